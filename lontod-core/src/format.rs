//! Format registry: file extensions, media types and output formats.

use std::fmt;
use std::path::Path;

use oxrdf::Graph;

use crate::error::{ParseError, SerializeError};
use crate::rdf;

/// A serialization an ontology can be read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    RdfXml,
    N3,
    Turtle,
    NTriples,
    TriG,
    TriX,
    RdfA,
    JsonLd,
    HexTuples,
    NQuads,
    Html,
}

/// Formats produced for every indexed ontology.
///
/// The order doubles as the preference order when negotiation ties.
pub const OUTPUT_FORMATS: [Format; 8] = [
    Format::Html,
    Format::RdfXml,
    Format::N3,
    Format::Turtle,
    Format::NTriples,
    Format::TriG,
    Format::JsonLd,
    Format::HexTuples,
];

const ALL_FORMATS: [Format; 11] = [
    Format::RdfXml,
    Format::N3,
    Format::Turtle,
    Format::NTriples,
    Format::TriG,
    Format::TriX,
    Format::RdfA,
    Format::JsonLd,
    Format::HexTuples,
    Format::NQuads,
    Format::Html,
];

impl Format {
    /// Look up the input format for a file extension.
    ///
    /// Matching is case-insensitive and tolerates a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "rdf" | "xml" | "owl" => Some(Format::RdfXml),
            "n3" => Some(Format::N3),
            "ttl" | "turtle" => Some(Format::Turtle),
            "nt" => Some(Format::NTriples),
            "trig" => Some(Format::TriG),
            "trix" => Some(Format::TriX),
            "xhtml" | "html" | "svg" => Some(Format::RdfA),
            "json" | "jsonld" | "json-ld" => Some(Format::JsonLd),
            "hext" => Some(Format::HexTuples),
            "nq" | "nquads" => Some(Format::NQuads),
            _ => None,
        }
    }

    /// Look up the input format of a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Look up a format by its media type, ignoring parameters.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        ALL_FORMATS
            .into_iter()
            .find(|format| format.mime_type().eq_ignore_ascii_case(essence))
    }

    /// The media type used when serving this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Format::RdfXml => "application/rdf+xml",
            Format::N3 => "text/n3",
            Format::Turtle => "text/turtle",
            Format::NTriples => "application/n-triples",
            Format::TriG => "application/trig",
            Format::TriX => "application/trix",
            Format::RdfA => "application/xhtml+xml",
            Format::JsonLd => "application/ld+json",
            Format::HexTuples => "application/hex+x-ndjson",
            Format::NQuads => "application/n-quads",
            Format::Html => "text/html",
        }
    }

    /// Extension used for download filenames.
    pub fn file_extension(self) -> &'static str {
        match self {
            Format::RdfXml => "rdf",
            Format::N3 => "n3",
            Format::Turtle => "ttl",
            Format::NTriples => "nt",
            Format::TriG => "trig",
            Format::TriX => "trix",
            Format::RdfA => "xhtml",
            Format::JsonLd => "jsonld",
            Format::HexTuples => "hext",
            Format::NQuads => "nq",
            Format::Html => "html",
        }
    }

    /// Position in the output preference order, if this is an output format.
    pub fn preference(self) -> Option<usize> {
        OUTPUT_FORMATS.iter().position(|f| *f == self)
    }

    /// Whether the bundled toolkit can read this format.
    pub fn can_parse(self) -> bool {
        !matches!(self, Format::RdfA | Format::Html)
    }

    /// Whether the bundled toolkit can write this format as RDF.
    pub fn can_serialize(self) -> bool {
        !matches!(self, Format::RdfA | Format::Html | Format::TriX)
    }

    /// Parse bytes in this format into a graph.
    ///
    /// Relative IRIs are resolved against `base_iri` when given.
    pub fn parse(self, bytes: &[u8], base_iri: Option<&str>) -> Result<Graph, ParseError> {
        if !self.can_parse() {
            return Err(ParseError::Unsupported(self));
        }
        rdf::parse(self, bytes, base_iri)
    }

    /// Serialize a graph into this format.
    pub fn serialize(self, graph: &Graph) -> Result<Vec<u8>, SerializeError> {
        if !self.can_serialize() {
            return Err(SerializeError::new(self, "format is not writable"));
        }
        rdf::serialize(self, graph)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::RdfXml => "RDF/XML",
            Format::N3 => "N3",
            Format::Turtle => "Turtle",
            Format::NTriples => "N-Triples",
            Format::TriG => "TriG",
            Format::TriX => "TriX",
            Format::RdfA => "RDFa",
            Format::JsonLd => "JSON-LD",
            Format::HexTuples => "HexTuples",
            Format::NQuads => "N-Quads",
            Format::Html => "HTML",
        };
        f.write_str(name)
    }
}

/// Sort media types by output preference, unknown types last and lexically.
pub fn sort_by_preference(mime_types: &mut [String]) {
    mime_types.sort_by_key(|mime| {
        let rank = Format::from_mime_type(mime)
            .and_then(Format::preference)
            .unwrap_or(usize::MAX);
        (rank, mime.clone())
    });
}
