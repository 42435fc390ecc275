//! RDF parsing and serialization.
//!
//! Standard syntaxes go through `oxrdfio`; JSON-LD, HexTuples and TriX are
//! handled by the codecs in this module. Every parser produces an
//! [`oxrdf::Graph`]: named graphs are merged into the default graph, and
//! blank nodes are relabelled canonically so that parsing the same document
//! twice yields the same graph.

mod hextuples;
mod jsonld;
mod trix;
pub mod vocab;

use oxrdf::dataset::CanonicalizationAlgorithm;
use oxrdf::{Graph, TripleRef};
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};

use crate::error::{ParseError, SerializeError};
use crate::format::Format;

/// Maps a format onto the syntax `oxrdfio` handles for it, if any.
fn rdf_format(format: Format) -> Option<RdfFormat> {
    match format {
        Format::RdfXml => Some(RdfFormat::RdfXml),
        Format::N3 => Some(RdfFormat::N3),
        Format::Turtle => Some(RdfFormat::Turtle),
        Format::NTriples => Some(RdfFormat::NTriples),
        Format::TriG => Some(RdfFormat::TriG),
        Format::NQuads => Some(RdfFormat::NQuads),
        _ => None,
    }
}

pub(crate) fn parse(format: Format, bytes: &[u8], base_iri: Option<&str>) -> Result<Graph, ParseError> {
    let mut graph = parse_graph(format, bytes, base_iri)?;
    graph.canonicalize(CanonicalizationAlgorithm::Unstable);
    Ok(graph)
}

fn parse_graph(format: Format, bytes: &[u8], base_iri: Option<&str>) -> Result<Graph, ParseError> {
    let syntax = |message: String| ParseError::Syntax { format, message };

    match format {
        Format::JsonLd => return jsonld::parse(bytes, base_iri).map_err(syntax),
        Format::HexTuples => return hextuples::parse(bytes).map_err(syntax),
        Format::TriX => return trix::parse(bytes).map_err(syntax),
        _ => {}
    }

    let rdf_format = rdf_format(format).ok_or(ParseError::Unsupported(format))?;
    let mut parser = RdfParser::from_format(rdf_format);
    if let Some(base) = base_iri {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| syntax(format!("invalid base IRI {base:?}: {e}")))?;
    }

    let mut graph = Graph::new();
    for quad in parser.for_reader(bytes) {
        let quad = quad.map_err(|e| syntax(e.to_string()))?;
        graph.insert(TripleRef::new(&quad.subject, &quad.predicate, &quad.object));
    }
    Ok(graph)
}

pub(crate) fn serialize(format: Format, graph: &Graph) -> Result<Vec<u8>, SerializeError> {
    match format {
        Format::JsonLd => return jsonld::serialize(graph).map_err(|e| SerializeError::new(format, e)),
        Format::HexTuples => {
            return hextuples::serialize(graph).map_err(|e| SerializeError::new(format, e));
        }
        _ => {}
    }

    let rdf_format = rdf_format(format)
        .ok_or_else(|| SerializeError::new(format, "no serializer available"))?;

    let mut serializer = RdfSerializer::from_format(rdf_format).for_writer(Vec::new());
    for triple in sorted_triples(graph) {
        serializer
            .serialize_triple(triple)
            .map_err(|e| SerializeError::new(format, e))?;
    }
    serializer.finish().map_err(|e| SerializeError::new(format, e))
}

/// Triples of a graph in a deterministic order.
///
/// Sorted output keeps repeated indexing runs byte-identical.
pub(crate) fn sorted_triples(graph: &Graph) -> Vec<TripleRef<'_>> {
    let mut triples: Vec<TripleRef<'_>> = graph.iter().collect();
    triples.sort_by_cached_key(|t| t.to_string());
    triples
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURTLE: &str = r#"
        @prefix ex: <http://example.org/onto#> .
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

        <http://example.org/onto> a owl:Ontology ;
            rdfs:label "Example"@en .
        ex:Widget a owl:Class ;
            rdfs:label "Widget"@en, "Gerät"@de ;
            rdfs:comment "A thing with 3 parts" .
        ex:weight a owl:DatatypeProperty ;
            rdfs:domain ex:Widget .
    "#;

    fn example() -> Graph {
        Format::Turtle.parse(TURTLE.as_bytes(), None).unwrap()
    }

    #[test]
    fn test_parse_turtle() {
        let graph = example();
        assert_eq!(graph.len(), 8);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Format::Turtle.parse(b"this is not turtle", None).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax {
                format: Format::Turtle,
                ..
            }
        ));
    }

    #[test]
    fn test_relative_iris_resolve_against_base() {
        let graph = Format::Turtle
            .parse(
                b"<#a> <#b> <#c> .",
                Some("file:///data/onto.ttl"),
            )
            .unwrap();
        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.subject.to_string(), "<file:///data/onto.ttl#a>");
    }

    #[test]
    fn test_every_writable_output_round_trips() {
        let graph = example();
        for format in crate::format::OUTPUT_FORMATS {
            if !format.can_serialize() {
                continue;
            }
            let bytes = format.serialize(&graph).unwrap();
            let reparsed = format.parse(&bytes, None).unwrap();
            assert_eq!(reparsed, graph, "{format} did not round-trip");
        }
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let graph = example();
        let first = Format::Turtle.serialize(&graph).unwrap();
        let second = Format::Turtle.serialize(&example()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blank_nodes_are_stable_across_parses() {
        let turtle = br#"
            @prefix owl: <http://www.w3.org/2002/07/owl#> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            <http://e.org/A> rdfs:subClassOf [
                a owl:Restriction ;
                owl:onProperty <http://e.org/p> ;
                owl:someValuesFrom [ owl:unionOf ( <http://e.org/B> <http://e.org/C> ) ]
            ] .
        "#;
        let first = Format::Turtle.parse(turtle, None).unwrap();
        let second = Format::Turtle.parse(turtle, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            Format::Turtle.serialize(&first).unwrap(),
            Format::Turtle.serialize(&second).unwrap()
        );
    }

    #[test]
    fn test_quads_merge_into_default_graph() {
        let nquads = b"<http://e.org/s> <http://e.org/p> <http://e.org/o> <http://e.org/g> .\n\
                       <http://e.org/s> <http://e.org/p> <http://e.org/o2> .\n";
        let graph = Format::NQuads.parse(nquads, None).unwrap();
        assert_eq!(graph.len(), 2);
    }
}
