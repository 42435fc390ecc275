//! HTML documentation pages and the anchors concepts are documented under.

mod render;
mod scanner;

use std::collections::HashMap;

use oxrdf::{Graph, NamedNodeRef, SubjectRef, TermRef};

pub use render::DocumentRenderer;
pub use scanner::DefinitionScanner;

use crate::error::RenderError;
use crate::ontology::OntologyMetadata;

/// Turns a parsed ontology into a standalone HTML document.
pub trait HtmlRenderer: Send + Sync {
    fn render(&self, graph: &Graph, metadata: &OntologyMetadata) -> Result<String, RenderError>;
}

/// Finds where concepts are documented inside a rendered page.
pub trait FragmentScanner: Send + Sync {
    /// Map from concept URI to the id of the element documenting it.
    fn anchors(&self, html: &str) -> HashMap<String, String>;
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`].
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Pick the literal to display for `subject` among `predicates`.
///
/// A literal tagged with an earlier entry of `languages` wins (prefix match,
/// so `en` accepts `en-GB`); untagged literals come next, then anything.
/// Remaining ties go to predicate order, then lexical order.
pub(crate) fn preferred_literal(
    graph: &Graph,
    subject: SubjectRef<'_>,
    predicates: &[NamedNodeRef<'_>],
    languages: &[String],
) -> Option<String> {
    let mut best: Option<((usize, usize, &str), &str)> = None;

    for (position, predicate) in predicates.iter().enumerate() {
        for object in graph.objects_for_subject_predicate(subject, *predicate) {
            let TermRef::Literal(literal) = object else {
                continue;
            };
            let rank = match literal.language() {
                Some(tag) => languages
                    .iter()
                    .position(|want| language_matches(tag, want))
                    .unwrap_or(languages.len() + 1),
                None => languages.len(),
            };
            let key = (rank, position, literal.value());
            if best.is_none_or(|(current, _)| key < current) {
                best = Some((key, literal.value()));
            }
        }
    }

    best.map(|(_, value)| value.to_string())
}

fn language_matches(tag: &str, wanted: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    let wanted = wanted.to_ascii_lowercase();
    tag == wanted || tag.strip_prefix(&wanted).is_some_and(|rest| rest.starts_with('-'))
}

/// The last segment of an IRI after `#` or `/`.
pub(crate) fn local_name(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['#', '/']);
    trimmed
        .rsplit(['#', '/', ':'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(trimmed)
}
