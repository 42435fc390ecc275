use std::collections::{BTreeSet, HashSet};
use std::fmt::Write;

use oxrdf::{Graph, NamedNodeRef, SubjectRef, TermRef};

use super::{HtmlRenderer, escape, local_name, preferred_literal};
use crate::error::RenderError;
use crate::ontology::OntologyMetadata;
use crate::rdf::vocab;

const TITLE_PREDICATES: [NamedNodeRef<'static>; 3] = [vocab::TITLE, vocab::LABEL, vocab::PREF_LABEL];
const DESCRIPTION_PREDICATES: [NamedNodeRef<'static>; 3] =
    [vocab::DESCRIPTION, vocab::COMMENT, vocab::DEFINITION];

/// Sections of the page, each listing concepts of the given types.
const SECTIONS: [(&str, &[NamedNodeRef<'static>]); 7] = [
    ("Classes", &[vocab::OWL_CLASS, vocab::RDFS_CLASS]),
    ("Object Properties", &[vocab::OBJECT_PROPERTY]),
    ("Datatype Properties", &[vocab::DATATYPE_PROPERTY]),
    ("Annotation Properties", &[vocab::ANNOTATION_PROPERTY]),
    ("Properties", &[vocab::PROPERTY]),
    ("Named Individuals", &[vocab::NAMED_INDIVIDUAL]),
    ("Concepts", &[vocab::CONCEPT]),
];

/// Relations shown in a concept's table, with their row headings.
const RELATIONS: [(&str, NamedNodeRef<'static>); 5] = [
    ("Type", vocab::TYPE),
    ("Super-classes", vocab::SUB_CLASS_OF),
    ("Super-properties", vocab::SUB_PROPERTY_OF),
    ("Domain", vocab::DOMAIN),
    ("Range", vocab::RANGE),
];

/// Renders a single self-contained documentation page.
///
/// Every concept is wrapped in a `div` whose id is derived from its local
/// name, with the concept IRI in the first table row; [`DefinitionScanner`]
/// recognises exactly this shape.
///
/// [`DefinitionScanner`]: super::DefinitionScanner
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    languages: Vec<String>,
}

impl DocumentRenderer {
    /// A renderer preferring labels in the given languages, most preferred first.
    pub fn new(languages: Vec<String>) -> Self {
        Self { languages }
    }

    fn text(&self, graph: &Graph, iri: &str, predicates: &[NamedNodeRef<'_>]) -> Option<String> {
        preferred_literal(
            graph,
            SubjectRef::NamedNode(NamedNodeRef::new_unchecked(iri)),
            predicates,
            &self.languages,
        )
    }

    fn label(&self, graph: &Graph, iri: &str) -> String {
        self.text(graph, iri, &TITLE_PREDICATES)
            .unwrap_or_else(|| local_name(iri).to_string())
    }

    fn header(&self, out: &mut String, graph: &Graph, metadata: &OntologyMetadata) -> std::fmt::Result {
        let title = if metadata.declared {
            self.text(graph, &metadata.uri, &TITLE_PREDICATES)
                .unwrap_or_else(|| metadata.uri.clone())
        } else {
            metadata.uri.clone()
        };

        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html>")?;
        writeln!(out, "<head>")?;
        writeln!(out, "<meta charset=\"utf-8\">")?;
        writeln!(out, "<title>{}</title>", escape(&title))?;
        writeln!(out, "</head>")?;
        writeln!(out, "<body>")?;
        writeln!(out, "<h1>{}</h1>", escape(&title))?;

        if let Some(description) = self.text(graph, &metadata.uri, &DESCRIPTION_PREDICATES) {
            writeln!(out, "<p class=\"description\">{}</p>", escape(&description))?;
        }

        writeln!(out, "<table class=\"metadata\">")?;
        writeln!(out, "<tr><th>IRI</th><td><code>{}</code></td></tr>", escape(&metadata.uri))?;
        for alternate in &metadata.alternate_uris {
            writeln!(
                out,
                "<tr><th>Version IRI</th><td><code>{}</code></td></tr>",
                escape(alternate)
            )?;
        }
        for (heading, predicate) in [
            ("Version", vocab::VERSION_INFO),
            ("Creator", vocab::CREATOR),
            ("License", vocab::LICENSE),
        ] {
            for value in self.values(graph, &metadata.uri, predicate) {
                writeln!(out, "<tr><th>{heading}</th><td>{value}</td></tr>")?;
            }
        }
        writeln!(out, "</table>")
    }

    /// Escaped display values of one relation, in lexical order.
    fn values(&self, graph: &Graph, iri: &str, predicate: NamedNodeRef<'_>) -> BTreeSet<String> {
        graph
            .objects_for_subject_predicate(NamedNodeRef::new_unchecked(iri), predicate)
            .map(|object| match object {
                TermRef::NamedNode(node) => format!("<code>{}</code>", escape(node.as_str())),
                TermRef::Literal(literal) => escape(literal.value()),
                other => escape(&other.to_string()),
            })
            .collect()
    }

    fn concept(
        &self,
        out: &mut String,
        graph: &Graph,
        iri: &str,
        id: &str,
    ) -> std::fmt::Result {
        writeln!(out, "<div id=\"{}\" class=\"concept\">", escape(id))?;
        writeln!(out, "<h3>{}</h3>", escape(&self.label(graph, iri)))?;
        writeln!(out, "<table>")?;
        writeln!(out, "<tr><th>IRI</th><td><code>{}</code></td></tr>", escape(iri))?;
        if let Some(description) = self.text(graph, iri, &DESCRIPTION_PREDICATES) {
            writeln!(
                out,
                "<tr><th>Description</th><td>{}</td></tr>",
                escape(&description)
            )?;
        }
        for (heading, predicate) in RELATIONS {
            let values = self.values(graph, iri, predicate);
            if !values.is_empty() {
                let joined: Vec<String> = values.into_iter().collect();
                writeln!(out, "<tr><th>{heading}</th><td>{}</td></tr>", joined.join(", "))?;
            }
        }
        writeln!(out, "</table>")?;
        writeln!(out, "</div>")
    }
}

impl HtmlRenderer for DocumentRenderer {
    fn render(&self, graph: &Graph, metadata: &OntologyMetadata) -> Result<String, RenderError> {
        if graph.is_empty() {
            return Err(RenderError("graph is empty".into()));
        }

        let fmt_err = |e: std::fmt::Error| RenderError(e.to_string());
        let mut out = String::new();
        self.header(&mut out, graph, metadata).map_err(fmt_err)?;

        let mut ids = FragmentIds::default();
        let mut placed: HashSet<&str> = HashSet::new();

        for (heading, types) in SECTIONS {
            let members: Vec<&String> = metadata
                .concepts
                .iter()
                .filter(|iri| !placed.contains(iri.as_str()))
                .filter(|iri| {
                    types.iter().any(|class| {
                        graph.contains(oxrdf::TripleRef::new(
                            NamedNodeRef::new_unchecked(iri),
                            vocab::TYPE,
                            *class,
                        ))
                    })
                })
                .collect();
            if members.is_empty() {
                continue;
            }

            writeln!(out, "<h2>{heading}</h2>").map_err(fmt_err)?;
            for iri in members {
                placed.insert(iri.as_str());
                let id = ids.next(iri);
                self.concept(&mut out, graph, iri, &id).map_err(fmt_err)?;
            }
        }

        let rest: Vec<&String> = metadata
            .concepts
            .iter()
            .filter(|iri| !placed.contains(iri.as_str()))
            .collect();
        if !rest.is_empty() {
            writeln!(out, "<h2>Other Definitions</h2>").map_err(fmt_err)?;
            for iri in rest {
                let id = ids.next(iri);
                self.concept(&mut out, graph, iri, &id).map_err(fmt_err)?;
            }
        }

        writeln!(out, "</body>").map_err(fmt_err)?;
        writeln!(out, "</html>").map_err(fmt_err)?;
        Ok(out)
    }
}

/// Hands out unique element ids derived from local names.
#[derive(Default)]
struct FragmentIds {
    used: HashSet<String>,
}

impl FragmentIds {
    fn next(&mut self, iri: &str) -> String {
        let mut base: String = local_name(iri)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if base.is_empty() {
            base.push_str("concept");
        }

        let mut id = base.clone();
        let mut n = 2;
        while !self.used.insert(id.clone()) {
            id = format!("{base}-{n}");
            n += 1;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;

    const ONTO: &str = r#"
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix dcterms: <http://purl.org/dc/terms/> .
        <http://example.org/onto#> a owl:Ontology ;
            dcterms:title "Widgets & Co"@en, "Widgets und Co"@de ;
            owl:versionIRI <http://example.org/onto/1.0#> .
        <http://example.org/onto#Widget> a owl:Class ;
            rdfs:label "Widget"@en ;
            rdfs:comment "A <small> thing" .
        <http://example.org/other#Widget> a owl:Class ;
            rdfs:isDefinedBy <http://example.org/onto#> .
        <http://example.org/onto#weight> a owl:DatatypeProperty ;
            rdfs:domain <http://example.org/onto#Widget> .
    "#;

    fn render(languages: &[&str]) -> String {
        let graph = Format::Turtle.parse(ONTO.as_bytes(), None).unwrap();
        let metadata = OntologyMetadata::extract(&graph, "onto");
        DocumentRenderer::new(languages.iter().map(|l| l.to_string()).collect())
            .render(&graph, &metadata)
            .unwrap()
    }

    #[test]
    fn test_renders_escaped_title_in_preferred_language() {
        assert!(render(&["en"]).contains("<h1>Widgets &amp; Co</h1>"));
        assert!(render(&["de"]).contains("<h1>Widgets und Co</h1>"));
    }

    #[test]
    fn test_concepts_get_unique_ids() {
        let html = render(&[]);
        assert!(html.contains("<div id=\"Widget\" class=\"concept\">"));
        assert!(html.contains("<div id=\"Widget-2\" class=\"concept\">"));
        assert!(html.contains("<div id=\"weight\" class=\"concept\">"));
        assert!(html.contains("A &lt;small&gt; thing"));
    }

    #[test]
    fn test_sections_follow_concept_kinds() {
        let html = render(&[]);
        let classes = html.find("<h2>Classes</h2>").unwrap();
        let properties = html.find("<h2>Datatype Properties</h2>").unwrap();
        assert!(classes < properties);
        assert!(!html.contains("Other Definitions"));
    }

    #[test]
    fn test_empty_graph_fails() {
        let graph = Graph::new();
        let metadata = OntologyMetadata::extract(&graph, "empty");
        let err = DocumentRenderer::default().render(&graph, &metadata).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
