//! Ontology metadata: identity, alternate identifiers and defined concepts.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use oxrdf::{Graph, NamedNodeRef, SubjectRef, TermRef};

use crate::rdf::vocab;

/// Prefix of identifiers synthesized for documents without an ontology subject.
pub const FALLBACK_PREFIX: &str = "urn:lontod:";

/// Identity and vocabulary of one parsed ontology document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyMetadata {
    /// The declared ontology subject, or `urn:lontod:<slug>`.
    pub uri: String,
    /// Whether `uri` was declared in the graph rather than synthesized.
    pub declared: bool,
    /// IRIs declared through `owl:versionIRI`, in IRI order.
    pub alternate_uris: Vec<String>,
    /// IRIs of concepts defined by the ontology.
    pub concepts: BTreeSet<String>,
}

impl OntologyMetadata {
    /// Reads identity and concepts out of a graph.
    pub fn extract(graph: &Graph, slug: &str) -> Self {
        let subject = ontology_subject(graph);

        let (uri, declared) = match subject {
            Some(node) => (node.as_str().to_string(), true),
            None => (format!("{FALLBACK_PREFIX}{slug}"), false),
        };

        let alternate_uris: Vec<String> = match subject {
            Some(node) => graph
                .objects_for_subject_predicate(node, vocab::VERSION_IRI)
                .filter_map(|object| match object {
                    TermRef::NamedNode(iri) if iri != node => Some(iri.as_str().to_string()),
                    _ => None,
                })
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => Vec::new(),
        };

        let mut identities: BTreeSet<&str> = alternate_uris.iter().map(String::as_str).collect();
        identities.insert(uri.as_str());

        let mut concepts = BTreeSet::new();
        for class in vocab::CONCEPT_TYPES {
            for instance in graph.subjects_for_predicate_object(vocab::TYPE, class) {
                if let SubjectRef::NamedNode(iri) = instance {
                    concepts.insert(iri.as_str().to_string());
                }
            }
        }
        for triple in graph.triples_for_predicate(vocab::IS_DEFINED_BY) {
            let defined_here = match triple.object {
                TermRef::NamedNode(iri) => identities.contains(iri.as_str()),
                _ => false,
            };
            if let (true, SubjectRef::NamedNode(iri)) = (defined_here, triple.subject) {
                concepts.insert(iri.as_str().to_string());
            }
        }
        concepts.retain(|concept| !identities.contains(concept.as_str()));

        Self {
            uri,
            declared,
            alternate_uris,
            concepts,
        }
    }

    /// All definienda of this ontology given the anchors found in its HTML.
    ///
    /// The canonical IRI comes first, followed by alternates, concepts, and
    /// the version-relative aliases of every concept below the canonical IRI.
    pub fn definienda(&self, anchors: &HashMap<String, String>) -> Vec<Definiendum> {
        let mut out = vec![Definiendum::canonical(&self.uri)];
        out.extend(self.alternate_uris.iter().map(|uri| Definiendum::canonical(uri)));

        let mut concepts: BTreeMap<String, Option<String>> = BTreeMap::new();
        for concept in &self.concepts {
            let fragment = anchors.get(concept).cloned();
            if let Some(relative) = concept.strip_prefix(self.uri.as_str()) {
                for base in &self.alternate_uris {
                    concepts
                        .entry(format!("{base}{relative}"))
                        .or_insert_with(|| fragment.clone());
                }
            }
            concepts.insert(concept.clone(), fragment);
        }

        let identities: BTreeSet<&str> = out.iter().map(|d| d.uri.as_str()).collect();
        let concepts: Vec<Definiendum> = concepts
            .into_iter()
            .filter(|(uri, _)| !identities.contains(uri.as_str()))
            .map(|(uri, fragment)| Definiendum {
                uri,
                canonical: false,
                fragment,
            })
            .collect();
        out.extend(concepts);
        out
    }
}

/// The IRI subject typed as an ontology, by type priority then IRI order.
pub fn ontology_subject(graph: &Graph) -> Option<NamedNodeRef<'_>> {
    vocab::ONTOLOGY_TYPES.into_iter().find_map(|class| {
        graph
            .subjects_for_predicate_object(vocab::TYPE, class)
            .filter_map(|subject| match subject {
                SubjectRef::NamedNode(iri) => Some(iri),
                _ => None,
            })
            .min_by_key(|iri| iri.as_str())
    })
}

/// A URI documented by an ontology.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Definiendum {
    pub uri: String,
    /// The ontology's own identity (canonical or alternate IRI).
    pub canonical: bool,
    /// HTML anchor of the concept's definition.
    pub fragment: Option<String>,
}

impl Definiendum {
    fn canonical(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            canonical: true,
            fragment: None,
        }
    }
}

/// One stored serialization of an ontology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Everything committed for one indexed file.
///
/// Alternate IRIs travel as the canonical definienda after the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyRecord {
    pub slug: String,
    pub uri: String,
    pub representations: Vec<Representation>,
    pub definienda: Vec<Definiendum>,
}

/// The slug of a source file: its file name without the final extension.
pub fn slug_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}
