//! Turns ontology files into index store records.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::error::IndexError;
use crate::format::{Format, OUTPUT_FORMATS};
use crate::html::{DefinitionScanner, DocumentRenderer, FragmentScanner, HtmlRenderer};
use crate::ontology::{OntologyMetadata, OntologyRecord, Representation, slug_from_path};
use crate::store::IndexStore;

/// What a successful indexing run committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedOntology {
    pub path: PathBuf,
    pub slug: String,
    pub uri: String,
    /// Formats stored, HTML first.
    pub formats: Vec<Format>,
    /// Number of concept definienda.
    pub concepts: usize,
    /// Slugs removed because they claimed the same IRI.
    pub displaced: Vec<String>,
}

/// Per-file results of indexing a list of paths.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub indexed: Vec<IndexedOntology>,
    pub failed: Vec<IndexError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn merge(&mut self, other: BatchReport) {
        self.indexed.extend(other.indexed);
        self.failed.extend(other.failed);
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ontology in &self.indexed {
            writeln!(
                f,
                "ok      {} -> {} ({})",
                ontology.path.display(),
                ontology.slug,
                ontology.uri
            )?;
        }
        for failure in &self.failed {
            writeln!(f, "failed  {failure}")?;
        }
        write!(
            f,
            "{} indexed, {} failed",
            self.indexed.len(),
            self.failed.len()
        )
    }
}

/// Parses, serializes, renders and commits ontology files.
pub struct Indexer {
    store: Arc<IndexStore>,
    renderer: Box<dyn HtmlRenderer>,
    scanner: Box<dyn FragmentScanner>,
}

impl Indexer {
    /// An indexer with the bundled renderer, preferring the given label languages.
    pub fn new(store: Arc<IndexStore>, languages: Vec<String>) -> Self {
        Self {
            store,
            renderer: Box::new(DocumentRenderer::new(languages)),
            scanner: Box::new(DefinitionScanner),
        }
    }

    pub fn with_renderer(mut self, renderer: impl HtmlRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Index every file and directory in `paths`, continuing past failures.
    ///
    /// Directories are expanded one level deep; dot-files, sub-directories
    /// and files without a known extension inside them are skipped.
    pub fn index_paths<P: AsRef<Path>>(&self, paths: &[P]) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                report.merge(self.index_directory(path));
                continue;
            }
            self.record(&mut report, self.index_file(path));
        }
        report
    }

    fn index_directory(&self, dir: &Path) -> BatchReport {
        let mut report = BatchReport::default();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                report.failed.push(IndexError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
                return report;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                let hidden = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_none_or(|name| name.starts_with('.'));
                !hidden && path.is_file()
            })
            .collect();
        files.sort();

        for path in files {
            if Format::from_path(&path).is_none() {
                debug!(path = %path.display(), "skipping file with unknown extension");
                continue;
            }
            self.record(&mut report, self.index_file(&path));
        }
        report
    }

    fn record(&self, report: &mut BatchReport, result: Result<IndexedOntology, IndexError>) {
        match result {
            Ok(indexed) => report.indexed.push(indexed),
            Err(err) => {
                error!(error = %err, "unable to index ontology");
                report.failed.push(err);
            }
        }
    }

    /// Index a single file, replacing whatever its slug held before.
    ///
    /// On error nothing is written.
    #[instrument(skip(self, path), fields(path = %path.display()), level = "debug")]
    pub fn index_file(&self, path: &Path) -> Result<IndexedOntology, IndexError> {
        let at = || path.to_path_buf();

        if !path.is_file() {
            return Err(IndexError::NotFound { path: at() });
        }
        let format = Format::from_path(path).ok_or_else(|| IndexError::UnknownExtension { path: at() })?;
        let slug = slug_from_path(path).ok_or_else(|| IndexError::UnknownExtension { path: at() })?;
        let bytes = fs::read(path).map_err(|source| IndexError::Io { path: at(), source })?;

        debug!(%format, "parsing graph");
        let base = base_iri(path);
        let graph = format
            .parse(&bytes, base.as_deref())
            .map_err(|source| IndexError::Parse { path: at(), source })?;

        let metadata = OntologyMetadata::extract(&graph, &slug);

        let mut machine = Vec::new();
        for output in OUTPUT_FORMATS.into_iter().filter(|f| *f != Format::Html) {
            match output.serialize(&graph) {
                Ok(data) => machine.push((output, data)),
                Err(err) => warn!(slug = %slug, error = %err, "omitting format"),
            }
        }
        if machine.is_empty() {
            return Err(IndexError::NoSerialization { path: at() });
        }

        let html = self
            .renderer
            .render(&graph, &metadata)
            .map_err(|source| IndexError::Render { path: at(), source })?;
        let anchors = self.scanner.anchors(&html);
        let definienda = metadata.definienda(&anchors);

        let mut formats = vec![Format::Html];
        let mut representations = vec![Representation {
            mime_type: Format::Html.mime_type().to_string(),
            data: html.into_bytes(),
        }];
        for (output, data) in machine {
            formats.push(output);
            representations.push(Representation {
                mime_type: output.mime_type().to_string(),
                data,
            });
        }

        let record = OntologyRecord {
            slug: slug.clone(),
            uri: metadata.uri.clone(),
            representations,
            definienda,
        };
        let outcome = self
            .store
            .upsert(&record)
            .map_err(|source| IndexError::Store { path: at(), source })?;

        info!(slug = %slug, uri = %metadata.uri, concepts = metadata.concepts.len(), "indexed ontology");
        Ok(IndexedOntology {
            path: at(),
            slug,
            uri: metadata.uri,
            formats,
            concepts: record.definienda.iter().filter(|d| !d.canonical).count(),
            displaced: outcome.displaced,
        })
    }

    /// Forget the ontology indexed from `path`. Returns whether it was present.
    #[instrument(skip(self, path), fields(path = %path.display()), level = "debug")]
    pub fn remove_path(&self, path: &Path) -> Result<bool, IndexError> {
        let slug = slug_from_path(path).ok_or_else(|| IndexError::UnknownExtension {
            path: path.to_path_buf(),
        })?;
        let removed = self.store.delete(&slug).map_err(|source| IndexError::Store {
            path: path.to_path_buf(),
            source,
        })?;
        if removed {
            info!(slug = %slug, "removed ontology");
        }
        Ok(removed)
    }
}

/// `file://` URL of a path, used to resolve relative IRIs.
fn base_iri(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).ok()?;
    url::Url::from_file_path(absolute).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use oxrdf::Graph;

    const ONTO: &str = r#"
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        <http://example.org/onto#> a owl:Ontology ; rdfs:label "Onto" .
        <http://example.org/onto#Widget> a owl:Class ; rdfs:label "Widget" .
    "#;

    fn indexer() -> Indexer {
        Indexer::new(Arc::new(IndexStore::open_in_memory().unwrap()), vec![])
    }

    struct FailingRenderer;

    impl HtmlRenderer for FailingRenderer {
        fn render(&self, _: &Graph, _: &OntologyMetadata) -> Result<String, RenderError> {
            Err(RenderError("boom".into()))
        }
    }

    #[test]
    fn test_index_file_stores_every_output_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onto.ttl");
        fs::write(&path, ONTO).unwrap();

        let indexer = indexer();
        let indexed = indexer.index_file(&path).unwrap();
        assert_eq!(indexed.slug, "onto");
        assert_eq!(indexed.uri, "http://example.org/onto#");
        assert_eq!(indexed.formats.len(), OUTPUT_FORMATS.len());
        assert_eq!(indexed.concepts, 1);

        let fragment = indexer
            .store()
            .resolve_concept(&["http://example.org/onto#Widget"])
            .unwrap()
            .unwrap()
            .fragment;
        assert_eq!(fragment.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_render_failure_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onto.ttl");
        fs::write(&path, ONTO).unwrap();

        let store = Arc::new(IndexStore::open_in_memory().unwrap());
        Indexer::new(store.clone(), vec![]).index_file(&path).unwrap();

        let failing = Indexer::new(store.clone(), vec![]).with_renderer(FailingRenderer);
        let err = failing.index_file(&path).unwrap_err();
        assert!(matches!(err, IndexError::Render { .. }));
        assert_eq!(store.list_ontologies().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_extension_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "hello").unwrap();

        let indexer = indexer();
        assert!(matches!(
            indexer.index_file(&notes),
            Err(IndexError::UnknownExtension { .. })
        ));
        assert!(matches!(
            indexer.index_file(&dir.path().join("missing.ttl")),
            Err(IndexError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onto.ttl");
        fs::write(&path, ONTO).unwrap();

        let indexer = indexer();
        indexer.index_file(&path).unwrap();
        assert!(indexer.remove_path(&path).unwrap());
        assert!(!indexer.remove_path(&path).unwrap());
    }

    #[test]
    fn test_report_display() {
        let report = BatchReport {
            indexed: vec![],
            failed: vec![IndexError::NotFound {
                path: PathBuf::from("gone.ttl"),
            }],
        };
        let text = report.to_string();
        assert!(text.contains("failed  gone.ttl: neither a file nor a directory"));
        assert!(text.ends_with("0 indexed, 1 failed"));
        assert!(!report.is_success());
    }
}
