//! Ontology indexing core: formats, RDF codecs, HTML pages, the index store
//! and content negotiation.

pub mod error;
pub mod format;
pub mod html;
pub mod indexer;
pub mod negotiate;
pub mod ontology;
pub mod rdf;
pub mod store;

pub use error::{IndexError, NotAcceptable, ParseError, RenderError, SerializeError, StoreError};
pub use format::{Format, OUTPUT_FORMATS};
pub use indexer::{BatchReport, IndexedOntology, Indexer};
pub use negotiate::{MediaRange, negotiate};
pub use ontology::{Definiendum, OntologyMetadata, OntologyRecord, Representation};
pub use store::{ConceptMatch, IndexStore, OntologySummary, UpsertOutcome};
