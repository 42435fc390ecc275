//! JSON-LD reading and writing.
//!
//! Output is flattened expanded form: one node object per subject with fully
//! expanded property IRIs, which every JSON-LD processor reads without a
//! context. Input accepts expanded documents as well as compacted ones with
//! embedded contexts (prefixes, terms, `@vocab`, `@base`, `@language`, type
//! coercion, list containers, keyword aliases and scoped contexts). Remote
//! contexts are not fetched.

use std::collections::{BTreeMap, HashMap};

use oxrdf::{BlankNode, Graph, Literal, NamedNode, Subject, Term, Triple};
use serde_json::{Map, Value, json};
use url::Url;

use super::vocab;

const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

pub(super) fn serialize(graph: &Graph) -> Result<Vec<u8>, String> {
    let mut nodes: BTreeMap<String, BTreeMap<String, Vec<Value>>> = BTreeMap::new();

    for triple in graph.iter() {
        let subject = match triple.subject {
            oxrdf::SubjectRef::NamedNode(node) => node.as_str().to_string(),
            oxrdf::SubjectRef::BlankNode(node) => format!("_:{}", node.as_str()),
            #[allow(unreachable_patterns)]
            _ => return Err("quoted triples cannot be written as JSON-LD".into()),
        };
        let object = match triple.object {
            oxrdf::TermRef::NamedNode(node) => json!({ "@id": node.as_str() }),
            oxrdf::TermRef::BlankNode(node) => json!({ "@id": format!("_:{}", node.as_str()) }),
            oxrdf::TermRef::Literal(literal) => literal_value(literal),
            #[allow(unreachable_patterns)]
            _ => return Err("quoted triples cannot be written as JSON-LD".into()),
        };

        nodes
            .entry(subject)
            .or_default()
            .entry(triple.predicate.as_str().to_string())
            .or_default()
            .push(object);
    }

    let document: Vec<Value> = nodes
        .into_iter()
        .map(|(id, properties)| {
            let mut node = Map::new();
            node.insert("@id".into(), Value::String(id));
            for (predicate, mut values) in properties {
                values.sort_by_key(|v| v.to_string());
                node.insert(predicate, Value::Array(values));
            }
            Value::Object(node)
        })
        .collect();

    serde_json::to_vec_pretty(&document).map_err(|e| e.to_string())
}

fn literal_value(literal: oxrdf::LiteralRef<'_>) -> Value {
    if let Some(language) = literal.language() {
        json!({ "@value": literal.value(), "@language": language })
    } else if literal.datatype() == vocab::XSD_STRING {
        json!({ "@value": literal.value() })
    } else {
        json!({ "@value": literal.value(), "@type": literal.datatype().as_str() })
    }
}

pub(super) fn parse(bytes: &[u8], base_iri: Option<&str>) -> Result<Graph, String> {
    let document: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    let context = Context::new(base_iri);
    let mut reader = Reader::default();

    match &document {
        Value::Array(nodes) => {
            for node in nodes {
                reader.top_level(node, &context)?;
            }
        }
        Value::Object(_) => reader.top_level(&document, &context)?,
        _ => return Err("expected a JSON object or array".into()),
    }

    Ok(reader.graph)
}

/// How a term coerces plain string values.
#[derive(Debug, Clone, PartialEq)]
enum Coercion {
    Id,
    Vocab,
    Datatype(String),
}

#[derive(Debug, Clone, Default)]
struct TermDefinition {
    /// Absolute IRI or keyword the term stands for
    iri: String,
    coercion: Option<Coercion>,
    /// `Some(None)` when the term clears the default language
    language: Option<Option<String>>,
    list: bool,
    scoped: Option<Value>,
}

/// Active context while reading a document.
#[derive(Debug, Clone, Default)]
struct Context {
    /// Base of the document itself, restored by a `null` context
    origin: Option<String>,
    base: Option<String>,
    vocab: Option<String>,
    language: Option<String>,
    /// `None` marks a term explicitly mapped to nothing
    terms: HashMap<String, Option<TermDefinition>>,
}

impl Context {
    fn new(base: Option<&str>) -> Self {
        Self {
            origin: base.map(str::to_string),
            base: base.map(str::to_string),
            ..Default::default()
        }
    }

    /// The context after applying a local `@context` value.
    fn with(&self, local: &Value) -> Result<Context, String> {
        let mut result = self.clone();
        for entry in as_array(local) {
            match entry {
                Value::Null => result = Context::new(self.origin.as_deref()),
                Value::String(url) => {
                    return Err(format!("remote context {url:?} is not supported"));
                }
                Value::Object(definitions) => result.define_all(definitions)?,
                _ => return Err("@context entries must be objects, strings or null".into()),
            }
        }
        Ok(result)
    }

    fn define_all(&mut self, definitions: &Map<String, Value>) -> Result<(), String> {
        if let Some(base) = definitions.get("@base") {
            self.base = match base {
                Value::Null => None,
                Value::String(iri) => Some(self.resolve(iri)),
                _ => return Err("@base must be a string or null".into()),
            };
        }
        if let Some(vocab) = definitions.get("@vocab") {
            self.vocab = match vocab {
                Value::Null => None,
                Value::String(iri) => Some(self.expand_iri(iri, true)),
                _ => return Err("@vocab must be a string or null".into()),
            };
        }
        if let Some(language) = definitions.get("@language") {
            self.language = match language {
                Value::Null => None,
                Value::String(tag) => Some(tag.clone()),
                _ => return Err("@language must be a string or null".into()),
            };
        }

        let mut state = HashMap::new();
        for term in definitions.keys().filter(|key| !key.starts_with('@')) {
            self.define(definitions, term, &mut state)?;
        }
        Ok(())
    }

    /// Create the definition of `term`, defining the terms it refers to first.
    ///
    /// `state` holds `false` for terms being defined and `true` once done.
    fn define(
        &mut self,
        definitions: &Map<String, Value>,
        term: &str,
        state: &mut HashMap<String, bool>,
    ) -> Result<(), String> {
        match state.get(term) {
            Some(true) => return Ok(()),
            Some(false) => return Err(format!("cyclic definition of term {term:?}")),
            None => {}
        }
        state.insert(term.to_string(), false);

        let value = &definitions[term];
        let (id, object) = match value {
            Value::Null => (None, None),
            Value::String(id) => (Some(id.as_str()), None),
            Value::Object(object) => match object.get("@id") {
                Some(Value::String(id)) => (Some(id.as_str()), Some(object)),
                Some(Value::Null) => (None, None),
                None => (None, Some(object)),
                Some(_) => return Err(format!("@id of term {term:?} must be a string")),
            },
            _ => return Err(format!("invalid definition of term {term:?}")),
        };

        if id.is_none() && object.is_none() {
            self.terms.insert(term.to_string(), None);
            state.insert(term.to_string(), true);
            return Ok(());
        }

        let datatype = object.and_then(|o| o.get("@type")).and_then(Value::as_str);
        for reference in [id, datatype, Some(term)].into_iter().flatten() {
            let dependency = reference.split_once(':').map_or(reference, |(prefix, _)| prefix);
            if dependency != term && definitions.contains_key(dependency) {
                self.define(definitions, dependency, state)?;
            }
        }

        let iri = match id {
            Some(id) => self
                .expand(id, true, false)
                .ok_or_else(|| format!("term {term:?} does not map to an IRI"))?,
            None if term.contains(':') => self.expand_iri(term, false),
            None => match &self.vocab {
                Some(vocab) => format!("{vocab}{term}"),
                None => return Err(format!("term {term:?} does not map to an IRI")),
            },
        };

        let mut definition = TermDefinition {
            iri,
            ..Default::default()
        };
        if let Some(object) = object {
            if object.contains_key("@reverse") {
                return Err(format!("reverse term {term:?} is not supported"));
            }
            definition.coercion = match datatype {
                None => None,
                Some("@id") => Some(Coercion::Id),
                Some("@vocab") => Some(Coercion::Vocab),
                Some(datatype) => Some(Coercion::Datatype(self.expand_iri(datatype, true))),
            };
            definition.language = match object.get("@language") {
                None => None,
                Some(Value::Null) => Some(None),
                Some(Value::String(tag)) => Some(Some(tag.clone())),
                Some(_) => return Err(format!("@language of term {term:?} must be a string")),
            };
            for container in object.get("@container").map(as_array).unwrap_or_default() {
                match container.as_str() {
                    Some("@list") => definition.list = true,
                    Some("@set") => {}
                    other => return Err(format!("container {other:?} is not supported")),
                }
            }
            definition.scoped = object.get("@context").cloned();
        }

        self.terms.insert(term.to_string(), Some(definition));
        state.insert(term.to_string(), true);
        Ok(())
    }

    fn definition(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term).and_then(Option::as_ref)
    }

    /// Expand a term, compact IRI or relative IRI.
    ///
    /// `vocab` allows terms and `@vocab`, `relative` allows resolving against
    /// the base. `None` means the value maps to nothing.
    fn expand(&self, value: &str, vocab: bool, relative: bool) -> Option<String> {
        if value.starts_with('@') {
            return Some(value.to_string());
        }
        if vocab {
            if let Some(definition) = self.terms.get(value) {
                return definition.as_ref().map(|d| d.iri.clone());
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Some(value.to_string());
            }
            if let Some(definition) = self.definition(prefix) {
                return Some(format!("{}{suffix}", definition.iri));
            }
            return Some(value.to_string());
        }
        if vocab {
            if let Some(base) = &self.vocab {
                return Some(format!("{base}{value}"));
            }
        }
        relative.then(|| self.resolve(value))
    }

    fn expand_iri(&self, value: &str, vocab: bool) -> String {
        self.expand(value, vocab, true)
            .unwrap_or_else(|| value.to_string())
    }

    fn resolve(&self, value: &str) -> String {
        self.base
            .as_deref()
            .and_then(|base| Url::parse(base).ok())
            .and_then(|base| base.join(value).ok())
            .map_or_else(|| value.to_string(), String::from)
    }

    /// The entry of `object` for `keyword`, honouring aliases.
    fn keyword<'v>(&self, object: &'v Map<String, Value>, keyword: &str) -> Option<&'v Value> {
        object.get(keyword).or_else(|| {
            object
                .iter()
                .find(|(key, _)| {
                    !key.starts_with('@')
                        && self.definition(key).is_some_and(|d| d.iri == keyword)
                })
                .map(|(_, value)| value)
        })
    }
}

#[derive(Default)]
struct Reader {
    graph: Graph,
    blank_nodes: HashMap<String, BlankNode>,
}

impl Reader {
    fn top_level(&mut self, value: &Value, context: &Context) -> Result<(), String> {
        match value {
            Value::Object(object) => self.node(object, context).map(|_| ()),
            _ => Err("top-level entries must be node objects".into()),
        }
    }

    fn node(&mut self, object: &Map<String, Value>, active: &Context) -> Result<Subject, String> {
        let local;
        let context = match object.get("@context") {
            Some(value) => {
                local = active.with(value)?;
                &local
            }
            None => active,
        };

        let subject: Subject = match context.keyword(object, "@id") {
            Some(Value::String(id)) => self.reference(context, id, false)?.into_subject(),
            Some(_) => return Err("@id must be a string".into()),
            None => BlankNode::default().into(),
        };

        for (key, values) in object {
            if key == "@context" {
                continue;
            }
            // keys mapping to nothing are dropped
            let Some(expanded) = context.expand(key, true, false) else {
                continue;
            };

            match expanded.as_str() {
                "@type" => {
                    for value in as_array(values) {
                        let Value::String(iri) = value else {
                            return Err("@type values must be strings".into());
                        };
                        let class = named_node(&context.expand_iri(iri, true))?;
                        self.graph.insert(&Triple::new(
                            subject.clone(),
                            vocab::TYPE.into_owned(),
                            class,
                        ));
                    }
                }
                // named graphs are merged into the default graph
                "@graph" => {
                    for value in as_array(values) {
                        let Value::Object(node) = value else {
                            return Err("@graph entries must be node objects".into());
                        };
                        self.node(node, context)?;
                    }
                }
                "@reverse" => return Err("@reverse is not supported".into()),
                keyword if keyword.starts_with('@') => {}
                property => {
                    let predicate = NamedNode::new(property)
                        .map_err(|_| format!("property {key:?} is not an absolute IRI"))?;
                    let definition = context.definition(key);

                    let scoped;
                    let value_context = match definition.and_then(|d| d.scoped.as_ref()) {
                        Some(local) => {
                            scoped = context.with(local)?;
                            &scoped
                        }
                        None => context,
                    };

                    let objects = if definition.is_some_and(|d| d.list)
                        && !matches!(values, Value::Object(o) if value_context.keyword(o, "@list").is_some())
                    {
                        vec![self.list(values, value_context, definition)?]
                    } else {
                        let mut objects = Vec::new();
                        for value in set_values(values) {
                            objects.push(self.object(value, value_context, definition)?);
                        }
                        objects
                    };
                    for object in objects {
                        self.graph
                            .insert(&Triple::new(subject.clone(), predicate.clone(), object));
                    }
                }
            }
        }

        Ok(subject)
    }

    fn object(
        &mut self,
        value: &Value,
        context: &Context,
        term: Option<&TermDefinition>,
    ) -> Result<Term, String> {
        let coercion = term.and_then(|t| t.coercion.as_ref());
        match value {
            Value::String(s) => match coercion {
                Some(Coercion::Id) => self.reference(context, s, false).map(Reference::into_term),
                Some(Coercion::Vocab) => self.reference(context, s, true).map(Reference::into_term),
                Some(Coercion::Datatype(datatype)) => {
                    Ok(Literal::new_typed_literal(s.as_str(), named_node(datatype)?).into())
                }
                None => {
                    let language = match term.and_then(|t| t.language.clone()) {
                        Some(explicit) => explicit,
                        None => context.language.clone(),
                    };
                    match language {
                        Some(tag) => Literal::new_language_tagged_literal(s.as_str(), &tag)
                            .map(Term::from)
                            .map_err(|e| format!("invalid language tag {tag:?}: {e}")),
                        None => Ok(Literal::new_simple_literal(s).into()),
                    }
                }
            },
            Value::Bool(_) | Value::Number(_) => {
                let lexical = value.to_string();
                match coercion {
                    Some(Coercion::Datatype(datatype)) => {
                        Ok(Literal::new_typed_literal(lexical, named_node(datatype)?).into())
                    }
                    _ => Ok(native_literal(value, lexical).into()),
                }
            }
            Value::Object(object) => {
                if let Some(literal) = context.keyword(object, "@value") {
                    return value_object(object, literal, context);
                }
                if let Some(items) = context.keyword(object, "@list") {
                    return self.list(items, context, term);
                }
                if object.len() == 1 {
                    if let Some(Value::String(id)) = context.keyword(object, "@id") {
                        return self.reference(context, id, false).map(Reference::into_term);
                    }
                }
                self.node(object, context).map(Term::from)
            }
            Value::Null => Err("null values are not supported".into()),
            Value::Array(_) => Err("nested arrays are not supported".into()),
        }
    }

    fn list(
        &mut self,
        items: &Value,
        context: &Context,
        term: Option<&TermDefinition>,
    ) -> Result<Term, String> {
        let items = as_array(items);
        let mut head: Term = NamedNode::new_unchecked(RDF_NIL).into();
        for item in items.iter().rev() {
            let cell = BlankNode::default();
            let value = self.object(item, context, term)?;
            self.graph.insert(&Triple::new(
                cell.clone(),
                NamedNode::new_unchecked(RDF_FIRST),
                value,
            ));
            self.graph.insert(&Triple::new(
                cell.clone(),
                NamedNode::new_unchecked(RDF_REST),
                head,
            ));
            head = cell.into();
        }
        Ok(head)
    }

    fn reference(&mut self, context: &Context, id: &str, vocab: bool) -> Result<Reference, String> {
        let id = context.expand_iri(id, vocab);
        if let Some(label) = id.strip_prefix("_:") {
            if let Some(node) = self.blank_nodes.get(label) {
                return Ok(Reference::Blank(node.clone()));
            }
            let node = BlankNode::new(label).map_err(|e| format!("invalid blank node {id:?}: {e}"))?;
            self.blank_nodes.insert(label.to_string(), node.clone());
            return Ok(Reference::Blank(node));
        }
        named_node(&id).map(Reference::Named)
    }
}

enum Reference {
    Named(NamedNode),
    Blank(BlankNode),
}

impl Reference {
    fn into_subject(self) -> Subject {
        match self {
            Reference::Named(node) => node.into(),
            Reference::Blank(node) => node.into(),
        }
    }

    fn into_term(self) -> Term {
        match self {
            Reference::Named(node) => node.into(),
            Reference::Blank(node) => node.into(),
        }
    }
}

fn value_object(
    object: &Map<String, Value>,
    value: &Value,
    context: &Context,
) -> Result<Term, String> {
    let lexical = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err("@value must be a scalar".into()),
    };

    if let Some(Value::String(language)) = context.keyword(object, "@language") {
        return Literal::new_language_tagged_literal(lexical, language)
            .map(Term::from)
            .map_err(|e| format!("invalid language tag {language:?}: {e}"));
    }
    if let Some(Value::String(datatype)) = context.keyword(object, "@type") {
        let datatype = named_node(&context.expand_iri(datatype, true))?;
        return Ok(Literal::new_typed_literal(lexical, datatype).into());
    }
    match value {
        Value::String(_) => Ok(Literal::new_simple_literal(lexical).into()),
        _ => Ok(native_literal(value, lexical).into()),
    }
}

/// Literal for a JSON boolean or number.
fn native_literal(value: &Value, lexical: String) -> Literal {
    match value {
        Value::Bool(_) => Literal::new_typed_literal(lexical, vocab::XSD_BOOLEAN),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            Literal::new_typed_literal(lexical, vocab::XSD_INTEGER)
        }
        _ => Literal::new_typed_literal(lexical, vocab::XSD_DOUBLE),
    }
}

fn named_node(iri: &str) -> Result<NamedNode, String> {
    NamedNode::new(iri).map_err(|e| format!("invalid IRI {iri:?}: {e}"))
}

fn as_array(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(values) => values.iter().collect(),
        value => vec![value],
    }
}

/// Values of a property, looking through `@set` objects.
fn set_values(value: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    for value in as_array(value) {
        match value {
            Value::Object(object) if object.contains_key("@set") => {
                out.extend(as_array(&object["@set"]));
            }
            value => out.push(value),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::TermRef;

    #[test]
    fn test_parse_expanded_node() {
        let doc = br#"[{
            "@id": "http://example.org/onto#Widget",
            "@type": ["http://www.w3.org/2002/07/owl#Class"],
            "http://www.w3.org/2000/01/rdf-schema#label": [
                {"@value": "Widget", "@language": "en"}
            ]
        }]"#;
        let graph = parse(doc, None).unwrap();
        assert_eq!(graph.len(), 2);
    }

    fn has(graph: &Graph, subject: &str, predicate: &str, object: impl Into<Term>) -> bool {
        graph.contains(&Triple::new(
            NamedNode::new_unchecked(subject),
            NamedNode::new_unchecked(predicate),
            object,
        ))
    }

    #[test]
    fn test_parse_compacted_document() {
        let doc = br#"{
            "@context": {
                "@vocab": "http://example.org/onto#",
                "@language": "en",
                "owl": "http://www.w3.org/2002/07/owl#",
                "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
                "xsd": "http://www.w3.org/2001/XMLSchema#",
                "id": "@id",
                "type": "@type",
                "label": "rdfs:label",
                "subClassOf": {"@id": "rdfs:subClassOf", "@type": "@id"},
                "weight": {"@type": "xsd:decimal"},
                "parts": {"@id": "hasParts", "@container": "@list", "@type": "@vocab"}
            },
            "@graph": [
                {"id": "http://example.org/onto#", "type": "owl:Ontology"},
                {
                    "id": "Widget",
                    "type": "owl:Class",
                    "label": "Widget",
                    "subClassOf": "owl:Thing",
                    "weight": "2.5",
                    "parts": ["Gear", "Spring"]
                }
            ]
        }"#;
        let graph = parse(doc, Some("http://example.org/onto")).unwrap();

        const ONTO: &str = "http://example.org/onto#";
        assert!(has(
            &graph,
            ONTO,
            vocab::TYPE.as_str(),
            NamedNode::new_unchecked("http://www.w3.org/2002/07/owl#Ontology")
        ));

        // relative @id resolves against the document base
        let widget = "http://example.org/Widget";
        assert!(has(
            &graph,
            widget,
            "http://www.w3.org/2000/01/rdf-schema#label",
            Literal::new_language_tagged_literal("Widget", "en").unwrap()
        ));
        assert!(has(
            &graph,
            widget,
            "http://www.w3.org/2000/01/rdf-schema#subClassOf",
            NamedNode::new_unchecked("http://www.w3.org/2002/07/owl#Thing")
        ));
        assert!(has(
            &graph,
            widget,
            "http://example.org/onto#weight",
            Literal::new_typed_literal(
                "2.5",
                NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#decimal")
            )
        ));
        let gear = NamedNode::new_unchecked("http://example.org/onto#Gear");
        assert!(graph.iter().any(|t| t.predicate.as_str() == RDF_FIRST
            && t.object == TermRef::from(gear.as_ref())));
        // two types, label, subclass, weight, list link and two list cells
        assert_eq!(graph.len(), 2 + 3 + 1 + 4);
    }

    #[test]
    fn test_node_context_overrides_outer_one() {
        let doc = br#"{
            "@context": {"ex": "http://example.org/a#", "name": "ex:name"},
            "@id": "ex:outer",
            "name": "outer",
            "http://example.org/p": {
                "@context": {"ex": "http://example.org/b#", "@language": "de"},
                "@id": "ex:inner",
                "name": "innen"
            }
        }"#;
        let graph = parse(doc, None).unwrap();
        assert!(has(
            &graph,
            "http://example.org/a#outer",
            "http://example.org/p",
            NamedNode::new_unchecked("http://example.org/b#inner")
        ));
        // name was defined before the inner prefix changed
        assert!(has(
            &graph,
            "http://example.org/b#inner",
            "http://example.org/a#name",
            Literal::new_language_tagged_literal("innen", "de").unwrap()
        ));
    }

    #[test]
    fn test_unmapped_keys_are_dropped() {
        let doc = br#"{"@context": {"skip": null}, "@id": "http://e.org/a", "skip": "x", "other": "y"}"#;
        let graph = parse(doc, None).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_remote_context_is_rejected() {
        let doc = br#"{"@context": "https://schema.org/", "@id": "http://e.org/a"}"#;
        let err = parse(doc, None).unwrap_err();
        assert!(err.contains("remote context"), "{err}");
    }

    #[test]
    fn test_cyclic_terms_are_rejected() {
        let doc = br#"{"@context": {"a": "b:x", "b": "a:y"}, "@id": "http://e.org/s"}"#;
        let err = parse(doc, None).unwrap_err();
        assert!(err.contains("cyclic"), "{err}");
    }

    #[test]
    fn test_parse_graph_container() {
        let doc = br#"{"@graph": [
            {"@id": "http://e.org/a", "http://e.org/p": [{"@id": "_:x"}]},
            {"@id": "_:x", "http://e.org/q": [1, true, 2.5]}
        ]}"#;
        let graph = parse(doc, None).unwrap();
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_parse_list() {
        let doc = br#"[{"@id": "http://e.org/a", "http://e.org/p": [{"@list": ["x", "y"]}]}]"#;
        let graph = parse(doc, None).unwrap();
        // one link plus two first/rest pairs
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn test_serialize_round_trips_blank_nodes() {
        let doc = br#"[
            {"@id": "http://e.org/a", "http://e.org/p": [{"@id": "_:b1"}]},
            {"@id": "_:b1", "http://e.org/q": [{"@value": "x", "@type": "http://e.org/dt"}]}
        ]"#;
        let graph = parse(doc, None).unwrap();
        let reparsed = parse(&serialize(&graph).unwrap(), None).unwrap();
        assert_eq!(graph, reparsed);
    }
}
