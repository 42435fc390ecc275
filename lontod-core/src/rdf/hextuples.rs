//! HexTuples: newline-delimited JSON arrays of
//! `[subject, predicate, value, datatype, language, graph]`.

use oxrdf::{BlankNode, Graph, Literal, NamedNode, Subject, Term, Triple};
use serde_json::Value;

use super::vocab;

const GLOBAL_ID: &str = "globalId";
const LOCAL_ID: &str = "localId";

pub(super) fn serialize(graph: &Graph) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    for triple in super::sorted_triples(graph) {
        let subject = match triple.subject {
            oxrdf::SubjectRef::NamedNode(node) => node.as_str().to_string(),
            oxrdf::SubjectRef::BlankNode(node) => format!("_:{}", node.as_str()),
            #[allow(unreachable_patterns)]
            _ => return Err("quoted triples cannot be written as HexTuples".into()),
        };
        let (value, datatype, language) = match triple.object {
            oxrdf::TermRef::NamedNode(node) => (node.as_str().to_string(), GLOBAL_ID, ""),
            oxrdf::TermRef::BlankNode(node) => (format!("_:{}", node.as_str()), LOCAL_ID, ""),
            oxrdf::TermRef::Literal(literal) => (
                literal.value().to_string(),
                literal.datatype().as_str(),
                literal.language().unwrap_or_default(),
            ),
            #[allow(unreachable_patterns)]
            _ => return Err("quoted triples cannot be written as HexTuples".into()),
        };

        let row = [
            subject.as_str(),
            triple.predicate.as_str(),
            value.as_str(),
            datatype,
            language,
            "",
        ];
        serde_json::to_writer(&mut out, &row).map_err(|e| e.to_string())?;
        out.push(b'\n');
    }
    Ok(out)
}

pub(super) fn parse(bytes: &[u8]) -> Result<Graph, String> {
    let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
    let mut graph = Graph::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: Vec<Value> =
            serde_json::from_str(line).map_err(|e| format!("line {}: {e}", number + 1))?;
        let triple = row_to_triple(&row).map_err(|e| format!("line {}: {e}", number + 1))?;
        graph.insert(&triple);
    }
    Ok(graph)
}

fn row_to_triple(row: &[Value]) -> Result<Triple, String> {
    if row.len() != 6 {
        return Err(format!("expected 6 fields, found {}", row.len()));
    }

    let subject: Subject = match field(row, 0)?.strip_prefix("_:") {
        Some(label) => blank(label)?.into(),
        None => iri(field(row, 0)?)?.into(),
    };
    let predicate = iri(field(row, 1)?)?;

    let (value, datatype, language) = (field(row, 2)?, field(row, 3)?, field(row, 4)?);
    let object: Term = match datatype {
        GLOBAL_ID => iri(value)?.into(),
        LOCAL_ID => blank(value.trim_start_matches("_:"))?.into(),
        _ if !language.is_empty() => Literal::new_language_tagged_literal(value, language)
            .map_err(|e| format!("invalid language tag {language:?}: {e}"))?
            .into(),
        "" => Literal::new_simple_literal(value).into(),
        dt if dt == vocab::XSD_STRING.as_str() => Literal::new_simple_literal(value).into(),
        dt => Literal::new_typed_literal(value, iri(dt)?).into(),
    };

    Ok(Triple::new(subject, predicate, object))
}

fn field(row: &[Value], i: usize) -> Result<&str, String> {
    match row.get(i) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(Value::Null) | None => Ok(""),
        Some(_) => Err(format!("field {i} is not a string")),
    }
}

fn iri(value: &str) -> Result<NamedNode, String> {
    NamedNode::new(value).map_err(|e| format!("invalid IRI {value:?}: {e}"))
}

fn blank(label: &str) -> Result<BlankNode, String> {
    BlankNode::new(label).map_err(|e| format!("invalid blank node {label:?}: {e}"))
}
