//! TriX reader. Graph names are dropped, triples land in one graph.

use oxrdf::{BlankNode, Graph, Literal, NamedNode, Subject, Term, Triple};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::vocab;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Uri,
    Id,
    Plain,
    Typed,
}

impl Node {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"uri" => Some(Node::Uri),
            b"id" => Some(Node::Id),
            b"plainLiteral" => Some(Node::Plain),
            b"typedLiteral" => Some(Node::Typed),
            _ => None,
        }
    }
}

/// An element whose text content is being collected.
struct Open {
    node: Node,
    language: Option<String>,
    datatype: Option<String>,
    text: String,
}

pub(super) fn parse(bytes: &[u8]) -> Result<Graph, String> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut graph = Graph::new();
    let mut buf = Vec::new();
    let mut in_triple = false;
    let mut terms: Vec<Term> = Vec::with_capacity(3);
    let mut open: Option<Open> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                let name = start.local_name();
                if name.as_ref() == b"triple" {
                    in_triple = true;
                    terms.clear();
                } else if in_triple {
                    if let Some(node) = Node::from_tag(name.as_ref()) {
                        open = Some(open_element(node, &start)?);
                    }
                }
            }
            Event::Empty(start) => {
                // <plainLiteral/> is an empty string
                let node = Node::from_tag(start.local_name().as_ref());
                if let (true, Some(node)) = (in_triple, node) {
                    let element = open_element(node, &start)?;
                    terms.push(to_term(element)?);
                }
            }
            Event::Text(text) => {
                if let Some(element) = open.as_mut() {
                    let text = text.unescape().map_err(|e| e.to_string())?;
                    element.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(element) = open.as_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(end) => {
                let name = end.local_name();
                if name.as_ref() == b"triple" {
                    in_triple = false;
                    graph.insert(&to_triple(std::mem::take(&mut terms))?);
                } else if Node::from_tag(name.as_ref()).is_some() {
                    if let Some(element) = open.take() {
                        terms.push(to_term(element)?);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if in_triple {
        return Err("unexpected end of document inside <triple>".into());
    }
    Ok(graph)
}

fn open_element(node: Node, start: &BytesStart<'_>) -> Result<Open, String> {
    let mut element = Open {
        node,
        language: None,
        datatype: None,
        text: String::new(),
    };
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let value = attribute
            .unescape_value()
            .map_err(|e| e.to_string())?
            .into_owned();
        match attribute.key.as_ref() {
            b"xml:lang" => element.language = Some(value),
            b"datatype" => element.datatype = Some(value),
            _ => {}
        }
    }
    Ok(element)
}

fn to_term(element: Open) -> Result<Term, String> {
    let text = element.text;
    Ok(match element.node {
        Node::Uri => NamedNode::new(text.trim())
            .map_err(|e| format!("invalid IRI {text:?}: {e}"))?
            .into(),
        Node::Id => BlankNode::new(text.trim())
            .map_err(|e| format!("invalid blank node {text:?}: {e}"))?
            .into(),
        Node::Plain => match element.language {
            Some(language) => Literal::new_language_tagged_literal(text, &language)
                .map_err(|e| format!("invalid language tag {language:?}: {e}"))?
                .into(),
            None => Literal::new_simple_literal(text).into(),
        },
        Node::Typed => {
            let datatype = element
                .datatype
                .ok_or("<typedLiteral> without a datatype attribute")?;
            let datatype =
                NamedNode::new(datatype).map_err(|e| format!("invalid datatype IRI: {e}"))?;
            if datatype.as_ref() == vocab::XSD_STRING {
                Literal::new_simple_literal(text).into()
            } else {
                Literal::new_typed_literal(text, datatype).into()
            }
        }
    })
}

fn to_triple(terms: Vec<Term>) -> Result<Triple, String> {
    let [subject, predicate, object]: [Term; 3] = terms
        .try_into()
        .map_err(|terms: Vec<Term>| format!("<triple> has {} terms, expected 3", terms.len()))?;

    let subject: Subject = match subject {
        Term::NamedNode(node) => node.into(),
        Term::BlankNode(node) => node.into(),
        _ => return Err("literal in subject position".into()),
    };
    let Term::NamedNode(predicate) = predicate else {
        return Err("predicate must be a <uri>".into());
    };
    Ok(Triple::new(subject, predicate, object))
}
