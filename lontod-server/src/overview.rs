//! The ontology overview page, as HTML or plain text.

use std::fmt::Write;

use lontod_core::OntologySummary;
use lontod_core::html::escape;

use crate::config::ServerConfig;

pub const HTML: &str = "text/html";
pub const TEXT: &str = "text/plain";

/// Types the overview is offered in.
pub fn offered() -> Vec<String> {
    vec![HTML.to_string(), TEXT.to_string()]
}

/// Identifier used in links to `summary`: its IRI in query style, its slug
/// in path style.
pub fn link_identifier<'a>(config: &ServerConfig, slug: &'a str, uri: &'a str) -> &'a str {
    match config.identifier_style {
        crate::config::IdentifierStyle::Query => uri,
        crate::config::IdentifierStyle::Path => slug,
    }
}

pub fn render_html(config: &ServerConfig, ontologies: &[OntologySummary]) -> String {
    let mut out = config.snippets.html_header.clone();
    for ontology in ontologies {
        let id = link_identifier(config, &ontology.slug, &ontology.uri);
        let _ = write!(
            out,
            "<fieldset>\n<legend>{}</legend>\n<span><a href=\"{}\">View in default format</a><br>{} definienda</span>\n",
            escape(&ontology.uri),
            escape(&config.link(Some(id), None, false, None)),
            ontology.definienda,
        );
        if !ontology.alternate_uris.is_empty() {
            out.push_str("Also known as:\n<ul>\n");
            for alternate in &ontology.alternate_uris {
                let _ = writeln!(out, "<li><code>{}</code></li>", escape(alternate));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("Download in other formats:\n<ul>\n");
        for mime_type in &ontology.mime_types {
            let _ = writeln!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                escape(&config.link(Some(id), Some(mime_type), true, None)),
                escape(mime_type),
            );
        }
        out.push_str("</ul>\n</fieldset>\n");
    }
    out.push_str(&config.snippets.html_footer);
    out
}

pub fn render_text(config: &ServerConfig, ontologies: &[OntologySummary]) -> String {
    let mut out = config.snippets.txt_header.clone();
    for ontology in ontologies {
        let id = link_identifier(config, &ontology.slug, &ontology.uri);
        let _ = writeln!(out, "## Ontology {}:", ontology.uri);
        let _ = writeln!(out, "[{}]", config.link(Some(id), None, false, None));
        let _ = writeln!(out, "{} definienda\n", ontology.definienda);
        for alternate in &ontology.alternate_uris {
            let _ = writeln!(out, "Also known as {alternate}");
        }
        out.push_str("Available formats:\n");
        for mime_type in &ontology.mime_types {
            let _ = writeln!(
                out,
                "* {mime_type} [{}]",
                config.link(Some(id), Some(mime_type), true, None)
            );
        }
        out.push('\n');
    }
    out.push_str(&config.snippets.txt_footer);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdentifierStyle, Snippets};

    fn summary() -> OntologySummary {
        OntologySummary {
            slug: "onto".into(),
            uri: "http://example.org/onto#".into(),
            alternate_uris: vec!["http://example.org/onto/1.0#".into()],
            definienda: 3,
            mime_types: vec!["text/html".into(), "text/turtle".into()],
        }
    }

    #[test]
    fn test_html_lists_download_links() {
        let html = render_html(&ServerConfig::default(), &[summary()]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<legend>http://example.org/onto#</legend>"));
        assert!(html.contains("3 definienda"));
        assert!(html.contains(
            "href=\"/?uri=http%3A%2F%2Fexample.org%2Fonto%23&amp;format=text%2Fturtle&amp;download=1\""
        ));
    }

    #[test]
    fn test_text_uses_snippets() {
        let config = ServerConfig {
            identifier_style: IdentifierStyle::Path,
            route: "/o".into(),
            snippets: Snippets {
                txt_header: "HEAD\n".into(),
                txt_footer: "FOOT\n".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let text = render_text(&config, &[summary()]);
        assert!(text.starts_with("HEAD\n## Ontology http://example.org/onto#:\n[/o/onto]\n"));
        assert!(text.contains("* text/turtle [/o/onto?format=text%2Fturtle&download=1]"));
        assert!(text.ends_with("FOOT\n"));
    }

    #[test]
    fn test_empty_index() {
        let config = ServerConfig::default();
        let text = render_text(&config, &[]);
        assert_eq!(text, format!("{}{}", config.snippets.txt_header, config.snippets.txt_footer));
    }
}
