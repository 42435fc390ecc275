use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{FragmentScanner, unescape};

/// `<div id="ID" ...>` optionally followed by a heading, then a table whose
/// first row is `<th>IRI</th><td><code>URI</code></td>`.
static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div\s+id="([^"]+)"[^>]*>\s*(?:<h[1-6][^>]*>.*?</h[1-6]>\s*)?<table[^>]*>\s*<tr>\s*<th>IRI</th>\s*<td>\s*<code>([^<]*)</code>"#,
    )
    .unwrap_or_else(|e| panic!("definition pattern does not compile: {e}"))
});

/// Scans pages produced by [`DocumentRenderer`](super::DocumentRenderer).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionScanner;

impl FragmentScanner for DefinitionScanner {
    fn anchors(&self, html: &str) -> HashMap<String, String> {
        let mut anchors = HashMap::new();
        for captures in DEFINITION.captures_iter(html) {
            let id = unescape(&captures[1]);
            let uri = unescape(captures[2].trim());
            // the first definition of a URI wins
            anchors.entry(uri).or_insert(id);
        }
        anchors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<h1>Example</h1>
<table class="metadata">
<tr><th>IRI</th><td><code>http://example.org/onto#</code></td></tr>
</table>
<div id="Widget" class="concept">
<h3>Widget</h3>
<table>
<tr><th>IRI</th><td><code>http://example.org/onto#Widget</code></td></tr>
</table>
</div>
<div id="q_a">
<table>
<tr><th>IRI</th><td><code>http://example.org/onto?q=a&amp;b</code></td></tr>
</table>
</div>
<div id="Widget-2"><h3>Again</h3><table><tr><th>IRI</th><td><code>http://example.org/onto#Widget</code></td></tr></table></div>
"#;

    #[test]
    fn test_finds_definition_anchors() {
        let anchors = DefinitionScanner.anchors(PAGE);
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors["http://example.org/onto#Widget"], "Widget");
        assert_eq!(anchors["http://example.org/onto?q=a&b"], "q_a");
    }

    #[test]
    fn test_metadata_table_is_not_an_anchor() {
        let anchors = DefinitionScanner.anchors(PAGE);
        assert!(!anchors.contains_key("http://example.org/onto#"));
    }
}
