//! Allow-list HTML sanitizer.
//!
//! Editor output is filtered before it reaches the paginator or the
//! exporters. Forbidden elements are removed together with their content,
//! unknown elements are unwrapped so their text survives, and attributes are
//! reduced to a fixed allow-list.

use crate::dom::{Dom, NodeData, NodeId, inner_html};

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "b", "em", "i", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
    "li", "a", "span", "div", "blockquote", "pre", "code", "table", "thead", "tbody", "tr", "th",
    "td", "figure", "figcaption", "img", "hr", "sub", "sup", "s",
];

/// Removed along with everything inside them.
const FORBIDDEN_TAGS: &[&str] = &[
    "script", "iframe", "object", "embed", "form", "input", "button", "style", "template",
    "noscript", "textarea", "select",
];

const ALLOWED_ATTRS: &[&str] = &[
    "href", "target", "rel", "class", "style", "src", "alt", "width", "height", "colspan",
    "rowspan", "id",
];

/// Filter markup down to the allow-list and return the cleaned body markup.
pub fn sanitize_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let mut dom = Dom::parse(html);
    let body = dom.body();
    clean_children(&mut dom, body);
    inner_html(&dom, body)
}

fn clean_children(dom: &mut Dom, parent: NodeId) {
    let children: Vec<NodeId> = dom.children(parent).collect();
    for child in children {
        clean_node(dom, child);
    }
}

fn clean_node(dom: &mut Dom, id: NodeId) {
    let tag = match dom.get(id).map(|n| &n.data) {
        Some(NodeData::Text(_)) => return,
        Some(NodeData::Element { name, .. }) => name.local.to_string(),
        _ => {
            dom.detach(id);
            return;
        }
    };

    if FORBIDDEN_TAGS.contains(&tag.as_str()) {
        log::debug!("sanitize: dropping <{tag}>");
        dom.detach(id);
        return;
    }

    clean_children(dom, id);

    if !ALLOWED_TAGS.contains(&tag.as_str()) {
        dom.unwrap_node(id);
        return;
    }

    if let Some(attrs) = dom.attrs_mut(id) {
        attrs.retain(|attr| {
            let name = attr.name.local.as_ref();
            if !ALLOWED_ATTRS.contains(&name) {
                return false;
            }
            !(matches!(name, "href" | "src") && is_script_url(&attr.value))
        });
    }
}

fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    let lower = compact.to_ascii_lowercase();
    lower.starts_with("javascript:") || lower.starts_with("vbscript:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_markup_passes_through() {
        let html = r#"<h1 class="title">T</h1><p style="text-align:center">a <strong>b</strong></p>"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_forbidden_tags_removed_with_content() {
        let out = sanitize_html("<p>a</p><form><input value=x><button>go</button></form><p>b</p>");
        assert_eq!(out, "<p>a</p><p>b</p>");
        let out = sanitize_html("<p>x<iframe src=\"evil\"></iframe><script>alert(1)</script></p>");
        assert_eq!(out, "<p>x</p>");
    }

    #[test]
    fn test_unknown_tags_are_unwrapped() {
        let out = sanitize_html("<p><font color=red>kept</font> <mark>too</mark></p>");
        assert_eq!(out, "<p>kept too</p>");
    }

    #[test]
    fn test_event_handlers_and_data_attributes_dropped() {
        let out = sanitize_html(r#"<img src="a.png" onerror="x()" data-id="3" alt="A">"#);
        assert_eq!(out, r#"<img src="a.png" alt="A">"#);
    }

    #[test]
    fn test_script_urls_dropped() {
        let out = sanitize_html(r#"<a href=" JavaScript:alert(1)" target="_blank">x</a>"#);
        assert_eq!(out, r#"<a target="_blank">x</a>"#);
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(sanitize_html("<p>a<!-- note --></p>"), "<p>a</p>");
    }
}
