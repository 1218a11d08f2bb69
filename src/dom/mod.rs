//! Standalone HTML document model.
//!
//! The export pipeline never sees a browser: editor markup is parsed with
//! html5ever into an arena tree ([`Dom`]) which the structural parser walks,
//! the sanitizer rewrites and the pagination estimator slices.

mod arena;
pub mod serialize;
mod tree_sink;

pub use arena::{Attribute, Children, Dom, Node, NodeData, NodeId};
pub use serialize::{inner_html, outer_html};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DomSink;

impl Dom {
    /// Parse an HTML string (document or fragment) into a tree.
    ///
    /// Fragments end up inside the synthesized `<body>`; see [`Dom::body`].
    pub fn parse(html: &str) -> Dom {
        parse_document(DomSink::new(), ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
            .into_dom()
    }
}
