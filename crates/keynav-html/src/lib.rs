//! keynav HTML loading
//!
//! Parses HTML with html5ever and converts it into a `keynav_dom::Document`.
//! There is no layout engine here: element boxes come from `data-rect`
//! attributes (`top left right bottom`, page coordinates) and the viewport
//! size from `data-viewport` (`width height`) on `<body>`.

mod parser;

pub use parser::HtmlParser;

use keynav_dom::Document;

/// Parse an HTML string into a Document located at `url`
pub fn parse_document(html: &str, url: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse_with_url(html, url)
}

/// HTML loading error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to read HTML: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data-rect {value:?} on <{element}>: expected four numbers (top left right bottom)")]
    InvalidRect { element: String, value: String },

    #[error("invalid data-viewport {0:?}: expected two numbers (width height)")]
    InvalidViewport(String),
}
