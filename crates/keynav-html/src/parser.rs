//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to our DOM format.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use keynav_dom::{DOMRect, Document, NodeId, Viewport};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

const RECT_ATTR: &str = "data-rect";
const VIEWPORT_ATTR: &str = "data-viewport";

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into an about:blank Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        let root = document.tree().root();
        self.convert_node(&dom.document, &mut document, root)?;
        document.finalize();

        let body = document.body();
        if let Some(value) = document.get_attribute(body, VIEWPORT_ATTR).map(str::to_string) {
            let [width, height] = parse_numbers::<2>(&value)
                .ok_or_else(|| HtmlError::InvalidViewport(value.clone()))?;
            *document.viewport_mut() = Viewport::new(width, height);
        }

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, doc: &mut Document, parent: NodeId) -> Result<(), HtmlError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, doc, parent)?;
                }
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if !text.trim().is_empty() {
                    let id = doc.create_text(&text);
                    doc.append_child(parent, id);
                }
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = doc.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    doc.set_attribute(id, &attr.name.local, &attr.value);
                }
                doc.append_child(parent, id);

                if let Some(value) = doc.get_attribute(id, RECT_ATTR).map(str::to_string) {
                    let [top, left, right, bottom] = parse_numbers::<4>(&value).ok_or_else(|| {
                        HtmlError::InvalidRect { element: name.local.to_string(), value: value.clone() }
                    })?;
                    doc.set_layout_rect(id, DOMRect::from_edges(top, left, right, bottom));
                }

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, doc, id)?;
                }
            }
            // Doctype, comments and processing instructions carry nothing
            // navigation looks at.
            _ => {}
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Exactly N numbers separated by whitespace and/or commas
fn parse_numbers<const N: usize>(value: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut parts = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty());
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
