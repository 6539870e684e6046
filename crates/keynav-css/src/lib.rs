//! keynav CSS Selectors
//!
//! Parses selectors with lightningcss and matches them against any tree
//! implementing [`SelectorElement`].

mod parser;
mod selectors;
mod query;

pub use parser::parse_selector_list;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, RelativeSelector, SelectorComponent, SelectorElement, SelectorList,
};
pub use query::{closest, matches, query_selector, query_selector_all, ElementRef};

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("invalid selector {selector:?}: {message}")]
    Syntax { selector: String, message: String },

    #[error("unsupported selector {0}")]
    Unsupported(String),
}
