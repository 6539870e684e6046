//! Selector model and matching
//!
//! Complex selectors are matched right to left, backtracking through
//! ancestors for descendant combinators and through earlier siblings for `~`.

use std::str::FromStr;

use crate::SelectorError;

/// The view of an element that selector matching needs
pub trait SelectorElement: Copy + PartialEq {
    /// Lowercased tag name
    fn local_name(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attr(&self, name: &str) -> Option<&str>;
    fn parent_element(&self) -> Option<Self>;
    fn first_child_element(&self) -> Option<Self>;
    fn prev_sibling_element(&self) -> Option<Self>;
    fn next_sibling_element(&self) -> Option<Self>;
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create An+B expression
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        // Widened so offsets near the i32 limits cannot overflow.
        let (a, b, n) = (i64::from(self.a), i64::from(self.b), i64::from(n));
        if a == 0 {
            return n == b;
        }

        let diff = n - b;
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (matcher, val) = match (&self.matcher, value) {
            (None, found) => return found.is_some(),
            (Some(_), None) => return false,
            (Some(matcher), Some(val)) => (matcher, val),
        };
        let fold = |s: &str| {
            if self.case_insensitive { s.to_lowercase() } else { s.to_string() }
        };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            // Empty operands never match for the substring family.
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

/// Pseudo-class type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    OnlyChild,
    OnlyOfType,
    /// :nth-child(), and :first-child as 0n+1
    NthChild(NthExpression),
    /// :nth-last-child(), and :last-child as 0n+1
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Not(Box<SelectorList>),
    /// :is() and :where()
    Is(Box<SelectorList>),
    Has(Vec<RelativeSelector>),
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name, lowercased)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
}

impl SelectorComponent {
    pub fn matches<E: SelectorElement>(&self, element: E) -> bool {
        match self {
            Self::Universal => true,
            Self::Type(tag) => element.local_name().eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Attribute(attr) => attr.matches(element.attr(&attr.name)),
            Self::PseudoClass(pseudo) => match_pseudo_class(pseudo, element),
        }
    }
}

/// Element siblings reached by repeatedly taking `step`, optionally only
/// those with the same tag
fn count_siblings<E: SelectorElement>(element: E, of_type: bool, step: fn(&E) -> Option<E>) -> i32 {
    let mut count = 0;
    let mut cur = step(&element);
    while let Some(el) = cur {
        if !of_type || el.local_name() == element.local_name() {
            count += 1;
        }
        cur = step(&el);
    }
    count
}

fn match_pseudo_class<E: SelectorElement>(pseudo: &PseudoClass, element: E) -> bool {
    let before = |of_type| count_siblings(element, of_type, E::prev_sibling_element);
    let after = |of_type| count_siblings(element, of_type, E::next_sibling_element);

    match pseudo {
        PseudoClass::Root => element.parent_element().is_none(),
        PseudoClass::OnlyChild => {
            element.prev_sibling_element().is_none() && element.next_sibling_element().is_none()
        }
        PseudoClass::OnlyOfType => before(true) == 0 && after(true) == 0,
        PseudoClass::NthChild(expr) => expr.matches(before(false) + 1),
        PseudoClass::NthLastChild(expr) => expr.matches(after(false) + 1),
        PseudoClass::NthOfType(expr) => expr.matches(before(true) + 1),
        PseudoClass::NthLastOfType(expr) => expr.matches(after(true) + 1),
        PseudoClass::Not(list) => !list.matches(element),
        PseudoClass::Is(list) => list.matches(element),
        PseudoClass::Has(relative) => relative.iter().any(|r| r.matches_from(element)),
    }
}

/// Sequence of simple selectors with no combinator, e.g. `a.title[href]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn matches<E: SelectorElement>(&self, element: E) -> bool {
        self.components.iter().all(|c| c.matches(element))
    }
}

/// Combinator between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

impl Combinator {
    /// Whether `element` stands in this relation to `left`, as in `left <self> element`
    fn relates<E: SelectorElement>(self, left: E, element: E) -> bool {
        let walk = |step: fn(&E) -> Option<E>| {
            let mut cur = step(&element);
            while let Some(el) = cur {
                if el == left {
                    return true;
                }
                cur = step(&el);
            }
            false
        };
        match self {
            Self::Child => element.parent_element() == Some(left),
            Self::NextSibling => element.prev_sibling_element() == Some(left),
            Self::Descendant => walk(E::parent_element),
            Self::SubsequentSibling => walk(E::prev_sibling_element),
        }
    }
}

/// Compound selectors joined by combinators, left to right.
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    pub fn matches<E: SelectorElement>(&self, element: E) -> bool {
        self.match_from_right(element, None)
    }

    /// Match with the leftmost compound additionally tied to `anchor`
    fn match_from_right<E: SelectorElement>(&self, element: E, anchor: Option<(Combinator, E)>) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.match_at(n - 1, element, anchor),
        }
    }

    fn match_at<E: SelectorElement>(&self, idx: usize, element: E, anchor: Option<(Combinator, E)>) -> bool {
        if !self.compounds[idx].matches(element) {
            return false;
        }
        if idx == 0 {
            return anchor.is_none_or(|(combinator, left)| combinator.relates(left, element));
        }

        let next = idx - 1;
        match self.combinators[next] {
            Combinator::Child => {
                element.parent_element().is_some_and(|p| self.match_at(next, p, anchor))
            }
            Combinator::NextSibling => {
                element.prev_sibling_element().is_some_and(|s| self.match_at(next, s, anchor))
            }
            Combinator::Descendant => {
                let mut cur = element.parent_element();
                while let Some(ancestor) = cur {
                    if self.match_at(next, ancestor, anchor) {
                        return true;
                    }
                    cur = ancestor.parent_element();
                }
                false
            }
            Combinator::SubsequentSibling => {
                let mut cur = element.prev_sibling_element();
                while let Some(sibling) = cur {
                    if self.match_at(next, sibling, anchor) {
                        return true;
                    }
                    cur = sibling.prev_sibling_element();
                }
                false
            }
        }
    }
}

/// One argument of `:has()`, e.g. `> a.title`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeSelector {
    /// Relation of the selector's leftmost compound to the `:has()` subject
    pub combinator: Combinator,
    pub selector: ComplexSelector,
}

impl RelativeSelector {
    /// Whether some element relative to `anchor` matches
    pub fn matches_from<E: SelectorElement>(&self, anchor: E) -> bool {
        let hit = |candidate: E| self.selector.match_from_right(candidate, Some((self.combinator, anchor)));
        match self.combinator {
            Combinator::Descendant | Combinator::Child => any_descendant(anchor, &hit),
            Combinator::NextSibling | Combinator::SubsequentSibling => {
                let mut cur = anchor.next_sibling_element();
                while let Some(sibling) = cur {
                    if hit(sibling) || any_descendant(sibling, &hit) {
                        return true;
                    }
                    cur = sibling.next_sibling_element();
                }
                false
            }
        }
    }
}

/// Pre-order search below `root`
fn any_descendant<E: SelectorElement>(root: E, pred: &impl Fn(E) -> bool) -> bool {
    let mut cur = root.first_child_element();
    while let Some(child) = cur {
        if pred(child) || any_descendant(child, pred) {
            return true;
        }
        cur = child.next_sibling_element();
    }
    false
}

impl std::fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(matcher) = &self.matcher else {
            return write!(f, "[{}]", self.name);
        };
        let (op, value) = match matcher {
            AttributeMatcher::Exact(v) => ("=", v),
            AttributeMatcher::Contains(v) => ("~=", v),
            AttributeMatcher::DashMatch(v) => ("|=", v),
            AttributeMatcher::Prefix(v) => ("^=", v),
            AttributeMatcher::Suffix(v) => ("$=", v),
            AttributeMatcher::Substring(v) => ("*=", v),
        };
        let flag = if self.case_insensitive { " i" } else { "" };
        write!(f, "[{}{op}{value:?}{flag}]", self.name)
    }
}

impl std::fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => f.write_str(":root"),
            Self::OnlyChild => f.write_str(":only-child"),
            Self::OnlyOfType => f.write_str(":only-of-type"),
            Self::NthChild(e) => write!(f, ":nth-child({}n{:+})", e.a, e.b),
            Self::NthLastChild(e) => write!(f, ":nth-last-child({}n{:+})", e.a, e.b),
            Self::NthOfType(e) => write!(f, ":nth-of-type({}n{:+})", e.a, e.b),
            Self::NthLastOfType(e) => write!(f, ":nth-last-of-type({}n{:+})", e.a, e.b),
            Self::Not(list) => write!(f, ":not({list})"),
            Self::Is(list) => write!(f, ":is({list})"),
            Self::Has(relative) => {
                f.write_str(":has(")?;
                for (i, r) in relative.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {}", combinator_str(r.combinator), r.selector)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl std::fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.components.is_empty() {
            return f.write_str("*");
        }
        for component in &self.components {
            match component {
                SelectorComponent::Universal => f.write_str("*")?,
                SelectorComponent::Type(tag) => f.write_str(tag)?,
                SelectorComponent::Id(id) => write!(f, "#{id}")?,
                SelectorComponent::Class(class) => write!(f, ".{class}")?,
                SelectorComponent::Attribute(attr) => write!(f, "{attr}")?,
                SelectorComponent::PseudoClass(pseudo) => write!(f, "{pseudo}")?,
            }
        }
        Ok(())
    }
}

fn combinator_str(combinator: Combinator) -> &'static str {
    match combinator {
        Combinator::Descendant => "",
        Combinator::Child => ">",
        Combinator::NextSibling => "+",
        Combinator::SubsequentSibling => "~",
    }
}

impl std::fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, compound) in self.compounds.iter().enumerate() {
            if i > 0 {
                match self.combinators[i - 1] {
                    Combinator::Descendant => f.write_str(" ")?,
                    other => write!(f, " {} ", combinator_str(other))?,
                }
            }
            write!(f, "{compound}")?;
        }
        Ok(())
    }
}

/// Comma-separated selector list, as accepted by `querySelectorAll`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
    source: String,
}

impl SelectorList {
    pub(crate) fn new(selectors: Vec<ComplexSelector>, source: &str) -> Self {
        Self { selectors, source: source.trim().to_string() }
    }

    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        crate::parse_selector_list(input)
    }

    /// Whether any selector in the list matches
    pub fn matches<E: SelectorElement>(&self, element: E) -> bool {
        self.selectors.iter().any(|s| s.matches(element))
    }

    /// The text this list was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for SelectorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
