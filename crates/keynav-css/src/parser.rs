//! Selector parser
//!
//! Selectors are parsed by lightningcss as the prelude of an empty style
//! rule, then lowered into the matching model in [`crate::selectors`].

use lightningcss::rules::CssRule;
use lightningcss::selector::{Component, Selector};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use parcel_selectors::attr::{AttrSelectorOperator, ParsedAttrSelectorOperation, ParsedCaseSensitivity};
use parcel_selectors::parser::{Combinator as CssCombinator, NthType};

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, RelativeSelector, SelectorComponent, SelectorList,
};
use crate::SelectorError;

/// Parse a comma-separated selector list
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    if input.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    let syntax = |message: &str| SelectorError::Syntax {
        selector: input.to_string(),
        message: message.to_string(),
    };
    if input.contains(['{', '}']) {
        return Err(syntax("unexpected brace"));
    }

    let css = format!("{input} {{}}");
    let sheet = StyleSheet::parse(&css, ParserOptions::default()).map_err(|e| syntax(&e.to_string()))?;
    let rule = match sheet.rules.0.as_slice() {
        [CssRule::Style(rule)] => rule,
        _ => return Err(syntax("expected a single selector list")),
    };

    let selectors = convert_list(rule.selectors.0.iter())?;
    tracing::trace!(selector = input, count = selectors.len(), "parsed selector list");
    Ok(SelectorList::new(selectors, input))
}

fn convert_list<'a, 'i: 'a>(
    selectors: impl IntoIterator<Item = &'a Selector<'i>>,
) -> Result<Vec<ComplexSelector>, SelectorError> {
    selectors.into_iter().map(convert_selector).collect()
}

fn nested_list<'i>(selectors: &[Selector<'i>]) -> Result<Box<SelectorList>, SelectorError> {
    let selectors = convert_list(selectors)?;
    let source = selectors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
    Ok(Box::new(SelectorList::new(selectors, &source)))
}

/// Lower one selector. lightningcss stores it right to left with
/// combinators between compounds.
fn convert_selector(selector: &Selector<'_>) -> Result<ComplexSelector, SelectorError> {
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut current = CompoundSelector::default();

    for component in selector.iter_raw_match_order() {
        if let Component::Combinator(combinator) = component {
            compounds.push(std::mem::take(&mut current));
            combinators.push(convert_combinator(combinator)?);
        } else if let Some(component) = convert_component(component)? {
            current.components.push(component);
        }
    }
    compounds.push(current);

    compounds.reverse();
    combinators.reverse();
    Ok(ComplexSelector { compounds, combinators })
}

fn convert_combinator(combinator: &CssCombinator) -> Result<Combinator, SelectorError> {
    match combinator {
        CssCombinator::Descendant => Ok(Combinator::Descendant),
        CssCombinator::Child => Ok(Combinator::Child),
        CssCombinator::NextSibling => Ok(Combinator::NextSibling),
        CssCombinator::LaterSibling => Ok(Combinator::SubsequentSibling),
        other => Err(SelectorError::Unsupported(format!("combinator {other:?}"))),
    }
}

/// `:has()` arguments. A leading combinator leaves an empty first compound.
fn convert_relative(selector: &Selector<'_>) -> Result<RelativeSelector, SelectorError> {
    let mut selector = convert_selector(selector)?;
    let combinator = if selector.compounds.len() > 1 && selector.compounds[0].components.is_empty() {
        selector.compounds.remove(0);
        selector.combinators.remove(0)
    } else {
        Combinator::Descendant
    };
    Ok(RelativeSelector { combinator, selector })
}

fn convert_component(component: &Component<'_>) -> Result<Option<SelectorComponent>, SelectorError> {
    let pseudo = |p: PseudoClass| -> Result<Option<SelectorComponent>, SelectorError> {
        Ok(Some(SelectorComponent::PseudoClass(p)))
    };
    match component {
        Component::ExplicitUniversalType => Ok(Some(SelectorComponent::Universal)),
        // `*|` prefixes; every element here is in the HTML namespace
        Component::ExplicitAnyNamespace => Ok(None),
        // `&` stands for the `:has()` subject in relative selectors
        Component::Nesting => Ok(None),
        Component::LocalName(name) => Ok(Some(SelectorComponent::Type(name.lower_name.0.to_string()))),
        Component::ID(id) => Ok(Some(SelectorComponent::Id(id.0.to_string()))),
        Component::Class(class) => Ok(Some(SelectorComponent::Class(class.0.to_string()))),
        Component::AttributeInNoNamespaceExists { local_name_lower, .. } => {
            Ok(Some(SelectorComponent::Attribute(AttributeSelector {
                name: local_name_lower.0.to_string(),
                matcher: None,
                case_insensitive: false,
            })))
        }
        Component::AttributeInNoNamespace { local_name, operator, value, case_sensitivity, .. } => {
            Ok(Some(SelectorComponent::Attribute(AttributeSelector {
                name: local_name.0.to_ascii_lowercase(),
                matcher: Some(convert_operator(operator, value.0.to_string())),
                case_insensitive: is_case_insensitive(case_sensitivity),
            })))
        }
        Component::AttributeOther(attr) => {
            let (matcher, case_insensitive) = match &attr.operation {
                ParsedAttrSelectorOperation::Exists => (None, false),
                ParsedAttrSelectorOperation::WithValue { operator, case_sensitivity, expected_value } => (
                    Some(convert_operator(operator, expected_value.0.to_string())),
                    is_case_insensitive(case_sensitivity),
                ),
            };
            Ok(Some(SelectorComponent::Attribute(AttributeSelector {
                name: attr.local_name_lower.0.to_string(),
                matcher,
                case_insensitive,
            })))
        }
        Component::Root => pseudo(PseudoClass::Root),
        Component::Nth(data) => {
            let expr = NthExpression::new(data.a, data.b);
            match &data.ty {
                NthType::Child => pseudo(PseudoClass::NthChild(expr)),
                NthType::LastChild => pseudo(PseudoClass::NthLastChild(expr)),
                NthType::OnlyChild => pseudo(PseudoClass::OnlyChild),
                NthType::OfType => pseudo(PseudoClass::NthOfType(expr)),
                NthType::LastOfType => pseudo(PseudoClass::NthLastOfType(expr)),
                NthType::OnlyOfType => pseudo(PseudoClass::OnlyOfType),
                NthType::Col => Err(SelectorError::Unsupported("Col".to_string())),
                NthType::LastCol => Err(SelectorError::Unsupported("LastCol".to_string())),
            }
        }
        Component::Negation(list) => pseudo(PseudoClass::Not(nested_list(list)?)),
        Component::Is(list) | Component::Where(list) => {
            pseudo(PseudoClass::Is(nested_list(list)?))
        }
        Component::Has(list) => {
            let relative = list.iter().map(convert_relative).collect::<Result<_, _>>()?;
            pseudo(PseudoClass::Has(relative))
        }
        other => Err(SelectorError::Unsupported(format!("{other:?}"))),
    }
}

fn convert_operator(operator: &AttrSelectorOperator, value: String) -> AttributeMatcher {
    match operator {
        AttrSelectorOperator::Equal => AttributeMatcher::Exact(value),
        AttrSelectorOperator::Includes => AttributeMatcher::Contains(value),
        AttrSelectorOperator::DashMatch => AttributeMatcher::DashMatch(value),
        AttrSelectorOperator::Prefix => AttributeMatcher::Prefix(value),
        AttrSelectorOperator::Substring => AttributeMatcher::Substring(value),
        AttrSelectorOperator::Suffix => AttributeMatcher::Suffix(value),
    }
}

/// Documents are HTML, so the HTML-only insensitivity applies too
fn is_case_insensitive(case_sensitivity: &ParsedCaseSensitivity) -> bool {
    matches!(
        case_sensitivity,
        ParsedCaseSensitivity::AsciiCaseInsensitive
            | ParsedCaseSensitivity::AsciiCaseInsensitiveIfInHtmlElementInHtmlDocument
    )
}
