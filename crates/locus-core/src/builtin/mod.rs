//! The built-in selector catalogue.

mod fields;
mod links;
mod structure;

use crate::error::SelectorError;
use crate::filter::FilterValue;
use crate::format::{Format, QueryExpression};
use crate::locator::{Capability, Locator, LocatorKind, LocatorType};
use crate::registry::SelectorRegistry;
use crate::selector::Selector;
use locus_xpath::Expression;
use locus_xpath::dsl::attr;

/// Register every built-in selector kind in `registry`.
pub fn install(registry: &SelectorRegistry) {
    for definition in structure::definitions()
        .into_iter()
        .chain(fields::definitions())
        .chain(links::definitions())
    {
        registry.register(definition);
    }
}

const TEXT: LocatorType = LocatorType::Kind(LocatorKind::Text);
const SYMBOL: LocatorType = LocatorType::Kind(LocatorKind::Symbol);
const PATTERN: LocatorType = LocatorType::Kind(LocatorKind::Pattern);
const TO_XPATH: LocatorType = LocatorType::Capability(Capability::ToXPath);

/// Filter value carrying a locator into an attribute condition.
fn locator_value(locator: &Locator) -> FilterValue {
    match locator {
        Locator::Pattern(re) => FilterValue::Pattern(re.clone()),
        Locator::XPath(expr) => FilterValue::XPath(expr.clone()),
        other => FilterValue::Text(other.to_text()),
    }
}

/// The XPath tree inside `expr`. Filters of XPath-only selectors call this.
fn xpath_of(expr: QueryExpression) -> Result<Expression, SelectorError> {
    let found = expr.format();
    expr.into_xpath().ok_or(SelectorError::FormatMismatch {
        expected: Format::XPath,
        found,
    })
}

/// `@test_id = locator` when a test id attribute is configured.
fn test_id_matcher(selector: &Selector<'_>, locator: &str) -> Option<Expression> {
    selector
        .test_id()
        .map(|test_id| attr(test_id).equals(locator))
}

/// Narrow `expr` by `name = value` through the builder of its format.
fn with_attribute(
    selector: &Selector<'_>,
    expr: QueryExpression,
    name: &str,
    value: &FilterValue,
) -> Result<QueryExpression, SelectorError> {
    let mut builder = selector.builder(Some(expr))?;
    builder.add_attribute_condition(name, value)?;
    Ok(builder.expression())
}

/// Filter transform passing the option straight to the builder.
fn attribute_filter(
    selector: &mut Selector<'_>,
    expr: QueryExpression,
    name: &str,
    value: &FilterValue,
) -> Result<QueryExpression, SelectorError> {
    with_attribute(selector, expr, name, value)
}

/// `true` requires the attribute, `false` forbids it.
fn presence_filter(
    selector: &mut Selector<'_>,
    expr: QueryExpression,
    name: &str,
    value: &FilterValue,
) -> Result<QueryExpression, SelectorError> {
    let present = value.as_bool().unwrap_or(true);
    with_attribute(selector, expr, name, &FilterValue::Bool(present))
}

/// `type` filter shared by field-like selectors: `textarea` and `select`
/// name the element, anything else is the input's `type` attribute.
fn field_type_filter(
    _: &mut Selector<'_>,
    expr: QueryExpression,
    _: &str,
    value: &FilterValue,
) -> Result<QueryExpression, SelectorError> {
    let expr = xpath_of(expr)?;
    let Some(field_type) = value.as_text() else {
        return Ok(expr.into());
    };
    let condition = match field_type {
        "textarea" | "select" => Expression::Current.self_axis(&[field_type]),
        other => attr("type").equals(other),
    };
    Ok(expr.filter(condition).into())
}
