//! Attribute matching primitives shared by selector blocks and the XPath
//! builder.

use crate::builder::regexp::RegexpDisassembler;
use crate::filter::FilterValue;
use locus_xpath::Expression;
use locus_xpath::dsl::{all_of, any_of, attr};
use regex::Regex;

/// Specialised matcher for a single attribute.
pub type AttributeMatcher = fn(&FilterValue) -> Option<Expression>;

/// Attributes whose values need more than plain equality.
const ATTRIBUTE_MATCHERS: &[(&str, AttributeMatcher)] = &[("class", match_class_value)];

pub fn attribute_matcher(name: &str) -> Option<AttributeMatcher> {
    ATTRIBUTE_MATCHERS
        .iter()
        .find(|(attribute, _)| *attribute == name)
        .map(|(_, matcher)| *matcher)
}

/// Condition for `@name` against `value`, or `None` when there is nothing to
/// constrain. A registered matcher for `name` takes precedence.
pub fn match_attribute(name: &str, value: Option<&FilterValue>) -> Option<Expression> {
    let value = value?;
    match attribute_matcher(name) {
        Some(matcher) => matcher(value),
        None => Some(attribute_condition(name, value)),
    }
}

/// Every class must be present as a whitespace-separated word of `@class`.
pub fn match_class_attribute<S: AsRef<str>>(classes: &[S]) -> Option<Expression> {
    all_of(
        classes
            .iter()
            .map(|class| attr("class").contains_word(class.as_ref())),
    )
}

fn match_class_value(value: &FilterValue) -> Option<Expression> {
    match value {
        FilterValue::Text(class) => match_class_attribute(&[class]),
        FilterValue::List(classes) => match_class_attribute(classes),
        other => Some(attribute_condition("class", other)),
    }
}

/// Generic condition for `@name`:
/// text compares for equality, `true`/`false` test presence, a pattern
/// becomes substring tests, a list matches any member and an XPath fragment
/// is applied as a predicate on the attribute node.
pub fn attribute_condition(name: &str, value: &FilterValue) -> Expression {
    match value {
        FilterValue::Text(text) => attr(name).equals(text.as_str()),
        FilterValue::Bool(true) => attr(name),
        FilterValue::Bool(false) => !attr(name),
        FilterValue::Pattern(re) => attr(name).filter(regexp_condition(re)),
        FilterValue::XPath(expr) => attr(name).filter(expr.clone()),
        FilterValue::List(values) => attr(name).one_of(values.iter().map(String::as_str)),
    }
}

/// Substring tests on the context node approximating `re`. `None` when the
/// pattern requires no literal text.
pub fn regexp_condition(re: &Regex) -> Option<Expression> {
    let disassembler = RegexpDisassembler::new(re);
    let subject = if disassembler.ignore_case() {
        Expression::Current.uppercase()
    } else {
        Expression::Current
    };
    any_of(
        disassembler
            .alternated_substrings()
            .into_iter()
            .filter_map(|strings| {
                all_of(
                    strings
                        .into_iter()
                        .map(|s| subject.clone().contains(s)),
                )
            }),
    )
}
