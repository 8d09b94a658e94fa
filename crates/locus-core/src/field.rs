//! Resolution of a single textual locator against form fields.

use crate::config::SelectorConfig;
use crate::locator::Locator;
use locus_xpath::Expression;
use locus_xpath::dsl::{anywhere, attr, descendant, string};

/// Predicate matching a field reachable by `locator` through its id, name,
/// placeholder, an associated `<label for>`, and optionally `aria-label` or
/// the configured test id attribute.
pub fn field_attribute_matchers(locator: &str, config: &SelectorConfig) -> Expression {
    let label_for = anywhere(&["label"])
        .filter(string().normalize().is(locator))
        .attr("for");

    let mut matchers = attr("id").equals(locator)
        | attr("name").equals(locator)
        | attr("placeholder").equals(locator)
        | attr("id").equals(label_for);

    if config.enable_aria_label {
        matchers = matchers | attr("aria-label").is(locator);
    }
    if let Some(test_id) = &config.test_id {
        matchers = matchers | attr(test_id).equals(locator);
    }
    matchers
}

/// Narrow `base` to fields matching `locator`.
///
/// The result is the union of `base` filtered by
/// [`field_attribute_matchers`] and `base` nested inside a `<label>` whose
/// text is the locator. Without a locator `base` is returned untouched.
pub fn locate_field(
    base: Expression,
    locator: Option<&Locator>,
    config: &SelectorConfig,
) -> Expression {
    let Some(locator) = locator else {
        return base;
    };
    let locator = locator.to_text();

    let wrapping_label = descendant(&["label"])
        .filter(string().normalize().is(locator.as_str()))
        .nested(base.clone());

    base.filter(field_attribute_matchers(&locator, config))
        .union(wrapping_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL_MATCHERS: &str = "(((./@id = 'email' or ./@name = 'email') or \
         ./@placeholder = 'email') or \
         ./@id = //label[normalize-space(string(.)) = 'email']/@for)";

    #[test]
    fn test_default_matchers() {
        let expr = field_attribute_matchers("email", &SelectorConfig::default());
        assert_eq!(expr.to_xpath(), EMAIL_MATCHERS);
    }

    #[test]
    fn test_aria_label_adds_disjunct() {
        let config = SelectorConfig::default().with_aria_label(true);
        let expr = field_attribute_matchers("email", &config);
        assert_eq!(
            expr.to_xpath(),
            format!("({EMAIL_MATCHERS} or ./@aria-label = 'email')")
        );
    }

    #[test]
    fn test_test_id_adds_exactly_one_disjunct() {
        let config = SelectorConfig::default().with_test_id("data-qa");
        let with = field_attribute_matchers("email", &config);
        let without = field_attribute_matchers("email", &SelectorConfig::default());
        assert_eq!(with, without.clone() | attr("data-qa").equals("email"));
        assert_eq!(
            with.to_xpath(),
            format!("({EMAIL_MATCHERS} or ./@data-qa = 'email')")
        );
    }

    #[test]
    fn test_locate_field_without_locator_is_identity() {
        let base = descendant(&["input"]);
        assert_eq!(
            locate_field(base.clone(), None, &SelectorConfig::default()),
            base
        );
    }

    #[test]
    fn test_locate_field_unions_label_wrapping() {
        let locator = Locator::from("email");
        let expr = locate_field(descendant(&["input"]), Some(&locator), &SelectorConfig::default());
        assert_eq!(expr.union_members().len(), 2);
        assert_eq!(
            expr.to_xpath(),
            format!(
                ".//input[{EMAIL_MATCHERS}] | \
                 .//label[normalize-space(string(.)) = 'email']//.//input"
            )
        );
    }

    #[test]
    fn test_locate_field_is_pure() {
        let locator = Locator::from("email");
        let config = SelectorConfig::default().with_aria_label(true);
        let a = locate_field(descendant(&["input"]), Some(&locator), &config);
        let b = locate_field(descendant(&["input"]), Some(&locator), &config);
        assert_eq!(a, b);
    }
}
