//! Format-specific expression builders.
//!
//! Selector blocks and expression filters never assemble attribute
//! conditions by hand for a specific format; they ask [`builder_for`] for the
//! builder matching the selector's current format.

pub mod css;
pub mod regexp;
pub mod xpath;

pub use css::CssBuilder;
pub use regexp::RegexpDisassembler;
pub use xpath::XPathBuilder;

use crate::error::SelectorError;
use crate::filter::FilterValue;
use crate::format::{Format, QueryExpression};

/// Low-level assembly of one query format.
pub trait QueryBuilder {
    fn format(&self) -> Format;

    /// Constrain the expression by each `(attribute, value)` pair in turn.
    fn add_attribute_conditions(
        &mut self,
        conditions: &[(&str, &FilterValue)],
    ) -> Result<(), SelectorError>;

    fn add_attribute_condition(
        &mut self,
        name: &str,
        value: &FilterValue,
    ) -> Result<(), SelectorError> {
        self.add_attribute_conditions(&[(name, value)])
    }

    fn expression(&self) -> QueryExpression;
}

/// Builder for `format`, seeded with `seed` when given.
///
/// The seed must already be in `format`.
pub fn builder_for(
    format: Format,
    seed: Option<QueryExpression>,
) -> Result<Box<dyn QueryBuilder>, SelectorError> {
    match (format, seed) {
        (Format::Css, None) => Ok(Box::new(CssBuilder::default())),
        (Format::Css, Some(QueryExpression::Css(css))) => Ok(Box::new(CssBuilder::new(css))),
        (Format::XPath, None) => Ok(Box::new(XPathBuilder::default())),
        (Format::XPath, Some(QueryExpression::XPath(expr))) => {
            Ok(Box::new(XPathBuilder::new(expr)))
        }
        (expected, Some(seed)) => Err(SelectorError::FormatMismatch {
            expected,
            found: seed.format(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locus_xpath::dsl::descendant;

    #[test]
    fn test_builder_for_each_format() {
        let css = builder_for(Format::Css, Some(QueryExpression::Css("a".into()))).unwrap();
        assert_eq!(css.format(), Format::Css);
        let xpath = builder_for(Format::XPath, None).unwrap();
        assert_eq!(xpath.format(), Format::XPath);
    }

    #[test]
    fn test_builder_rejects_foreign_seed() {
        let seed = QueryExpression::XPath(descendant(&["a"]));
        let err = builder_for(Format::Css, Some(seed)).err().unwrap();
        assert_eq!(
            err,
            SelectorError::FormatMismatch {
                expected: Format::Css,
                found: Format::XPath,
            }
        );
    }

    #[test]
    fn test_builder_adds_condition_in_format() {
        let value = FilterValue::from("main");
        let mut css = builder_for(Format::Css, Some(QueryExpression::Css("div".into()))).unwrap();
        css.add_attribute_condition("id", &value).unwrap();
        assert_eq!(css.expression().to_string(), "div#main");

        let mut xpath =
            builder_for(Format::XPath, Some(QueryExpression::XPath(descendant(&["div"])))).unwrap();
        xpath.add_attribute_condition("id", &value).unwrap();
        assert_eq!(xpath.expression().to_string(), ".//div[./@id = 'main']");
    }
}
