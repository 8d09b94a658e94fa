use super::QueryBuilder;
use super::css::parse_class;
use crate::error::SelectorError;
use crate::filter::FilterValue;
use crate::format::{Format, QueryExpression};
use crate::matchers::attribute_condition;
use locus_xpath::Expression;
use locus_xpath::dsl::{all_of, attr, descendant};

/// Builds XPath expression trees by adding predicates to a seed.
#[derive(Debug, Clone)]
pub struct XPathBuilder {
    expression: Expression,
}

impl Default for XPathBuilder {
    fn default() -> Self {
        Self::new(descendant(&[]))
    }
}

impl XPathBuilder {
    pub fn new(seed: Expression) -> Self {
        Self { expression: seed }
    }

    pub fn into_inner(self) -> Expression {
        self.expression
    }
}

impl QueryBuilder for XPathBuilder {
    fn format(&self) -> Format {
        Format::XPath
    }

    fn add_attribute_conditions(
        &mut self,
        conditions: &[(&str, &FilterValue)],
    ) -> Result<(), SelectorError> {
        for (name, value) in conditions {
            let condition = if *name == "class" {
                class_conditions(value)
            } else {
                Some(attribute_condition(name, value))
            };
            if let Some(condition) = condition {
                let seed = std::mem::replace(&mut self.expression, Expression::Current);
                self.expression = seed.filter(condition);
            }
        }
        Ok(())
    }

    fn expression(&self) -> QueryExpression {
        QueryExpression::XPath(self.expression.clone())
    }
}

fn class_conditions(value: &FilterValue) -> Option<Expression> {
    let classes: Vec<&str> = match value {
        FilterValue::Text(class) => vec![class.as_str()],
        FilterValue::List(classes) => classes.iter().map(String::as_str).collect(),
        other => return Some(attribute_condition("class", other)),
    };
    all_of(classes.into_iter().filter_map(parse_class).map(|(negated, class)| {
        let condition = attr("class").contains_word(class);
        if negated { !condition } else { condition }
    }))
}
