//! Selector definitions: what a selector kind accepts and how it compiles.

use crate::error::SelectorError;
use crate::filter::{FilterOptions, FilterValue, FilterValueType};
use crate::format::{Format, QueryExpression};
use crate::locator::{Locator, LocatorType};
use crate::selector::Selector;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Format-specific expression procedure of a selector kind.
pub type ExpressionFn = dyn Fn(&mut Selector<'_>, Option<&Locator>, &FilterOptions) -> Result<QueryExpression, SelectorError>
    + Send
    + Sync;

/// Transform applied by a declared expression filter.
///
/// Receives the instance, the expression built so far, the option name the
/// filter matched and the option value.
pub type FilterFn = dyn Fn(&mut Selector<'_>, QueryExpression, &str, &FilterValue) -> Result<QueryExpression, SelectorError>
    + Send
    + Sync;

/// An expression procedure and the option names it handles itself.
#[derive(Clone)]
pub struct ExpressionBlock {
    params: Vec<String>,
    block: Arc<ExpressionFn>,
}

impl ExpressionBlock {
    pub fn new<F>(params: &[&str], block: F) -> Self
    where
        F: Fn(&mut Selector<'_>, Option<&Locator>, &FilterOptions) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            params: params.iter().map(|p| p.to_string()).collect(),
            block: Arc::new(block),
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn consumes(&self, option: &str) -> bool {
        self.params.iter().any(|p| p == option)
    }

    pub(crate) fn call(
        &self,
        selector: &mut Selector<'_>,
        locator: Option<&Locator>,
        options: &FilterOptions,
    ) -> Result<QueryExpression, SelectorError> {
        (self.block)(selector, locator, options)
    }
}

/// How an expression filter picks the options it handles.
#[derive(Debug, Clone)]
pub enum FilterMatcher {
    Name(String),
    /// Any option whose name matches `regex`; `label` names the filter.
    Pattern { label: String, regex: Regex },
}

#[derive(Clone)]
pub struct ExpressionFilter {
    matcher: FilterMatcher,
    value_type: FilterValueType,
    default: Option<FilterValue>,
    transform: Arc<FilterFn>,
}

impl ExpressionFilter {
    pub fn name(&self) -> &str {
        match &self.matcher {
            FilterMatcher::Name(name) => name,
            FilterMatcher::Pattern { label, .. } => label,
        }
    }

    pub fn matcher(&self) -> &FilterMatcher {
        &self.matcher
    }

    pub fn value_type(&self) -> &FilterValueType {
        &self.value_type
    }

    pub fn default(&self) -> Option<&FilterValue> {
        self.default.as_ref()
    }

    /// Whether this filter handles the option called `option`.
    pub fn matches(&self, option: &str) -> bool {
        match &self.matcher {
            FilterMatcher::Name(name) => name == option,
            FilterMatcher::Pattern { regex, .. } => regex.is_match(option),
        }
    }

    pub(crate) fn apply(
        &self,
        selector: &mut Selector<'_>,
        expression: QueryExpression,
        option: &str,
        value: &FilterValue,
    ) -> Result<QueryExpression, SelectorError> {
        (self.transform)(selector, expression, option, value)
    }
}

impl fmt::Debug for ExpressionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionFilter")
            .field("matcher", &self.matcher)
            .field("value_type", &self.value_type)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// A named selector kind.
///
/// Definitions are cheap to clone: procedures are shared behind `Arc`.
#[derive(Clone)]
pub struct SelectorDefinition {
    name: String,
    description: Option<String>,
    default_format: Option<Format>,
    locator_types: Option<Vec<LocatorType>>,
    xpath: Option<ExpressionBlock>,
    css: Option<ExpressionBlock>,
    filters: Vec<ExpressionFilter>,
}

impl SelectorDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default_format: None,
            locator_types: None,
            xpath: None,
            css: None,
            filters: Vec::new(),
        }
    }

    pub fn builder(name: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder {
            definition: Self::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Format used when an instance is created without one: the explicit
    /// default, else the only declared format, else XPath when both exist.
    pub fn default_format(&self) -> Option<Format> {
        if self.default_format.is_some() {
            return self.default_format;
        }
        match (&self.xpath, &self.css) {
            (Some(_), _) => Some(Format::XPath),
            (None, Some(_)) => Some(Format::Css),
            (None, None) => None,
        }
    }

    pub fn locator_types(&self) -> Option<&[LocatorType]> {
        self.locator_types.as_deref()
    }

    pub fn expression(&self, format: Format) -> Option<&ExpressionBlock> {
        match format {
            Format::XPath => self.xpath.as_ref(),
            Format::Css => self.css.as_ref(),
        }
    }

    pub fn supports(&self, format: Format) -> bool {
        self.expression(format).is_some()
    }

    pub fn formats(&self) -> Vec<Format> {
        [Format::XPath, Format::Css]
            .into_iter()
            .filter(|f| self.supports(*f))
            .collect()
    }

    pub fn filters(&self) -> &[ExpressionFilter] {
        &self.filters
    }

    pub fn filter(&self, name: &str) -> Option<&ExpressionFilter> {
        self.filters.iter().find(|f| f.name() == name)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_default_format(&mut self, format: Format) -> &mut Self {
        self.default_format = Some(format);
        self
    }

    pub fn set_locator_types(&mut self, types: impl IntoIterator<Item = LocatorType>) -> &mut Self {
        self.locator_types = Some(types.into_iter().collect());
        self
    }

    pub fn set_xpath<F>(&mut self, params: &[&str], block: F) -> &mut Self
    where
        F: Fn(&mut Selector<'_>, Option<&Locator>, &FilterOptions) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.xpath = Some(ExpressionBlock::new(params, block));
        self
    }

    pub fn set_css<F>(&mut self, params: &[&str], block: F) -> &mut Self
    where
        F: Fn(&mut Selector<'_>, Option<&Locator>, &FilterOptions) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.css = Some(ExpressionBlock::new(params, block));
        self
    }

    /// Declare a filter for the option `name`. A later declaration with the
    /// same name replaces the earlier one.
    pub fn add_expression_filter<F>(
        &mut self,
        name: &str,
        value_type: FilterValueType,
        transform: F,
    ) -> &mut Self
    where
        F: Fn(&mut Selector<'_>, QueryExpression, &str, &FilterValue) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.push_filter(ExpressionFilter {
            matcher: FilterMatcher::Name(name.to_string()),
            value_type,
            default: None,
            transform: Arc::new(transform),
        })
    }

    /// Declare a filter handling every option whose name matches `regex`.
    pub fn add_expression_filter_matching<F>(
        &mut self,
        label: &str,
        regex: Regex,
        value_type: FilterValueType,
        transform: F,
    ) -> &mut Self
    where
        F: Fn(&mut Selector<'_>, QueryExpression, &str, &FilterValue) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.push_filter(ExpressionFilter {
            matcher: FilterMatcher::Pattern {
                label: label.to_string(),
                regex,
            },
            value_type,
            default: None,
            transform: Arc::new(transform),
        })
    }

    /// Value applied for the filter `name` when the caller omits it.
    pub fn set_filter_default(&mut self, name: &str, value: impl Into<FilterValue>) -> &mut Self {
        match self.filters.iter_mut().find(|f| f.name() == name) {
            Some(filter) => filter.default = Some(value.into()),
            None => tracing::warn!(
                selector = %self.name,
                filter = name,
                "default given for undeclared filter"
            ),
        }
        self
    }

    fn push_filter(&mut self, filter: ExpressionFilter) -> &mut Self {
        match self.filters.iter_mut().find(|f| f.name() == filter.name()) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
        self
    }
}

impl fmt::Debug for SelectorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("default_format", &self.default_format())
            .field("locator_types", &self.locator_types)
            .field("formats", &self.formats())
            .field("filters", &self.filters)
            .finish()
    }
}

/// Fluent construction of a [`SelectorDefinition`].
pub struct DefinitionBuilder {
    definition: SelectorDefinition,
}

impl DefinitionBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.set_description(description);
        self
    }

    pub fn default_format(mut self, format: Format) -> Self {
        self.definition.set_default_format(format);
        self
    }

    pub fn locator_types(mut self, types: impl IntoIterator<Item = LocatorType>) -> Self {
        self.definition.set_locator_types(types);
        self
    }

    pub fn xpath<F>(mut self, params: &[&str], block: F) -> Self
    where
        F: Fn(&mut Selector<'_>, Option<&Locator>, &FilterOptions) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.definition.set_xpath(params, block);
        self
    }

    pub fn css<F>(mut self, params: &[&str], block: F) -> Self
    where
        F: Fn(&mut Selector<'_>, Option<&Locator>, &FilterOptions) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.definition.set_css(params, block);
        self
    }

    pub fn expression_filter<F>(mut self, name: &str, value_type: FilterValueType, transform: F) -> Self
    where
        F: Fn(&mut Selector<'_>, QueryExpression, &str, &FilterValue) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.definition.add_expression_filter(name, value_type, transform);
        self
    }

    pub fn expression_filter_matching<F>(
        mut self,
        label: &str,
        regex: Regex,
        value_type: FilterValueType,
        transform: F,
    ) -> Self
    where
        F: Fn(&mut Selector<'_>, QueryExpression, &str, &FilterValue) -> Result<QueryExpression, SelectorError>
            + Send
            + Sync
            + 'static,
    {
        self.definition
            .add_expression_filter_matching(label, regex, value_type, transform);
        self
    }

    pub fn filter_default(mut self, name: &str, value: impl Into<FilterValue>) -> Self {
        self.definition.set_filter_default(name, value);
        self
    }

    pub fn build(self) -> SelectorDefinition {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::LocatorKind;
    use locus_xpath::dsl::descendant;

    fn anchor(_: &mut Selector<'_>, _: Option<&Locator>, _: &FilterOptions) -> Result<QueryExpression, SelectorError> {
        Ok(descendant(&["a"]).into())
    }

    fn passthrough(
        _: &mut Selector<'_>,
        expr: QueryExpression,
        _: &str,
        _: &FilterValue,
    ) -> Result<QueryExpression, SelectorError> {
        Ok(expr)
    }

    #[test]
    fn test_default_format_derivation() {
        let none = SelectorDefinition::new("empty");
        assert_eq!(none.default_format(), None);

        let css_only = SelectorDefinition::builder("c")
            .css(&[], |_, _, _| Ok(QueryExpression::Css("a".into())))
            .build();
        assert_eq!(css_only.default_format(), Some(Format::Css));

        let both = SelectorDefinition::builder("b")
            .xpath(&[], anchor)
            .css(&[], |_, _, _| Ok(QueryExpression::Css("a".into())))
            .build();
        assert_eq!(both.default_format(), Some(Format::XPath));

        let explicit = SelectorDefinition::builder("e")
            .xpath(&[], anchor)
            .css(&[], |_, _, _| Ok(QueryExpression::Css("a".into())))
            .default_format(Format::Css)
            .build();
        assert_eq!(explicit.default_format(), Some(Format::Css));
    }

    #[test]
    fn test_block_params() {
        let def = SelectorDefinition::builder("link")
            .xpath(&["href", "title"], anchor)
            .build();
        let block = def.expression(Format::XPath).unwrap();
        assert!(block.consumes("href"));
        assert!(!block.consumes("alt"));
        assert!(def.expression(Format::Css).is_none());
        assert_eq!(def.formats(), vec![Format::XPath]);
    }

    #[test]
    fn test_filter_redeclaration_replaces() {
        let def = SelectorDefinition::builder("field")
            .xpath(&[], anchor)
            .expression_filter("name", FilterValueType::Any, passthrough)
            .expression_filter("name", FilterValueType::Text, passthrough)
            .build();
        assert_eq!(def.filters().len(), 1);
        assert_eq!(def.filter("name").unwrap().value_type(), &FilterValueType::Text);
    }

    #[test]
    fn test_pattern_filter_matches_option_names() {
        let def = SelectorDefinition::builder("element")
            .xpath(&[], anchor)
            .expression_filter_matching(
                "attributes",
                Regex::new("^data-").unwrap(),
                FilterValueType::Any,
                passthrough,
            )
            .build();
        let filter = def.filter("attributes").unwrap();
        assert!(filter.matches("data-role"));
        assert!(!filter.matches("role"));
    }

    #[test]
    fn test_filter_default() {
        let def = SelectorDefinition::builder("option")
            .xpath(&[], anchor)
            .expression_filter("disabled", FilterValueType::Boolean, passthrough)
            .filter_default("disabled", false)
            .filter_default("missing", true)
            .build();
        assert!(matches!(
            def.filter("disabled").unwrap().default(),
            Some(FilterValue::Bool(false))
        ));
        assert!(def.filter("missing").is_none());
    }

    #[test]
    fn test_locator_types_and_description() {
        let def = SelectorDefinition::builder("id")
            .description("Element by id")
            .locator_types([LocatorType::Kind(LocatorKind::Text)])
            .xpath(&[], anchor)
            .build();
        assert_eq!(def.description(), Some("Element by id"));
        assert_eq!(def.locator_types().unwrap().len(), 1);
        assert!(format!("{def:?}").contains("\"id\""));
    }
}
