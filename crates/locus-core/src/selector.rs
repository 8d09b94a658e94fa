//! A selector definition bound to a format and configuration for one
//! compilation.

use crate::builder::{QueryBuilder, builder_for};
use crate::config::SelectorConfig;
use crate::definition::{ExpressionFilter, FilterMatcher, SelectorDefinition};
use crate::error::{LocatorShapeWarning, SelectorError};
use crate::filter::{FilterOptions, FilterValue};
use crate::format::{Format, QueryExpression};
use crate::locator::{Locator, LocatorType, describe_locator_types, locator_valid};
use crate::registry::SelectorRegistry;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Options every selector accepts without declaring them.
const UNIVERSAL_FILTERS: &[&str] = &["id", "class"];

pub struct Selector<'r> {
    registry: &'r SelectorRegistry,
    definition: Arc<SelectorDefinition>,
    config: SelectorConfig,
    format: Option<Format>,
    errors: Vec<String>,
    warnings: Vec<LocatorShapeWarning>,
}

impl<'r> Selector<'r> {
    pub fn new(
        registry: &'r SelectorRegistry,
        definition: Arc<SelectorDefinition>,
        config: SelectorConfig,
        format: Option<Format>,
    ) -> Self {
        Self {
            registry,
            definition,
            config,
            format,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn definition(&self) -> &SelectorDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn description(&self) -> Option<&str> {
        self.definition.description()
    }

    pub fn default_format(&self) -> Option<Format> {
        self.definition.default_format()
    }

    pub fn locator_types(&self) -> Option<&[LocatorType]> {
        self.definition.locator_types()
    }

    pub fn supports(&self, format: Format) -> bool {
        self.definition.supports(format)
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn enable_aria_label(&self) -> bool {
        self.config.enable_aria_label
    }

    pub fn enable_aria_role(&self) -> bool {
        self.config.enable_aria_role
    }

    pub fn test_id(&self) -> Option<&str> {
        self.config.test_id.as_deref()
    }

    /// The requested format, else the definition's default.
    pub fn resolve_format(&self) -> Option<Format> {
        self.format.or_else(|| self.definition.default_format())
    }

    /// Filter errors collected so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[LocatorShapeWarning] {
        &self.warnings
    }

    pub fn add_filter_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(selector = %self.name(), %message, "filter error");
        self.errors.push(message);
    }

    /// Compile `locator` and `options` into a query expression.
    ///
    /// Returns `Ok(None)` when no format can be resolved. The locator is
    /// checked against the accepted locator types after every attempt,
    /// failed and panicking ones included; a mismatch is only recorded as a
    /// warning.
    pub fn compile(
        &mut self,
        locator: Option<&Locator>,
        options: &FilterOptions,
    ) -> Result<Option<QueryExpression>, SelectorError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.compile_expression(locator, options)
        }));
        self.check_locator(locator);
        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn compile_expression(
        &mut self,
        locator: Option<&Locator>,
        options: &FilterOptions,
    ) -> Result<Option<QueryExpression>, SelectorError> {
        let Some(format) = self.resolve_format() else {
            tracing::warn!(selector = %self.name(), "selector has no format");
            return Ok(None);
        };

        let definition = Arc::clone(&self.definition);
        let block = definition
            .expression(format)
            .ok_or_else(|| SelectorError::UnsupportedFormat {
                selector: definition.name().to_string(),
                format,
            })?;

        tracing::debug!(selector = %definition.name(), %format, "compiling selector");
        let mut expression = block.call(self, locator, options)?;

        let mut handled: HashSet<&str> = options
            .iter()
            .map(|(name, _)| name)
            .filter(|name| block.consumes(name))
            .collect();

        for filter in definition.filters() {
            match filter.matcher() {
                FilterMatcher::Name(name) => {
                    if handled.contains(name.as_str()) {
                        continue;
                    }
                    if let Some(value) = options.get(name) {
                        handled.insert(name.as_str());
                        expression = self.apply_filter(filter, expression, name, value)?;
                    } else if let Some(default) = filter.default() {
                        expression = self.apply_filter(filter, expression, name, default)?;
                    }
                }
                FilterMatcher::Pattern { .. } => {
                    for (option, value) in options.iter() {
                        if handled.contains(option) || !filter.matches(option) {
                            continue;
                        }
                        handled.insert(option);
                        expression = self.apply_filter(filter, expression, option, value)?;
                    }
                }
            }
        }

        for (option, value) in options.iter() {
            if handled.contains(option) {
                continue;
            }
            if UNIVERSAL_FILTERS.contains(&option) {
                let mut builder = builder_for(expression.format(), Some(expression))?;
                builder.add_attribute_condition(option, value)?;
                expression = builder.expression();
            } else {
                let message = format!("Invalid option :{option} for selector :{}", definition.name());
                self.add_filter_error(message);
            }
        }

        Ok(Some(expression))
    }

    fn apply_filter(
        &mut self,
        filter: &ExpressionFilter,
        expression: QueryExpression,
        option: &str,
        value: &FilterValue,
    ) -> Result<QueryExpression, SelectorError> {
        if !filter.value_type().accepts(value) {
            self.add_filter_error(format!(
                "Invalid value {value} passed to expression filter :{} - must be {}",
                filter.name(),
                filter.value_type().describe()
            ));
            return Ok(expression);
        }
        filter.apply(self, expression, option, value)
    }

    fn check_locator(&mut self, locator: Option<&Locator>) {
        let types = self.definition.locator_types();
        if locator_valid(types, locator) {
            return;
        }
        let (Some(types), Some(locator)) = (types, locator) else {
            return;
        };
        let warning = LocatorShapeWarning {
            selector: self.definition.name().to_string(),
            locator: locator.describe(),
            expected: describe_locator_types(types),
        };
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Run `body` with `list` as the active error list.
    ///
    /// Errors added by `body` end up in `list`, and the previous list is
    /// active again afterwards, also when `body` panics.
    pub fn with_scoped_error_list<T>(
        &mut self,
        list: &mut Vec<String>,
        body: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous = std::mem::replace(&mut self.errors, std::mem::take(list));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *self)));
        *list = std::mem::replace(&mut self.errors, previous);
        match outcome {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Compile the selector `name` with this instance's configuration.
    ///
    /// Uses `format` when given, else this instance's format. Filter errors
    /// and locator warnings of the delegate are added to this instance.
    pub fn expression_for(
        &mut self,
        name: &str,
        locator: Option<&Locator>,
        options: &FilterOptions,
        format: Option<Format>,
    ) -> Result<Option<QueryExpression>, SelectorError> {
        let definition = self.registry.lookup(name)?;
        let format = format.or_else(|| self.resolve_format());
        let mut delegate = Selector::new(self.registry, definition, self.config.clone(), format);
        let result = delegate.compile(locator, options);
        self.errors.append(&mut delegate.errors);
        self.warnings.append(&mut delegate.warnings);
        result
    }

    /// Builder for this instance's format, seeded with `seed`.
    pub fn builder(&self, seed: Option<QueryExpression>) -> Result<Box<dyn QueryBuilder>, SelectorError> {
        let format = self
            .resolve_format()
            .or_else(|| seed.as_ref().map(QueryExpression::format))
            .unwrap_or(Format::XPath);
        builder_for(format, seed)
    }
}

impl std::fmt::Debug for Selector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("name", &self.name())
            .field("format", &self.resolve_format())
            .field("config", &self.config)
            .field("errors", &self.errors)
            .field("warnings", &self.warnings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValueType;
    use crate::locator::LocatorKind;
    use locus_xpath::Expression;
    use locus_xpath::dsl::{attr, descendant};

    fn registry() -> SelectorRegistry {
        let registry = SelectorRegistry::new();
        registry.register(
            SelectorDefinition::builder("thing")
                .locator_types([LocatorType::Kind(LocatorKind::Text)])
                .xpath(&["name"], |selector, locator, options| {
                    let mut expr = descendant(&["thing"]);
                    if let Some(locator) = locator {
                        expr = expr.filter(attr("id").equals(locator.to_text()));
                    }
                    if let Some(name) = options.get_text("name") {
                        expr = expr.filter(attr("name").equals(name));
                    }
                    if options.get_bool("fail") == Some(true) {
                        selector.add_filter_error("fail requested");
                    }
                    Ok(expr.into())
                })
                .expression_filter("size", FilterValueType::Text, |_, expr, _, value| {
                    let expr = expr.into_xpath().unwrap_or(Expression::Current);
                    let size = value.as_text().unwrap_or_default();
                    Ok(expr.filter(attr("size").equals(size)).into())
                })
                .build(),
        );
        registry.register(
            SelectorDefinition::builder("broken")
                .xpath(&[], |_, _, _| {
                    Err(SelectorError::UnsupportedFilterValue {
                        filter: "x".into(),
                        reason: "always".into(),
                    })
                })
                .locator_types([LocatorType::Kind(LocatorKind::Integer)])
                .build(),
        );
        registry.register(SelectorDefinition::new("formless"));
        registry
    }

    fn compile(
        registry: &SelectorRegistry,
        name: &str,
        locator: Option<Locator>,
        options: FilterOptions,
    ) -> (Result<Option<QueryExpression>, SelectorError>, Vec<String>, usize) {
        let mut selector = registry
            .selector(name, SelectorConfig::default(), None)
            .unwrap();
        let result = selector.compile(locator.as_ref(), &options);
        (result, selector.errors().to_vec(), selector.warnings().len())
    }

    #[test]
    fn test_compile_block_consumes_params() {
        let registry = registry();
        let (result, errors, warnings) = compile(
            &registry,
            "thing",
            Some("a".into()),
            FilterOptions::new().with("name", "n"),
        );
        assert_eq!(
            result.unwrap().unwrap().to_string(),
            ".//thing[./@id = 'a'][./@name = 'n']"
        );
        assert!(errors.is_empty());
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_compile_applies_declared_filter() {
        let registry = registry();
        let (result, errors, _) =
            compile(&registry, "thing", None, FilterOptions::new().with("size", "3"));
        assert_eq!(result.unwrap().unwrap().to_string(), ".//thing[./@size = '3']");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_compile_rejects_invalid_filter_value() {
        let registry = registry();
        let (result, errors, _) =
            compile(&registry, "thing", None, FilterOptions::new().with("size", true));
        assert_eq!(result.unwrap().unwrap().to_string(), ".//thing");
        assert_eq!(
            errors,
            vec!["Invalid value true passed to expression filter :size - must be a text value"]
        );
    }

    #[test]
    fn test_compile_universal_filters() {
        let registry = registry();
        let (result, errors, _) = compile(
            &registry,
            "thing",
            None,
            FilterOptions::new().with("id", "main").with("class", "big"),
        );
        assert_eq!(
            result.unwrap().unwrap().to_string(),
            ".//thing[contains(concat(' ', normalize-space(./@class), ' '), ' big ')][./@id = 'main']"
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_compile_records_unknown_option() {
        let registry = registry();
        let (result, errors, _) =
            compile(&registry, "thing", None, FilterOptions::new().with("colour", "red"));
        assert!(result.unwrap().is_some());
        assert_eq!(errors, vec!["Invalid option :colour for selector :thing"]);
    }

    #[test]
    fn test_unsupported_format() {
        let registry = registry();
        let mut selector = registry
            .selector("thing", SelectorConfig::default(), Some(Format::Css))
            .unwrap();
        let err = selector.compile(None, &FilterOptions::new()).unwrap_err();
        assert_eq!(
            err,
            SelectorError::UnsupportedFormat {
                selector: "thing".into(),
                format: Format::Css,
            }
        );
        assert_eq!(err.to_string(), "Selector :thing does not support css");
    }

    #[test]
    fn test_no_format_is_not_an_error() {
        let registry = registry();
        let (result, errors, _) = compile(&registry, "formless", None, FilterOptions::new());
        assert!(result.unwrap().is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_locator_warning_is_non_fatal() {
        let registry = registry();
        let mut selector = registry
            .selector("thing", SelectorConfig::default(), None)
            .unwrap();
        let result = selector.compile(Some(&Locator::from(42)), &FilterOptions::new());
        assert_eq!(result.unwrap().unwrap().to_string(), ".//thing[./@id = '42']");
        assert_eq!(
            selector.warnings()[0].to_string(),
            "Locator Integer:42 for selector :thing must be an instance of Text. \
             This will raise an error in a future version."
        );
    }

    #[test]
    fn test_locator_check_runs_when_block_fails() {
        let registry = registry();
        let (result, _, warnings) = compile(&registry, "broken", Some("x".into()), FilterOptions::new());
        assert!(result.is_err());
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_locator_check_runs_when_block_panics() {
        let registry = registry();
        registry.register(
            SelectorDefinition::builder("panicky")
                .locator_types([LocatorType::Kind(LocatorKind::Integer)])
                .xpath(&[], |_, _, _| panic!("block exploded"))
                .build(),
        );
        let mut selector = registry
            .selector("panicky", SelectorConfig::default(), None)
            .unwrap();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            selector.compile(Some(&Locator::from("x")), &FilterOptions::new())
        }));

        assert!(outcome.is_err());
        assert_eq!(selector.warnings().len(), 1);
    }

    #[test]
    fn test_scoped_error_list_collects_and_restores() {
        let registry = registry();
        let mut selector = registry
            .selector("thing", SelectorConfig::default(), None)
            .unwrap();
        selector.add_filter_error("outer");

        let mut scoped = Vec::new();
        selector.with_scoped_error_list(&mut scoped, |s| s.add_filter_error("inner"));

        assert_eq!(scoped, vec!["inner"]);
        assert_eq!(selector.errors(), ["outer"]);
    }

    #[test]
    fn test_scoped_error_list_restores_on_err() {
        let registry = registry();
        let mut selector = registry
            .selector("thing", SelectorConfig::default(), None)
            .unwrap();
        selector.add_filter_error("outer");

        let mut scoped = Vec::new();
        let result = selector.with_scoped_error_list(&mut scoped, |s| {
            s.add_filter_error("inner");
            s.expression_for("broken", None, &FilterOptions::new(), None)
        });

        assert!(result.is_err());
        assert_eq!(scoped, vec!["inner"]);
        assert_eq!(selector.errors(), ["outer"]);
    }

    #[test]
    fn test_scoped_error_list_restores_on_panic() {
        let registry = registry();
        let mut selector = registry
            .selector("thing", SelectorConfig::default(), None)
            .unwrap();
        selector.add_filter_error("outer");

        let mut scoped = Vec::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            selector.with_scoped_error_list(&mut scoped, |s| {
                s.add_filter_error("inner");
                panic!("boom");
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(selector.errors(), ["outer"]);
        assert_eq!(scoped, vec!["inner"]);
    }

    #[test]
    fn test_expression_for_merges_delegate_errors() {
        let registry = registry();
        let mut selector = registry
            .selector("thing", SelectorConfig::default(), None)
            .unwrap();
        let expr = selector
            .expression_for(
                "thing",
                Some(&"b".into()),
                &FilterOptions::new().with("fail", true),
                None,
            )
            .unwrap()
            .unwrap();
        assert_eq!(expr.to_string(), ".//thing[./@id = 'b']");
        assert_eq!(selector.errors(), ["fail requested", "Invalid option :fail for selector :thing"]);
    }

    #[test]
    fn test_expression_for_unknown() {
        let registry = registry();
        let mut selector = registry
            .selector("thing", SelectorConfig::default(), None)
            .unwrap();
        let err = selector
            .expression_for("nope", None, &FilterOptions::new(), None)
            .unwrap_err();
        assert_eq!(err, SelectorError::UnknownSelectorKind("nope".into()));
    }

    #[test]
    fn test_accessors_read_through() {
        let registry = registry();
        let config = SelectorConfig::default().with_test_id("data-qa");
        let selector = registry.selector("thing", config, None).unwrap();
        assert_eq!(selector.name(), "thing");
        assert_eq!(selector.default_format(), Some(Format::XPath));
        assert!(selector.supports(Format::XPath));
        assert!(!selector.supports(Format::Css));
        assert_eq!(selector.test_id(), Some("data-qa"));
        assert!(!selector.enable_aria_label());
    }
}
