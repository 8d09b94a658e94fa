use super::{
    PATTERN, SYMBOL, TEXT, TO_XPATH, attribute_filter, locator_value, presence_filter,
    test_id_matcher, with_attribute,
};
use crate::definition::SelectorDefinition;
use crate::filter::FilterValueType;
use crate::format::QueryExpression;
use crate::locator::Locator;
use crate::matchers::match_attribute;
use locus_xpath::dsl::{attr, child, descendant, local_name, raw, string};
use regex::Regex;

pub(super) fn definitions() -> Vec<SelectorDefinition> {
    let mut definitions = vec![xpath(), css(), id(), fieldset(), table(), frame()];
    definitions.extend(element());
    definitions
}

fn xpath() -> SelectorDefinition {
    SelectorDefinition::builder("xpath")
        .description("Raw XPath expression")
        .locator_types([TO_XPATH, TEXT])
        .xpath(&[], |_, locator, _| {
            let expr = match locator {
                Some(Locator::XPath(expr)) => expr.clone(),
                Some(other) => raw(other.to_text()),
                None => descendant(&[]),
            };
            Ok(expr.into())
        })
        .build()
}

fn css() -> SelectorDefinition {
    SelectorDefinition::builder("css")
        .description("Raw CSS selector")
        .locator_types([TEXT, SYMBOL])
        .css(&[], |_, locator, _| {
            let css = locator.map_or_else(|| "*".to_string(), Locator::to_text);
            Ok(QueryExpression::Css(css))
        })
        .build()
}

fn id() -> SelectorDefinition {
    SelectorDefinition::builder("id")
        .description("Element by id attribute")
        .locator_types([TEXT, SYMBOL, PATTERN])
        .xpath(&[], |selector, locator, _| {
            let seed = QueryExpression::XPath(descendant(&[]));
            match locator {
                Some(locator) => with_attribute(selector, seed, "id", &locator_value(locator)),
                None => Ok(seed),
            }
        })
        .css(&[], |selector, locator, _| {
            match locator {
                Some(locator) => with_attribute(
                    selector,
                    QueryExpression::Css(String::new()),
                    "id",
                    &locator_value(locator),
                ),
                None => Ok(QueryExpression::Css("*".to_string())),
            }
        })
        .build()
}

fn fieldset() -> SelectorDefinition {
    SelectorDefinition::builder("fieldset")
        .description("Fieldset by id, legend text or test id")
        .locator_types([TEXT, SYMBOL])
        .xpath(&["legend"], |selector, locator, options| {
            let mut xpath = descendant(&["fieldset"]);
            if let Some(locator) = locator {
                let locator = locator.to_text();
                let mut matchers = attr("id").equals(&locator)
                    | child(&["legend"]).filter(string().normalize().is(&locator));
                if let Some(test_id) = test_id_matcher(selector, &locator) {
                    matchers = matchers | test_id;
                }
                xpath = xpath.filter(matchers);
            }
            if let Some(legend) = options.get_text("legend") {
                xpath = xpath.filter(child(&["legend"]).filter(string().normalize().is(legend)));
            }
            Ok(xpath.into())
        })
        .expression_filter("disabled", FilterValueType::Boolean, presence_filter)
        .build()
}

fn table() -> SelectorDefinition {
    SelectorDefinition::builder("table")
        .description("Table by id, caption or test id")
        .locator_types([TEXT, SYMBOL])
        .xpath(&["caption"], |selector, locator, options| {
            let mut xpath = descendant(&["table"]);
            if let Some(locator) = locator {
                let locator = locator.to_text();
                let mut matchers =
                    attr("id").equals(&locator) | descendant(&["caption"]).is(&locator);
                if let Some(test_id) = test_id_matcher(selector, &locator) {
                    matchers = matchers | test_id;
                }
                xpath = xpath.filter(matchers);
            }
            if let Some(caption) = options.get_text("caption") {
                xpath = xpath.filter(descendant(&["caption"]).equals(caption));
            }
            Ok(xpath.into())
        })
        .build()
}

fn frame() -> SelectorDefinition {
    SelectorDefinition::builder("frame")
        .description("Frame or iframe by id, name or test id")
        .locator_types([TEXT, SYMBOL])
        .xpath(&["name"], |selector, locator, options| {
            let mut xpath = descendant(&["iframe"]).union(descendant(&["frame"]));
            if let Some(locator) = locator {
                let locator = locator.to_text();
                let mut matchers = attr("id").equals(&locator) | attr("name").equals(&locator);
                if let Some(test_id) = test_id_matcher(selector, &locator) {
                    matchers = matchers | test_id;
                }
                xpath = xpath.filter(matchers);
            }
            Ok(xpath.filter(match_attribute("name", options.get("name"))).into())
        })
        .build()
}

/// `element` takes any option as an attribute condition. Nothing is
/// registered if the catch-all option pattern fails to compile.
fn element() -> Option<SelectorDefinition> {
    let any_option = Regex::new(".+").ok()?;
    let definition = SelectorDefinition::builder("element")
        .description("Element by tag name and arbitrary attributes")
        .locator_types([TEXT, SYMBOL])
        .xpath(&[], |_, locator, _| {
            let condition = locator.map(|l| local_name().equals(l.to_text()));
            Ok(descendant(&[]).filter(condition).into())
        })
        .css(&[], |_, locator, _| {
            let css = locator.map_or_else(|| "*".to_string(), Locator::to_text);
            Ok(QueryExpression::Css(css))
        })
        .expression_filter_matching("attributes", any_option, FilterValueType::Any, attribute_filter)
        .build();
    Some(definition)
}

#[cfg(test)]
mod tests {
    use crate::config::SelectorConfig;
    use crate::error::SelectorError;
    use crate::filter::FilterOptions;
    use crate::format::Format;
    use crate::locator::Locator;
    use crate::registry::SelectorRegistry;
    use locus_xpath::dsl::descendant;
    use regex::Regex;

    fn compile(
        name: &str,
        format: Option<Format>,
        locator: Option<Locator>,
        options: FilterOptions,
        config: SelectorConfig,
    ) -> Result<(String, Vec<String>), SelectorError> {
        let registry = SelectorRegistry::with_builtins();
        let mut selector = registry.selector(name, config, format)?;
        let expr = selector.compile(locator.as_ref(), &options)?;
        Ok((
            expr.map(|e| e.to_string()).unwrap_or_default(),
            selector.errors().to_vec(),
        ))
    }

    fn xpath(name: &str, locator: &str) -> String {
        compile(name, None, Some(locator.into()), FilterOptions::new(), SelectorConfig::default())
            .unwrap()
            .0
    }

    #[test]
    fn test_xpath_selector() {
        assert_eq!(xpath("xpath", "//div[@id='x']"), "//div[@id='x']");
        let tree = Locator::from(descendant(&["p"]));
        let (expr, _) = compile("xpath", None, Some(tree), FilterOptions::new(), SelectorConfig::default()).unwrap();
        assert_eq!(expr, ".//p");
    }

    #[test]
    fn test_css_selector() {
        assert_eq!(xpath("css", "ul > li"), "ul > li");
        let err = compile("css", Some(Format::XPath), None, FilterOptions::new(), SelectorConfig::default())
            .unwrap_err();
        assert!(matches!(err, SelectorError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_id_selector_both_formats() {
        assert_eq!(xpath("id", "main"), ".//*[./@id = 'main']");
        let (css, _) = compile(
            "id",
            Some(Format::Css),
            Some("main".into()),
            FilterOptions::new(),
            SelectorConfig::default(),
        )
        .unwrap();
        assert_eq!(css, "#main");
    }

    #[test]
    fn test_id_selector_pattern() {
        let locator = Locator::from(Regex::new("ma.n").unwrap());
        let (expr, _) = compile("id", None, Some(locator), FilterOptions::new(), SelectorConfig::default()).unwrap();
        assert_eq!(
            expr,
            ".//*[./@id[(contains(., 'ma') and contains(., 'n'))]]"
        );
    }

    #[test]
    fn test_id_selector_pattern_with_escapes() {
        let locator = Locator::from(Regex::new(r"\x41BC").unwrap());
        let (expr, _) = compile("id", None, Some(locator.clone()), FilterOptions::new(), SelectorConfig::default()).unwrap();
        assert_eq!(expr, ".//*[./@id[contains(., 'ABC')]]");

        let (css, _) = compile("id", Some(Format::Css), Some(locator), FilterOptions::new(), SelectorConfig::default()).unwrap();
        assert!(css.ends_with("[id*='ABC']"), "{css}");
    }

    #[test]
    fn test_fieldset_with_test_id() {
        let config = SelectorConfig::default().with_test_id("data-qa");
        let (expr, _) = compile("fieldset", None, Some("Address".into()), FilterOptions::new(), config).unwrap();
        assert_eq!(
            expr,
            ".//fieldset[((./@id = 'Address' or ./legend[normalize-space(string(.)) = 'Address']) \
             or ./@data-qa = 'Address')]"
        );
    }

    #[test]
    fn test_fieldset_legend_and_disabled() {
        let (expr, errors) = compile(
            "fieldset",
            None,
            None,
            FilterOptions::new().with("legend", "Billing").with("disabled", true),
            SelectorConfig::default(),
        )
        .unwrap();
        assert_eq!(
            expr,
            ".//fieldset[./legend[normalize-space(string(.)) = 'Billing']][./@disabled]"
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_table_by_caption() {
        let (expr, _) = compile(
            "table",
            None,
            Some("People".into()),
            FilterOptions::new().with("caption", "People"),
            SelectorConfig::default(),
        )
        .unwrap();
        assert_eq!(
            expr,
            ".//table[(./@id = 'People' or .//caption = 'People')][.//caption = 'People']"
        );
    }

    #[test]
    fn test_frame_union() {
        assert_eq!(
            xpath("frame", "main"),
            ".//iframe[(./@id = 'main' or ./@name = 'main')] | \
             .//frame[(./@id = 'main' or ./@name = 'main')]"
        );
    }

    #[test]
    fn test_element_attributes() {
        let (expr, errors) = compile(
            "element",
            None,
            Some("input".into()),
            FilterOptions::new().with("type", "submit").with("data-x", true),
            SelectorConfig::default(),
        )
        .unwrap();
        assert_eq!(
            expr,
            ".//*[local-name(.) = 'input'][./@data-x][./@type = 'submit']"
        );
        assert!(errors.is_empty());

        let (css, _) = compile(
            "element",
            Some(Format::Css),
            Some("input".into()),
            FilterOptions::new().with("type", "submit"),
            SelectorConfig::default(),
        )
        .unwrap();
        assert_eq!(css, "input[type='submit']");
    }
}
