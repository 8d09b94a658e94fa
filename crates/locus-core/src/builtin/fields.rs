use super::{SYMBOL, TEXT, attribute_filter, field_type_filter, presence_filter, test_id_matcher, with_attribute};
use crate::definition::{DefinitionBuilder, SelectorDefinition};
use crate::field::locate_field;
use crate::filter::{FilterOptions, FilterValueType};
use crate::matchers::match_attribute;
use crate::selector::Selector;
use locus_xpath::Expression;
use locus_xpath::dsl::{all_of, attr, axis, descendant, string};

const LABELABLE: &[&str] = &[
    "button", "input", "keygen", "meter", "output", "progress", "select", "textarea",
];

pub(super) fn definitions() -> Vec<SelectorDefinition> {
    vec![
        field(),
        fillable_field(),
        radio_button(),
        checkbox(),
        select(),
        option(),
        file_field(),
        label(),
    ]
}

/// Declare the attribute filters shared by form fields.
fn field_filters(mut builder: DefinitionBuilder, names: &[&str]) -> DefinitionBuilder {
    for name in names {
        builder = match *name {
            "name" | "placeholder" => {
                builder.expression_filter(name, FilterValueType::TextOrPattern, attribute_filter)
            }
            _ => builder.expression_filter(name, FilterValueType::Boolean, presence_filter),
        };
    }
    builder
}

/// Condition for the `checked` and `unchecked` options. Both set to true
/// can never match and is reported as a filter error.
fn checked_state(selector: &mut Selector<'_>, options: &FilterOptions) -> Option<Expression> {
    let mut state = |option: &str| match options.get(option) {
        None => None,
        Some(value) => {
            if value.as_bool().is_none() {
                selector.add_filter_error(format!(
                    "Invalid value {value} passed to :{option} - must be true or false"
                ));
            }
            value.as_bool()
        }
    };
    let checked = state("checked");
    let unchecked = state("unchecked");

    if checked == Some(true) && unchecked == Some(true) {
        selector.add_filter_error("checked and unchecked cannot both be true");
    }

    all_of(
        [
            checked.map(|c| if c { attr("checked") } else { !attr("checked") }),
            unchecked.map(|u| if u { !attr("checked") } else { attr("checked") }),
        ]
        .into_iter()
        .flatten(),
    )
}

fn field() -> SelectorDefinition {
    let builder = SelectorDefinition::builder("field")
        .description("Form field by id, name, placeholder or label")
        .locator_types([TEXT, SYMBOL])
        .xpath(&["checked", "unchecked"], |selector, locator, options| {
            let mut invalid_types = vec!["submit", "image"];
            if options.get_text("type") != Some("hidden") {
                invalid_types.push("hidden");
            }
            let base = descendant(&["input", "textarea", "select"])
                .filter(!attr("type").one_of(invalid_types))
                .filter(checked_state(selector, options));
            Ok(locate_field(base, locator, selector.config()).into())
        })
        .expression_filter("type", FilterValueType::Text, field_type_filter);
    field_filters(builder, &["name", "placeholder", "disabled", "multiple", "readonly"]).build()
}

fn fillable_field() -> SelectorDefinition {
    let builder = SelectorDefinition::builder("fillable_field")
        .description("Text input or textarea")
        .locator_types([TEXT, SYMBOL])
        .xpath(&["allow_self"], |selector, locator, options| {
            let step = if options.get_bool("allow_self") == Some(true) {
                "descendant-or-self"
            } else {
                "descendant"
            };
            let base = axis(step, &["input", "textarea"]).filter(
                !attr("type").one_of(["submit", "image", "radio", "checkbox", "hidden", "file"]),
            );
            Ok(locate_field(base, locator, selector.config()).into())
        })
        .expression_filter("type", FilterValueType::Text, field_type_filter);
    field_filters(builder, &["name", "placeholder", "disabled", "multiple", "readonly"]).build()
}

/// `radio_button` and `checkbox` differ only in the input type.
fn toggle(name: &str, input_type: &'static str) -> SelectorDefinition {
    let builder = SelectorDefinition::builder(name)
        .description(format!("{input_type} input by id, name or label"))
        .locator_types([TEXT, SYMBOL])
        .xpath(&["checked", "unchecked"], move |selector, locator, options| {
            let base = descendant(&["input"])
                .filter(attr("type").equals(input_type))
                .filter(checked_state(selector, options));
            Ok(locate_field(base, locator, selector.config()).into())
        })
        .expression_filter("option", FilterValueType::TextOrPattern, |selector, expr, _, value| {
            with_attribute(selector, expr, "value", value)
        });
    field_filters(builder, &["name", "disabled"]).build()
}

fn radio_button() -> SelectorDefinition {
    toggle("radio_button", "radio")
}

fn checkbox() -> SelectorDefinition {
    toggle("checkbox", "checkbox")
}

fn select() -> SelectorDefinition {
    let builder = SelectorDefinition::builder("select")
        .description("Select box by id, name, placeholder or label")
        .locator_types([TEXT, SYMBOL])
        .xpath(&[], |selector, locator, _| {
            Ok(locate_field(descendant(&["select"]), locator, selector.config()).into())
        });
    field_filters(builder, &["name", "placeholder", "disabled", "multiple"]).build()
}

fn option() -> SelectorDefinition {
    let builder = SelectorDefinition::builder("option")
        .description("Option by its text")
        .locator_types([TEXT, SYMBOL])
        .xpath(&[], |_, locator, _| {
            let text = locator.map(|l| string().normalize().is(l.to_text()));
            Ok(descendant(&["option"]).filter(text).into())
        });
    field_filters(builder, &["disabled", "selected"]).build()
}

fn file_field() -> SelectorDefinition {
    let builder = SelectorDefinition::builder("file_field")
        .description("File input by id, name or label")
        .locator_types([TEXT, SYMBOL])
        .xpath(&[], |selector, locator, _| {
            let base = descendant(&["input"]).filter(attr("type").equals("file"));
            Ok(locate_field(base, locator, selector.config()).into())
        });
    field_filters(builder, &["name", "disabled", "multiple"]).build()
}

fn label() -> SelectorDefinition {
    SelectorDefinition::builder("label")
        .description("Label by text, id or the field it labels")
        .locator_types([TEXT, SYMBOL])
        .xpath(&["for"], |selector, locator, options| {
            let mut xpath = descendant(&["label"]);
            if let Some(locator) = locator {
                let locator = locator.to_text();
                let mut matchers = string().normalize().is(&locator) | attr("id").equals(&locator);
                if let Some(test_id) = test_id_matcher(selector, &locator) {
                    matchers = matchers | test_id;
                }
                xpath = xpath.filter(matchers);
            }

            let target = options.get("for").filter(|v| v.as_text() != Some(""));
            if let (Some(by_for), Some(by_id)) = (
                match_attribute("for", target),
                match_attribute("id", target),
            ) {
                let wrapped = !attr("for") & descendant(LABELABLE).filter(by_id);
                xpath = xpath.filter(by_for | wrapped);
            }
            Ok(xpath.into())
        })
        .build()
}

#[cfg(test)]
mod tests {
    use crate::config::SelectorConfig;
    use crate::filter::FilterOptions;
    use crate::locator::Locator;
    use crate::registry::SelectorRegistry;

    fn compile(name: &str, locator: Option<&str>, options: FilterOptions) -> (String, Vec<String>) {
        let registry = SelectorRegistry::with_builtins();
        let mut selector = registry
            .selector(name, SelectorConfig::default(), None)
            .unwrap();
        let locator = locator.map(Locator::from);
        let expr = selector.compile(locator.as_ref(), &options).unwrap().unwrap();
        (expr.to_string(), selector.errors().to_vec())
    }

    #[test]
    fn test_field_excludes_buttons_and_hidden() {
        let (expr, errors) = compile("field", None, FilterOptions::new());
        assert_eq!(
            expr,
            ".//*[self::input | self::textarea | self::select]\
             [not((./@type = 'submit' or ./@type = 'image' or ./@type = 'hidden'))]"
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_field_type_hidden_keeps_hidden_inputs() {
        let (expr, _) = compile("field", None, FilterOptions::new().with("type", "hidden"));
        assert_eq!(
            expr,
            ".//*[self::input | self::textarea | self::select]\
             [not((./@type = 'submit' or ./@type = 'image'))][./@type = 'hidden']"
        );
    }

    #[test]
    fn test_checkbox_checked() {
        let (expr, errors) = compile("checkbox", None, FilterOptions::new().with("checked", true));
        assert_eq!(expr, ".//input[./@type = 'checkbox'][./@checked]");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_checked_and_unchecked_conflict() {
        let (expr, errors) = compile(
            "radio_button",
            None,
            FilterOptions::new().with("checked", true).with("unchecked", true),
        );
        assert_eq!(
            expr,
            ".//input[./@type = 'radio'][(./@checked and not(./@checked))]"
        );
        assert_eq!(errors, vec!["checked and unchecked cannot both be true"]);
    }

    #[test]
    fn test_checked_requires_boolean() {
        let (_, errors) = compile("checkbox", None, FilterOptions::new().with("checked", "yes"));
        assert_eq!(
            errors,
            vec!["Invalid value \"yes\" passed to :checked - must be true or false"]
        );
    }

    #[test]
    fn test_radio_option_value() {
        let (expr, _) = compile("radio_button", None, FilterOptions::new().with("option", "red"));
        assert_eq!(expr, ".//input[./@type = 'radio'][./@value = 'red']");
    }

    #[test]
    fn test_fillable_field_allow_self() {
        let (expr, _) = compile("fillable_field", None, FilterOptions::new().with("allow_self", true));
        assert!(expr.starts_with("./descendant-or-self::*[self::input | self::textarea]"));
    }

    #[test]
    fn test_select_multiple() {
        let (expr, _) = compile("select", None, FilterOptions::new().with("multiple", false));
        assert_eq!(expr, ".//select[not(./@multiple)]");
    }

    #[test]
    fn test_option_by_text() {
        let (expr, _) = compile("option", Some("Red"), FilterOptions::new().with("selected", true));
        assert_eq!(
            expr,
            ".//option[normalize-space(string(.)) = 'Red'][./@selected]"
        );
    }

    #[test]
    fn test_file_field_name() {
        let (expr, _) = compile("file_field", None, FilterOptions::new().with("name", "avatar"));
        assert_eq!(expr, ".//input[./@type = 'file'][./@name = 'avatar']");
    }

    #[test]
    fn test_label_for() {
        let (expr, _) = compile("label", Some("Email"), FilterOptions::new().with("for", "email"));
        assert_eq!(
            expr,
            ".//label[(normalize-space(string(.)) = 'Email' or ./@id = 'Email')]\
             [(./@for = 'email' or (not(./@for) and \
             .//*[self::button | self::input | self::keygen | self::meter | self::output | \
             self::progress | self::select | self::textarea][./@id = 'email']))]"
        );
    }

    #[test]
    fn test_label_empty_for_is_ignored() {
        let (expr, _) = compile("label", None, FilterOptions::new().with("for", ""));
        assert_eq!(expr, ".//label");
    }
}
