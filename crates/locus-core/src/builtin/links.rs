use super::{SYMBOL, TEXT, attribute_filter, presence_filter, test_id_matcher, xpath_of};
use crate::definition::SelectorDefinition;
use crate::error::SelectorError;
use crate::filter::{FilterOptions, FilterValueType};
use crate::format::Format;
use crate::matchers::match_attribute;
use locus_xpath::dsl::{attr, descendant, string, union_all};

pub(super) fn definitions() -> Vec<SelectorDefinition> {
    vec![link(), button(), link_or_button()]
}

fn link() -> SelectorDefinition {
    SelectorDefinition::builder("link")
        .description("Link by id, text, title or image alt text")
        .locator_types([TEXT, SYMBOL])
        .xpath(&["title", "alt", "target"], |selector, locator, options| {
            let mut xpath = descendant(&["a"]);
            if let Some(locator) = locator {
                let locator = locator.to_text();
                let mut matchers = attr("id").equals(&locator)
                    | string().normalize().is(&locator)
                    | attr("title").is(&locator)
                    | descendant(&["img"]).filter(attr("alt").is(&locator));
                if selector.enable_aria_label() {
                    matchers = matchers | attr("aria-label").is(&locator);
                }
                if let Some(test_id) = test_id_matcher(selector, &locator) {
                    matchers = matchers | test_id;
                }
                xpath = xpath.filter(matchers);
            }

            xpath = xpath.filter(match_attribute("title", options.get("title")));
            if let Some(alt) = options.get_text("alt") {
                xpath = xpath.filter(descendant(&["img"]).filter(attr("alt").equals(alt)));
            }
            xpath = xpath.filter(match_attribute("target", options.get("target")));
            Ok(xpath.into())
        })
        // true: any href, false: no href, text or pattern: the href value.
        .expression_filter("href", FilterValueType::Any, attribute_filter)
        .filter_default("href", true)
        .build()
}

fn button() -> SelectorDefinition {
    const ATTRIBUTES: [&str; 4] = ["value", "title", "type", "name"];

    SelectorDefinition::builder("button")
        .description("Button by id, name, value, title or text")
        .locator_types([TEXT, SYMBOL])
        .xpath(&ATTRIBUTES, |selector, locator, options| {
            let mut input_btn = descendant(&["input"])
                .filter(attr("type").one_of(["submit", "reset", "image", "button"]));
            let mut btn = descendant(&["button"]);
            let mut aria_btn = descendant(&[]).filter(attr("role").equals("button"));
            let mut image_btn = descendant(&["input"]).filter(attr("type").equals("image"));

            if let Some(locator) = locator {
                let locator = locator.to_text();
                let mut matchers = attr("id").equals(&locator)
                    | attr("name").equals(&locator)
                    | attr("value").is(&locator)
                    | attr("title").is(&locator);
                if selector.enable_aria_label() {
                    matchers = matchers | attr("aria-label").is(&locator);
                }
                if let Some(test_id) = test_id_matcher(selector, &locator) {
                    matchers = matchers | test_id;
                }
                let text = string().normalize().is(&locator);

                input_btn = input_btn.filter(matchers.clone());
                btn = btn.filter(
                    matchers.clone()
                        | text.clone()
                        | descendant(&["img"]).filter(attr("alt").is(&locator)),
                );
                aria_btn = aria_btn.filter(matchers | text);

                let mut alt = attr("alt").is(&locator);
                if selector.enable_aria_label() {
                    alt = alt | attr("aria-label").is(&locator);
                }
                image_btn = image_btn.filter(alt);
            }

            let mut xpath = input_btn.union(btn).union(image_btn);
            if selector.enable_aria_role() {
                xpath = xpath.union(aria_btn);
            }
            for name in ATTRIBUTES {
                xpath = xpath.filter(match_attribute(name, options.get(name)));
            }
            Ok(xpath.into())
        })
        .expression_filter("disabled", FilterValueType::Boolean, presence_filter)
        .build()
}

fn link_or_button() -> SelectorDefinition {
    SelectorDefinition::builder("link_or_button")
        .description("Link or button")
        .locator_types([TEXT, SYMBOL])
        .xpath(&[], |selector, locator, _| {
            let mut members = Vec::new();
            for name in ["link", "button"] {
                if let Some(expr) = selector.expression_for(name, locator, &FilterOptions::new(), None)? {
                    members.push(xpath_of(expr)?);
                }
            }
            let union = union_all(members).ok_or_else(|| SelectorError::UnsupportedFormat {
                selector: selector.name().to_string(),
                format: Format::XPath,
            })?;
            Ok(union.into())
        })
        .expression_filter("disabled", FilterValueType::Boolean, presence_filter)
        .build()
}
