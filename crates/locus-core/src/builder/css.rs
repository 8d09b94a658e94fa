use super::QueryBuilder;
use super::regexp::RegexpDisassembler;
use crate::error::SelectorError;
use crate::filter::FilterValue;
use crate::format::{Format, QueryExpression};
use regex::Regex;

/// Builds CSS selector strings.
///
/// Conditions are appended to every comma-separated branch of the seed, and
/// alternative conditions multiply the branches.
#[derive(Debug, Clone, Default)]
pub struct CssBuilder {
    expression: String,
}

impl CssBuilder {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            expression: seed.into(),
        }
    }

    fn conditions_for(name: &str, value: &FilterValue) -> Result<Vec<String>, SelectorError> {
        if name == "class" {
            return class_conditions(value);
        }
        match value {
            FilterValue::Pattern(re) => Ok(regexp_conditions(name, re)),
            FilterValue::List(values) => Ok(values
                .iter()
                .map(|v| attribute_condition(name, &FilterValue::Text(v.clone())))
                .collect::<Result<Vec<_>, _>>()?),
            other => Ok(vec![attribute_condition(name, other)?]),
        }
    }
}

impl QueryBuilder for CssBuilder {
    fn format(&self) -> Format {
        Format::Css
    }

    fn add_attribute_conditions(
        &mut self,
        conditions: &[(&str, &FilterValue)],
    ) -> Result<(), SelectorError> {
        for (name, value) in conditions {
            let suffixes = Self::conditions_for(name, value)?;
            if suffixes.is_empty() {
                continue;
            }
            let branches = if self.expression.is_empty() {
                vec![String::new()]
            } else {
                split(&self.expression)
            };
            self.expression = branches
                .iter()
                .map(|branch| {
                    suffixes
                        .iter()
                        .map(|suffix| format!("{branch}{suffix}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect::<Vec<_>>()
                .join(", ");
        }
        Ok(())
    }

    fn expression(&self) -> QueryExpression {
        QueryExpression::Css(self.expression.clone())
    }
}

fn case_flag(disassembler: &RegexpDisassembler) -> &'static str {
    if disassembler.ignore_case() { " i" } else { "" }
}

fn regexp_conditions(name: &str, re: &Regex) -> Vec<String> {
    let disassembler = RegexpDisassembler::new(re);
    let flag = case_flag(&disassembler);
    disassembler
        .alternated_substrings()
        .into_iter()
        .map(|strings| {
            strings
                .iter()
                .map(|s| format!("[{name}*='{}'{flag}]", escape_string(s)))
                .collect::<String>()
        })
        .collect()
}

fn attribute_condition(name: &str, value: &FilterValue) -> Result<String, SelectorError> {
    match value {
        FilterValue::XPath(_) => Err(SelectorError::UnsupportedFilterValue {
            filter: name.to_string(),
            reason: "XPath expressions are not supported with CSS based selectors".to_string(),
        }),
        FilterValue::Pattern(re) => {
            let disassembler = RegexpDisassembler::new(re);
            let flag = case_flag(&disassembler);
            Ok(disassembler
                .substrings()
                .iter()
                .map(|s| format!("[{name}*='{}'{flag}]", escape_string(s)))
                .collect())
        }
        FilterValue::Bool(true) => Ok(format!("[{name}]")),
        FilterValue::Bool(false) => Ok(format!(":not([{name}])")),
        FilterValue::Text(text) if name == "id" => Ok(format!("#{}", escape(text))),
        FilterValue::Text(text) => Ok(format!("[{name}='{}']", escape_string(text))),
        FilterValue::List(values) => Ok(format!("[{name}='{}']", escape_string(&values.join(" ")))),
    }
}

fn class_conditions(value: &FilterValue) -> Result<Vec<String>, SelectorError> {
    let classes: Vec<&str> = match value {
        FilterValue::XPath(_) => {
            return Err(SelectorError::UnsupportedFilterValue {
                filter: "class".to_string(),
                reason: "XPath expressions are not supported with CSS based selectors"
                    .to_string(),
            });
        }
        FilterValue::Pattern(_) | FilterValue::Bool(_) => {
            return Ok(vec![attribute_condition("class", value)?]);
        }
        FilterValue::Text(class) => vec![class.as_str()],
        FilterValue::List(classes) => classes.iter().map(String::as_str).collect(),
    };

    let (negated, positive): (Vec<_>, Vec<_>) = classes
        .into_iter()
        .filter_map(parse_class)
        .partition(|(negated, _)| *negated);
    let mut condition = String::new();
    for (_, class) in positive {
        condition.push('.');
        condition.push_str(&escape(class));
    }
    for (_, class) in negated {
        condition.push_str(&format!(":not(.{})", escape(class)));
    }
    Ok(vec![condition])
}

/// Split a class entry into `(negated, name)`.
///
/// `!name` negates a class; a leading `!!!` escapes a literal `!`. Entries
/// with no name left after the prefix are skipped.
pub(crate) fn parse_class(class: &str) -> Option<(bool, &str)> {
    let (negated, name) = if class.starts_with('!') && !class.starts_with("!!!") {
        (true, &class[1..])
    } else {
        (false, class.strip_prefix("!!").unwrap_or(class))
    };
    (!name.is_empty()).then_some((negated, name))
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Escape a CSS identifier.
pub fn escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut chars = ident.chars().peekable();
    if let Some(&c) = chars.peek()
        && (c == '-' || c == '_')
    {
        out.push(c);
        chars.next();
    }
    if let Some(c) = chars.next() {
        if c == '_' || c.is_ascii_alphabetic() {
            out.push(c);
        } else {
            out.push_str(&escape_char(c));
        }
    }
    for c in chars {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        } else {
            out.push_str(&escape_char(c));
        }
    }
    out
}

fn escape_char(c: char) -> String {
    if (' '..='/').contains(&c) || (':'..='~').contains(&c) {
        format!("\\{c}")
    } else {
        format!("\\{:06x}", c as u32)
    }
}

/// Split a selector list at top-level commas. Commas inside quotes,
/// parentheses and attribute brackets do not split.
pub fn split(css: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = css.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                continue;
            }
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                selectors.push(current.trim().to_string());
                current.clear();
                continue;
            }
            (None, _) => {}
        }
        current.push(c);
    }
    selectors.push(current.trim().to_string());
    selectors
}
