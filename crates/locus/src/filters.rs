use locus_core::{FilterOptions, FilterValue, Locator};
use regex::Regex;

/// Parse a `--filter key=value` argument.
///
/// `true`/`false` become booleans, `/re/` a pattern, and a value containing
/// commas a list. Anything else is text.
pub fn parse_filter(arg: &str) -> Result<(String, FilterValue), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{arg}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter name in `{arg}`"));
    }
    Ok((key.to_string(), parse_value(value)?))
}

fn parse_value(value: &str) -> Result<FilterValue, String> {
    if let Some(pattern) = value
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
    {
        let re = Regex::new(pattern).map_err(|e| format!("invalid pattern /{pattern}/: {e}"))?;
        return Ok(FilterValue::Pattern(re));
    }
    Ok(match value {
        "true" => FilterValue::Bool(true),
        "false" => FilterValue::Bool(false),
        list if list.contains(',') => FilterValue::List(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        text => FilterValue::Text(text.to_string()),
    })
}

pub fn filter_options(filters: Vec<(String, FilterValue)>) -> FilterOptions {
    filters.into_iter().collect()
}

/// The locator argument, as a pattern when `pattern` is set.
pub fn parse_locator(locator: &str, pattern: bool) -> Result<Locator, regex::Error> {
    if pattern {
        Ok(Locator::Pattern(Regex::new(locator)?))
    } else {
        Ok(Locator::from(locator))
    }
}
