// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Replaces `${name}` placeholders with values from `variables`.
///
/// Unknown placeholders become empty strings; an unclosed `${` is kept as text.
///
/// ```rust
/// use std::collections::HashMap;
/// use morphwood::utils::format_template;
///
/// let mut variables = HashMap::new();
/// variables.insert("first".to_string(), "Herman".to_string());
/// variables.insert("last".to_string(), "Melville".to_string());
///
/// assert_eq!(format_template("${last}, ${first}", &variables), "Melville, Herman");
/// assert_eq!(format_template("${middle}!", &variables), "!");
/// ```
pub fn format_template(template: &str, variables: &HashMap<String, String>) -> String {
    let expanded: Result<String, ()> = expand(template, "${", '}', |name| {
        Ok(variables.get(name).cloned().unwrap_or_default())
    });
    expanded.unwrap_or_else(|()| template.to_string())
}

/// Replaces `$[name]` references, failing on the first undefined one.
///
/// Returns the name of the undefined variable on failure.
pub fn substitute_variables<F>(text: &str, mut lookup: F) -> Result<String, String>
where
    F: FnMut(&str) -> Option<String>,
{
    expand(text, "$[", ']', |name| lookup(name).ok_or_else(|| name.to_string()))
}

/// Names of all `$[name]` references in `text`, in order of appearance.
pub fn referenced_variables(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let _: Result<String, ()> = expand(text, "$[", ']', |name| {
        names.push(name.to_string());
        Ok(String::new())
    });
    names
}

fn expand<F, E>(text: &str, open: &str, close: char, mut resolve: F) -> Result<String, E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(close) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&resolve(&after[..end])?);
        rest = &after[end + close.len_utf8()..];
    }
    out.push_str(rest);
    Ok(out)
}
