//! Text reader for the rule-file format.
//!
//! The format is line-oriented:
//!
//! ```text
//! # comment to end of line, ';' works too
//! [section_name]
//! key = scalar value
//! names = a, b, c            ; a list
//! ranges = {{0, 15}, {32, end}}  ; a tuple of lists
//! bare_key                   ; allowed, gets an empty scalar value
//! ```
//!
//! Whitespace is insignificant except inside double-quoted scalars, where
//! comments and commas are also left alone.

use crate::error::IniError;
use crate::ini::{Config, Property, PropertyValue, Section};

/// Parse rule-file text into a [`Config`].
pub fn parse_config(input: &str) -> Result<Config, IniError> {
    let mut config = Config::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let line = strip_comment(raw, line_no)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or(IniError::MalformedSection { line: line_no })?
                .trim();
            if name.is_empty() {
                return Err(IniError::MalformedSection { line: line_no });
            }
            config.sections.push(Section {
                name: name.to_string(),
                line: line_no,
                properties: Vec::new(),
            });
            continue;
        }

        let section = config
            .sections
            .last_mut()
            .ok_or(IniError::PropertyOutsideSection { line: line_no })?;

        let (name, value_text) = match split_key_value(line) {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (line, None),
        };
        if name.is_empty() {
            return Err(IniError::MissingPropertyName { line: line_no });
        }

        let value = match value_text {
            None => PropertyValue::Scalar(String::new()),
            Some(text) => parse_value(text, line_no)?,
        };
        section.properties.push(Property {
            name: name.to_string(),
            line: line_no,
            value,
        });
    }

    Ok(config)
}

/// Drop an end-of-line comment, honoring double quotes.
fn strip_comment(line: &str, line_no: u32) -> Result<&str, IniError> {
    let mut in_quote = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '#' | ';' if !in_quote => return Ok(&line[..i]),
            _ => {}
        }
    }
    if in_quote {
        return Err(IniError::UnterminatedQuote { line: line_no });
    }
    Ok(line)
}

/// Split a property line at the first `=` outside quotes.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let mut in_quote = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '=' if !in_quote => return Some((&line[..i], &line[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Parse the text after `=` into a property value.
fn parse_value(text: &str, line_no: u32) -> Result<PropertyValue, IniError> {
    if text.starts_with('{') {
        return parse_braced(text, line_no);
    }
    if split_top_level(text, ',').len() > 1 {
        let items = split_top_level(text, ',')
            .into_iter()
            .map(|item| unquote(item.trim()).to_string())
            .collect();
        return Ok(PropertyValue::List(items));
    }
    Ok(PropertyValue::Scalar(unquote(text).to_string()))
}

/// Parse a `{…}` value: a list when every element is a scalar, a tuple
/// when any element is itself braced.
fn parse_braced(text: &str, line_no: u32) -> Result<PropertyValue, IniError> {
    let inner = braced_inner(text).ok_or(IniError::UnbalancedBraces { line: line_no })?;

    let elements = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner, ',')
    };

    let any_nested = elements.iter().any(|e| e.trim().starts_with('{'));
    if !any_nested {
        let items = elements
            .into_iter()
            .map(|e| unquote(e.trim()).to_string())
            .collect();
        return Ok(PropertyValue::List(items));
    }

    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        let element = element.trim();
        if element.starts_with('{') {
            items.push(parse_braced(element, line_no)?);
        } else {
            items.push(PropertyValue::Scalar(unquote(element).to_string()));
        }
    }
    Ok(PropertyValue::Tuple(items))
}

/// The text between a leading `{` and its matching `}`, which must close
/// the whole value.
fn braced_inner(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_quote = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '{' if !in_quote => depth += 1,
            '}' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    if text[i + 1..].trim().is_empty() {
                        return Some(&text[1..i]);
                    }
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on a separator at brace depth zero, outside quotes.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '{' if !in_quote => depth += 1,
            '}' if !in_quote => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 && !in_quote => {
                parts.push(&text[start..i]);
                start = i + sep.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Strip one layer of surrounding double quotes, if present.
fn unquote(text: &str) -> &str {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
