//! Rule-file configuration tree.
//!
//! Rule files are INI-like: named `[sections]` holding `key = value`
//! properties. A value is a bare scalar, a comma-separated list, or a
//! braced tuple whose items may themselves be lists or tuples. This module
//! models that tree and parses the one extra primitive — function-call
//! expressions like `offset_of(member)` — out of scalars on demand.
//!
//! Reading text into a [`Config`] lives in [`reader`].

mod reader;

pub use reader::parse_config;

use serde::{Deserialize, Serialize};

/// A parsed rule-file: an ordered list of sections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    pub sections: Vec<Section>,
}

/// One `[name]` section and its properties, in file order.
///
/// Property names may repeat; whether that is legal is decided by the
/// schema of whoever consumes the section, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// 1-based line of the section heading.
    pub line: u32,
    pub properties: Vec<Property>,
}

impl Section {
    /// The first property with the given name, if any.
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// All properties with the given name, in file order.
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties.iter().filter(move |p| p.name == name)
    }
}

/// One `key = value` line (or a bare `key` line, which gets an empty
/// scalar value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// 1-based line the property appeared on.
    pub line: u32,
    pub value: PropertyValue,
}

/// A property value.
///
/// An unbraced value with top-level commas parses as a `List`, so
/// `names = a, b, c` and `names = {a, b, c}` are equivalent. A braced
/// value containing nested braces parses as a `Tuple`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Scalar(String),
    List(Vec<String>),
    Tuple(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

/// A function-call expression parsed from a scalar: `name(arg1, …, argN)`,
/// N ≥ 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallExpr {
    pub name: String,
    pub arguments: Vec<String>,
}

/// Parse a scalar as a function-call expression.
///
/// The callee must be an identifier (`[A-Za-z_][A-Za-z0-9_]*`), arguments
/// are comma-separated and must be non-empty. Returns `None` when the
/// input is not of that shape.
pub fn parse_function_call_expr(input: &str) -> Option<FunctionCallExpr> {
    let input = input.trim();
    let open = input.find('(')?;
    let name = input[..open].trim();
    if !is_identifier(name) {
        return None;
    }
    let rest = &input[open + 1..];
    let close = rest.rfind(')')?;
    if !rest[close + 1..].trim().is_empty() {
        return None;
    }
    let inner = rest[..close].trim();
    let arguments = if inner.is_empty() {
        Vec::new()
    } else {
        let args: Vec<String> = inner.split(',').map(|a| a.trim().to_string()).collect();
        if args.iter().any(|a| a.is_empty()) {
            return None;
        }
        args
    };
    Some(FunctionCallExpr {
        name: name.to_string(),
        arguments,
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
