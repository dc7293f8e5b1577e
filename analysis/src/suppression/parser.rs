//! Parsing of rule files into suppression records.
//!
//! Each recognized section kind owns a schema: a table mapping property
//! names to `{sufficient, repeatable, consume}` records. A section is
//! accepted iff every property it carries is known, no non-repeatable
//! property repeats, at least one *sufficient* property is present (so a
//! section can never build a match-everything rule by accident), and every
//! typed decoder succeeds. A rejected section is skipped with a diagnostic
//! and parsing continues; nothing here ever unwinds.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use abiscope_core::ini::{
    parse_config, parse_function_call_expr, Config, Property, PropertyValue, Section,
};

use crate::error::SuppressionError;
use crate::regexes::RegexCache;
use crate::suppression::model::{
    FileSuppression, FnChangeKind, FunctionSuppression, InsertionRange, Offset, ParameterSpec,
    ReachKind, Suppression, SuppressionBase, TypeKindSpec, TypeSuppression, VarChangeKind,
    VariableSuppression,
};

/// What a parser diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    UnknownSection,
    UnknownProperty,
    RepeatedProperty,
    MalformedValue,
    BadRegex,
    InsufficientProperties,
    IgnoredDrop,
}

/// A line-anchored warning emitted while reading rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the section the diagnostic belongs to.
    pub section: String,
    /// 1-based line in the rule text.
    pub line: u32,
    pub message: String,
}

/// The result of reading a rule stream: the accepted rules in file order,
/// plus every diagnostic emitted along the way.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub suppressions: Vec<Suppression>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    fn diag(&mut self, kind: DiagnosticKind, section: &Section, line: u32, message: String) {
        warn!(section = %section.name, line, "{message}");
        self.diagnostics.push(Diagnostic {
            kind,
            section: section.name.clone(),
            line,
            message,
        });
    }
}

/// Read suppression rules from an already-parsed configuration tree.
pub fn read_suppressions(config: &Config) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut cache = RegexCache::new();

    for section in &config.sections {
        match section.name.as_str() {
            "suppress_type" => {
                let mut rule = TypeSuppression::default();
                if populate_section(section, &type_schema(), &mut rule, &mut cache, &mut outcome) {
                    finish_type_rule(section, &mut rule, &mut outcome);
                    outcome.suppressions.push(Suppression::Type(rule));
                }
            }
            "suppress_function" => {
                let mut rule = FunctionSuppression::default();
                if populate_section(section, &function_schema(), &mut rule, &mut cache, &mut outcome)
                {
                    finish_function_rule(section, &mut rule, &mut outcome);
                    outcome.suppressions.push(Suppression::Function(rule));
                }
            }
            "suppress_variable" => {
                let mut rule = VariableSuppression::default();
                if populate_section(section, &variable_schema(), &mut rule, &mut cache, &mut outcome)
                {
                    finish_variable_rule(section, &mut rule, &mut outcome);
                    outcome.suppressions.push(Suppression::Variable(rule));
                }
            }
            "suppress_file" => {
                let mut rule = FileSuppression::default();
                if populate_section(section, &file_schema(), &mut rule, &mut cache, &mut outcome) {
                    // A file rule drops whole binaries from the IR exactly
                    // when it is tied to a SONAME.
                    rule.base.drops_artifact = rule.base.has_soname_related_property();
                    outcome.suppressions.push(Suppression::File(rule));
                }
            }
            other => {
                outcome.diag(
                    DiagnosticKind::UnknownSection,
                    section,
                    section.line,
                    format!("unknown section [{other}]"),
                );
            }
        }
    }

    outcome
}

/// Read suppression rules from rule-file text.
pub fn read_suppressions_str(text: &str) -> Result<ParseOutcome, SuppressionError> {
    let config = parse_config(text)?;
    Ok(read_suppressions(&config))
}

/// Read suppression rules from a file on disk.
pub fn read_suppressions_file(path: impl AsRef<Path>) -> Result<ParseOutcome, SuppressionError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| SuppressionError::File {
        path: display.clone(),
        source: anyhow::Error::new(e),
    })?;
    let config = parse_config(&text).map_err(|e| SuppressionError::File {
        path: display,
        source: anyhow::Error::new(e),
    })?;
    Ok(read_suppressions(&config))
}

// ==================== schema machinery ====================

enum ValueError {
    Malformed(String),
    BadRegex(String),
}

impl ValueError {
    fn kind(&self) -> DiagnosticKind {
        match self {
            ValueError::Malformed(_) => DiagnosticKind::MalformedValue,
            ValueError::BadRegex(_) => DiagnosticKind::BadRegex,
        }
    }

    fn message(&self) -> &str {
        match self {
            ValueError::Malformed(m) | ValueError::BadRegex(m) => m,
        }
    }
}

struct PropSpec<T> {
    name: &'static str,
    /// Presence of this property alone justifies the section.
    sufficient: bool,
    /// Whether the property may appear more than once.
    repeatable: bool,
    consume: fn(&mut T, &Property, &mut RegexCache) -> Result<(), ValueError>,
}

/// Drive a section through its schema, populating `target`.
///
/// Returns false (after emitting a diagnostic) when the section must be
/// skipped.
fn populate_section<T>(
    section: &Section,
    schema: &[PropSpec<T>],
    target: &mut T,
    cache: &mut RegexCache,
    outcome: &mut ParseOutcome,
) -> bool {
    let mut seen: HashMap<&str, u32> = HashMap::new();
    let mut saw_sufficient = false;

    for prop in &section.properties {
        let Some(spec) = schema.iter().find(|s| s.name == prop.name) else {
            outcome.diag(
                DiagnosticKind::UnknownProperty,
                section,
                prop.line,
                format!("unknown property '{}' in [{}]", prop.name, section.name),
            );
            return false;
        };

        let count = seen.entry(spec.name).or_insert(0);
        *count += 1;
        if *count > 1 && !spec.repeatable {
            outcome.diag(
                DiagnosticKind::RepeatedProperty,
                section,
                prop.line,
                format!("property '{}' appears more than once", prop.name),
            );
            return false;
        }

        if let Err(e) = (spec.consume)(target, prop, cache) {
            outcome.diag(
                e.kind(),
                section,
                prop.line,
                format!("property '{}': {}", prop.name, e.message()),
            );
            return false;
        }

        if spec.sufficient {
            saw_sufficient = true;
        }
    }

    if !saw_sufficient {
        outcome.diag(
            DiagnosticKind::InsufficientProperties,
            section,
            section.line,
            format!("section [{}] has no identifying property", section.name),
        );
        return false;
    }

    true
}

// ==================== typed decoders ====================

fn decode_string(prop: &Property) -> Result<String, ValueError> {
    prop.value
        .as_scalar()
        .map(str::to_string)
        .ok_or_else(|| ValueError::Malformed("expected a plain string".to_string()))
}

fn decode_bool(prop: &Property) -> Result<bool, ValueError> {
    match decode_string(prop)?.as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        other => Err(ValueError::Malformed(format!("'{other}' is not a boolean"))),
    }
}

fn decode_regex(prop: &Property, cache: &mut RegexCache) -> Result<Regex, ValueError> {
    let pattern = decode_string(prop)?;
    cache
        .compile(&pattern)
        .map_err(|e| ValueError::BadRegex(format!("cannot compile '{pattern}': {e}")))
}

/// A scalar becomes a one-element set; a list becomes the whole set.
fn decode_string_set(prop: &Property) -> Result<BTreeSet<String>, ValueError> {
    match &prop.value {
        PropertyValue::Scalar(s) => Ok(BTreeSet::from([s.clone()])),
        PropertyValue::List(items) => Ok(items.iter().cloned().collect()),
        PropertyValue::Tuple(_) => {
            Err(ValueError::Malformed("expected a string or a list".to_string()))
        }
    }
}

fn decode_string_list(prop: &Property) -> Result<Vec<String>, ValueError> {
    match &prop.value {
        PropertyValue::Scalar(s) => Ok(vec![s.clone()]),
        PropertyValue::List(items) => Ok(items.clone()),
        PropertyValue::Tuple(_) => {
            Err(ValueError::Malformed("expected a string or a list".to_string()))
        }
    }
}

/// Decode one offset: `end`, a non-negative integer, or
/// `offset_of(member)` / `offset_after(member)`.
fn decode_offset(text: &str) -> Result<Offset, ValueError> {
    let text = text.trim();
    if text == "end" {
        return Ok(Offset::END);
    }
    if text.starts_with('-') {
        return Err(ValueError::Malformed(format!(
            "negative offset '{text}' is not accepted; use 'end' for the end of the type"
        )));
    }
    if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return text
            .parse::<u64>()
            .map(Offset::Integer)
            .map_err(|_| ValueError::Malformed(format!("'{text}' is not a valid offset")));
    }
    let expr = parse_function_call_expr(text)
        .ok_or_else(|| ValueError::Malformed(format!("'{text}' is not a valid offset")))?;
    if expr.arguments.len() != 1 {
        return Err(ValueError::Malformed(format!(
            "'{}' takes exactly one data-member name",
            expr.name
        )));
    }
    let member = expr.arguments.into_iter().next().expect("one argument");
    match expr.name.as_str() {
        "offset_of" => Ok(Offset::OffsetOf(member)),
        "offset_after" => Ok(Offset::OffsetAfter(member)),
        other => Err(ValueError::Malformed(format!(
            "unknown offset function '{other}'"
        ))),
    }
}

/// `has_data_member_inserted_at = <offset>` — one open-ended range.
fn decode_inserted_at(prop: &Property) -> Result<InsertionRange, ValueError> {
    let begin = decode_offset(&decode_string(prop)?)?;
    Ok(InsertionRange::new(begin, Offset::END))
}

/// A `{begin, end}` list as one range.
fn decode_range_pair(value: &PropertyValue) -> Result<InsertionRange, ValueError> {
    let items = value
        .as_list()
        .ok_or_else(|| ValueError::Malformed("expected a {begin, end} pair".to_string()))?;
    if items.len() != 2 {
        return Err(ValueError::Malformed(format!(
            "expected exactly two offsets in a range, got {}",
            items.len()
        )));
    }
    Ok(InsertionRange::new(
        decode_offset(&items[0])?,
        decode_offset(&items[1])?,
    ))
}

/// `has_data_member_inserted_between = {{begin, end}}` — a tuple holding
/// exactly one pair.
fn decode_inserted_between(prop: &Property) -> Result<InsertionRange, ValueError> {
    let items = prop
        .value
        .as_tuple()
        .ok_or_else(|| ValueError::Malformed("expected {{begin, end}}".to_string()))?;
    if items.len() != 1 {
        return Err(ValueError::Malformed(
            "expected exactly one {begin, end} pair".to_string(),
        ));
    }
    decode_range_pair(&items[0])
}

/// `has_data_members_inserted_between = {{b1, e1}, {b2, e2}, …}`.
fn decode_ranges_between(prop: &Property) -> Result<Vec<InsertionRange>, ValueError> {
    let items = prop.value.as_tuple().ok_or_else(|| {
        ValueError::Malformed("expected a tuple of {begin, end} pairs".to_string())
    })?;
    if items.is_empty() {
        return Err(ValueError::Malformed(
            "expected at least one {begin, end} pair".to_string(),
        ));
    }
    items.iter().map(decode_range_pair).collect()
}

/// Parse a `parameter` value: `['index] [/type-regex/ | type-name]`.
///
/// The index defaults to 0 when only a type is given. Whitespace inside a
/// bare type name is insignificant and removed.
fn decode_parameter_spec(
    prop: &Property,
    cache: &mut RegexCache,
) -> Result<ParameterSpec, ValueError> {
    let input = decode_string(prop)?;
    let chars: Vec<char> = input.chars().collect();
    let mut cur = 0;

    while cur < chars.len() && chars[cur].is_whitespace() {
        cur += 1;
    }

    let mut index_str = String::new();
    if cur < chars.len() && chars[cur] == '\'' {
        cur += 1;
        while cur < chars.len() && chars[cur].is_ascii_digit() {
            index_str.push(chars[cur]);
            cur += 1;
        }
    }

    while cur < chars.len() && chars[cur].is_whitespace() {
        cur += 1;
    }

    let is_regex = cur < chars.len() && chars[cur] == '/';
    if is_regex {
        cur += 1;
    }

    let mut type_text = String::new();
    while cur < chars.len() {
        let c = chars[cur];
        if !c.is_whitespace() {
            if is_regex && c == '/' {
                break;
            }
            type_text.push(c);
        }
        cur += 1;
    }

    if index_str.is_empty() && type_text.is_empty() {
        return Err(ValueError::Malformed(format!(
            "'{input}' is not a valid parameter specification"
        )));
    }

    let index = index_str.parse::<usize>().unwrap_or(0);
    if is_regex {
        let re = cache
            .compile(&type_text)
            .map_err(|e| ValueError::BadRegex(format!("cannot compile '{type_text}': {e}")))?;
        Ok(ParameterSpec {
            index,
            type_name: None,
            type_name_regex: Some(re),
        })
    } else {
        Ok(ParameterSpec {
            index,
            type_name: (!type_text.is_empty()).then_some(type_text),
            type_name_regex: None,
        })
    }
}

fn decode_type_kind(prop: &Property) -> Result<TypeKindSpec, ValueError> {
    match decode_string(prop)?.as_str() {
        "class" => Ok(TypeKindSpec::Class),
        "struct" => Ok(TypeKindSpec::Struct),
        "union" => Ok(TypeKindSpec::Union),
        "enum" => Ok(TypeKindSpec::Enum),
        "array" => Ok(TypeKindSpec::Array),
        "typedef" => Ok(TypeKindSpec::Typedef),
        "builtin" => Ok(TypeKindSpec::Builtin),
        other => Err(ValueError::Malformed(format!("unknown type kind '{other}'"))),
    }
}

fn decode_reach_kind(prop: &Property) -> Result<ReachKind, ValueError> {
    match decode_string(prop)?.as_str() {
        "direct" => Ok(ReachKind::Direct),
        "pointer" => Ok(ReachKind::Pointer),
        "reference" => Ok(ReachKind::Reference),
        "reference-or-pointer" => Ok(ReachKind::ReferenceOrPointer),
        other => Err(ValueError::Malformed(format!(
            "unknown access path '{other}'"
        ))),
    }
}

fn decode_fn_change_kind(prop: &Property) -> Result<FnChangeKind, ValueError> {
    match decode_string(prop)?.as_str() {
        "function-subtype-change" => Ok(FnChangeKind::SUBTYPE),
        "added-function" => Ok(FnChangeKind::ADDED),
        "deleted-function" => Ok(FnChangeKind::DELETED),
        "all" => Ok(FnChangeKind::ALL),
        other => Err(ValueError::Malformed(format!(
            "unknown change kind '{other}'"
        ))),
    }
}

fn decode_var_change_kind(prop: &Property) -> Result<VarChangeKind, ValueError> {
    match decode_string(prop)?.as_str() {
        "variable-subtype-change" => Ok(VarChangeKind::SUBTYPE),
        "added-variable" => Ok(VarChangeKind::ADDED),
        "deleted-variable" => Ok(VarChangeKind::DELETED),
        "all" => Ok(VarChangeKind::ALL),
        other => Err(ValueError::Malformed(format!(
            "unknown change kind '{other}'"
        ))),
    }
}

// ==================== per-kind schemas ====================

fn type_schema() -> Vec<PropSpec<TypeSuppression>> {
    vec![
        PropSpec {
            name: "label",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.label = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "drop_artifact",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.drops_artifact = decode_bool(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "drop",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.drops_artifact = decode_bool(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.type_name = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.type_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.type_name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "type_kind",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.type_kind = Some(decode_type_kind(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "accessed_through",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.reach_kind = Some(decode_reach_kind(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "source_location_not_in",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.source_locations_to_keep = decode_string_set(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "source_location_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.source_location_to_keep_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "has_data_member_inserted_at",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.insertion_ranges.push(decode_inserted_at(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "has_data_member_inserted_between",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.insertion_ranges.push(decode_inserted_between(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "has_data_members_inserted_between",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.insertion_ranges.extend(decode_ranges_between(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "changed_enumerators",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.changed_enumerator_names = decode_string_list(p)?;
                Ok(())
            },
        },
    ]
}

fn function_schema() -> Vec<PropSpec<FunctionSuppression>> {
    vec![
        PropSpec {
            name: "label",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.base.label = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "drop_artifact",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.drops_artifact = decode_bool(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "drop",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.drops_artifact = decode_bool(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.name = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "change_kind",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.change_kind = decode_fn_change_kind(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "allow_other_aliases",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.allow_other_aliases = decode_bool(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "parameter",
            sufficient: true,
            repeatable: true,
            consume: |t, p, c| {
                t.parameter_specs.push(decode_parameter_spec(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "return_type_name",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.return_type_name = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "return_type_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.return_type_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_name",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.symbol_name = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.symbol_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.symbol_name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_version",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.symbol_version = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_version_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.symbol_version_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
    ]
}

fn variable_schema() -> Vec<PropSpec<VariableSuppression>> {
    vec![
        PropSpec {
            name: "label",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.base.label = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "drop_artifact",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.drops_artifact = decode_bool(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "drop",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.drops_artifact = decode_bool(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.name = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "change_kind",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.change_kind = decode_var_change_kind(p)?;
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_name",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.symbol_name = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.symbol_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.symbol_name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_version",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.symbol_version = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "symbol_version_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.symbol_version_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "type_name",
            sufficient: true,
            repeatable: false,
            consume: |t, p, _| {
                t.type_name = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "type_name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.type_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
    ]
}

fn file_schema() -> Vec<PropSpec<FileSuppression>> {
    vec![
        PropSpec {
            name: "label",
            sufficient: false,
            repeatable: false,
            consume: |t, p, _| {
                t.base.label = Some(decode_string(p)?);
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "file_name_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.file_name_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
        PropSpec {
            name: "soname_not_regexp",
            sufficient: true,
            repeatable: false,
            consume: |t, p, c| {
                t.base.soname_not_regex = Some(decode_regex(p, c)?);
                Ok(())
            },
        },
    ]
}

// ==================== post-validation ====================

fn drop_property_line(section: &Section) -> u32 {
    section
        .find_property("drop_artifact")
        .or_else(|| section.find_property("drop"))
        .map(|p| p.line)
        .unwrap_or(section.line)
}

/// `drop` is only honored when the rule names something; a drop-everything
/// rule is defused with a warning.
fn finish_type_rule(section: &Section, rule: &mut TypeSuppression, outcome: &mut ParseOutcome) {
    if rule.base.drops_artifact
        && rule.type_name.is_none()
        && rule.type_name_regex.is_none()
        && rule.source_location_to_keep_regex.is_none()
        && rule.source_locations_to_keep.is_empty()
    {
        outcome.diag(
            DiagnosticKind::IgnoredDrop,
            section,
            drop_property_line(section),
            "'drop' ignored: the rule names no type or source location".to_string(),
        );
        rule.base.drops_artifact = false;
    }

    // The enumerator allow-list only means something for enums.
    if !rule.changed_enumerator_names.is_empty() && rule.type_kind != Some(TypeKindSpec::Enum) {
        rule.changed_enumerator_names.clear();
    }
}

fn finish_function_rule(
    section: &Section,
    rule: &mut FunctionSuppression,
    outcome: &mut ParseOutcome,
) {
    if rule.base.drops_artifact
        && rule.name.is_none()
        && rule.name_regex.is_none()
        && rule.name_not_regex.is_none()
        && rule.symbol_name.is_none()
        && rule.symbol_name_regex.is_none()
        && rule.symbol_name_not_regex.is_none()
    {
        outcome.diag(
            DiagnosticKind::IgnoredDrop,
            section,
            drop_property_line(section),
            "'drop' ignored: the rule names no function or symbol".to_string(),
        );
        rule.base.drops_artifact = false;
    }
}

fn finish_variable_rule(
    section: &Section,
    rule: &mut VariableSuppression,
    outcome: &mut ParseOutcome,
) {
    if rule.base.drops_artifact
        && rule.name.is_none()
        && rule.name_regex.is_none()
        && rule.name_not_regex.is_none()
        && rule.symbol_name.is_none()
        && rule.symbol_name_regex.is_none()
        && rule.symbol_name_not_regex.is_none()
    {
        outcome.diag(
            DiagnosticKind::IgnoredDrop,
            section,
            drop_property_line(section),
            "'drop' ignored: the rule names no variable or symbol".to_string(),
        );
        rule.base.drops_artifact = false;
    }
}

// ==================== serialization ====================

/// Render a rule back into the section text it would parse from.
///
/// Only recognized properties are written; parsing the result yields a
/// rule equal to the input.
pub fn write_suppression_ini(rule: &Suppression) -> String {
    let mut out = String::new();
    match rule {
        Suppression::Type(t) => {
            out.push_str("[suppress_type]\n");
            write_base(&mut out, &t.base, true);
            write_scalar(&mut out, "name", t.type_name.as_deref());
            write_regex(&mut out, "name_regexp", t.type_name_regex.as_ref());
            write_regex(&mut out, "name_not_regexp", t.type_name_not_regex.as_ref());
            if let Some(kind) = t.type_kind {
                let text = match kind {
                    TypeKindSpec::Class => "class",
                    TypeKindSpec::Struct => "struct",
                    TypeKindSpec::Union => "union",
                    TypeKindSpec::Enum => "enum",
                    TypeKindSpec::Array => "array",
                    TypeKindSpec::Typedef => "typedef",
                    TypeKindSpec::Builtin => "builtin",
                };
                write_scalar(&mut out, "type_kind", Some(text));
            }
            if let Some(reach) = t.reach_kind {
                let text = match reach {
                    ReachKind::Direct => "direct",
                    ReachKind::Pointer => "pointer",
                    ReachKind::Reference => "reference",
                    ReachKind::ReferenceOrPointer => "reference-or-pointer",
                };
                write_scalar(&mut out, "accessed_through", Some(text));
            }
            if !t.source_locations_to_keep.is_empty() {
                let items: Vec<&str> = t
                    .source_locations_to_keep
                    .iter()
                    .map(String::as_str)
                    .collect();
                write_list(&mut out, "source_location_not_in", &items);
            }
            write_regex(
                &mut out,
                "source_location_not_regexp",
                t.source_location_to_keep_regex.as_ref(),
            );
            if !t.insertion_ranges.is_empty() {
                let ranges: Vec<String> = t
                    .insertion_ranges
                    .iter()
                    .map(|r| format!("{{{}, {}}}", fmt_offset(&r.begin), fmt_offset(&r.end)))
                    .collect();
                out.push_str(&format!(
                    "has_data_members_inserted_between = {{{}}}\n",
                    ranges.join(", ")
                ));
            }
            if !t.changed_enumerator_names.is_empty() {
                let items: Vec<&str> = t
                    .changed_enumerator_names
                    .iter()
                    .map(String::as_str)
                    .collect();
                write_list(&mut out, "changed_enumerators", &items);
            }
        }
        Suppression::Function(f) => {
            out.push_str("[suppress_function]\n");
            write_base(&mut out, &f.base, true);
            if let Some(text) = fn_change_kind_text(f.change_kind) {
                write_scalar(&mut out, "change_kind", Some(text));
            }
            write_scalar(&mut out, "name", f.name.as_deref());
            write_regex(&mut out, "name_regexp", f.name_regex.as_ref());
            write_regex(&mut out, "name_not_regexp", f.name_not_regex.as_ref());
            write_scalar(&mut out, "return_type_name", f.return_type_name.as_deref());
            write_regex(&mut out, "return_type_regexp", f.return_type_regex.as_ref());
            write_scalar(&mut out, "symbol_name", f.symbol_name.as_deref());
            write_regex(&mut out, "symbol_name_regexp", f.symbol_name_regex.as_ref());
            write_regex(
                &mut out,
                "symbol_name_not_regexp",
                f.symbol_name_not_regex.as_ref(),
            );
            write_scalar(&mut out, "symbol_version", f.symbol_version.as_deref());
            write_regex(
                &mut out,
                "symbol_version_regexp",
                f.symbol_version_regex.as_ref(),
            );
            for spec in &f.parameter_specs {
                let mut text = format!("'{}", spec.index);
                if let Some(name) = &spec.type_name {
                    text.push(' ');
                    text.push_str(name);
                } else if let Some(re) = &spec.type_name_regex {
                    text.push_str(&format!(" /{}/", re.as_str()));
                }
                write_scalar(&mut out, "parameter", Some(&text));
            }
            if !f.allow_other_aliases {
                write_scalar(&mut out, "allow_other_aliases", Some("no"));
            }
        }
        Suppression::Variable(v) => {
            out.push_str("[suppress_variable]\n");
            write_base(&mut out, &v.base, true);
            if let Some(text) = var_change_kind_text(v.change_kind) {
                write_scalar(&mut out, "change_kind", Some(text));
            }
            write_scalar(&mut out, "name", v.name.as_deref());
            write_regex(&mut out, "name_regexp", v.name_regex.as_ref());
            write_regex(&mut out, "name_not_regexp", v.name_not_regex.as_ref());
            write_scalar(&mut out, "symbol_name", v.symbol_name.as_deref());
            write_regex(&mut out, "symbol_name_regexp", v.symbol_name_regex.as_ref());
            write_regex(
                &mut out,
                "symbol_name_not_regexp",
                v.symbol_name_not_regex.as_ref(),
            );
            write_scalar(&mut out, "symbol_version", v.symbol_version.as_deref());
            write_regex(
                &mut out,
                "symbol_version_regexp",
                v.symbol_version_regex.as_ref(),
            );
            write_scalar(&mut out, "type_name", v.type_name.as_deref());
            write_regex(&mut out, "type_name_regexp", v.type_name_regex.as_ref());
        }
        Suppression::File(f) => {
            out.push_str("[suppress_file]\n");
            // drops_artifact is derived from the SONAME predicates at
            // parse time, so it is not written.
            write_base(&mut out, &f.base, false);
        }
    }
    out
}

fn write_base(out: &mut String, base: &SuppressionBase, with_drop: bool) {
    write_scalar(out, "label", base.label.as_deref());
    if with_drop && base.drops_artifact {
        write_scalar(out, "drop", Some("yes"));
    }
    write_regex(out, "file_name_regexp", base.file_name_regex.as_ref());
    write_regex(out, "file_name_not_regexp", base.file_name_not_regex.as_ref());
    write_regex(out, "soname_regexp", base.soname_regex.as_ref());
    write_regex(out, "soname_not_regexp", base.soname_not_regex.as_ref());
}

fn write_scalar(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("{name} = {}\n", fmt_scalar(value)));
    }
}

fn write_regex(out: &mut String, name: &str, value: Option<&Regex>) {
    write_scalar(out, name, value.map(Regex::as_str));
}

fn write_list(out: &mut String, name: &str, items: &[&str]) {
    let rendered: Vec<String> = items.iter().map(|i| fmt_scalar(i)).collect();
    out.push_str(&format!("{name} = {{{}}}\n", rendered.join(", ")));
}

/// Quote a scalar whenever the reader would otherwise misinterpret it.
fn fmt_scalar(value: &str) -> String {
    let needs_quoting =
        value.is_empty() || value != value.trim() || value.contains([',', '{', '}', '#', ';']);
    if needs_quoting {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn fmt_offset(offset: &Offset) -> String {
    match offset {
        Offset::Integer(u64::MAX) => "end".to_string(),
        Offset::Integer(v) => v.to_string(),
        Offset::OffsetOf(m) => format!("offset_of({m})"),
        Offset::OffsetAfter(m) => format!("offset_after({m})"),
    }
}

fn fn_change_kind_text(kind: FnChangeKind) -> Option<&'static str> {
    if kind == FnChangeKind::ALL {
        None
    } else if kind == FnChangeKind::SUBTYPE {
        Some("function-subtype-change")
    } else if kind == FnChangeKind::ADDED {
        Some("added-function")
    } else if kind == FnChangeKind::DELETED {
        Some("deleted-function")
    } else {
        None
    }
}

fn var_change_kind_text(kind: VarChangeKind) -> Option<&'static str> {
    if kind == VarChangeKind::ALL {
        None
    } else if kind == VarChangeKind::SUBTYPE {
        Some("variable-subtype-change")
    } else if kind == VarChangeKind::ADDED {
        Some("added-variable")
    } else if kind == VarChangeKind::DELETED {
        Some("deleted-variable")
    } else {
        None
    }
}
