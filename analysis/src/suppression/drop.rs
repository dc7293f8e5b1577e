//! Load-time filtering of candidate IR artifacts.
//!
//! IR builders consult these functions before materializing an artifact:
//! when a rule with `drop = yes` matches the candidate's name or symbol
//! name, the artifact is never added to the IR at all. The same name-only
//! predicates are exposed for callers that merely want to know whether a
//! candidate is suppressed, without requiring the drop property.

use abiscope_core::ir::{SourceLocation, SymbolKind};

use crate::suppression::model::{
    is_private_type_suppression, FileSuppression, FunctionSuppression, Suppression,
    TypeSuppression, VariableSuppression,
};

/// Match a function rule against a qualified function name alone.
///
/// The regex wins when present; otherwise the not-regex; otherwise the
/// exact name. A rule with no name predicate matches nothing here.
pub fn matches_function_name(rule: &FunctionSuppression, name: &str) -> bool {
    if let Some(re) = &rule.name_regex {
        re.is_match(name)
    } else if let Some(re) = &rule.name_not_regex {
        !re.is_match(name)
    } else if let Some(expected) = &rule.name {
        expected == name
    } else {
        false
    }
}

/// Match a function rule against an ELF symbol name alone.
pub fn matches_function_symbol_name(rule: &FunctionSuppression, symbol_name: &str) -> bool {
    if let Some(re) = &rule.symbol_name_regex {
        re.is_match(symbol_name)
    } else if let Some(re) = &rule.symbol_name_not_regex {
        !re.is_match(symbol_name)
    } else if let Some(expected) = &rule.symbol_name {
        expected == symbol_name
    } else {
        false
    }
}

/// Match a variable rule against a qualified variable name alone.
pub fn matches_variable_name(rule: &VariableSuppression, name: &str) -> bool {
    if let Some(re) = &rule.name_regex {
        re.is_match(name)
    } else if let Some(re) = &rule.name_not_regex {
        !re.is_match(name)
    } else if let Some(expected) = &rule.name {
        expected == name
    } else {
        false
    }
}

/// Match a variable rule against an ELF symbol name alone.
pub fn matches_variable_symbol_name(rule: &VariableSuppression, symbol_name: &str) -> bool {
    if let Some(re) = &rule.symbol_name_regex {
        re.is_match(symbol_name)
    } else if let Some(re) = &rule.symbol_name_not_regex {
        !re.is_match(symbol_name)
    } else if let Some(expected) = &rule.symbol_name {
        expected == symbol_name
    } else {
        false
    }
}

/// Whether a candidate function is suppressed by some function rule.
///
/// `name` and `symbol_name` may each be empty when unknown; an empty
/// string is simply not consulted. With `require_drop` only rules carrying
/// `drop = yes` participate, which is the mode IR builders use.
pub fn function_is_suppressed(
    suppressions: &[Suppression],
    name: &str,
    symbol_name: &str,
    require_drop: bool,
) -> bool {
    for rule in suppressions {
        let Some(function_rule) = rule.as_function() else {
            continue;
        };
        if require_drop && !rule.drops_artifact() {
            continue;
        }
        if !name.is_empty() && matches_function_name(function_rule, name) {
            return true;
        }
        if !symbol_name.is_empty() && matches_function_symbol_name(function_rule, symbol_name) {
            return true;
        }
    }
    false
}

/// Whether a candidate variable is suppressed by some variable rule.
pub fn variable_is_suppressed(
    suppressions: &[Suppression],
    name: &str,
    symbol_name: &str,
    require_drop: bool,
) -> bool {
    for rule in suppressions {
        let Some(variable_rule) = rule.as_variable() else {
            continue;
        };
        if require_drop && !rule.drops_artifact() {
            continue;
        }
        if !name.is_empty() && matches_variable_name(variable_rule, name) {
            return true;
        }
        if !symbol_name.is_empty() && matches_variable_symbol_name(variable_rule, symbol_name) {
            return true;
        }
    }
    false
}

/// Whether a bare ELF symbol (no declaration yet) is suppressed, by
/// dispatching on the symbol's own kind.
pub fn elf_symbol_is_suppressed(
    suppressions: &[Suppression],
    symbol_name: &str,
    kind: SymbolKind,
    require_drop: bool,
) -> bool {
    match kind {
        SymbolKind::Function => function_is_suppressed(suppressions, "", symbol_name, require_drop),
        SymbolKind::Variable => variable_is_suppressed(suppressions, "", symbol_name, require_drop),
    }
}

/// Whether a candidate type is suppressed by some type rule.
///
/// Returns the verdict plus a privacy hint: true when the matching rule is
/// an auto-generated private-types rule, so the loader can record the type
/// as private rather than merely absent.
pub fn type_is_suppressed(
    suppressions: &[Suppression],
    type_name: &str,
    location: Option<&SourceLocation>,
    require_drop: bool,
) -> (bool, bool) {
    for rule in suppressions {
        let Some(type_rule) = rule.as_type() else {
            continue;
        };
        if require_drop && !rule.drops_artifact() {
            continue;
        }
        if matches_type_name_and_location(type_rule, type_name, location) {
            return (true, is_private_type_suppression(type_rule));
        }
    }
    (false, false)
}

fn matches_type_name_and_location(
    rule: &TypeSuppression,
    type_name: &str,
    location: Option<&SourceLocation>,
) -> bool {
    rule.matches_type_name(type_name) && rule.matches_location(location)
}

/// The first file rule refusing to load `file_path`, if any.
pub fn file_is_suppressed<'a>(
    suppressions: &'a [Suppression],
    file_path: &str,
) -> Option<&'a FileSuppression> {
    suppressions
        .iter()
        .filter_map(Suppression::as_file)
        .find(|rule| rule.suppresses_file(file_path))
}
