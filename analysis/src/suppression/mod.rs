//! Declarative suppression of ABI change reports.
//!
//! A rule file is a sequence of INI-like sections, each describing one
//! suppression rule:
//!
//! ```text
//! [suppress_type]
//! name_regexp = ^std::.*
//! source_location_not_in = foo.h
//!
//! [suppress_function]
//! change_kind = added-function
//! symbol_name_regexp = ^_ZN3foo.*
//! ```
//!
//! Rules come in four kinds — type, function, variable, file — sharing a
//! base of binary-scope predicates (file name and SONAME regexes). They are
//! consulted at two points:
//!
//! - **Diff time**: every node of the comparison graph is tested against
//!   every rule; a node is withheld from the report if any rule matches.
//! - **Load time**: rules carrying `drop = yes` prevent the matched
//!   artifacts from being materialized in the IR at all.

mod drop;
mod matcher;
mod model;
mod offsets;
mod parser;
mod whitelist;

pub use drop::{
    elf_symbol_is_suppressed, file_is_suppressed, function_is_suppressed,
    matches_function_name, matches_function_symbol_name, matches_variable_name,
    matches_variable_symbol_name, type_is_suppressed, variable_is_suppressed,
};
pub use model::{
    is_private_type_suppression, FileSuppression, FnChangeKind, FunctionSuppression,
    InsertionRange, Offset, ParameterSpec, ReachKind, Suppression, SuppressionBase,
    TypeKindSpec, TypeSuppression, VarChangeKind, VariableSuppression,
    PRIVATE_TYPES_SUPPR_LABEL,
};
pub use offsets::{eval_offset, is_end_boundary};
pub use parser::{
    read_suppressions, read_suppressions_file, read_suppressions_str, write_suppression_ini,
    Diagnostic, DiagnosticKind, ParseOutcome,
};
pub use whitelist::{
    suppressions_from_symbol_whitelists, suppressions_from_symbols, WHITELIST_SUPPR_LABEL,
};
