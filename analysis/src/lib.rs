//! abiscope-analysis: the suppression engine
//!
//! This crate decides, for every candidate ABI change and for every
//! candidate IR artifact at load time, whether it must be withheld from
//! the report or from the IR itself. Decisions are driven entirely by
//! declarative suppression rules read from rule files; no ABI policy is
//! hard-coded.
//!
//! # Example
//!
//! ```ignore
//! use abiscope_analysis::suppression::read_suppressions_str;
//!
//! let outcome = read_suppressions_str(
//!     "[suppress_type]\nname_regexp = ^std::.*\n",
//! )?;
//! for rule in &outcome.suppressions {
//!     if rule.suppresses_diff(&node, Some(&ctx)) {
//!         // withhold the node from the report
//!     }
//! }
//! ```

pub mod error;
pub mod regexes;
pub mod suppression;

pub use error::SuppressionError;
pub use suppression::{
    read_suppressions, read_suppressions_file, read_suppressions_str, Diagnostic, DiagnosticKind,
    ParseOutcome, Suppression,
};
