//! Synthesis of suppression rules from symbol whitelists.
//!
//! A whitelist file names the symbols that constitute a stable interface,
//! one bare symbol name per line under an arbitrary `[section]` heading:
//!
//! ```text
//! [stable_interface]
//! clk_enable
//! clk_disable
//! ```
//!
//! Everything *not* on the whitelist is irrelevant to the interface, so
//! the generated rules drop any function or variable whose ELF symbol
//! name falls outside the set.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use regex::Regex;

use abiscope_core::ini::parse_config;

use crate::error::SuppressionError;
use crate::regexes::pattern_from_strings;
use crate::suppression::model::{FunctionSuppression, Suppression, VariableSuppression};

/// Label shared by the function/variable rule pair generated from
/// whitelists.
pub const WHITELIST_SUPPR_LABEL: &str = "Whitelisted symbols suppression rule";

/// Build the rule pair that keeps exactly `symbols` and drops everything
/// else.
///
/// Returns an empty set of rules when `symbols` is empty: no whitelist
/// means no filtering, not "drop everything".
pub fn suppressions_from_symbols(symbols: &BTreeSet<String>) -> Vec<Suppression> {
    if symbols.is_empty() {
        return Vec::new();
    }

    let names: Vec<&str> = symbols.iter().map(String::as_str).collect();
    let pattern = pattern_from_strings(&names);
    // The pattern is built from escaped literals, so it always compiles.
    let keep = Regex::new(&pattern).expect("membership pattern compiles");

    let mut function = FunctionSuppression::default();
    function.base.label = Some(WHITELIST_SUPPR_LABEL.to_string());
    function.base.drops_artifact = true;
    function.base.is_artificial = true;
    function.symbol_name_not_regex = Some(keep.clone());

    let mut variable = VariableSuppression::default();
    variable.base.label = Some(WHITELIST_SUPPR_LABEL.to_string());
    variable.base.drops_artifact = true;
    variable.base.is_artificial = true;
    variable.symbol_name_not_regex = Some(keep);

    vec![
        Suppression::Function(function),
        Suppression::Variable(variable),
    ]
}

/// Read whitelist files and build the corresponding rule pair.
///
/// Symbols from all files and all sections are merged and de-duplicated.
pub fn suppressions_from_symbol_whitelists<P: AsRef<Path>>(
    paths: &[P],
) -> Result<Vec<Suppression>, SuppressionError> {
    let mut symbols = BTreeSet::new();

    for path in paths {
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

        for section in &config.sections {
            for prop in &section.properties {
                symbols.insert(prop.name.clone());
            }
        }
    }

    Ok(suppressions_from_symbols(&symbols))
}
