use thiserror::Error;

/// Errors raised while reading a rule-file configuration into an
/// [`ini::Config`](crate::ini::Config) tree.
///
/// Every variant carries the 1-based line number the reader was looking at,
/// so diagnostics can point back into the file.
#[derive(Debug, Error)]
pub enum IniError {
    #[error("line {line}: property found outside of any section")]
    PropertyOutsideSection { line: u32 },

    #[error("line {line}: malformed section heading")]
    MalformedSection { line: u32 },

    #[error("line {line}: unterminated quoted string")]
    UnterminatedQuote { line: u32 },

    #[error("line {line}: unbalanced braces in property value")]
    UnbalancedBraces { line: u32 },

    #[error("line {line}: property has no name")]
    MissingPropertyName { line: u32 },
}

impl IniError {
    /// The 1-based line the error was detected on.
    pub fn line(&self) -> u32 {
        match self {
            IniError::PropertyOutsideSection { line }
            | IniError::MalformedSection { line }
            | IniError::UnterminatedQuote { line }
            | IniError::UnbalancedBraces { line }
            | IniError::MissingPropertyName { line } => *line,
        }
    }
}
