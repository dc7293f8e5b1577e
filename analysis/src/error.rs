use thiserror::Error;

/// Errors raised while reading suppression rules from disk or text.
///
/// Matching never fails: `suppresses_diff` and the file matchers are total
/// functions. Only the configuration read path can error out, and even
/// there a structurally bad *section* is skipped with a diagnostic rather
/// than raised; these variants cover failures of the stream itself.
#[derive(Debug, Error)]
pub enum SuppressionError {
    #[error("failed to read rule file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed rule text: {0}")]
    Ini(#[from] abiscope_core::IniError),
}
