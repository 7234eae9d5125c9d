use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Every failure the library can surface.
///
/// - `Config`      — bad architecture or hyperparameters (unknown activation,
///                   list length mismatch, zero widths, bad learning rate)
/// - `Data`        — dataset unreadable, empty, or malformed
/// - `Dimension`   — a vector's length does not match the network or the
///                   stored normalization vectors
/// - `Persistence` — a model record is unreadable, corrupt, or incomplete
#[derive(Debug, Error)]
pub enum NetError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("data error: {0}")]
    Data(String),

    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    Dimension {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl NetError {
    /// Shorthand for building a `Dimension` error.
    pub fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> NetError {
        NetError::Dimension {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Fails with `Dimension` unless `actual == expected`.
    pub fn check_len(context: &str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(NetError::dimension(context, expected, actual))
        }
    }
}
