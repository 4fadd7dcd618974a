/// Shared error type used across all Recap crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// A message index or index range outside the chat log (or inverted).
    #[error("range: {0}")]
    Range(String),

    /// A structurally valid range with nothing summarizable inside it.
    #[error("range {start}..={end} contains no visible messages")]
    EmptyRange { start: usize, end: usize },

    /// An invalid parameter value (e.g. an auto-fill interval below 5).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The external text generator is unavailable, misconfigured, or failed.
    #[error("generation: {0}")]
    Generation(String),

    /// The persisted-memory substrate is unreachable or malformed.
    #[error("storage: {0}")]
    Storage(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Range check helper: `Ok(())` when `index < len`.
    pub fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Error::Range(format!(
                "index {index} out of range (chat has {len} messages)"
            )))
        }
    }

    /// Range check helper for an inclusive `start..=end` range.
    pub fn check_range(start: usize, end: usize, len: usize) -> Result<()> {
        if start > end {
            return Err(Error::Range(format!("range start {start} after end {end}")));
        }
        Self::check_index(end, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_index_in_bounds() {
        assert!(Error::check_index(4, 5).is_ok());
    }

    #[test]
    fn check_index_out_of_bounds() {
        let err = Error::check_index(5, 5).unwrap_err();
        assert!(matches!(err, Error::Range(_)));
    }

    #[test]
    fn check_range_rejects_inverted() {
        assert!(Error::check_range(3, 2, 10).is_err());
        assert!(Error::check_range(2, 3, 10).is_ok());
    }
}
