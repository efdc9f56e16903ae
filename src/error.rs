use std::path::PathBuf;
use thiserror::Error;

pub type ScrapeResult<T> = Result<T, ScrapeError>;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// A recognized endpoint returned a body missing a mandatory field or
    /// path. Caught at the router; that endpoint's contribution is dropped
    /// and the session continues.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The browser could not be launched or interception could not be set
    /// up. Fatal.
    #[error("browser session failed: {0}")]
    Browser(String),

    /// The target page could not be loaded. Fatal; no output is written.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The snapshot could not be written. Fatal, but the in-memory store is
    /// untouched and remains available to the caller.
    #[error("failed to write snapshot to {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    pub fn missing(path: &str) -> Self {
        Self::MalformedPayload(format!("missing field `{path}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_the_path() {
        let err = ScrapeError::missing("data.user.result");
        assert_eq!(
            err.to_string(),
            "malformed payload: missing field `data.user.result`"
        );
    }
}
