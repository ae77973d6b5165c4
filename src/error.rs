//! Error type shared by configuration loading, the gallery tooling and the
//! browser backend.
//!
//! The UI controllers themselves never return errors: a missing element is
//! a no-op and bad input is reported to the visitor on the page.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    /// Reading or writing a file failed
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Site configuration could not be parsed
    #[error("invalid site configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// Manifest or field set (de)serialization failed
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The gallery page has no `adminGallery` grid to regenerate
    #[error("gallery grid `{0}` not found in page")]
    GalleryGridMissing(String),

    /// A browser API call failed
    #[error("dom: {0}")]
    Dom(String),
}

impl SiteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
