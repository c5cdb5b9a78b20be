//! Error types for the sp_drive crate.

use thiserror::Error;

/// Errors that can occur when working with a SharePoint document library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("security policy violation: {0}")]
    SecurityPolicy(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} was not found")]
    NotFound(String),

    #[error("'{0}' already exists on the drive; pass overwrite = true to replace it")]
    Conflict(String),

    #[error("folder '{0}' does not exist on the drive")]
    MissingFolder(String),

    #[error("transfer failed for '{path}'")]
    Transfer {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to decode '{path}'")]
    Decode {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to encode '{path}'")]
    Encode {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Graph API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook read error: {0}")]
    WorkbookRead(#[from] calamine::Error),

    #[error("workbook write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("object archive error: {0}")]
    Archive(#[from] bincode::Error),
}

impl Error {
    pub(crate) fn transfer(path: &str, source: Error) -> Self {
        Error::Transfer {
            path: path.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn decode(path: &str, source: Error) -> Self {
        Error::Decode {
            path: path.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn encode(path: &str, source: Error) -> Self {
        Error::Encode {
            path: path.to_string(),
            source: Box::new(source),
        }
    }
}

/// Result type alias for sp_drive operations.
pub type Result<T> = std::result::Result<T, Error>;
