use thiserror::Error;

/// Returned when the requested field list does not ask for `score`.
pub const SCORE_NOT_IN_FIELD_LIST: &str =
    "No score was found in the result, is 'score' in the field list?";

/// Returned when a hit carries no `_store` value.
pub const NO_STORE_VALUE: &str = "The document doesn't contain a _store field";

/// Prefix of the message returned when a `_store` value can't be decoded.
/// The offending payload is appended verbatim.
pub const UNMARSHALLING_STORE_FAILED: &str = "Unmarshalling the _store field failed: ";

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", SCORE_NOT_IN_FIELD_LIST)]
    ScoreFieldMissing,

    #[error("{}", NO_STORE_VALUE)]
    StoreFieldMissing { id: String },

    #[error("{}{}", UNMARSHALLING_STORE_FAILED, payload)]
    StoreDecodeFailed { payload: String, reason: String },

    #[error("Unsupported entity type: {0}")]
    UnsupportedEntityType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Rendering the response failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Request-time failures are caused by the request or by the indexed
    /// data; everything else is a setup or transport fault.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::ScoreFieldMissing | Error::StoreFieldMissing { .. } | Error::StoreDecodeFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
