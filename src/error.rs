use thiserror::Error;

/// Reasons a single record cannot be turned into a citation entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// Every word of the title is a stopword, so no key word can be derived.
    #[error("no significant word in title {0:?}")]
    TitleWordNotFound(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

pub type Result<T, E = RecordError> = std::result::Result<T, E>;
