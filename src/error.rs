//! error taxonomy shared by loader, store and reporter

use thiserror::Error;

pub type Result<T, E = SummitError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SummitError
{
    /// malformed or missing field in the ingestion source
    #[error("parse error in {location}, field `{field}`: {reason}")]
    Parse
    {
        location : String,
        field    : String,
        reason   : String,
    },

    /// source document isn't a JSON array of records
    #[error("invalid source document: {0}")]
    Json(#[from] serde_json::Error),

    /// extremal query ran against a table w/o rows
    #[error("no {0} found in the database")]
    NotFound(&'static str),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("table {table} failed integrity check")]
    Schema { table : &'static str },

    #[error("invalid format string: {0}")]
    Format(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl SummitError
{
    pub fn parse(
        location : impl Into<String>,
        field    : impl Into<String>,
        reason   : impl Into<String>,
        ) -> Self
    {
        SummitError::Parse {
            location : location.into(),
            field    : field.into(),
            reason   : reason.into(),
        }
    }
}
