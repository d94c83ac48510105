use std::io;

pub use self::categories::Categories;
use crate::utils::transport_message;

pub mod api;
mod categories;
pub mod csv;

/// One input row, whichever source it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub customer_name: String,
    pub raw_address: Option<String>,
    pub customer_type: String,
}

impl Record {
    pub fn new(customer_name: &str, raw_address: Option<&str>, customer_type: &str) -> Self {
        Self {
            customer_name: customer_name.to_string(),
            raw_address: raw_address.map(str::to_string),
            customer_type: customer_type.to_string(),
        }
    }
}

/// Failures reading records. Any of these aborts the run before geocoding.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("invalid JSON: {0}")]
    Decode(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] ::csv::Error),

    #[error("no {0:?} column")]
    MissingColumn(&'static str),
}

impl From<ureq::Error> for SourceError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(x) => Self::Http(transport_message(&x)),
        }
    }
}

/// Lower-cased alphanumerics only, so `Zip Code`, `zip_code` and `ZIP-CODE` agree.
pub(crate) fn fold_key(raw: &str) -> String {
    raw.chars()
        .filter(|x| x.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
