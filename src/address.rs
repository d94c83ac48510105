use std::fmt;

/// Canonical form of a postal address, used as the only dedup key.
///
/// Built by decoding HTML entities and then lower-casing. Addresses read back
/// from the store go through the same function so both sides always agree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedAddress(String);

impl NormalizedAddress {
    pub fn new(raw: &str) -> Self {
        Self(html_escape::decode_html_entities(raw).to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize(raw: &str) -> NormalizedAddress {
    NormalizedAddress::new(raw)
}

/// Decodes entities without folding case, for names and categories.
pub fn unescape(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}
