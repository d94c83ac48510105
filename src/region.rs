/// Coarse acceptance check on the provider's resolved address text.
///
/// A geocode is kept only when the region code appears somewhere in that
/// text. This is a substring match, not a geofence.
#[derive(Clone, Debug)]
pub struct RegionFilter {
    code: String,
}

impl RegionFilter {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_string(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn accept(&self, resolved: &str) -> bool {
        accept(resolved, &self.code)
    }
}

pub fn accept(resolved: &str, region: &str) -> bool {
    resolved.contains(region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_match() {
        let filter = RegionFilter::new("PA");
        assert!(filter.accept("100 Oak St, Erie, PA 16501"));
        assert!(!filter.accept("100 Oak St, Albany, NY 12203"));
    }

    #[test]
    fn case_sensitive() {
        assert!(!accept("100 oak st, erie, pa 16501", "PA"));
    }

    #[test]
    fn code_is_trimmed() {
        assert_eq!(RegionFilter::new(" OH\n").code(), "OH");
    }
}
