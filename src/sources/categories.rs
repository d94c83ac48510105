use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};

use super::fold_key;

const DEFAULT_CATEGORY: &str = "Retail";

const DEFAULTS: &[(&str, &[&str])] = &[
    ("On Premise", &["on premise", "on prem", "onp"]),
    (
        "Retail",
        &["off premise", "off prem", "retail", "package store", "convenience", "c-store"],
    ),
    ("Home-D", &["home d", "home delivery"]),
    ("Restaurant", &["restaurant", "dining"]),
    ("Bar", &["bar", "tavern", "pub", "brewpub"]),
    ("Grocery", &["grocery", "supermarket"]),
    ("Six Pack Shop", &["six pack shop", "6 pack shop", "bottle shop"]),
];

/// Maps the many spellings of a market type to the categories the map styles.
pub struct Categories {
    table: BTreeMap<String, String>,
}

impl Default for Categories {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        for (category, names) in DEFAULTS {
            for name in *names {
                table.insert(fold_key(name), category.to_string());
            }
        }
        Self { table }
    }
}

impl Categories {
    /// Reads `category: [market type, ...]` pairs over the built-in table.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_yaml::from_str(
            &fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        )
        .with_context(|| format!("Failed to parse {}", path.display()))?;

        let mut categories = Self::default();
        for (category, names) in raw {
            for name in names {
                categories.table.insert(fold_key(&name), category.clone());
            }
        }
        Ok(categories)
    }

    /// Unknown types pass through, blanks count as retail.
    pub fn categorize(&self, market: &str) -> String {
        let market = market.trim();
        if market.is_empty() {
            return DEFAULT_CATEGORY.to_string();
        }
        match self.table.get(&fold_key(market)) {
            Some(x) => x.clone(),
            None => market.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spellings() {
        let categories = Categories::default();
        assert_eq!(categories.categorize("ON-PREMISE"), "On Premise");
        assert_eq!(categories.categorize("Off Premise"), "Retail");
        assert_eq!(categories.categorize("home_d"), "Home-D");
        assert_eq!(categories.categorize(" Tavern "), "Bar");
    }

    #[test]
    fn fallbacks() {
        let categories = Categories::default();
        assert_eq!(categories.categorize(""), "Retail");
        assert_eq!(categories.categorize("Stadium"), "Stadium");
    }

    #[test]
    fn load_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.yaml");
        fs::write(&path, "Bar:\n  - Stadium\nGrocery: [Pub]\n").unwrap();

        let categories = Categories::load(&path).unwrap();
        assert_eq!(categories.categorize("stadium"), "Bar");
        assert_eq!(categories.categorize("pub"), "Grocery");
        assert_eq!(categories.categorize("restaurant"), "Restaurant");
    }
}
