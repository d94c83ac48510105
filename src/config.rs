use std::{path::PathBuf, time::Duration};

use clap::Args;

use crate::region::RegionFilter;

/// Options shared by every source.
#[derive(Clone, Debug, Args)]
pub struct Options {
    /// Feature collection to merge into
    #[arg(long, env = "LOCATIONS_STORE", default_value = "processed_geo_data.json")]
    pub store: PathBuf,

    /// Only keep geocodes whose resolved address mentions this region code (e.g. PA)
    #[arg(long, env = "LOCATIONS_REGION")]
    pub region: Option<String>,

    /// Bing Maps key, enables Bing as a fallback provider
    #[arg(long, env = "BING_MAPS_API_KEY", hide_env_values = true)]
    pub bing_key: Option<String>,

    /// Contact address sent to Nominatim
    #[arg(long, env = "LOCATIONS_EMAIL")]
    pub email: Option<String>,

    /// Comma separated ISO 3166-1 codes Nominatim is limited to
    #[arg(long, default_value = "us")]
    pub countrycodes: String,

    /// Per request timeout, in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Resolve everything but leave the store untouched
    #[arg(long)]
    pub dry_run: bool,
}

/// Settings the provider chain and engine are built from.
#[derive(Clone, Debug)]
pub struct Config {
    pub timeout: Duration,
    pub email: Option<String>,
    pub countrycodes: Option<String>,
    pub bing_key: Option<String>,
    pub region: Option<RegionFilter>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            email: None,
            countrycodes: Some("us".to_string()),
            bing_key: None,
            region: None,
        }
    }
}

impl From<&Options> for Config {
    fn from(options: &Options) -> Self {
        Self {
            timeout: Duration::from_secs(options.timeout),
            email: non_empty(&options.email),
            countrycodes: non_empty(&Some(options.countrycodes.clone())),
            bing_key: non_empty(&options.bing_key),
            region: non_empty(&options.region).map(|x| RegionFilter::new(&x)),
        }
    }
}

// an exported-but-blank variable counts as unset
fn non_empty(x: &Option<String>) -> Option<String> {
    x.as_deref()
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_string)
}
