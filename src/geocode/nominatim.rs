use std::{
    cell::Cell,
    collections::BTreeMap,
    thread,
    time::{Duration, Instant},
};

use serde::Deserialize;
use ureq::Agent;

use super::{parse_number, point, Geocode, Geocoder, ProviderError};

const URL: &str = "https://nominatim.openstreetmap.org/search";

// usage policy allows one request per second
const MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// OpenStreetMap Nominatim. Free, no key, rate limited.
pub struct Nominatim {
    agent: Agent,
    email: Option<String>,
    countrycodes: Option<String>,
    last: Cell<Option<Instant>>,
}

impl Nominatim {
    pub fn new(agent: Agent, email: Option<String>, countrycodes: Option<String>) -> Self {
        Self {
            agent,
            email,
            countrycodes,
            last: Cell::new(None),
        }
    }

    fn throttle(&self) {
        if let Some(last) = self.last.get() {
            let elapsed = last.elapsed();
            if elapsed < MIN_INTERVAL {
                thread::sleep(MIN_INTERVAL - elapsed);
            }
        }
        self.last.set(Some(Instant::now()));
    }
}

impl Geocoder for Nominatim {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    fn geocode(&self, query: &str) -> Result<Option<Geocode>, ProviderError> {
        self.throttle();

        let mut request = self
            .agent
            .get(URL)
            .query("format", "json")
            .query("limit", "1")
            .query("addressdetails", "1")
            .query("q", query);
        if let Some(x) = &self.countrycodes {
            request = request.query("countrycodes", x);
        }
        if let Some(x) = &self.email {
            request = request.query("email", x);
        }

        let places: Vec<Place> = request.call()?.into_json()?;
        refine(places)
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: BTreeMap<String, String>,
}

fn refine(places: Vec<Place>) -> Result<Option<Geocode>, ProviderError> {
    let place = match places.into_iter().next() {
        Some(x) => x,
        None => return Ok(None),
    };

    let point = point(parse_number(&place.lon)?, parse_number(&place.lat)?)?;

    // display_name spells states out ("Pennsylvania"), append the postal code
    // so region codes can match
    let mut address = place.display_name;
    if let Some(code) = place
        .address
        .get("ISO3166-2-lvl4")
        .and_then(|x| x.split_once('-'))
        .map(|(_, x)| x)
    {
        address.push_str(", ");
        address.push_str(code);
    }

    Ok(Some(Geocode {
        point,
        address: Some(address),
        provider: "nominatim",
    }))
}
