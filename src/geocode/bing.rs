use serde::Deserialize;
use ureq::Agent;

use super::{point, Geocode, Geocoder, ProviderError};

const URL: &str = "https://dev.virtualearth.net/REST/v1/Locations";

/// Bing Maps Locations API. Needs a key, so it only runs as a fallback.
pub struct Bing {
    agent: Agent,
    key: String,
}

impl Bing {
    pub fn new(agent: Agent, key: String) -> Self {
        Self { agent, key }
    }
}

impl Geocoder for Bing {
    fn name(&self) -> &'static str {
        "bing"
    }

    fn geocode(&self, query: &str) -> Result<Option<Geocode>, ProviderError> {
        let response: Response = self
            .agent
            .get(URL)
            .query("q", query)
            .query("maxResults", "1")
            .query("key", &self.key)
            .call()?
            .into_json()?;
        refine(response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    #[serde(default)]
    resource_sets: Vec<ResourceSet>,
}

#[derive(Debug, Deserialize)]
struct ResourceSet {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    name: Option<String>,
    point: Option<RawPoint>,
    address: Option<RawAddress>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    // [lat, lon]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAddress {
    formatted_address: Option<String>,
}

fn refine(response: Response) -> Result<Option<Geocode>, ProviderError> {
    let resource = match response
        .resource_sets
        .into_iter()
        .next()
        .and_then(|x| x.resources.into_iter().next())
    {
        Some(x) => x,
        None => return Ok(None),
    };

    let (lat, lon) = match resource.point.as_ref().map(|x| x.coordinates.as_slice()) {
        Some(&[lat, lon, ..]) => (lat, lon),
        _ => return Ok(None),
    };

    let address = resource
        .address
        .and_then(|x| x.formatted_address)
        .or(resource.name);

    Ok(Some(Geocode {
        point: point(lon, lat)?,
        address,
        provider: "bing",
    }))
}
