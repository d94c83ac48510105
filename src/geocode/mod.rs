use std::io;

use geo::Point;
use tracing::{debug, warn};

use crate::{
    address::NormalizedAddress,
    config::Config,
    utils::{agent, transport_message},
};

pub use self::{bing::Bing, nominatim::Nominatim};

mod bing;
mod nominatim;

/// A successful provider answer.
#[derive(Clone, Debug, PartialEq)]
pub struct Geocode {
    pub point: Point,
    /// Address text as the provider understood it, used by the region filter.
    pub address: Option<String>,
    pub provider: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Decode(#[from] io::Error),

    #[error("invalid number: {0:?}")]
    Number(String),

    #[error("coordinate out of range: {lon}, {lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },
}

impl From<ureq::Error> for ProviderError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(x) => Self::Transport(transport_message(&x)),
        }
    }
}

/// One geocoding backend. `Ok(None)` means the provider had no match.
pub trait Geocoder {
    fn name(&self) -> &'static str;

    fn geocode(&self, query: &str) -> Result<Option<Geocode>, ProviderError>;
}

/// Providers in priority order. The next one is tried only when the current
/// one errors or finds nothing.
pub struct ProviderChain {
    providers: Vec<Box<dyn Geocoder>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn Geocoder>>) -> Self {
        Self { providers }
    }

    /// Free provider first, keyed provider only when a key is configured.
    pub fn from_config(config: &Config) -> Self {
        let agent = agent(config.timeout);
        let mut providers: Vec<Box<dyn Geocoder>> = vec![Box::new(Nominatim::new(
            agent.clone(),
            config.email.clone(),
            config.countrycodes.clone(),
        ))];
        match &config.bing_key {
            Some(key) => providers.push(Box::new(Bing::new(agent, key.clone()))),
            None => debug!("no Bing key configured, using Nominatim only"),
        }
        Self::new(providers)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|x| x.name()).collect()
    }

    pub fn resolve(&self, address: &NormalizedAddress, customer: &str) -> Option<Geocode> {
        let query = query(address, customer);
        for provider in &self.providers {
            debug!("{}: {query}", provider.name());
            match provider.geocode(&query) {
                Ok(Some(x)) => return Some(x),
                Ok(None) => debug!("{} found nothing for {query:?}", provider.name()),
                Err(e) => warn!("{} failed for {query:?}: {e}", provider.name()),
            }
        }
        None
    }
}

/// The customer name goes first so chain locations sharing a street address
/// resolve to the right storefront.
pub fn query(address: &NormalizedAddress, customer: &str) -> String {
    let customer = customer.trim();
    if customer.is_empty() {
        address.to_string()
    } else {
        format!("{customer}, {address}")
    }
}

pub(crate) fn point(lon: f64, lat: f64) -> Result<Point, ProviderError> {
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(ProviderError::InvalidCoordinate { lon, lat });
    }
    Ok(Point::new(lon, lat))
}

pub(crate) fn parse_number(raw: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse()
        .map_err(|_| ProviderError::Number(raw.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

    use super::*;
    use crate::address::normalize;

    /// Replays canned answers and records every query it receives.
    pub struct Scripted {
        pub name: &'static str,
        pub answers: RefCell<VecDeque<Result<Option<Geocode>, ProviderError>>>,
        pub calls: Rc<RefCell<Vec<String>>>,
    }

    impl Scripted {
        pub fn new(
            name: &'static str,
            answers: Vec<Result<Option<Geocode>, ProviderError>>,
        ) -> (Self, Rc<RefCell<Vec<String>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let x = Self {
                name,
                answers: RefCell::new(answers.into()),
                calls: calls.clone(),
            };
            (x, calls)
        }
    }

    impl Geocoder for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn geocode(&self, query: &str) -> Result<Option<Geocode>, ProviderError> {
            self.calls.borrow_mut().push(query.to_string());
            self.answers.borrow_mut().pop_front().unwrap_or(Ok(None))
        }
    }

    pub fn chain_of(providers: Vec<Scripted>) -> ProviderChain {
        ProviderChain::new(
            providers
                .into_iter()
                .map(|x| Box::new(x) as Box<dyn Geocoder>)
                .collect(),
        )
    }

    pub fn found(lon: f64, lat: f64, address: &str) -> Result<Option<Geocode>, ProviderError> {
        Ok(Some(Geocode {
            point: Point::new(lon, lat),
            address: Some(address.to_string()),
            provider: "scripted",
        }))
    }

    #[test]
    fn query_format() {
        let address = normalize("100 Oak St, Erie, PA");
        assert_eq!(query(&address, "Joe's"), "Joe's, 100 oak st, erie, pa");
        assert_eq!(query(&address, "  "), "100 oak st, erie, pa");
    }

    #[test]
    fn first_success_stops() {
        let (a, a_calls) = Scripted::new("a", vec![found(1.0, 2.0, "x")]);
        let (b, b_calls) = Scripted::new("b", vec![found(3.0, 4.0, "y")]);
        let chain = chain_of(vec![a, b]);

        let result = chain.resolve(&normalize("1 main st"), "c").unwrap();
        assert_eq!(result.point, Point::new(1.0, 2.0));
        assert_eq!(a_calls.borrow().len(), 1);
        assert!(b_calls.borrow().is_empty());
    }

    #[test]
    fn falls_back_with_same_query() {
        let (a, a_calls) = Scripted::new("a", vec![Err(ProviderError::Status(503))]);
        let (b, b_calls) = Scripted::new("b", vec![found(3.0, 4.0, "y")]);
        let chain = chain_of(vec![a, b]);

        let result = chain.resolve(&normalize("1 Main St"), "c").unwrap();
        assert_eq!(result.point, Point::new(3.0, 4.0));
        assert_eq!(*a_calls.borrow(), vec!["c, 1 main st"]);
        assert_eq!(*a_calls.borrow(), *b_calls.borrow());
    }

    #[test]
    fn no_result_also_falls_back() {
        let (a, _) = Scripted::new("a", vec![Ok(None)]);
        let (b, b_calls) = Scripted::new("b", vec![found(3.0, 4.0, "y")]);
        let chain = chain_of(vec![a, b]);
        assert!(chain.resolve(&normalize("1 main st"), "c").is_some());
        assert_eq!(b_calls.borrow().len(), 1);
    }

    #[test]
    fn all_fail() {
        let (a, _) = Scripted::new("a", vec![Err(ProviderError::Transport("timed out".into()))]);
        let (b, _) = Scripted::new("b", vec![Ok(None)]);
        let chain = chain_of(vec![a, b]);
        assert!(chain.resolve(&normalize("1 main st"), "c").is_none());
    }

    #[test]
    fn bing_only_with_key() {
        let mut config = Config::default();
        assert_eq!(ProviderChain::from_config(&config).names(), vec!["nominatim"]);
        config.bing_key = Some("k".to_string());
        assert_eq!(
            ProviderChain::from_config(&config).names(),
            vec!["nominatim", "bing"]
        );
    }

    #[test]
    fn transport_error_hides_key() {
        let e = agent(Duration::from_secs(2))
            .get("http://127.0.0.1:9/REST/v1/Locations")
            .query("q", "x")
            .query("key", "SECRETKEY123")
            .call()
            .unwrap_err();
        let e = ProviderError::from(e);
        assert!(matches!(e, ProviderError::Transport(_)));
        assert!(!format!("bing failed for \"x\": {e}").contains("SECRETKEY123"));
    }

    #[test]
    fn coordinate_range() {
        assert!(point(-80.0, 42.0).is_ok());
        assert!(point(42.0, -180.0).is_err());
        assert!(point(f64::NAN, 0.0).is_err());
        assert!(parse_number("nope").is_err());
        assert_eq!(parse_number(" 42.5").unwrap(), 42.5);
    }
}
