use geo::Point;
use serde::{Deserialize, Serialize};

use crate::address::NormalizedAddress;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    r#type: CollectionType,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
enum CollectionType {
    #[default]
    FeatureCollection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
enum FeatureType {
    #[default]
    Feature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFeature")]
pub struct Feature {
    #[serde(default)]
    r#type: FeatureType,
    // position of the record in the batch that first resolved it
    pub id: usize,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    pub fn new(id: usize, point: Point, properties: Properties) -> Self {
        Self {
            r#type: FeatureType::Feature,
            id,
            geometry: Geometry::from(point),
            properties,
        }
    }

    pub fn point(&self) -> Point {
        self.geometry.point()
    }
}

// Older stores keep the id inside properties and spell the name `Name`.
#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    r#type: FeatureType,
    id: Option<usize>,
    geometry: Geometry,
    properties: RawProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperties {
    id: Option<usize>,
    #[serde(alias = "Name")]
    name: String,
    address: String,
    #[serde(default)]
    customer_type: String,
}

impl From<RawFeature> for Feature {
    fn from(raw: RawFeature) -> Self {
        let RawFeature {
            r#type,
            id,
            geometry,
            properties,
        } = raw;
        Self {
            r#type,
            id: id.or(properties.id).unwrap_or_default(),
            geometry,
            properties: Properties {
                name: properties.name,
                address: properties.address,
                customer_type: properties.customer_type,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// `[lon, lat]`
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    pub fn point(&self) -> Point {
        match self {
            Self::Point { coordinates: [x, y] } => Point::new(*x, *y),
        }
    }
}

impl From<Point> for Geometry {
    fn from(point: Point) -> Self {
        let (x, y) = point.x_y();
        Self::Point { coordinates: [x, y] }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub customer_type: String,
}

impl Properties {
    pub fn new(name: &str, address: &NormalizedAddress, customer_type: &str) -> Self {
        Self {
            name: crate::address::unescape(name).to_lowercase(),
            address: address.to_string(),
            customer_type: crate::address::unescape(customer_type),
        }
    }
}
