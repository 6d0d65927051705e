//! Ingestion inputs: point and line features with free-form attributes

use serde::{Deserialize, Serialize};

use crate::shared::Point;

/// Attribute table row (pass-through, plus the classification fields)
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Structure location with attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub id: u64,
    pub location: Point,
    #[serde(default)]
    pub attributes: Attributes,
}

impl PointFeature {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            location: Point::new(x, y),
            attributes: Attributes::new(),
        }
    }

    /// Builder: set one attribute
    pub fn with_attribute(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// Conduit vertex sequence with attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub id: u64,
    pub vertices: Vec<Point>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl LineFeature {
    pub fn new(id: u64, vertices: Vec<Point>) -> Self {
        Self {
            id,
            vertices,
            attributes: Attributes::new(),
        }
    }

    /// Two-vertex conduit
    pub fn segment(id: u64, from: (f64, f64), to: (f64, f64)) -> Self {
        Self::new(id, vec![from.into(), to.into()])
    }

    /// Builder: set one attribute
    pub fn with_attribute(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// Features plus the reference system they are expressed in
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureSet<F> {
    pub crs: Option<String>,
    pub features: Vec<F>,
}

impl<F> FeatureSet<F> {
    pub fn new(features: Vec<F>) -> Self {
        Self {
            crs: None,
            features,
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
