//! Clustering method selection and classifier registry
//!
//! The classifier variant is chosen once, at startup, from an explicit
//! [`ClusteringMethod`] and then injected into the engine.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::ClusterClassifier;
use crate::error::ConfigError;

/// Time-series clustering method a classifier was trained for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ClusteringMethod {
    /// k-means under soft-DTW
    #[serde(rename = "sdtw_km")]
    #[value(name = "sdtw_km")]
    SoftDtwKMeans,
    /// k-means with DTW barycenter averaging
    #[serde(rename = "dba_km")]
    #[value(name = "dba_km")]
    DbaKMeans,
    /// Euclidean k-means
    #[serde(rename = "km")]
    #[value(name = "km")]
    #[default]
    KMeans,
    /// Kernel k-means with the global alignment kernel
    #[serde(rename = "gak_km")]
    #[value(name = "gak_km")]
    GakKMeans,
    /// k-Shape
    #[serde(rename = "ks")]
    #[value(name = "ks")]
    KShape,
}

impl ClusteringMethod {
    pub const ALL: [ClusteringMethod; 5] = [
        ClusteringMethod::SoftDtwKMeans,
        ClusteringMethod::DbaKMeans,
        ClusteringMethod::KMeans,
        ClusteringMethod::GakKMeans,
        ClusteringMethod::KShape,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ClusteringMethod::SoftDtwKMeans => "sdtw_km",
            ClusteringMethod::DbaKMeans => "dba_km",
            ClusteringMethod::KMeans => "km",
            ClusteringMethod::GakKMeans => "gak_km",
            ClusteringMethod::KShape => "ks",
        }
    }
}

impl fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ClusteringMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClusteringMethod::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| ConfigError::UnknownClusteringMethod(s.to_string()))
    }
}

/// Classifiers keyed by the clustering method they were trained for
#[derive(Default)]
pub struct ClassifierRegistry {
    classifiers: HashMap<ClusteringMethod, Box<dyn ClusterClassifier>>,
}

impl ClassifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method: ClusteringMethod, classifier: Box<dyn ClusterClassifier>) {
        self.classifiers.insert(method, classifier);
    }

    pub fn with(mut self, method: ClusteringMethod, classifier: Box<dyn ClusterClassifier>) -> Self {
        self.register(method, classifier);
        self
    }

    pub fn contains(&self, method: ClusteringMethod) -> bool {
        self.classifiers.contains_key(&method)
    }

    /// Take the classifier for `method`, consuming the registry
    pub fn resolve(mut self, method: ClusteringMethod) -> Result<Box<dyn ClusterClassifier>, ConfigError> {
        self.classifiers
            .remove(&method)
            .ok_or_else(|| ConfigError::UnknownClassifier(method.to_string()))
    }
}
