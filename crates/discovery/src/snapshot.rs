use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{AdType, Attribute, Collector, Constraint, QueryError, ScheddAd};

/// Collector backed by a YAML dump of schedd ads, re-read on every query so
/// an external process can keep it fresh.
pub struct SnapshotCollector {
    host: String,
    path: PathBuf,
}

impl SnapshotCollector {
    pub fn new(host: &str, path: impl AsRef<Path>) -> Self {
        Self {
            host: host.to_string(),
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<Vec<ScheddAd>, QueryError> {
        let text = fs::read_to_string(&self.path).map_err(|err| QueryError::Unavailable {
            host: self.host.clone(),
            reason: format!("cannot read '{}': {}", self.path.display(), err),
        })?;

        serde_yaml::from_str(&text).map_err(|err| QueryError::Malformed {
            host: self.host.clone(),
            reason: format!("'{}': {}", self.path.display(), err),
        })
    }
}

impl Collector for SnapshotCollector {
    fn host(&self) -> &str {
        &self.host
    }

    fn query(
        &self,
        ad_type: AdType,
        constraint: &Constraint,
        projection: &[Attribute],
    ) -> Result<Vec<ScheddAd>, QueryError> {
        let ads = self.load()?;
        Ok(run_query(&self.host, &ads, ad_type, constraint, projection))
    }
}

/// Collector answering from an in-memory set of ads.
#[derive(Default)]
pub struct StaticCollector {
    host: String,
    ads: Vec<ScheddAd>,
}

impl StaticCollector {
    pub fn new(host: &str, ads: Vec<ScheddAd>) -> Self {
        Self {
            host: host.to_string(),
            ads,
        }
    }
}

impl Collector for StaticCollector {
    fn host(&self) -> &str {
        &self.host
    }

    fn query(
        &self,
        ad_type: AdType,
        constraint: &Constraint,
        projection: &[Attribute],
    ) -> Result<Vec<ScheddAd>, QueryError> {
        Ok(run_query(&self.host, &self.ads, ad_type, constraint, projection))
    }
}

fn run_query(
    host: &str,
    ads: &[ScheddAd],
    ad_type: AdType,
    constraint: &Constraint,
    projection: &[Attribute],
) -> Vec<ScheddAd> {
    debug!("Querying {} for {:?} ads where {}", host, ad_type, constraint);

    let matched: Vec<ScheddAd> = ads
        .iter()
        .filter(|ad| constraint.matches(ad))
        .map(|ad| ad.project(projection))
        .collect();

    debug!("Collector {} returned {} ads", host, matched.len());
    matched
}
