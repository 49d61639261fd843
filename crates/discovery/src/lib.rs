//! Collector (resource discovery service) client side: schedd ad records,
//! query constraints and the `Collector` trait the locator queries through.

use std::sync::Arc;

use thiserror::Error;

pub mod ad;
pub mod constraint;
pub mod snapshot;

pub use ad::{Attribute, HealthFlag, ScheddAd};
pub use constraint::{Constraint, quote};
pub use snapshot::{SnapshotCollector, StaticCollector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdType {
    Schedd,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("collector {host} unavailable: {reason}")]
    Unavailable { host: String, reason: String },

    #[error("collector {host} returned malformed ads: {reason}")]
    Malformed { host: String, reason: String },
}

pub trait Collector {
    /// Host the collector answers on, for diagnostics.
    fn host(&self) -> &str;

    fn query(
        &self,
        ad_type: AdType,
        constraint: &Constraint,
        projection: &[Attribute],
    ) -> Result<Vec<ScheddAd>, QueryError>;
}

impl<C: Collector + ?Sized> Collector for Arc<C> {
    fn host(&self) -> &str {
        (**self).host()
    }

    fn query(
        &self,
        ad_type: AdType,
        constraint: &Constraint,
        projection: &[Attribute],
    ) -> Result<Vec<ScheddAd>, QueryError> {
        (**self).query(ad_type, constraint, projection)
    }
}

impl<C: Collector + ?Sized> Collector for Box<C> {
    fn host(&self) -> &str {
        (**self).host()
    }

    fn query(
        &self,
        ad_type: AdType,
        constraint: &Constraint,
        projection: &[Attribute],
    ) -> Result<Vec<ScheddAd>, QueryError> {
        (**self).query(ad_type, constraint, projection)
    }
}
