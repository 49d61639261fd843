use std::sync::Arc;

use gridsub_config::config::Config;
use gridsub_discovery::{AdType, Attribute, Collector, Constraint, QueryError, ScheddAd};
use gridsub_lb::{ChoiceError, adjust_weights, weighted_choice};
use log::{debug, info, warn};
use rand::Rng;
use thiserror::Error;

pub mod cache;

pub use cache::{CacheError, CollectorCache};
pub use gridsub_lb::ChoicePolicy;

/// Attributes needed to talk to a schedd.
pub const ADDRESS_ATTRIBUTES: &[Attribute] = &[
    Attribute::AddressV1,
    Attribute::CondorPlatform,
    Attribute::CondorVersion,
    Attribute::Machine,
    Attribute::MyAddress,
    Attribute::Name,
    Attribute::MyType,
    Attribute::ScheddIpAddr,
    Attribute::RemoteCondorSetup,
];

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("collector query failed: {0}")]
    DiscoveryQueryFailed(#[from] QueryError),

    #[error("no schedd candidates available from collector {host}")]
    NoCandidatesAvailable { host: String },

    #[error("no htcondorSchedds configured")]
    NoAllowList,

    #[error(transparent)]
    Choice(#[from] ChoiceError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("schedd {name} is missing the {attribute} ClassAd")]
    MissingAttribute { name: String, attribute: Attribute },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Connection details for a remote schedd, built from its collector ad.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheddHandle {
    pub name: String,
    pub address: String,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub machine: Option<String>,
    ad: ScheddAd,
}

impl ScheddHandle {
    pub fn from_ad(name: &str, ad: ScheddAd) -> Result<Self, LocatorError> {
        let address = ad
            .my_address
            .clone()
            .ok_or_else(|| LocatorError::MissingAttribute {
                name: name.to_string(),
                attribute: Attribute::MyAddress,
            })?;

        Ok(Self {
            name: ad.name.clone().unwrap_or_else(|| name.to_string()),
            address,
            version: ad.condor_version.clone(),
            platform: ad.condor_platform.clone(),
            machine: ad.machine.clone(),
            ad,
        })
    }

    pub fn ad(&self) -> &ScheddAd {
        &self.ad
    }
}

pub struct Locator<C> {
    config: Config,
    collector: C,
    cache: Arc<CollectorCache>,
}

impl<C: Collector> Locator<C> {
    pub fn new(config: Config, collector: C, cache: Arc<CollectorCache>) -> Self {
        Self {
            config,
            collector,
            cache,
        }
    }

    /// Collector host from `htcondorPool`, or "localhost".
    pub fn collector_host(&self) -> String {
        self.config.collector_host()
    }

    pub fn configured_policy(&self) -> Result<ChoicePolicy, LocatorError> {
        ChoicePolicy::from_config(&self.config.policy).map_err(LocatorError::Config)
    }

    /// Select a schedd with the default (memory based) policy.
    pub fn select_default(&self) -> Result<String, LocatorError> {
        self.select_schedd(ChoicePolicy::default())
    }

    pub fn select_schedd(&self, policy: ChoicePolicy) -> Result<String, LocatorError> {
        let mut rng = rand::thread_rng();
        self.select_schedd_with(policy, &mut rng)
    }

    /// Query the collector for candidate schedds, weight them with `policy`
    /// and draw one.
    pub fn select_schedd_with<R>(&self, policy: ChoicePolicy, rng: &mut R) -> Result<String, LocatorError>
    where
        R: Rng + ?Sized,
    {
        let host = self.collector_host();
        let constraint = Constraint::scheduler_universe(&self.config.schedd_type);
        let ads = self
            .collector
            .query(AdType::Schedd, &constraint, policy.projection())?;
        debug!("Collector {} returned {} schedds", host, ads.len());

        let allow_list = self.config.allow_list().ok_or(LocatorError::NoAllowList)?;
        let mut choices = policy.choices(&ads, allow_list)?;
        adjust_weights(&mut choices, allow_list);

        if choices.is_empty() {
            return Err(LocatorError::NoCandidatesAvailable { host });
        }

        let schedd = weighted_choice(&choices, rng)?.to_string();
        info!("Selected schedd {} using {:?} policy", schedd, policy);
        Ok(schedd)
    }

    /// Resolve `name` to a handle and its address, falling back to the last
    /// cached collector answer when the collector has nothing for it.
    pub fn schedd_address(&self, name: &str) -> Result<(ScheddHandle, String), LocatorError> {
        let constraint = Constraint::name(name);
        let fresh = match self
            .collector
            .query(AdType::Schedd, &constraint, ADDRESS_ATTRIBUTES)
        {
            Ok(ads) => ads.into_iter().next(),
            Err(err) => {
                warn!("Collector query for schedd {} failed: {}", name, err);
                None
            }
        };

        let ad = match fresh {
            Some(ad) => {
                self.cache.store(name, ad);
                self.cache.load(name)?
            }
            None => {
                warn!(
                    "Collector {} has no ad for schedd {}, using cached output",
                    self.collector_host(),
                    name
                );
                self.cache.load(name)?
            }
        };

        let handle = ScheddHandle::from_ad(name, ad)?;
        let address = handle.address.clone();
        debug!("Schedd {} is at {}", name, address);
        Ok((handle, address))
    }
}
