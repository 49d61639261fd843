use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::default::{
    get_default_cache_ttl_secs, get_default_collector, get_default_log, get_default_log_file,
    get_default_log_level, get_default_policy, get_default_pool, get_default_schedd_type,
    get_default_version, get_default_weight_factor,
};

/// Schedd allow-list: schedd name -> per-schedd settings.
pub type AllowList = BTreeMap<String, ScheddSettings>;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "get_default_version")]
    pub version: u32,

    // collector host; falls back to "localhost" when unset
    #[serde(rename = "htcondorPool", alias = "htcondor_pool", default)]
    pub htcondor_pool: Option<String>,

    // key = schedd name
    #[serde(rename = "htcondorSchedds", alias = "htcondor_schedds", default)]
    pub htcondor_schedds: Option<AllowList>,

    #[serde(default = "get_default_policy")]
    pub policy: String, // memory | capacity

    #[serde(default = "get_default_schedd_type")]
    pub schedd_type: String, // CMSGWMS_Type of the schedds we submit to

    #[serde(default = "get_default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "get_default_collector")]
    pub collector: Collector,

    // site names served by the static site directory
    #[serde(default)]
    pub sites: Vec<String>,

    #[serde(default = "get_default_log")]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: get_default_version(),
            htcondor_pool: None,
            htcondor_schedds: None,
            policy: get_default_policy(),
            schedd_type: get_default_schedd_type(),
            cache_ttl_secs: get_default_cache_ttl_secs(),
            collector: get_default_collector(),
            sites: Vec::new(),
            log: get_default_log(),
        }
    }
}

impl Config {
    pub fn collector_host(&self) -> String {
        self.htcondor_pool.clone().unwrap_or_else(get_default_pool)
    }

    pub fn allow_list(&self) -> Option<&AllowList> {
        self.htcondor_schedds.as_ref()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ScheddSettings {
    #[serde(
        rename = "weightFactor",
        alias = "weightfactor",
        alias = "weight_factor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub weight_factor: Option<f64>,
}

impl ScheddSettings {
    pub fn with_factor(factor: f64) -> Self {
        Self {
            weight_factor: Some(factor),
        }
    }

    pub fn factor(&self) -> f64 {
        self.weight_factor.unwrap_or_else(get_default_weight_factor)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Collector {
    // YAML file holding a dump of schedd ads
    #[serde(default)]
    pub snapshot: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Log {
    #[serde(default = "get_default_log_level")]
    pub level: String, // trace, debug, info, warn, error, off

    #[serde(default)]
    pub enabled: bool, // write to file instead of stderr

    #[serde(default = "get_default_log_file")]
    pub file: String,
}

impl Default for Log {
    fn default() -> Self {
        get_default_log()
    }
}
