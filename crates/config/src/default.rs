use crate::config::{Collector, Log};

// default values
pub fn get_default_version() -> u32 {
    1
}

pub fn get_default_pool() -> String {
    String::from("localhost")
}

pub fn get_default_policy() -> String {
    String::from("memory")
}

pub fn get_default_schedd_type() -> String {
    String::from("crabschedd")
}

pub fn get_default_cache_ttl_secs() -> u64 {
    1800
}

pub fn get_default_weight_factor() -> f64 {
    1.0
}

pub fn get_default_log_level() -> String {
    String::from("info")
}

pub fn get_default_log_file() -> String {
    String::from("./logs/gridsub.log")
}

pub fn get_default_collector() -> Collector {
    Collector { snapshot: None }
}

pub fn get_default_log() -> Log {
    Log {
        level: get_default_log_level(),
        enabled: false,
        file: get_default_log_file(),
    }
}
