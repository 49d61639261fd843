use crate::config::Config;
use log::{error, info, warn};

pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate(config: &Config) -> bool {
    info!("Starting configuration validation...");

    // --- Validate Log level ---
    if !VALID_LOG_LEVELS
        .iter()
        .any(|lvl| lvl.eq_ignore_ascii_case(&config.log.level))
    {
        error!("Invalid log level: {}", config.log.level);
        return false;
    }

    // --- Validate collector pool ---
    if let Some(pool) = &config.htcondor_pool {
        if pool.trim().is_empty() {
            error!("htcondorPool is set but empty");
            return false;
        }
    }

    if config.schedd_type.trim().is_empty() {
        error!("schedd_type is empty");
        return false;
    }

    if config.cache_ttl_secs == 0 {
        error!("cache_ttl_secs is invalid (0)");
        return false;
    }

    // --- Validate schedd allow-list ---
    match &config.htcondor_schedds {
        None => warn!("No htcondorSchedds configured, schedd selection will fail"),
        Some(schedds) if schedds.is_empty() => {
            warn!("htcondorSchedds is empty, schedd selection will fail")
        }
        Some(schedds) => {
            for (name, settings) in schedds {
                if name.trim().is_empty() {
                    error!("Schedd name is missing in htcondorSchedds");
                    return false;
                }

                if let Some(factor) = settings.weight_factor {
                    if !factor.is_finite() || factor < 0.0 {
                        error!("Weight factor is invalid ({}) for schedd '{}'", factor, name);
                        return false;
                    }
                }
            }
        }
    }

    info!("Configuration validation passed successfully");

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheddSettings;

    fn config() -> Config {
        let mut config = Config::default();
        config.htcondor_schedds = Some(
            [("crab3@vocms059.cern.ch".to_string(), ScheddSettings::default())]
                .into_iter()
                .collect(),
        );
        config
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&config()));
    }

    #[test]
    fn rejects_negative_weight_factor() {
        let mut config = config();
        config
            .htcondor_schedds
            .as_mut()
            .unwrap()
            .insert("bad".to_string(), ScheddSettings::with_factor(-1.0));
        assert!(!validate(&config));
    }

    #[test]
    fn rejects_zero_ttl_and_empty_pool() {
        let mut config = config();
        config.cache_ttl_secs = 0;
        assert!(!validate(&config));

        let mut config = self::config();
        config.htcondor_pool = Some("  ".to_string());
        assert!(!validate(&config));
    }

    #[test]
    fn rejects_invalid_log_level() {
        let mut config = config();
        config.log.level = "loud".to_string();
        assert!(!validate(&config));
    }
}
