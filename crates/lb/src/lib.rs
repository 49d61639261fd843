use gridsub_config::config::AllowList;
use gridsub_discovery::{Attribute, ScheddAd};
use thiserror::Error;

pub mod capacity;
pub mod filter;
pub mod memory;
pub mod weighted;

pub use capacity::capacity_metrics_choices;
pub use filter::{filter_allowed_and_healthy, filter_by_attributes};
pub use memory::{DEFAULT_DETECTED_MEMORY_MB, memory_based_choices};
pub use weighted::{pick, weighted_choice};

#[derive(Debug, Error, PartialEq)]
pub enum ChoiceError {
    #[error(
        "cannot weight schedds: aggregate capacity is zero \
         (memory {total_memory}, max jobs {total_jobs}, max uploads {total_uploads})"
    )]
    DivisionByZeroInWeighting {
        total_memory: i64,
        total_jobs: i64,
        total_uploads: i64,
    },

    #[error("no schedd with a positive weight to choose from")]
    EmptyWeightedChoiceSet,

    #[error("invalid weight {weight} for schedd {name}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("schedd weights add up to a non-finite total")]
    WeightOverflow,

    #[error("capacity of schedd {name} overflows while weighting ({attribute})")]
    CapacityOverflow { name: String, attribute: Attribute },
}

/// A schedd name and its selection weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedChoice {
    pub name: String,
    pub weight: f64,
}

impl WeightedChoice {
    pub fn new(name: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            weight,
        }
    }
}

/// Attributes requested from the collector when selecting a schedd.
pub const SELECTION_ATTRIBUTES: &[Attribute] = &[
    Attribute::Name,
    Attribute::DetectedMemory,
    Attribute::TotalFreeMemoryMB,
    Attribute::TransferQueueNumUploading,
    Attribute::TransferQueueMaxUploading,
    Attribute::TotalRunningJobs,
    Attribute::JobsRunning,
    Attribute::MaxJobsRunning,
    Attribute::IsOk,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChoicePolicy {
    /// Weight by the most constrained of free memory, job slots and upload slots.
    CapacityMetrics,
    /// Weight by detected memory only.
    #[default]
    MemoryBased,
}

impl ChoicePolicy {
    pub fn from_config(value: &str) -> Result<Self, String> {
        let mode = value.trim().to_lowercase();
        match mode.as_str() {
            "capacity" | "capacity-metrics" | "capacity_metrics" | "hybrid" => {
                Ok(Self::CapacityMetrics)
            }
            "memory" | "memory-based" | "memory_based" | "static-memory" => Ok(Self::MemoryBased),
            _ => Err(format!("unsupported schedd selection policy: {value}")),
        }
    }

    pub fn projection(&self) -> &'static [Attribute] {
        SELECTION_ATTRIBUTES
    }

    pub fn choices(
        &self,
        ads: &[ScheddAd],
        allow_list: &AllowList,
    ) -> Result<Vec<WeightedChoice>, ChoiceError> {
        match self {
            ChoicePolicy::CapacityMetrics => capacity_metrics_choices(ads, allow_list),
            ChoicePolicy::MemoryBased => Ok(memory_based_choices(ads, allow_list)),
        }
    }
}

/// Scale each weight by the schedd's configured weight factor (1 when unset).
pub fn adjust_weights(choices: &mut [WeightedChoice], allow_list: &AllowList) {
    for choice in choices.iter_mut() {
        let factor = allow_list
            .get(&choice.name)
            .map(|settings| settings.factor())
            .unwrap_or(1.0);
        choice.weight *= factor;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use gridsub_config::config::{AllowList, ScheddSettings};
    use gridsub_discovery::{HealthFlag, ScheddAd};

    pub fn allow_list(names: &[&str]) -> AllowList {
        names
            .iter()
            .map(|name| (name.to_string(), ScheddSettings::default()))
            .collect()
    }

    pub struct Load {
        pub detected_memory: i64,
        pub free_memory: i64,
        pub max_jobs: i64,
        pub running_jobs: i64,
        pub max_uploads: i64,
        pub uploads: i64,
    }

    pub fn loaded_ad(name: &str, load: Load) -> ScheddAd {
        ScheddAd {
            name: Some(name.to_string()),
            detected_memory: Some(load.detected_memory),
            total_free_memory_mb: Some(load.free_memory),
            max_jobs_running: Some(load.max_jobs),
            total_running_jobs: Some(load.running_jobs),
            jobs_running: Some(load.running_jobs),
            transfer_queue_max_uploading: Some(load.max_uploads),
            transfer_queue_num_uploading: Some(load.uploads),
            is_ok: Some(HealthFlag::Bool(true)),
            ..ScheddAd::default()
        }
    }
}
