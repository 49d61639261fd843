use std::collections::HashMap;

use gridsub_config::config::AllowList;
use gridsub_discovery::ScheddAd;

use crate::WeightedChoice;

/// Weight given to allow-listed schedds the collector did not report (24 GiB in MB).
pub const DEFAULT_DETECTED_MEMORY_MB: i64 = 24 * 1024;

/// One choice per allow-listed schedd, weighted by its `DetectedMemory`.
pub fn memory_based_choices(ads: &[ScheddAd], allow_list: &AllowList) -> Vec<WeightedChoice> {
    let detected: HashMap<&str, i64> = ads
        .iter()
        .filter_map(|ad| Some((ad.name.as_deref()?, ad.detected_memory?)))
        .collect();

    allow_list
        .keys()
        .map(|name| {
            let memory = detected
                .get(name.as_str())
                .copied()
                .unwrap_or(DEFAULT_DETECTED_MEMORY_MB);
            WeightedChoice::new(name, memory as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::allow_list;

    #[test]
    fn unknown_schedds_get_the_default_memory() {
        let mut x = ScheddAd::named("X");
        x.detected_memory = Some(8192);

        let choices = memory_based_choices(&[x], &allow_list(&["X", "Y"]));
        assert_eq!(
            choices,
            vec![WeightedChoice::new("X", 8192.0), WeightedChoice::new("Y", 24576.0)]
        );
    }

    #[test]
    fn schedds_outside_the_allow_list_are_not_offered() {
        let mut z = ScheddAd::named("Z");
        z.detected_memory = Some(1);

        let choices = memory_based_choices(&[z], &allow_list(&["X"]));
        assert_eq!(choices, vec![WeightedChoice::new("X", 24576.0)]);
    }

    #[test]
    fn ad_without_memory_is_treated_as_unreported() {
        let choices = memory_based_choices(&[ScheddAd::named("X")], &allow_list(&["X"]));
        assert_eq!(choices[0].weight, DEFAULT_DETECTED_MEMORY_MB as f64);
    }
}
