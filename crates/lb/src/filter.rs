use gridsub_config::config::AllowList;
use gridsub_discovery::{Attribute, ScheddAd};
use log::debug;

/// Keep the schedds that publish every required attribute.
pub fn filter_by_attributes<'a>(ads: &'a [ScheddAd], required: &[Attribute]) -> Vec<&'a ScheddAd> {
    ads.iter()
        .filter(|ad| {
            let missing = ad.missing(required);
            for attribute in &missing {
                debug!(
                    "Ignoring {} schedd since it is missing the {} ClassAd.",
                    ad.display_name(),
                    attribute
                );
            }
            missing.is_empty()
        })
        .collect()
}

/// Keep the schedds that are allow-listed and report themselves healthy.
pub fn filter_allowed_and_healthy<'a>(
    ads: Vec<&'a ScheddAd>,
    allow_list: &AllowList,
) -> Vec<&'a ScheddAd> {
    ads.into_iter()
        .filter(|ad| {
            let allowed = ad
                .name
                .as_deref()
                .is_some_and(|name| allow_list.contains_key(name));
            if !allowed {
                debug!("Ignoring {} schedd since it is not in htcondorSchedds.", ad.display_name());
                return false;
            }
            if !ad.is_healthy() {
                debug!("Ignoring {} schedd since IsOK is not true.", ad.display_name());
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use gridsub_discovery::HealthFlag;

    use super::*;
    use crate::test_support::allow_list;

    #[test]
    fn drops_ads_missing_required_attributes() {
        let mut complete = ScheddAd::named("a");
        complete.detected_memory = Some(1);
        let partial = ScheddAd::named("b");
        let ads = vec![complete.clone(), partial];

        let kept = filter_by_attributes(&ads, &[Attribute::Name, Attribute::DetectedMemory]);
        assert_eq!(kept, vec![&complete]);
    }

    #[test]
    fn empty_requirement_keeps_everything() {
        let ads = vec![ScheddAd::default(), ScheddAd::named("a")];
        assert_eq!(filter_by_attributes(&ads, &[]).len(), 2);
    }

    #[test]
    fn allow_list_and_health_both_apply() {
        let mut healthy = ScheddAd::named("a");
        healthy.is_ok = Some(HealthFlag::Bool(true));
        let mut sick = ScheddAd::named("b");
        sick.is_ok = Some(HealthFlag::Expr("false".to_string()));
        let mut unlisted = ScheddAd::named("c");
        unlisted.is_ok = Some(HealthFlag::Bool(true));
        let ads = vec![healthy.clone(), sick, unlisted];

        let kept = filter_allowed_and_healthy(ads.iter().collect(), &allow_list(&["a", "b"]));
        assert_eq!(kept, vec![&healthy]);
    }
}
