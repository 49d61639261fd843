use gridsub_config::config::AllowList;
use gridsub_discovery::{Attribute, ScheddAd};
use log::debug;

use crate::{ChoiceError, WeightedChoice, filter_allowed_and_healthy, filter_by_attributes};

pub const CAPACITY_ATTRIBUTES: &[Attribute] = &[
    Attribute::DetectedMemory,
    Attribute::TotalFreeMemoryMB,
    Attribute::MaxJobsRunning,
    Attribute::TotalRunningJobs,
    Attribute::TransferQueueMaxUploading,
    Attribute::TransferQueueNumUploading,
    Attribute::Name,
];

struct Capacity<'a> {
    name: &'a str,
    detected_memory: i64,
    free_memory: i64,
    max_jobs: i64,
    running_jobs: i64,
    max_uploads: i64,
    uploads: i64,
}

impl<'a> Capacity<'a> {
    fn from_ad(ad: &'a ScheddAd) -> Option<Self> {
        Some(Self {
            name: ad.name.as_deref()?,
            detected_memory: ad.detected_memory?,
            free_memory: ad.total_free_memory_mb?,
            max_jobs: ad.max_jobs_running?,
            running_jobs: ad.total_running_jobs?,
            max_uploads: ad.transfer_queue_max_uploading?,
            uploads: ad.transfer_queue_num_uploading?,
        })
    }
}

/// Weight each usable schedd by the scarcest of its free memory, free job
/// slots and free upload slots, each as a fraction of the pool-wide total.
///
/// When nothing usable comes back from the collector every allow-listed
/// schedd gets weight 1.
pub fn capacity_metrics_choices(
    ads: &[ScheddAd],
    allow_list: &AllowList,
) -> Result<Vec<WeightedChoice>, ChoiceError> {
    let usable = filter_allowed_and_healthy(filter_by_attributes(ads, CAPACITY_ATTRIBUTES), allow_list);
    let schedds: Vec<(Capacity, &ScheddAd)> = usable
        .into_iter()
        .filter_map(|ad| Capacity::from_ad(ad).map(|capacity| (capacity, ad)))
        .collect();

    if schedds.is_empty() {
        debug!("No usable schedd from the collector, using htcondorSchedds with equal weights");
        return Ok(allow_list
            .keys()
            .map(|name| WeightedChoice::new(name, 1.0))
            .collect());
    }

    let total_memory = checked_total(&schedds, Attribute::DetectedMemory, |c| c.detected_memory)?;
    let total_jobs = checked_total(&schedds, Attribute::MaxJobsRunning, |c| c.max_jobs)?;
    let total_uploads =
        checked_total(&schedds, Attribute::TransferQueueMaxUploading, |c| c.max_uploads)?;

    debug!(
        "Total Mem: {}, Total Jobs: {}, Total Uploads: {}",
        total_memory, total_jobs, total_uploads
    );

    if total_memory == 0 || total_jobs == 0 || total_uploads == 0 {
        return Err(ChoiceError::DivisionByZeroInWeighting {
            total_memory,
            total_jobs,
            total_uploads,
        });
    }

    let choices = schedds
        .iter()
        .map(|(capacity, ad)| -> Result<WeightedChoice, ChoiceError> {
            let free_jobs = headroom(
                capacity,
                capacity.max_jobs,
                capacity.running_jobs,
                Attribute::TotalRunningJobs,
            )?;
            let free_uploads = headroom(
                capacity,
                capacity.max_uploads,
                capacity.uploads,
                Attribute::TransferQueueNumUploading,
            )?;

            let mem_perc = capacity.free_memory as f64 / total_memory as f64;
            let job_perc = free_jobs as f64 / total_jobs as f64;
            let upl_perc = free_uploads as f64 / total_uploads as f64;
            // oversubscribed schedds would go negative
            let weight = mem_perc.min(job_perc).min(upl_perc).max(0.0);

            // JobsRunning is logged, TotalRunningJobs drives the weight
            debug!(
                "{}: Mem {}, MemPrct {:.2}, Run {}, RunPrct {:.2}, Trf {}, TrfPrct {:.2}, weight: {:.6}",
                capacity.name,
                capacity.free_memory,
                mem_perc,
                ad.jobs_running.map_or_else(|| "undefined".to_string(), |v| v.to_string()),
                job_perc,
                capacity.uploads,
                upl_perc,
                weight
            );

            Ok(WeightedChoice::new(capacity.name, weight))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(choices)
}

fn checked_total<F>(
    schedds: &[(Capacity, &ScheddAd)],
    attribute: Attribute,
    value: F,
) -> Result<i64, ChoiceError>
where
    F: Fn(&Capacity) -> i64,
{
    schedds.iter().try_fold(0i64, |total, (capacity, _)| {
        total
            .checked_add(value(capacity))
            .ok_or_else(|| ChoiceError::CapacityOverflow {
                name: capacity.name.to_string(),
                attribute,
            })
    })
}

fn headroom(capacity: &Capacity, max: i64, used: i64, attribute: Attribute) -> Result<i64, ChoiceError> {
    max.checked_sub(used)
        .ok_or_else(|| ChoiceError::CapacityOverflow {
            name: capacity.name.to_string(),
            attribute,
        })
}
