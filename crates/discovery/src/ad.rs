use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

/// ClassAd attribute names the locator knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Name,
    DetectedMemory,
    TotalFreeMemoryMB,
    MaxJobsRunning,
    TotalRunningJobs,
    JobsRunning,
    TransferQueueMaxUploading,
    TransferQueueNumUploading,
    IsOk,
    StartSchedulerUniverse,
    CmsGwmsType,
    AddressV1,
    CondorPlatform,
    CondorVersion,
    Machine,
    MyAddress,
    MyType,
    ScheddIpAddr,
    RemoteCondorSetup,
}

impl Attribute {
    pub const ALL: &'static [Attribute] = &[
        Attribute::Name,
        Attribute::DetectedMemory,
        Attribute::TotalFreeMemoryMB,
        Attribute::MaxJobsRunning,
        Attribute::TotalRunningJobs,
        Attribute::JobsRunning,
        Attribute::TransferQueueMaxUploading,
        Attribute::TransferQueueNumUploading,
        Attribute::IsOk,
        Attribute::StartSchedulerUniverse,
        Attribute::CmsGwmsType,
        Attribute::AddressV1,
        Attribute::CondorPlatform,
        Attribute::CondorVersion,
        Attribute::Machine,
        Attribute::MyAddress,
        Attribute::MyType,
        Attribute::ScheddIpAddr,
        Attribute::RemoteCondorSetup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Name => "Name",
            Attribute::DetectedMemory => "DetectedMemory",
            Attribute::TotalFreeMemoryMB => "TotalFreeMemoryMB",
            Attribute::MaxJobsRunning => "MaxJobsRunning",
            Attribute::TotalRunningJobs => "TotalRunningJobs",
            Attribute::JobsRunning => "JobsRunning",
            Attribute::TransferQueueMaxUploading => "TransferQueueMaxUploading",
            Attribute::TransferQueueNumUploading => "TransferQueueNumUploading",
            Attribute::IsOk => "IsOK",
            Attribute::StartSchedulerUniverse => "StartSchedulerUniverse",
            Attribute::CmsGwmsType => "CMSGWMS_Type",
            Attribute::AddressV1 => "AddressV1",
            Attribute::CondorPlatform => "CondorPlatform",
            Attribute::CondorVersion => "CondorVersion",
            Attribute::Machine => "Machine",
            Attribute::MyAddress => "MyAddress",
            Attribute::MyType => "MyType",
            Attribute::ScheddIpAddr => "ScheddIpAddr",
            Attribute::RemoteCondorSetup => "RemoteCondorSetup",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `IsOK` is published either as a literal or as an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealthFlag {
    Bool(bool),
    Int(i64),
    Expr(String),
}

impl HealthFlag {
    /// Anything that does not reduce to a literal evaluates to UNDEFINED, i.e. not healthy.
    pub fn evaluate(&self) -> bool {
        match self {
            HealthFlag::Bool(value) => *value,
            HealthFlag::Int(value) => *value != 0,
            HealthFlag::Expr(expr) => {
                let expr = expr.trim();
                if expr.eq_ignore_ascii_case("true") {
                    return true;
                }
                if expr.eq_ignore_ascii_case("false") {
                    return false;
                }
                match expr.parse::<i64>() {
                    Ok(value) => value != 0,
                    Err(_) => {
                        debug!("IsOK expression '{}' does not evaluate to a literal", expr);
                        false
                    }
                }
            }
        }
    }
}

/// One schedd as published in the collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheddAd {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "DetectedMemory", default, skip_serializing_if = "Option::is_none")]
    pub detected_memory: Option<i64>,

    #[serde(rename = "TotalFreeMemoryMB", default, skip_serializing_if = "Option::is_none")]
    pub total_free_memory_mb: Option<i64>,

    #[serde(rename = "MaxJobsRunning", default, skip_serializing_if = "Option::is_none")]
    pub max_jobs_running: Option<i64>,

    #[serde(rename = "TotalRunningJobs", default, skip_serializing_if = "Option::is_none")]
    pub total_running_jobs: Option<i64>,

    // only logged; weighting uses TotalRunningJobs
    #[serde(rename = "JobsRunning", default, skip_serializing_if = "Option::is_none")]
    pub jobs_running: Option<i64>,

    #[serde(rename = "TransferQueueMaxUploading", default, skip_serializing_if = "Option::is_none")]
    pub transfer_queue_max_uploading: Option<i64>,

    #[serde(rename = "TransferQueueNumUploading", default, skip_serializing_if = "Option::is_none")]
    pub transfer_queue_num_uploading: Option<i64>,

    #[serde(rename = "IsOK", alias = "IsOk", default, skip_serializing_if = "Option::is_none")]
    pub is_ok: Option<HealthFlag>,

    #[serde(rename = "StartSchedulerUniverse", default, skip_serializing_if = "Option::is_none")]
    pub start_scheduler_universe: Option<bool>,

    #[serde(rename = "CMSGWMS_Type", default, skip_serializing_if = "Option::is_none")]
    pub cms_gwms_type: Option<String>,

    #[serde(rename = "AddressV1", default, skip_serializing_if = "Option::is_none")]
    pub address_v1: Option<String>,

    #[serde(rename = "CondorPlatform", default, skip_serializing_if = "Option::is_none")]
    pub condor_platform: Option<String>,

    #[serde(rename = "CondorVersion", default, skip_serializing_if = "Option::is_none")]
    pub condor_version: Option<String>,

    #[serde(rename = "Machine", default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,

    #[serde(rename = "MyAddress", default, skip_serializing_if = "Option::is_none")]
    pub my_address: Option<String>,

    #[serde(rename = "MyType", default, skip_serializing_if = "Option::is_none")]
    pub my_type: Option<String>,

    #[serde(rename = "ScheddIpAddr", default, skip_serializing_if = "Option::is_none")]
    pub schedd_ip_addr: Option<String>,

    #[serde(rename = "RemoteCondorSetup", default, skip_serializing_if = "Option::is_none")]
    pub remote_condor_setup: Option<String>,
}

impl ScheddAd {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Name for diagnostics; ads without one show up as `<unnamed>`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn has(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Name => self.name.is_some(),
            Attribute::DetectedMemory => self.detected_memory.is_some(),
            Attribute::TotalFreeMemoryMB => self.total_free_memory_mb.is_some(),
            Attribute::MaxJobsRunning => self.max_jobs_running.is_some(),
            Attribute::TotalRunningJobs => self.total_running_jobs.is_some(),
            Attribute::JobsRunning => self.jobs_running.is_some(),
            Attribute::TransferQueueMaxUploading => self.transfer_queue_max_uploading.is_some(),
            Attribute::TransferQueueNumUploading => self.transfer_queue_num_uploading.is_some(),
            Attribute::IsOk => self.is_ok.is_some(),
            Attribute::StartSchedulerUniverse => self.start_scheduler_universe.is_some(),
            Attribute::CmsGwmsType => self.cms_gwms_type.is_some(),
            Attribute::AddressV1 => self.address_v1.is_some(),
            Attribute::CondorPlatform => self.condor_platform.is_some(),
            Attribute::CondorVersion => self.condor_version.is_some(),
            Attribute::Machine => self.machine.is_some(),
            Attribute::MyAddress => self.my_address.is_some(),
            Attribute::MyType => self.my_type.is_some(),
            Attribute::ScheddIpAddr => self.schedd_ip_addr.is_some(),
            Attribute::RemoteCondorSetup => self.remote_condor_setup.is_some(),
        }
    }

    /// Required attributes this ad lacks, in the order given.
    pub fn missing(&self, required: &[Attribute]) -> Vec<Attribute> {
        required
            .iter()
            .copied()
            .filter(|attribute| !self.has(*attribute))
            .collect()
    }

    /// Healthy only when `IsOK` is present and evaluates true.
    pub fn is_healthy(&self) -> bool {
        self.is_ok.as_ref().is_some_and(HealthFlag::evaluate)
    }

    /// Copy of this ad carrying only the projected attributes.
    pub fn project(&self, projection: &[Attribute]) -> ScheddAd {
        let mut out = ScheddAd::default();
        for attribute in projection {
            match attribute {
                Attribute::Name => out.name = self.name.clone(),
                Attribute::DetectedMemory => out.detected_memory = self.detected_memory,
                Attribute::TotalFreeMemoryMB => out.total_free_memory_mb = self.total_free_memory_mb,
                Attribute::MaxJobsRunning => out.max_jobs_running = self.max_jobs_running,
                Attribute::TotalRunningJobs => out.total_running_jobs = self.total_running_jobs,
                Attribute::JobsRunning => out.jobs_running = self.jobs_running,
                Attribute::TransferQueueMaxUploading => {
                    out.transfer_queue_max_uploading = self.transfer_queue_max_uploading
                }
                Attribute::TransferQueueNumUploading => {
                    out.transfer_queue_num_uploading = self.transfer_queue_num_uploading
                }
                Attribute::IsOk => out.is_ok = self.is_ok.clone(),
                Attribute::StartSchedulerUniverse => {
                    out.start_scheduler_universe = self.start_scheduler_universe
                }
                Attribute::CmsGwmsType => out.cms_gwms_type = self.cms_gwms_type.clone(),
                Attribute::AddressV1 => out.address_v1 = self.address_v1.clone(),
                Attribute::CondorPlatform => out.condor_platform = self.condor_platform.clone(),
                Attribute::CondorVersion => out.condor_version = self.condor_version.clone(),
                Attribute::Machine => out.machine = self.machine.clone(),
                Attribute::MyAddress => out.my_address = self.my_address.clone(),
                Attribute::MyType => out.my_type = self.my_type.clone(),
                Attribute::ScheddIpAddr => out.schedd_ip_addr = self.schedd_ip_addr.clone(),
                Attribute::RemoteCondorSetup => {
                    out.remote_condor_setup = self.remote_condor_setup.clone()
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_flag_literals() {
        assert!(HealthFlag::Bool(true).evaluate());
        assert!(!HealthFlag::Bool(false).evaluate());
        assert!(HealthFlag::Int(1).evaluate());
        assert!(!HealthFlag::Int(0).evaluate());
        assert!(HealthFlag::Expr(" TRUE ".to_string()).evaluate());
        assert!(!HealthFlag::Expr("false".to_string()).evaluate());
        assert!(!HealthFlag::Expr("TotalRunningJobs < 10".to_string()).evaluate());
    }

    #[test]
    fn ad_without_is_ok_is_not_healthy() {
        assert!(!ScheddAd::named("a").is_healthy());
    }

    #[test]
    fn deserializes_classad_names() {
        let ad: ScheddAd = serde_yaml::from_str(
            "Name: crab3@vocms059.cern.ch\nDetectedMemory: 8192\nIsOK: \"true\"\nCMSGWMS_Type: crabschedd\n",
        )
        .unwrap();
        assert_eq!(ad.name.as_deref(), Some("crab3@vocms059.cern.ch"));
        assert_eq!(ad.detected_memory, Some(8192));
        assert_eq!(ad.cms_gwms_type.as_deref(), Some("crabschedd"));
        assert!(ad.is_healthy());
    }

    #[test]
    fn missing_lists_absent_attributes_in_order() {
        let mut ad = ScheddAd::named("a");
        ad.detected_memory = Some(1);
        let missing = ad.missing(&[
            Attribute::Name,
            Attribute::MaxJobsRunning,
            Attribute::DetectedMemory,
            Attribute::IsOk,
        ]);
        assert_eq!(missing, vec![Attribute::MaxJobsRunning, Attribute::IsOk]);
    }

    #[test]
    fn project_keeps_only_requested_attributes() {
        let mut ad = ScheddAd::named("a");
        ad.detected_memory = Some(1);
        ad.my_address = Some("<127.0.0.1:9618>".to_string());

        let projected = ad.project(&[Attribute::Name, Attribute::MyAddress]);
        assert_eq!(projected.name.as_deref(), Some("a"));
        assert_eq!(projected.my_address.as_deref(), Some("<127.0.0.1:9618>"));
        assert!(projected.detected_memory.is_none());
    }

    #[test]
    fn attribute_names_round_trip_display() {
        assert_eq!(Attribute::IsOk.to_string(), "IsOK");
        assert_eq!(Attribute::CmsGwmsType.to_string(), "CMSGWMS_Type");
        assert_eq!(Attribute::ALL.len(), 19);
    }
}
