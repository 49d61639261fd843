//! Placeholder dataset for tasks without input data (private MC), so the
//! job splitter can treat them like any other task. Only the total number
//! of events matters to the splitter; every other field is a dummy value.

use std::collections::BTreeSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FAKE_FILESET_NAME: &str = "MCFakeFileSet";
pub const FAKE_FILE_LFN: &str = "MCFakeFile";
pub const FAKE_BLOCK: &str = "MCFakeBlock";
pub const FAKE_FILE_SIZE: u64 = 1000;
pub const DEFAULT_EVENTS_PER_LUMI: u32 = 100;
pub const FIRST_LUMI: u32 = 1;
pub const LAST_LUMI: u32 = 10;

/// Tier-1 sites are kept for production work.
const EXCLUDED_SITE_PREFIX: &str = "T1_";

#[derive(Debug, Error)]
pub enum FilesetError {
    #[error("site directory lookup failed: {0}")]
    SiteDirectory(String),
}

/// Source of the site names a fake file can be located at.
pub trait SiteDirectory {
    fn all_cms_names(&self) -> Result<Vec<String>, FilesetError>;
}

pub struct StaticSiteDirectory {
    sites: Vec<String>,
}

impl StaticSiteDirectory {
    pub fn new<I>(sites: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            sites: sites.into_iter().collect(),
        }
    }
}

impl SiteDirectory for StaticSiteDirectory {
    fn all_cms_names(&self) -> Result<Vec<String>, FilesetError> {
        Ok(self.sites.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub total_units: u64,
    #[serde(default)]
    pub events_per_lumi: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run: u32,
    pub lumis: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub lfn: String,
    pub size: u64,
    pub events: u64,
    pub locations: BTreeSet<String>,
    pub runs: Vec<Run>,
    pub block: String,
    pub first_event: u64,
    pub last_event: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fileset {
    pub name: String,
    pub files: Vec<File>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeFileSetResult {
    pub task: Task,
    pub fileset: Fileset,
}

pub struct MakeFakeFileSet<D> {
    directory: D,
}

impl<D: SiteDirectory> MakeFakeFileSet<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Sites private MC may run at: everything but Tier-1s.
    pub fn list_of_sites(&self) -> Result<Vec<String>, FilesetError> {
        let sites = self.directory.all_cms_names()?;
        Ok(sites
            .into_iter()
            .filter(|site| !site.starts_with(EXCLUDED_SITE_PREFIX))
            .collect())
    }

    pub fn execute(&self, mut task: Task) -> Result<FakeFileSetResult, FilesetError> {
        let total_events = task.total_units;

        // the splitter reads events per lumi from the task, not from the file
        if task.events_per_lumi.unwrap_or(0) == 0 {
            debug!(
                "Task {} has no events per lumi, defaulting to {}",
                task.name, DEFAULT_EVENTS_PER_LUMI
            );
            task.events_per_lumi = Some(DEFAULT_EVENTS_PER_LUMI);
        }

        let file = File {
            lfn: FAKE_FILE_LFN.to_string(),
            size: FAKE_FILE_SIZE,
            events: total_events,
            locations: self.list_of_sites()?.into_iter().collect(),
            runs: vec![Run {
                run: 1,
                lumis: (FIRST_LUMI..=LAST_LUMI).collect(),
            }],
            block: FAKE_BLOCK.to_string(),
            first_event: 1,
            last_event: total_events,
        };

        info!(
            "Built fake fileset for task {} with {} events at {} sites",
            task.name,
            total_events,
            file.locations.len()
        );

        Ok(FakeFileSetResult {
            task,
            fileset: Fileset {
                name: FAKE_FILESET_NAME.to_string(),
                files: vec![file],
            },
        })
    }
}
