//! Job Catalog: job metadata loaded once from the jobs CSV and read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

const DEFAULT_SALARY: &str = "N/A";

/// Canonical metadata for one job title. Serialized as the client's `jobInfo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub title: String,
    pub description: String,
    pub average_salary: String,
    pub skills: Vec<String>,
}

/// One raw CSV row. Columns beyond these four are ignored.
#[derive(Debug, Deserialize)]
struct JobRow {
    job_title: Option<String>,
    job_description: Option<String>,
    average_salary: Option<String>,
    required_skills: Option<String>,
}

impl JobRow {
    fn into_record(self) -> Option<JobRecord> {
        let title = self.job_title.filter(|t| !t.trim().is_empty())?;
        Some(JobRecord {
            title,
            description: self.job_description.unwrap_or_default(),
            average_salary: self
                .average_salary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SALARY.to_string()),
            skills: split_skills(self.required_skills.as_deref().unwrap_or("")),
        })
    }
}

fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// What to do when the jobs CSV cannot be loaded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Abort startup.
    #[default]
    FailFast,
    /// Log the error and serve an empty catalog.
    Degrade,
}

impl FromStr for LoadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" => Ok(LoadPolicy::FailFast),
            "degrade" => Ok(LoadPolicy::Degrade),
            other => Err(format!("expected 'fail_fast' or 'degrade', got '{other}'")),
        }
    }
}

impl fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadPolicy::FailFast => f.write_str("fail_fast"),
            LoadPolicy::Degrade => f.write_str("degrade"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open jobs file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read jobs CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Distinct job records in first-seen order, indexed by lower-cased title.
#[derive(Debug, Default)]
pub struct JobCatalog {
    records: Vec<JobRecord>,
    index: HashMap<String, usize>,
}

impl JobCatalog {
    /// Parses CSV with a header row. The first row for a title wins (titles compared
    /// case-insensitively). Rows without a title or that fail to decode are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        // Fail on an unreadable header row rather than loading nothing.
        reader.headers()?;

        let mut catalog = JobCatalog::default();
        for (line, row) in reader.deserialize::<JobRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping malformed jobs CSV row {}: {e}", line + 2);
                    continue;
                }
            };
            match row.into_record() {
                Some(record) => catalog.insert(record),
                None => warn!("Skipping jobs CSV row {} without a job_title", line + 2),
            }
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file)?;
        info!("Loaded {} job(s) from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Loads the catalog, applying `policy` when loading fails.
    pub fn load_with_policy(path: &Path, policy: LoadPolicy) -> Result<Self, CatalogError> {
        match (Self::load(path), policy) {
            (Ok(catalog), _) => Ok(catalog),
            (Err(e), LoadPolicy::FailFast) => Err(e),
            (Err(e), LoadPolicy::Degrade) => {
                error!("{e}; serving zero jobs");
                Ok(Self::default())
            }
        }
    }

    fn insert(&mut self, record: JobRecord) {
        let key = record.title.to_lowercase();
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
    }

    pub fn find(&self, title: &str) -> Option<&JobRecord> {
        self.index
            .get(&title.to_lowercase())
            .map(|&i| &self.records[i])
    }

    pub fn all(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
