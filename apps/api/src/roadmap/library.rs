//! Roadmap Library: the canonical roadmaps loaded from a keyed JSON document.
//!
//! The document maps lower-case job titles to roadmaps:
//! `{ "software engineer": [ {"stepId": 1, ...}, ... ], ... }`.
//! Which entry a job gets is decided by [`SelectionPolicy`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::roadmap::models::{Roadmap, RoadmapError};

/// Key of the roadmap served when no title-specific entry applies.
pub const FALLBACK_ROADMAP_KEY: &str = "software engineer";

/// How a job title is mapped to a canonical roadmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Every job gets the fallback roadmap. Per-job selection is not implemented yet;
    /// this is the behaviour clients currently depend on.
    #[default]
    Fixed,
    /// Look up the lower-cased title, then fall back.
    ByTitle,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(SelectionPolicy::Fixed),
            "by_title" => Ok(SelectionPolicy::ByTitle),
            other => Err(format!("expected 'fixed' or 'by_title', got '{other}'")),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Fixed => f.write_str("fixed"),
            SelectionPolicy::ByTitle => f.write_str("by_title"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read roadmap document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("roadmap document is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("roadmap '{key}' is invalid: {source}")]
    InvalidRoadmap {
        key: String,
        #[source]
        source: RoadmapError,
    },

    #[error("roadmap document has no 'software engineer' entry")]
    MissingFallback,
}

/// Immutable set of canonical roadmaps, shared by all requests.
#[derive(Debug)]
pub struct RoadmapLibrary {
    roadmaps: HashMap<String, Roadmap>,
    fallback: Roadmap,
    policy: SelectionPolicy,
}

impl RoadmapLibrary {
    pub fn from_json(json: &str, policy: SelectionPolicy) -> Result<Self, LibraryError> {
        let document: Map<String, Value> = serde_json::from_str(json)?;

        let mut roadmaps = HashMap::with_capacity(document.len());
        for (key, value) in document {
            let roadmap = Roadmap::from_value(value).map_err(|source| {
                LibraryError::InvalidRoadmap {
                    key: key.clone(),
                    source,
                }
            })?;
            roadmaps.insert(key.to_lowercase(), roadmap);
        }

        let fallback = roadmaps
            .get(FALLBACK_ROADMAP_KEY)
            .cloned()
            .ok_or(LibraryError::MissingFallback)?;

        Ok(Self {
            roadmaps,
            fallback,
            policy,
        })
    }

    pub fn load(path: &Path, policy: SelectionPolicy) -> Result<Self, LibraryError> {
        let json = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_json(&json, policy)?;
        info!(
            "Loaded {} roadmap(s) from {}",
            library.roadmaps.len(),
            path.display()
        );
        Ok(library)
    }

    /// The canonical roadmap for a job title under the active policy.
    pub fn select(&self, title: &str) -> &Roadmap {
        match self.policy {
            SelectionPolicy::Fixed => &self.fallback,
            SelectionPolicy::ByTitle => self
                .roadmaps
                .get(&title.to_lowercase())
                .unwrap_or(&self.fallback),
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }
}
