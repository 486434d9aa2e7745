// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information and peer protocol compatibility checks

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Semantic protocol version spoken by this miner
pub const VERSION_NUMBER: &str = "1.0.0";

/// Major version number
pub const VERSION_MAJOR: u64 = 1;

/// Minor version number
pub const VERSION_MINOR: u64 = 0;

/// Patch version number
pub const VERSION_PATCH: u64 = 0;

/// Synapse names this miner answers
pub const SUPPORTED_SYNAPSES: &[&str] = &["TextEmbeddingSynapse"];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Embedding Miner {}", VERSION_NUMBER)
}

/// Get version info for the health endpoint
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "synapses": SUPPORTED_SYNAPSES,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid component '{component}' in version '{version}'")]
    InvalidComponent { version: String, component: String },
}

/// Parse `major.minor.patch` into numeric components.
///
/// A leading `v` is accepted. Components are padded with zeros to length 3,
/// so `"1.2"` parses as `[1, 2, 0]`.
pub fn parse_version(version: &str) -> Result<Vec<u64>, VersionParseError> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(VersionParseError::Empty);
    }

    let mut parts = trimmed
        .split('.')
        .map(|component| {
            component
                .parse::<u64>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    version: version.to_string(),
                    component: component.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    while parts.len() < 3 {
        parts.push(0);
    }
    Ok(parts)
}

/// Compare two semantic version strings component by component.
///
/// Missing trailing components compare as zero on either side.
pub fn compare_version(left: &str, right: &str) -> Result<Ordering, VersionParseError> {
    let left = parse_version(left)?;
    let right = parse_version(right)?;
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

/// Non-fatal notice that a peer speaks a newer protocol than we do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionAdvisory {
    pub request_version: String,
    pub running_version: String,
}

impl fmt::Display for VersionAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Received request with version {}, is newer than miner running version {}. \
             You may need to update the repo and restart the miner.",
            self.request_version, self.running_version
        )
    }
}

/// Compare a request's declared version against the running version.
///
/// Never rejects anything. Malformed versions are treated as older and only
/// logged.
pub fn check(request_version: Option<&str>, running_version: &str) -> Option<VersionAdvisory> {
    let request_version = request_version?;

    match compare_version(request_version, running_version) {
        Ok(Ordering::Greater) => {
            let advisory = VersionAdvisory {
                request_version: request_version.to_string(),
                running_version: running_version.to_string(),
            };
            warn!("{}", advisory);
            Some(advisory)
        }
        Ok(_) => {
            debug!(
                "Request version {} not newer than running version {}, older version, no action",
                request_version, running_version
            );
            None
        }
        Err(e) => {
            warn!(
                "Could not parse request version '{}': {}. Treating as older",
                request_version, e
            );
            None
        }
    }
}

/// Version gate applied to every inbound request
#[derive(Debug, Clone)]
pub struct VersionGuard {
    running_version: String,
}

impl VersionGuard {
    pub fn new(running_version: impl Into<String>) -> Self {
        Self {
            running_version: running_version.into(),
        }
    }

    pub fn running_version(&self) -> &str {
        &self.running_version
    }

    pub fn check(&self, request_version: Option<&str>) -> Option<VersionAdvisory> {
        check(request_version, &self.running_version)
    }
}

impl Default for VersionGuard {
    fn default() -> Self {
        Self::new(VERSION_NUMBER)
    }
}
