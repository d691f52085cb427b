// SPDX-License-Identifier: MIT

//! Environment-driven configuration

use std::path::PathBuf;

use crate::intake::error::IntakeError;

pub const ENV_SESSION_TTL: &str = "INTAKE_SESSION_TTL_SECS";
pub const ENV_SURVEY_DIR: &str = "INTAKE_SURVEY_DIR";

/// One day
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
pub const DEFAULT_SURVEY_DIR: &str = "surveys";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Lifetime of a stored run snapshot
    pub session_ttl_secs: u64,
    /// Where survey definitions are looked up by name
    pub survey_dir: PathBuf,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            survey_dir: PathBuf::from(DEFAULT_SURVEY_DIR),
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, IntakeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IntakeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SESSION_TTL) {
            config.session_ttl_secs = raw.trim().parse().map_err(|_| {
                IntakeError::config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_SESSION_TTL, raw
                ))
            })?;
        }

        if let Some(dir) = lookup(ENV_SURVEY_DIR) {
            if dir.trim().is_empty() {
                return Err(IntakeError::config(format!("{} is empty", ENV_SURVEY_DIR)));
            }
            config.survey_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Resolve a survey argument: an existing path is used as-is, otherwise
    /// it is looked up in the survey directory with a yaml, yml or json
    /// extension
    pub fn survey_path(&self, survey: &str) -> PathBuf {
        let direct = PathBuf::from(survey);
        if direct.exists() {
            return direct;
        }
        ["yaml", "yml", "json"]
            .iter()
            .map(|ext| self.survey_dir.join(format!("{}.{}", survey, ext)))
            .find(|candidate| candidate.exists())
            .unwrap_or(direct)
    }
}
