//! Grouping-code lookup table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::ChartError;
use super::types::{Classification, Masters};

/// Maps a grouping code to its minor head, major head and display names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupingClassifier {
    entries: HashMap<String, Classification>,
}

impl GroupingClassifier {
    /// Creates an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the classification for a grouping code.
    pub fn insert(&mut self, grouping_code: impl Into<String>, classification: Classification) {
        self.entries.insert(grouping_code.into(), classification);
    }

    /// Looks up a grouping code.
    #[must_use]
    pub fn get(&self, grouping_code: &str) -> Option<&Classification> {
        self.entries.get(grouping_code)
    }

    /// Number of known grouping codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no grouping codes are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the lookup table from chart masters.
    ///
    /// Each grouping is resolved through its minor head to its major head.
    ///
    /// # Errors
    ///
    /// Returns `ChartError` when a reference cannot be resolved or a
    /// grouping code is duplicated.
    pub fn from_masters(masters: &Masters) -> Result<Self, ChartError> {
        let majors: HashMap<&str, &str> = masters
            .major_heads
            .iter()
            .map(|m| (m.code.as_str(), m.name.as_str()))
            .collect();
        let minors: HashMap<&str, (&str, &str)> = masters
            .minor_heads
            .iter()
            .map(|m| (m.code.as_str(), (m.name.as_str(), m.major_head_code.as_str())))
            .collect();

        let mut classifier = Self::new();
        for grouping in &masters.groupings {
            let (minor_name, major_code) = minors
                .get(grouping.minor_head_code.as_str())
                .copied()
                .ok_or_else(|| ChartError::UnknownMinorHead {
                    grouping: grouping.code.clone(),
                    minor_head: grouping.minor_head_code.clone(),
                })?;
            let major_name =
                majors
                    .get(major_code)
                    .copied()
                    .ok_or_else(|| ChartError::UnknownMajorHead {
                        minor_head: grouping.minor_head_code.clone(),
                        major_head: major_code.to_string(),
                    })?;

            if classifier.get(&grouping.code).is_some() {
                return Err(ChartError::DuplicateGrouping(grouping.code.clone()));
            }

            classifier.insert(
                grouping.code.clone(),
                Classification {
                    grouping_name: grouping.name.clone(),
                    minor_head_code: grouping.minor_head_code.clone(),
                    minor_head_name: minor_name.to_string(),
                    major_head_code: major_code.to_string(),
                    major_head_name: major_name.to_string(),
                },
            );
        }

        Ok(classifier)
    }
}
