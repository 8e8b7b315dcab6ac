// ABOUTME: Per-user habitual portion entries and dish name normalization
// ABOUTME: Entries change only through confirmed history records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Habitual portion for one (user, dish) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationEntry {
    /// Most recently confirmed portion in grams
    pub usual_portion_grams: f64,
    /// Number of confirmations recorded
    pub scan_count: u32,
    /// Time of the latest confirmation
    pub last_seen: DateTime<Utc>,
}

impl PersonalizationEntry {
    /// First confirmation for a dish
    #[must_use]
    pub const fn first(portion_grams: f64, at: DateTime<Utc>) -> Self {
        Self {
            usual_portion_grams: portion_grams,
            scan_count: 1,
            last_seen: at,
        }
    }

    /// Apply a later confirmation: the latest deliberate choice replaces the old value
    #[must_use]
    pub const fn confirmed(self, portion_grams: f64, at: DateTime<Utc>) -> Self {
        Self {
            usual_portion_grams: portion_grams,
            scan_count: self.scan_count.saturating_add(1),
            last_seen: at,
        }
    }
}

/// Normalize a dish name for personalization lookups
///
/// Lowercases, replaces anything that is not a letter or digit with a space,
/// and collapses runs of whitespace, so `"Paneer  Butter-Masala"` and
/// `"paneer butter masala"` map to the same entry.
#[must_use]
pub fn normalize_dish_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
