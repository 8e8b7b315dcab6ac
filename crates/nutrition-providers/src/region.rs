// ABOUTME: GS1 prefix filters deciding which barcodes a regional provider is authoritative for
// ABOUTME: Parses single prefixes ("890") and inclusive ranges ("300-379")
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use crate::models::Observation;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Set of GS1 prefix ranges
///
/// An empty filter matches every barcode, including codes without a
/// recognizable GS1 prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFilter {
    ranges: Vec<RangeInclusive<u16>>,
}

impl RegionFilter {
    /// Filter matching every barcode
    #[must_use]
    pub const fn any() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Filter matching the given ranges
    #[must_use]
    pub const fn from_ranges(ranges: Vec<RangeInclusive<u16>>) -> Self {
        Self { ranges }
    }

    /// Whether this filter restricts anything
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether the observation's GS1 prefix falls in one of the ranges
    ///
    /// Barcodes without a GS1 prefix only match an unrestricted filter.
    #[must_use]
    pub fn matches(&self, observation: &Observation) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        observation
            .gs1_prefix()
            .and_then(|prefix| prefix.parse::<u16>().ok())
            .is_some_and(|prefix| self.ranges.iter().any(|r| r.contains(&prefix)))
    }
}

impl FromStr for RegionFilter {
    type Err = AppError;

    /// Parse a comma-separated list such as `"890"` or `"300-379,890"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (start, end) = part.split_once('-').unwrap_or((part, part));
            let start = parse_prefix(start)?;
            let end = parse_prefix(end)?;
            if start > end {
                return Err(AppError::config(format!(
                    "GS1 prefix range '{part}' has start after end"
                )));
            }
            ranges.push(start..=end);
        }
        Ok(Self { ranges })
    }
}

fn parse_prefix(value: &str) -> Result<u16, AppError> {
    let value = value.trim();
    if value.len() != 3 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::config(format!(
            "GS1 prefix '{value}' must be three digits"
        )));
    }
    value
        .parse()
        .map_err(|_| AppError::config(format!("GS1 prefix '{value}' is not a number")))
}
