// ABOUTME: Photo and barcode observations that trigger a nutrition resolution
// ABOUTME: Computes content-derived cache keys and GS1 region prefixes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::gs1;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Observation kind, used to select the resolution chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Photo of a plate or dish
    Photo,
    /// Scanned product barcode
    Barcode,
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo => f.write_str("photo"),
            Self::Barcode => f.write_str("barcode"),
        }
    }
}

/// Input to a resolution request, created per user action
///
/// Construct with [`Observation::photo`] or [`Observation::barcode`] so the
/// content hash and barcode normalization are always applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Photo observation
    Photo {
        /// Raw image bytes (JPEG/PNG as captured)
        image: Bytes,
        /// Lowercase hex SHA-256 of `image`
        content_hash: String,
    },
    /// Barcode observation
    Barcode {
        /// Normalized barcode (GTIN-13 where the code is a UPC-A/EAN-13/GTIN-14)
        code: String,
    },
}

impl Observation {
    /// Create a photo observation, hashing the image content
    pub fn photo(image: impl Into<Bytes>) -> Self {
        let image = image.into();
        let content_hash = hex::encode(Sha256::digest(&image));
        Self::Photo {
            image,
            content_hash,
        }
    }

    /// Create a barcode observation from a scanned code
    ///
    /// Whitespace and hyphens are stripped. A 12-digit UPC-A gains a leading
    /// zero and a 14-digit GTIN with indicator digit `0` drops it, so the same
    /// product scanned either way shares one cache key.
    #[must_use]
    pub fn barcode(code: &str) -> Self {
        let compact: String = code
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        let all_digits = !compact.is_empty() && compact.bytes().all(|b| b.is_ascii_digit());
        let code = match compact.len() {
            12 if all_digits => format!("0{compact}"),
            14 if all_digits && compact.starts_with('0') => compact[1..].to_owned(),
            _ => compact,
        };

        Self::Barcode { code }
    }

    /// Kind of this observation
    #[must_use]
    pub const fn kind(&self) -> ObservationKind {
        match self {
            Self::Photo { .. } => ObservationKind::Photo,
            Self::Barcode { .. } => ObservationKind::Barcode,
        }
    }

    /// Content reference: image hash or barcode
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::Photo { content_hash, .. } => content_hash,
            Self::Barcode { code } => code,
        }
    }

    /// Whether this observation carries anything to look up
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        match self {
            Self::Photo { image, .. } => !image.is_empty(),
            Self::Barcode { code } => !code.is_empty(),
        }
    }

    /// Stable cache key derived from observation content only
    #[must_use]
    pub fn cache_key(&self) -> ObservationKey {
        ObservationKey(format!("{}:{}", self.kind(), self.reference()))
    }

    /// GS1 prefix identifying the numbering region of a barcode
    ///
    /// Returns `None` for photos and for codes that are not EAN-8, GTIN-13 or GTIN-14.
    #[must_use]
    pub fn gs1_prefix(&self) -> Option<&str> {
        let Self::Barcode { code } = self else {
            return None;
        };
        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match code.len() {
            8 | 13 => code.get(..gs1::PREFIX_LEN),
            14 => code.get(1..=gs1::PREFIX_LEN),
            _ => None,
        }
    }
}

/// Cache key derived from observation content (`photo:<sha256>` or `barcode:<gtin>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationKey(String);

impl ObservationKey {
    /// Key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
