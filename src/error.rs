// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types for the tune catalog.
//!
//! Whole-document failures (unreadable collection files, a corrupt snapshot,
//! a failed download) are reported as [`CatalogError`]. Problems with single
//! records, such as an unparseable song length or a release path that names
//! no known tune, are not errors: they are logged and defaulted where they
//! occur.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    /// A collection document or tune file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A tune file ended before the full header could be read.
    #[error("{} is too short for a tune header: {found} of {expected} bytes", path.display())]
    ShortHeader {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// The snapshot exists but could not be decompressed or parsed.
    #[error("tune snapshot {} is corrupt: {reason}", path.display())]
    CorruptSnapshot { path: PathBuf, reason: String },

    /// The release document could not be parsed.
    #[error("release list {} is invalid: {reason}", path.display())]
    InvalidReleases { path: PathBuf, reason: String },

    /// The version marker document holds no release number.
    #[error("unable to detect collection version from {}", path.display())]
    VersionNotFound { path: PathBuf },

    /// Downloading a prebuilt snapshot failed.
    #[error("error while downloading {url}: {reason}")]
    Download { url: String, reason: String },

    /// The catalog could not be encoded for persisting.
    #[error("failed to encode tune snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, CatalogError>;
