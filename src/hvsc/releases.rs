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

//! Release cross-referencing.
//!
//! Releases come from an external [`ReleaseProvider`], each listing the paths
//! of the tunes it contains. Cross-referencing resolves those paths against
//! the catalog and attaches the release to every tune found. The path lists
//! are dropped afterwards.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    error::{CatalogError, Result},
    model::{Catalog, Release},
};

/// Name of the release document in the data directory.
pub(crate) const RELEASES_FILE: &str = "releases.json";

/// A read-only source of releases.
pub(crate) trait ReleaseProvider {
    /// # Errors
    ///
    /// Returns an error if the releases exist but cannot be read.
    fn releases(&self) -> Result<Vec<Release>>;
}

/// Provides no releases at all.
#[cfg(test)]
pub(crate) struct NoReleases;

#[cfg(test)]
impl ReleaseProvider for NoReleases {
    fn releases(&self) -> Result<Vec<Release>> {
        Ok(Vec::new())
    }
}

/// Reads releases from a JSON array of release records. A missing document
/// provides no releases.
pub(crate) struct JsonReleaseProvider {
    path: PathBuf,
}

impl JsonReleaseProvider {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(RELEASES_FILE))
    }
}

impl ReleaseProvider for JsonReleaseProvider {
    fn releases(&self) -> Result<Vec<Release>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No release list at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(CatalogError::io(&self.path, e)),
        };

        serde_json::from_slice(&data).map_err(|e| CatalogError::InvalidReleases {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// Outcome of a cross-reference pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CrossReference {
    pub(crate) attached: usize,
    pub(crate) unknown: usize,
}

/// Attaches every release to the tunes it lists.
///
/// Paths that match no tune are logged and skipped, they never stop the pass.
pub(crate) fn cross_reference(catalog: &mut Catalog, releases: Vec<Release>) -> CrossReference {
    let mut outcome = CrossReference::default();

    for release in releases {
        let (reference, paths) = release.into_parts();
        for path in paths {
            if catalog.attach_release(&path, &reference) {
                outcome.attached += 1;
            } else {
                warn!("Unknown path: {}", path);
                outcome.unknown += 1;
            }
        }
    }

    info!(
        "Cross-referenced releases: {} attached, {} unknown paths",
        outcome.attached, outcome.unknown
    );

    outcome
}
