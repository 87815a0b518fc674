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

//! Tune collection indexing.
//!
//! This module turns a tune collection on disk into a [`Catalog`]. A catalog
//! is obtained in one of three ways:
//!
//! * **Load**: read the local snapshot.
//! * **Fetch then load**: with no local snapshot, download the prebuilt one
//!   for the detected collection release, then load it. This happens at most
//!   once per call; if the snapshot is still missing afterwards the load
//!   fails rather than fetching again.
//! * **Rebuild**: derive everything from the raw collection, attach STIL
//!   commentary, cross-reference releases and save a fresh snapshot.
//!
//! # Sub-modules
//!
//! * [`header`]: tune file header decoding.
//! * [`songlengths`]: song length document parsing.
//! * [`years`]: year extraction from release credits.
//! * [`stil`]: STIL commentary parsing.
//! * [`build`]: catalog construction.
//! * [`releases`]: release providers and cross-referencing.
//! * [`snapshot`]: compact snapshot persistence.
//! * [`fetch`]: version detection and snapshot download.
//! * [`filter`]: substring search over a catalog.

pub(crate) mod build;
pub(crate) mod fetch;
pub(crate) mod filter;
pub(crate) mod header;
pub(crate) mod releases;
pub(crate) mod snapshot;
pub(crate) mod songlengths;
pub(crate) mod stil;
pub(crate) mod years;

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    error::{CatalogError, Result},
    hvsc::releases::ReleaseProvider,
    model::Catalog,
};

/// Where a collection and its snapshot live.
#[derive(Debug, Clone)]
pub(crate) struct Collection {
    hvsc_base: PathBuf,
    data_dir: PathBuf,
    index_url: String,
}

impl Collection {
    pub(crate) fn new(
        hvsc_base: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        index_url: impl Into<String>,
    ) -> Self {
        Self {
            hvsc_base: hvsc_base.into(),
            data_dir: data_dir.into(),
            index_url: index_url.into(),
        }
    }

    pub(crate) fn hvsc_base(&self) -> &Path {
        &self.hvsc_base
    }

    pub(crate) fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(snapshot::SNAPSHOT_FILE)
    }

    /// Absolute location of a catalog tune path.
    pub(crate) fn tune_file(&self, path: &str) -> PathBuf {
        build::tune_file_path(&self.hvsc_base, path)
    }

    /// Loads the local snapshot, downloading it first if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the release cannot be detected, the download
    /// fails, or the snapshot is unreadable or corrupt.
    pub(crate) fn load_or_fetch(&self) -> Result<Catalog> {
        self.load_or_fetch_with(fetch::download_snapshot)
    }

    /// As [`Self::load_or_fetch`], with `download` retrieving `url` into the
    /// snapshot path.
    pub(crate) fn load_or_fetch_with<F>(&self, download: F) -> Result<Catalog>
    where
        F: FnOnce(&str, &Path) -> Result<u64>,
    {
        let release = fetch::detect_release(&self.hvsc_base)?;
        let path = self.snapshot_path();

        if !path.exists() {
            info!("No tunes index at {}", path.display());
            self.ensure_data_dir()?;
            download(&fetch::snapshot_url(&self.index_url, release), &path)?;
        }

        snapshot::load_snapshot(&path, release)
    }

    /// Builds a fresh catalog from the collection and saves it as the local
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or the snapshot
    /// cannot be written.
    pub(crate) fn rebuild(&self, provider: &dyn ReleaseProvider) -> Result<Catalog> {
        let release = fetch::detect_release(&self.hvsc_base)?;
        let catalog = build::build_catalog(&self.hvsc_base, release, provider)?;

        self.ensure_data_dir()?;
        snapshot::save_snapshot(&catalog, &self.snapshot_path())?;

        Ok(catalog)
    }

    fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| CatalogError::io(&self.data_dir, e))
    }
}
