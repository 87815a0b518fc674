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

//! The tune catalog.
//!
//! A [`Catalog`] is the canonical, ordered sequence of tunes. It is assembled
//! once per build or load and is read-only afterwards, apart from releases
//! being attached during a build. A rebuild produces a new catalog which
//! replaces the old one wholesale.

use std::collections::HashMap;

use tracing::warn;

use crate::model::{ReleaseRef, SidTune};

#[derive(Debug, Default)]
pub(crate) struct Catalog {
    tunes: Vec<SidTune>,
    positions: HashMap<String, usize>,
    release: u32,
}

impl Catalog {
    /// Assembles a catalog from tunes in canonical order.
    ///
    /// Every tune's index is reset to its position. Paths must be unique, a
    /// tune repeating an earlier path is dropped.
    pub(crate) fn new(tunes: Vec<SidTune>, release: u32) -> Self {
        let mut positions = HashMap::with_capacity(tunes.len());
        let mut unique = Vec::with_capacity(tunes.len());

        for mut tune in tunes {
            if positions.contains_key(&tune.path) {
                warn!("Dropping duplicate tune path: {}", tune.path);
                continue;
            }
            tune.index = unique.len();
            positions.insert(tune.path.clone(), tune.index);
            unique.push(tune);
        }

        Self {
            tunes: unique,
            positions,
            release,
        }
    }

    pub(crate) fn tunes(&self) -> &[SidTune] {
        &self.tunes
    }

    pub(crate) fn get(&self, index: usize) -> Option<&SidTune> {
        self.tunes.get(index)
    }

    /// Number of tunes in the catalog.
    pub(crate) fn len(&self) -> usize {
        self.tunes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tunes.is_empty()
    }

    /// The collection release number this catalog was built from.
    pub(crate) fn release(&self) -> u32 {
        self.release
    }

    /// Position of the tune with the given path.
    pub(crate) fn index_of(&self, path: &str) -> Option<usize> {
        self.positions.get(path).copied()
    }

    /// Attaches a release to the tune at `path`, returning `false` when no
    /// tune has that path.
    pub(crate) fn attach_release(&mut self, path: &str, release: &ReleaseRef) -> bool {
        match self.index_of(path).and_then(|idx| self.tunes.get_mut(idx)) {
            Some(tune) => {
                tune.add_release(release.clone());
                true
            }
            None => false,
        }
    }

    /// Sets the STIL commentary of the tune at `path`, returning `false` when
    /// no tune has that path.
    pub(crate) fn attach_stil(&mut self, path: &str, text: String) -> bool {
        match self.index_of(path).and_then(|idx| self.tunes.get_mut(idx)) {
            Some(tune) => {
                tune.stil = text;
                true
            }
            None => false,
        }
    }
}
