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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, the decoded
//! tune header, the catalogued tune and the releases cross-referenced onto
//! tunes. These types are always fully populated: default elision is a
//! concern of the snapshot format only and never shows up here.

pub(crate) mod catalog;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub(crate) use catalog::Catalog;

/// Placeholder stored in header text fields when a value is unknown.
pub(crate) const DEFAULT_TEXT: &str = "<?>";
pub(crate) const DEFAULT_MAGIC_ID: &str = "PSID";
pub(crate) const DEFAULT_VERSION: u16 = 2;
pub(crate) const DEFAULT_DATA_OFFSET: u16 = 124;
pub(crate) const DEFAULT_SONGS: u16 = 1;
pub(crate) const DEFAULT_START_SONG: u16 = 1;

/// The decoded 124-byte prefix of a tune file.
///
/// Text fields hold single-byte characters, each byte of the file mapped to
/// the code point of the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SidHeader {
    pub(crate) magic_id: String,
    pub(crate) version: u16,
    pub(crate) data_offset: u16,
    pub(crate) load_address: u16,
    pub(crate) init_address: u16,
    pub(crate) play_address: u16,
    pub(crate) songs: u16,
    pub(crate) start_song: u16,
    pub(crate) speed: u32,
    pub(crate) name: String,
    pub(crate) author: String,
    pub(crate) released: String,
    pub(crate) flags: u16,
    pub(crate) start_page: u8,
    pub(crate) page_length: u8,
    pub(crate) sid2_address: Option<u16>,
    pub(crate) sid3_address: Option<u16>,
}

impl Default for SidHeader {
    fn default() -> Self {
        Self {
            magic_id: DEFAULT_MAGIC_ID.to_string(),
            version: DEFAULT_VERSION,
            data_offset: DEFAULT_DATA_OFFSET,
            load_address: 0,
            init_address: 0,
            play_address: 0,
            songs: DEFAULT_SONGS,
            start_song: DEFAULT_START_SONG,
            speed: 0,
            name: DEFAULT_TEXT.to_string(),
            author: DEFAULT_TEXT.to_string(),
            released: DEFAULT_TEXT.to_string(),
            flags: 0,
            start_page: 0,
            page_length: 0,
            sid2_address: None,
            sid3_address: None,
        }
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SidTune {
    /// Position in the catalog, reassigned whenever a catalog is assembled.
    pub(crate) index: usize,
    /// Collection-relative path, unique within a catalog.
    pub(crate) path: String,
    pub(crate) header: SidHeader,
    /// One entry per song; a zero duration means the length is unknown.
    pub(crate) song_lengths: Vec<Duration>,
    /// Earliest year mentioned in `header.released`, zero if none.
    pub(crate) year_min: u16,
    /// Latest year mentioned in `header.released`, zero if none.
    pub(crate) year_max: u16,
    pub(crate) releases: Vec<ReleaseRef>,
    /// Commentary from the STIL document, empty if the tune has none.
    pub(crate) stil: String,
}

impl SidTune {
    pub(crate) fn title(&self) -> &str {
        &self.header.name
    }

    pub(crate) fn author(&self) -> &str {
        &self.header.author
    }

    /// Length of the given 1-based song, if known.
    pub(crate) fn song_length(&self, song: u16) -> Option<Duration> {
        let idx = usize::from(song).checked_sub(1)?;
        self.song_lengths.get(idx).copied().filter(|d| !d.is_zero())
    }

    /// Attaches a release, ignoring one already attached.
    pub(crate) fn add_release(&mut self, release: ReleaseRef) {
        if !self.releases.iter().any(|r| r.id == release.id) {
            self.releases.push(release);
        }
    }
}

/// A curated release as supplied by a release provider, listing the paths of
/// the tunes it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct Release {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) group: String,
    pub(crate) year: u16,
    pub(crate) paths: Vec<String>,
}

impl Release {
    /// Splits the release into its reference and its tune paths.
    pub(crate) fn into_parts(self) -> (ReleaseRef, Vec<String>) {
        let reference = ReleaseRef {
            id: self.id,
            name: self.name,
            group: self.group,
            year: self.year,
        };
        (reference, self.paths)
    }
}

/// A release attached to a tune after cross-referencing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct ReleaseRef {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) group: String,
    pub(crate) year: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_length_is_one_based() {
        let tune = SidTune {
            song_lengths: vec![Duration::from_secs(90), Duration::ZERO],
            ..SidTune::default()
        };

        assert_eq!(tune.song_length(1), Some(Duration::from_secs(90)));
        assert_eq!(tune.song_length(2), None);
        assert_eq!(tune.song_length(0), None);
        assert_eq!(tune.song_length(3), None);
    }

    #[test]
    fn test_add_release_is_a_set() {
        let mut tune = SidTune::default();
        let release = ReleaseRef {
            id: 42,
            name: "Demo".to_string(),
            ..ReleaseRef::default()
        };

        tune.add_release(release.clone());
        tune.add_release(release);

        assert_eq!(tune.releases.len(), 1);
    }

    #[test]
    fn test_header_defaults() {
        let header = SidHeader::default();
        assert_eq!(header.magic_id, "PSID");
        assert_eq!(header.version, 2);
        assert_eq!(header.songs, 1);
        assert_eq!(header.name, "<?>");
        assert_eq!(header.sid2_address, None);
    }
}
