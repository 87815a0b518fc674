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

//! Catalog construction from the raw collection.
//!
//! The song length document drives the build: every tune it introduces is
//! decoded from its file, given one song length slot per song, and appended
//! in encounter order. That order is the canonical catalog order.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::info;

use crate::{
    error::{CatalogError, Result},
    hvsc::{
        header::read_sid_header,
        releases::{ReleaseProvider, cross_reference},
        songlengths::{SongLengthEntry, SongLengths},
        stil::read_stil,
        years::year_range,
    },
    model::{Catalog, SidTune},
};

/// Location of the song length document, relative to the collection root.
pub(crate) const SONG_LENGTHS_FILE: &str = "DOCUMENTS/Songlengths.txt";

/// Builds a full catalog from the collection at `hvsc_base`, then attaches
/// the STIL commentary and the releases supplied by `provider`.
///
/// # Errors
///
/// Returns an error if the song length document, the STIL document or any
/// tune file named cannot be read, or if the provider fails.
pub(crate) fn build_catalog(
    hvsc_base: &Path,
    release: u32,
    provider: &dyn ReleaseProvider,
) -> Result<Catalog> {
    let doc_path = hvsc_base.join(SONG_LENGTHS_FILE);
    let file = File::open(&doc_path).map_err(|e| CatalogError::io(&doc_path, e))?;

    info!("Building tunes index from {}", doc_path.display());

    let mut tunes = Vec::new();
    for entry in SongLengths::new(BufReader::new(file)) {
        let entry = entry.map_err(|e| CatalogError::io(&doc_path, e))?;
        tunes.push(build_tune(hvsc_base, entry)?);
    }

    let mut catalog = Catalog::new(tunes, release);
    read_stil(hvsc_base, &mut catalog)?;
    cross_reference(&mut catalog, provider.releases()?);

    info!("Built index of {} tunes", catalog.len());

    Ok(catalog)
}

/// Decodes the tune named by a song length entry and derives its fields.
fn build_tune(hvsc_base: &Path, entry: SongLengthEntry) -> Result<SidTune> {
    let header = read_sid_header(&tune_file_path(hvsc_base, &entry.path))?;

    // Lengths beyond the song count are dropped, missing ones stay zero.
    let mut song_lengths = vec![Duration::ZERO; usize::from(header.songs)];
    for (slot, length) in song_lengths.iter_mut().zip(entry.lengths) {
        *slot = length;
    }

    let (year_min, year_max) = year_range(&header.released);

    Ok(SidTune {
        index: 0,
        path: entry.path,
        header,
        song_lengths,
        year_min,
        year_max,
        releases: Vec::new(),
        stil: String::new(),
    })
}

/// Resolves a collection-relative tune path below the collection root.
pub(crate) fn tune_file_path(hvsc_base: &Path, path: &str) -> PathBuf {
    hvsc_base.join(path.trim_start_matches('/'))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;

    use super::*;
    use crate::{
        hvsc::{header::test_header_bytes, releases::NoReleases, stil::STIL_FILE},
        model::Release,
    };

    /// Writes a tune file into a test collection.
    pub(crate) fn write_tune(root: &Path, path: &str, name: &str, released: &str, songs: u16) {
        let file = tune_file_path(root, path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, test_header_bytes(name, "Rob Hubbard", released, songs)).unwrap();
    }

    /// Creates a small collection with song length and STIL documents.
    pub(crate) fn test_collection() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write_tune(root, "/MUSICIANS/H/Hubbard_Rob/Commando.sid", "Commando", "1985 Elite", 3);
        write_tune(root, "/MUSICIANS/H/Hubbard_Rob/Monty_on_the_Run.sid", "Monty on the Run", "1985 Gremlin", 1);
        write_tune(root, "/MUSICIANS/H/Hubbard_Rob/Delta.sid", "Delta", "1987-88 Thalamus", 12);

        fs::create_dir_all(root.join("DOCUMENTS")).unwrap();
        fs::write(
            root.join(SONG_LENGTHS_FILE),
            "\
; /MUSICIANS/H/Hubbard_Rob/Commando.sid
4:51 0:05
; /MUSICIANS/H/Hubbard_Rob/Monty_on_the_Run.sid
5:55
; /MUSICIANS/H/Hubbard_Rob/Delta.sid
11:44 0:56 0:33
",
        )
        .unwrap();
        fs::write(
            root.join(STIL_FILE),
            "\
/MUSICIANS/H/Hubbard_Rob/
COMMENT: Directory notes.

/MUSICIANS/H/Hubbard_Rob/Delta.sid
COMMENT: Inspired by Philip Glass.
",
        )
        .unwrap();

        dir
    }

    struct FixedReleases(Vec<Release>);

    impl ReleaseProvider for FixedReleases {
        fn releases(&self) -> Result<Vec<Release>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_build_in_encounter_order() {
        let dir = test_collection();

        let catalog = build_catalog(dir.path(), 80, &NoReleases).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.release(), 80);
        let names: Vec<&str> = catalog.tunes().iter().map(|t| t.title()).collect();
        assert_eq!(names, vec!["Commando", "Monty on the Run", "Delta"]);
        for (pos, tune) in catalog.tunes().iter().enumerate() {
            assert_eq!(tune.index, pos);
            assert_eq!(tune.song_lengths.len(), usize::from(tune.header.songs));
        }
    }

    #[test]
    fn test_missing_lengths_are_zero() {
        let dir = test_collection();

        let catalog = build_catalog(dir.path(), 80, &NoReleases).unwrap();
        let commando = catalog.get(0).unwrap();

        assert_eq!(
            commando.song_lengths,
            vec![Duration::from_secs(291), Duration::from_secs(5), Duration::ZERO]
        );
    }

    #[test]
    fn test_years_are_derived() {
        let dir = test_collection();

        let catalog = build_catalog(dir.path(), 80, &NoReleases).unwrap();

        let monty = catalog.get(1).unwrap();
        assert_eq!((monty.year_min, monty.year_max), (1985, 1985));
        let delta = catalog.get(2).unwrap();
        assert_eq!((delta.year_min, delta.year_max), (1987, 1988));
    }

    #[test]
    fn test_stil_is_attached() {
        let dir = test_collection();

        let catalog = build_catalog(dir.path(), 80, &NoReleases).unwrap();

        assert_eq!(catalog.get(2).unwrap().stil, "COMMENT: Inspired by Philip Glass.");
        assert!(catalog.get(0).unwrap().stil.is_empty());
    }

    #[test]
    fn test_releases_are_attached() {
        let dir = test_collection();
        let provider = FixedReleases(vec![Release {
            id: 3,
            name: "Hubbard Hits".to_string(),
            paths: vec![
                "/MUSICIANS/H/Hubbard_Rob/Delta.sid".to_string(),
                "/MUSICIANS/X/Nobody/Gone.sid".to_string(),
            ],
            ..Release::default()
        }]);

        let catalog = build_catalog(dir.path(), 80, &provider).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(2).unwrap().releases[0].name, "Hubbard Hits");
        assert!(catalog.get(0).unwrap().releases.is_empty());
    }

    #[test]
    fn test_missing_tune_file_fails() {
        let dir = test_collection();
        fs::remove_file(tune_file_path(dir.path(), "/MUSICIANS/H/Hubbard_Rob/Delta.sid")).unwrap();

        let err = build_catalog(dir.path(), 80, &NoReleases).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_missing_song_length_document_fails() {
        let dir = tempfile::tempdir().unwrap();

        let err = build_catalog(dir.path(), 80, &NoReleases).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
