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

//! Compact catalog snapshots.
//!
//! A snapshot is a pretty-printed JSON array of tune records, gzip
//! compressed. To keep it small, fields holding their usual value are left
//! out of the record entirely:
//!
//! | field                        | omitted when               |
//! |------------------------------|----------------------------|
//! | `YearMax`                    | equal to `YearMin`         |
//! | `Header.MagicID`             | `"PSID"`                   |
//! | `Header.Version`             | `2`                        |
//! | `Header.DataOffset`          | `124`                      |
//! | `Header.Songs`               | `1`                        |
//! | `Header.StartSong`           | `1`                        |
//! | `Header.Name/Author/Released`| `"<?>"`                    |
//! | `Header.Sid2Address/Sid3Address` | absent                 |
//! | `Releases`                   | empty                      |
//! | `STIL`                       | empty                      |
//!
//! Elision works on the [`TuneRecord`] copies made while saving, the catalog
//! itself is never touched. Loading restores every omitted field and keeps
//! every stored one, zeros included.
//!
//! Snapshots written by older tools carry an `Index` in each record and store
//! defaults as zero values instead of omitting them. Only in such records are
//! zero numbers, an empty magic identifier and a zero `YearMax` read as
//! defaults.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
    time::Duration,
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{CatalogError, Result},
    model::{
        Catalog, DEFAULT_DATA_OFFSET, DEFAULT_MAGIC_ID, DEFAULT_SONGS, DEFAULT_START_SONG,
        DEFAULT_TEXT, DEFAULT_VERSION, ReleaseRef, SidHeader, SidTune,
    },
};

/// File name of the snapshot in the data directory.
pub(crate) const SNAPSHOT_FILE: &str = "tunes.json.gz";

/// Persisted form of a [`SidTune`]. The position is never stored.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct TuneRecord {
    /// Only present in records written by older tools.
    #[serde(skip_serializing)]
    index: Option<usize>,
    path: String,
    header: HeaderRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    song_lengths: Vec<u64>,
    year_min: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    year_max: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    releases: Vec<ReleaseRef>,
    #[serde(rename = "STIL", skip_serializing_if = "String::is_empty")]
    stil: String,
}

/// Persisted form of a [`SidHeader`].
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct HeaderRecord {
    #[serde(rename = "MagicID", skip_serializing_if = "Option::is_none")]
    magic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_offset: Option<u16>,
    load_address: u16,
    init_address: u16,
    play_address: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    songs: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_song: Option<u16>,
    speed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    released: Option<String>,
    flags: u16,
    start_page: u8,
    page_length: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    sid2_address: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sid3_address: Option<u16>,
}

fn unless<T: PartialEq>(value: T, default: T) -> Option<T> {
    (value != default).then_some(value)
}

fn unless_text(value: &str, default: &str) -> Option<String> {
    unless(value, default).map(str::to_string)
}

/// A stored number, or `default` when omitted. Legacy records also use zero
/// for the default.
fn restore_number(value: Option<u16>, default: u16, legacy: bool) -> u16 {
    match value {
        Some(0) if legacy => default,
        Some(v) => v,
        None => default,
    }
}

fn restore_address(value: Option<u16>, legacy: bool) -> Option<u16> {
    value.filter(|&a| !(legacy && a == 0))
}

impl From<&SidHeader> for HeaderRecord {
    fn from(h: &SidHeader) -> Self {
        Self {
            magic_id: unless_text(&h.magic_id, DEFAULT_MAGIC_ID),
            version: unless(h.version, DEFAULT_VERSION),
            data_offset: unless(h.data_offset, DEFAULT_DATA_OFFSET),
            load_address: h.load_address,
            init_address: h.init_address,
            play_address: h.play_address,
            songs: unless(h.songs, DEFAULT_SONGS),
            start_song: unless(h.start_song, DEFAULT_START_SONG),
            speed: h.speed,
            name: unless_text(&h.name, DEFAULT_TEXT),
            author: unless_text(&h.author, DEFAULT_TEXT),
            released: unless_text(&h.released, DEFAULT_TEXT),
            flags: h.flags,
            start_page: h.start_page,
            page_length: h.page_length,
            sid2_address: h.sid2_address,
            sid3_address: h.sid3_address,
        }
    }
}

impl HeaderRecord {
    fn restore(self, legacy: bool) -> SidHeader {
        SidHeader {
            magic_id: self
                .magic_id
                .filter(|m| !(legacy && m.is_empty()))
                .unwrap_or_else(|| DEFAULT_MAGIC_ID.to_string()),
            version: restore_number(self.version, DEFAULT_VERSION, legacy),
            data_offset: restore_number(self.data_offset, DEFAULT_DATA_OFFSET, legacy),
            load_address: self.load_address,
            init_address: self.init_address,
            play_address: self.play_address,
            songs: restore_number(self.songs, DEFAULT_SONGS, legacy),
            start_song: restore_number(self.start_song, DEFAULT_START_SONG, legacy),
            speed: self.speed,
            name: self.name.unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            author: self.author.unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            released: self.released.unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            flags: self.flags,
            start_page: self.start_page,
            page_length: self.page_length,
            sid2_address: restore_address(self.sid2_address, legacy),
            sid3_address: restore_address(self.sid3_address, legacy),
        }
    }
}

impl From<&SidTune> for TuneRecord {
    fn from(tune: &SidTune) -> Self {
        Self {
            index: None,
            path: tune.path.clone(),
            header: HeaderRecord::from(&tune.header),
            song_lengths: tune
                .song_lengths
                .iter()
                .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
                .collect(),
            year_min: tune.year_min,
            year_max: unless(tune.year_max, tune.year_min),
            releases: tune.releases.clone(),
            stil: tune.stil.clone(),
        }
    }
}

impl TuneRecord {
    /// Restores every omitted field. The index is left for the catalog to
    /// assign.
    pub(crate) fn restore(self) -> SidTune {
        let legacy = self.index.is_some();
        let header = self.header.restore(legacy);

        let mut song_lengths: Vec<Duration> = self
            .song_lengths
            .into_iter()
            .map(Duration::from_nanos)
            .collect();
        song_lengths.resize(usize::from(header.songs), Duration::ZERO);

        SidTune {
            index: 0,
            path: self.path,
            header,
            song_lengths,
            year_min: self.year_min,
            year_max: restore_number(self.year_max, self.year_min, legacy),
            releases: self.releases,
            stil: self.stil,
        }
    }
}

/// Writes `catalog` to a snapshot at `path`.
///
/// The snapshot is written beside `path` first and moved into place once
/// complete, so an interrupted save never leaves a truncated snapshot.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be encoded or written.
pub(crate) fn save_snapshot(catalog: &Catalog, path: &Path) -> Result<()> {
    let records: Vec<TuneRecord> = catalog.tunes().iter().map(TuneRecord::from).collect();

    let tmp_path = path.with_extension("gz.tmp");

    let result = write_records(&records, &tmp_path)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(|e| CatalogError::io(path, e)));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    info!("Saved index of {} tunes to {}", catalog.len(), path.display());

    Ok(())
}

fn write_records(records: &[TuneRecord], tmp_path: &Path) -> Result<()> {
    let file = File::create(tmp_path).map_err(|e| CatalogError::io(tmp_path, e))?;

    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer_pretty(&mut encoder, records).map_err(|e| {
        if e.is_io() {
            CatalogError::io(tmp_path, e.into())
        } else {
            CatalogError::Serialize(e)
        }
    })?;

    encoder
        .finish()
        .and_then(|mut writer| writer.flush())
        .map_err(|e| CatalogError::io(tmp_path, e))
}

/// Reads a snapshot from `path` into a catalog for collection `release`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or a corruption error if it
/// cannot be decompressed or parsed.
pub(crate) fn load_snapshot(path: &Path, release: u32) -> Result<Catalog> {
    let data = fs::read(path).map_err(|e| CatalogError::io(path, e))?;

    let records: Vec<TuneRecord> =
        serde_json::from_reader(GzDecoder::new(data.as_slice())).map_err(|e| {
            CatalogError::CorruptSnapshot {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

    let tunes = records.into_iter().map(TuneRecord::restore).collect();
    let catalog = Catalog::new(tunes, release);

    info!("Read index of {} tunes from {}", catalog.len(), path.display());

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn tune(path: &str, released: &str, years: (u16, u16)) -> SidTune {
        SidTune {
            index: 0,
            path: path.to_string(),
            header: SidHeader {
                name: "Delta".to_string(),
                author: "Rob Hubbard".to_string(),
                released: released.to_string(),
                init_address: 0x1000,
                play_address: 0x1003,
                ..SidHeader::default()
            },
            song_lengths: vec![Duration::from_secs(704)],
            year_min: years.0,
            year_max: years.1,
            releases: Vec::new(),
            stil: String::new(),
        }
    }

    fn unusual_tune() -> SidTune {
        SidTune {
            index: 0,
            path: "/GAMES/S-Z/Unusual.sid".to_string(),
            header: SidHeader {
                magic_id: "RSID".to_string(),
                version: 3,
                data_offset: 0x0076,
                load_address: 0x0801,
                songs: 3,
                start_song: 2,
                speed: 0xffff_ffff,
                name: DEFAULT_TEXT.to_string(),
                author: String::new(),
                released: "1991 Nobody".to_string(),
                flags: 0x24,
                start_page: 0x04,
                page_length: 0x10,
                sid2_address: Some(0xD420),
                sid3_address: Some(0xDE00),
                ..SidHeader::default()
            },
            song_lengths: vec![Duration::from_secs(10), Duration::ZERO, Duration::from_secs(99)],
            year_min: 1991,
            year_max: 1991,
            releases: vec![ReleaseRef {
                id: 9,
                name: "Compilation".to_string(),
                group: "Crest".to_string(),
                year: 1992,
            }],
            stil: "COMMENT: Written for a diskmag.\n         Never released.".to_string(),
        }
    }

    fn zero_tune() -> SidTune {
        SidTune {
            path: "/DEMOS/0-9/Empty.sid".to_string(),
            header: SidHeader {
                version: 0,
                data_offset: 0,
                songs: 0,
                start_song: 0,
                ..SidHeader::default()
            },
            ..SidTune::default()
        }
    }

    fn snapshot_json(path: &Path) -> serde_json::Value {
        let mut json = String::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut json)
            .unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_elide_then_restore_is_identity() {
        for original in [
            tune("/A.sid", "1987 Thalamus", (1987, 1987)),
            unusual_tune(),
            zero_tune(),
        ] {
            let restored = TuneRecord::from(&original).restore();
            assert_eq!(restored, original);
        }
    }

    #[test]
    fn test_defaults_are_omitted() {
        let record = TuneRecord::from(&tune("/A.sid", "1987", (1987, 1987)));

        assert_eq!(record.year_max, None);
        assert_eq!(record.header.magic_id, None);
        assert_eq!(record.header.version, None);
        assert_eq!(record.header.data_offset, None);
        assert_eq!(record.header.songs, None);
        assert_eq!(record.header.start_song, None);
        assert_eq!(record.header.released.as_deref(), Some("1987"));

        let restored = record.restore();
        assert_eq!((restored.year_min, restored.year_max), (1987, 1987));
    }

    #[test]
    fn test_elision_does_not_touch_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(vec![tune("/A.sid", "1987", (1987, 1987))], 80);

        save_snapshot(&catalog, &dir.path().join(SNAPSHOT_FILE)).unwrap();

        let tune = catalog.get(0).unwrap();
        assert_eq!(tune.year_max, 1987);
        assert_eq!(tune.header.magic_id, "PSID");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        let catalog = Catalog::new(
            vec![
                tune("/A.sid", "1987-88 Thalamus", (1987, 1988)),
                unusual_tune(),
                tune("/B.sid", DEFAULT_TEXT, (0, 0)),
            ],
            80,
        );

        save_snapshot(&catalog, &path).unwrap();
        let loaded = load_snapshot(&path, 80).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.tunes(), catalog.tunes());
        assert_eq!(loaded.index_of("/B.sid"), Some(2));
        assert!(!dir.path().join("tunes.json.gz.tmp").exists());
    }

    #[test]
    fn test_persisted_document_omits_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        let catalog = Catalog::new(vec![tune("/A.sid", "1987", (1987, 1987))], 80);

        save_snapshot(&catalog, &path).unwrap();

        let json = snapshot_json(&path);
        let record = &json[0];
        assert_eq!(record["Path"], "/A.sid");
        assert_eq!(record["YearMin"], 1987);
        assert!(record.get("YearMax").is_none());
        assert!(record.get("Index").is_none());
        assert!(record.get("Releases").is_none());
        assert!(record["Header"].get("MagicID").is_none());
        assert!(record["Header"].get("Songs").is_none());
        assert_eq!(record["SongLengths"][0], 704_000_000_000u64);
    }

    #[test]
    fn test_zero_values_are_kept() {
        let record = TuneRecord::from(&zero_tune());

        assert_eq!(record.header.songs, Some(0));
        assert_eq!(record.header.start_song, Some(0));
        assert!(record.song_lengths.is_empty());

        let restored = record.restore();
        assert_eq!(restored.header.version, 0);
        assert_eq!(restored.header.data_offset, 0);
        assert_eq!(restored.header.songs, 0);
        assert_eq!(restored.header.start_song, 0);
        assert!(restored.song_lengths.is_empty());
    }

    #[test]
    fn test_save_and_load_zero_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        let catalog = Catalog::new(vec![zero_tune()], 80);

        save_snapshot(&catalog, &path).unwrap();
        let loaded = load_snapshot(&path, 80).unwrap();

        assert_eq!(loaded.tunes(), catalog.tunes());
    }

    #[test]
    fn test_load_explicit_zeros() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        let json = r#"[
          {
            "Path": "/A.sid",
            "Header": { "MagicID": "", "Songs": 0, "StartSong": 0 },
            "YearMin": 0,
            "YearMax": 0
          }
        ]"#;
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let catalog = load_snapshot(&path, 80).unwrap();
        let tune = catalog.get(0).unwrap();

        assert_eq!(tune.header.magic_id, "");
        assert_eq!(tune.header.version, 2);
        assert_eq!(tune.header.songs, 0);
        assert_eq!(tune.header.start_song, 0);
        assert!(tune.song_lengths.is_empty());
    }

    #[test]
    fn test_stil_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        let catalog = Catalog::new(vec![unusual_tune(), tune("/A.sid", "1987", (1987, 1987))], 80);

        save_snapshot(&catalog, &path).unwrap();

        let json = snapshot_json(&path);
        assert!(json[0]["STIL"].as_str().unwrap().starts_with("COMMENT:"));
        assert!(json[1].get("STIL").is_none());

        let loaded = load_snapshot(&path, 80).unwrap();
        assert_eq!(loaded.get(0).unwrap().stil, unusual_tune().stil);
    }

    #[test]
    fn test_failed_save_removes_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        fs::create_dir(&path).unwrap();
        let catalog = Catalog::new(vec![tune("/A.sid", "1987", (1987, 1987))], 80);

        let err = save_snapshot(&catalog, &path).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(!dir.path().join("tunes.json.gz.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_load_zero_valued_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        let json = r#"[
          {
            "Index": 17,
            "Path": "/A.sid",
            "Header": {
              "MagicID": "", "Version": 0, "DataOffset": 0, "Songs": 0, "StartSong": 0,
              "Name": "Delta", "Sid2Address": 0, "Sid3Address": 0
            },
            "SongLengths": [704000000000],
            "YearMin": 1987,
            "YearMax": 0
          }
        ]"#;
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let catalog = load_snapshot(&path, 71).unwrap();
        let tune = catalog.get(0).unwrap();

        assert_eq!(tune.index, 0);
        assert_eq!(tune.header.magic_id, "PSID");
        assert_eq!(tune.header.version, 2);
        assert_eq!(tune.header.data_offset, 124);
        assert_eq!(tune.header.songs, 1);
        assert_eq!(tune.header.start_song, 1);
        assert_eq!(tune.header.author, DEFAULT_TEXT);
        assert_eq!(tune.header.sid2_address, None);
        assert_eq!(tune.year_max, 1987);
        assert_eq!(tune.song_lengths, vec![Duration::from_secs(704)]);
    }

    #[test]
    fn test_load_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        fs::write(&path, b"definitely not gzip").unwrap();

        let err = load_snapshot(&path, 80).unwrap_err();

        assert!(matches!(err, CatalogError::CorruptSnapshot { .. }));
    }

    #[test]
    fn test_load_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_snapshot(&dir.path().join(SNAPSHOT_FILE), 80).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
