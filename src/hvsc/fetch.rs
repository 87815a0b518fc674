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

//! Prebuilt snapshot download.
//!
//! When no local snapshot exists, one matching the installed collection is
//! downloaded. The collection release is read from the version marker
//! document and substituted into the configured URL template.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::Path,
    sync::OnceLock,
    time::Duration,
};

use regex::Regex;
use tracing::info;

use crate::error::{CatalogError, Result};

/// Location of the version marker document, relative to the collection root.
pub(crate) const VERSION_FILE: &str = "DOCUMENTS/hv_sids.txt";

/// Placeholder in the URL template replaced by the release number.
pub(crate) const RELEASE_PLACEHOLDER: &str = "{release}";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn number_regex() -> &'static Regex {
    NUMBER_PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("Invalid number pattern"))
}

/// Reads the collection release number from the version marker document.
///
/// # Errors
///
/// Returns an error if the document cannot be read or holds no number.
pub(crate) fn detect_release(hvsc_base: &Path) -> Result<u32> {
    let path = hvsc_base.join(VERSION_FILE);
    let content = fs::read(&path).map_err(|e| CatalogError::io(&path, e))?;

    let release = parse_release(&String::from_utf8_lossy(&content))
        .ok_or(CatalogError::VersionNotFound { path })?;

    info!("Detected collection release {}", release);

    Ok(release)
}

/// The first number in `content`.
pub(crate) fn parse_release(content: &str) -> Option<u32> {
    number_regex().find(content)?.as_str().parse().ok()
}

/// Expands the snapshot URL template for a release.
pub(crate) fn snapshot_url(template: &str, release: u32) -> String {
    template.replace(RELEASE_PLACEHOLDER, &release.to_string())
}

/// Downloads the snapshot at `url` to `dest`, returning the number of bytes
/// written. The request is made once and never retried.
///
/// # Errors
///
/// Returns an error on any transport failure, an error status, or if the
/// snapshot cannot be written.
pub(crate) fn download_snapshot(url: &str, dest: &Path) -> Result<u64> {
    let download_error = |reason: String| CatalogError::Download {
        url: url.to_string(),
        reason,
    };

    info!("Downloading index of tunes and releases from {}", url);

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| download_error(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| download_error(e.to_string()))?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(download_error(status.to_string()));
    }

    let length = write_snapshot(response, dest)?;

    info!("{:.2}MB downloaded", length as f64 / 1_000_000.0);

    Ok(length)
}

/// Writes a downloaded body verbatim to `dest`.
///
/// The body is written beside `dest` and moved into place once complete, so
/// a failed transfer never leaves a partial snapshot behind.
pub(crate) fn write_snapshot(mut body: impl Read, dest: &Path) -> Result<u64> {
    let tmp_path = dest.with_extension("gz.part");

    let result = (|| -> io::Result<u64> {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        let length = io::copy(&mut body, &mut writer)?;
        writer.flush()?;
        Ok(length)
    })();

    match result {
        Ok(length) => {
            fs::rename(&tmp_path, dest).map_err(|e| CatalogError::io(dest, e))?;
            Ok(length)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(CatalogError::io(&tmp_path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        assert_eq!(parse_release("80\n"), Some(80));
        assert_eq!(parse_release("HVSC #81 - 2024"), Some(81));
        assert_eq!(parse_release("no version here"), None);
    }

    #[test]
    fn test_detect_release() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("DOCUMENTS")).unwrap();
        fs::write(dir.path().join(VERSION_FILE), "79").unwrap();

        assert_eq!(detect_release(dir.path()).unwrap(), 79);
    }

    #[test]
    fn test_detect_release_without_number() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("DOCUMENTS")).unwrap();
        fs::write(dir.path().join(VERSION_FILE), "unknown").unwrap();

        let err = detect_release(dir.path()).unwrap_err();

        assert!(matches!(err, CatalogError::VersionNotFound { .. }));
    }

    #[test]
    fn test_detect_release_missing_marker() {
        let dir = tempfile::tempdir().unwrap();

        let err = detect_release(dir.path()).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_snapshot_url() {
        assert_eq!(
            snapshot_url("https://example.org/hvsc-{release}/tunes.json.gz", 80),
            "https://example.org/hvsc-80/tunes.json.gz"
        );
    }

    #[test]
    fn test_write_snapshot_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tunes.json.gz");
        let body: &[u8] = &[0x1f, 0x8b, 0x08, 0x00, 0xff];

        let length = write_snapshot(body, &dest).unwrap();

        assert_eq!(length, 5);
        assert_eq!(fs::read(&dest).unwrap(), body);
        assert!(!dir.path().join("tunes.json.gz.part").exists());
    }

    #[test]
    fn test_write_snapshot_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("tunes.json.gz");

        let err = write_snapshot(&b"data"[..], &dest).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(!dest.exists());
    }
}
