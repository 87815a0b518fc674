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

//! STIL commentary parsing.
//!
//! The SID Tune Information List is a line oriented document of free-form
//! notes on individual tunes. Lines starting with `#` are comments. A line
//! starting with `/` introduces a path, and the lines after it, up to the
//! next blank line, are that path's text. Paths ending in `/` describe a
//! whole directory and are skipped along with their text.
//!
//! ```text
//! /MUSICIANS/H/Hubbard_Rob/Commando.sid
//! COMMENT: The title tune was composed overnight.
//!
//! /MUSICIANS/H/Hubbard_Rob/Delta.sid
//! (#1)
//!   TITLE: Delta
//! ```
//!
//! Text is kept as written, with per-song `(#n)` markers and field labels
//! intact, trailing whitespace removed.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use tracing::{debug, info, warn};

use crate::{
    error::{CatalogError, Result},
    model::Catalog,
};

/// Location of the STIL document, relative to the collection root.
pub(crate) const STIL_FILE: &str = "DOCUMENTS/STIL.txt";

const COMMENT: u8 = b'#';
const PATH: u8 = b'/';

/// Commentary text for one tune path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StilEntry {
    pub(crate) path: String,
    pub(crate) text: String,
}

/// Streaming parser over a STIL document.
pub(crate) struct StilEntries<R> {
    reader: R,
    buf: Vec<u8>,
    /// The open entry; `None` inside a directory entry or between entries.
    current: Option<StilEntry>,
    done: bool,
}

impl<R: BufRead> StilEntries<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            current: None,
            done: false,
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).trim_end().to_string()))
    }

    /// Closes the open entry, yielding it unless it has no text.
    fn close(&mut self) -> Option<StilEntry> {
        self.current.take().filter(|entry| !entry.text.is_empty())
    }
}

impl<R: BufRead> Iterator for StilEntries<R> {
    type Item = io::Result<StilEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.done = true;
                    return self.close().map(Ok);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let first = line.as_bytes().first().copied();
            match first {
                None => {
                    if let Some(entry) = self.close() {
                        return Some(Ok(entry));
                    }
                }
                Some(COMMENT) => {}
                Some(PATH) => {
                    let finished = self.close();
                    if line.ends_with('/') {
                        debug!("Skipping directory commentary for {}", line);
                    } else {
                        self.current = Some(StilEntry {
                            path: line,
                            text: String::new(),
                        });
                    }
                    if let Some(entry) = finished {
                        return Some(Ok(entry));
                    }
                }
                Some(_) => {
                    if let Some(entry) = self.current.as_mut() {
                        if !entry.text.is_empty() {
                            entry.text.push('\n');
                        }
                        entry.text.push_str(&line);
                    }
                }
            }
        }
    }
}

/// Reads the STIL document below `hvsc_base` and attaches its text to the
/// matching tunes, returning how many tunes received commentary.
///
/// A collection without a STIL document yields no commentary.
///
/// # Errors
///
/// Returns an error if the document exists but cannot be read.
pub(crate) fn read_stil(hvsc_base: &Path, catalog: &mut Catalog) -> Result<usize> {
    let doc_path = hvsc_base.join(STIL_FILE);
    let file = match File::open(&doc_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No STIL document at {}", doc_path.display());
            return Ok(0);
        }
        Err(e) => return Err(CatalogError::io(&doc_path, e)),
    };

    let mut attached = 0;
    for entry in StilEntries::new(BufReader::new(file)) {
        let entry = entry.map_err(|e| CatalogError::io(&doc_path, e))?;
        if catalog.attach_stil(&entry.path, entry.text) {
            attached += 1;
        } else {
            warn!("Unknown STIL path: {}", entry.path);
        }
    }

    info!("Attached STIL commentary to {} tunes", attached);

    Ok(attached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SidTune;

    fn parse(doc: &str) -> Vec<StilEntry> {
        StilEntries::new(doc.as_bytes())
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_parse_entries() {
        let doc = "\
### Hubbard_Rob ##############################################
/MUSICIANS/H/Hubbard_Rob/
COMMENT: Rob Hubbard was born in Hull.

/MUSICIANS/H/Hubbard_Rob/Commando.sid
COMMENT: The title tune was composed overnight.

/MUSICIANS/H/Hubbard_Rob/Delta.sid
(#1)
  TITLE: Delta
COMMENT: Inspired by Glass Works,
         by Philip Glass.   \r
(#12)
COMMENT: Hi-score tune.
";
        let entries = parse(doc);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/MUSICIANS/H/Hubbard_Rob/Commando.sid");
        assert_eq!(entries[0].text, "COMMENT: The title tune was composed overnight.");
        assert_eq!(entries[1].path, "/MUSICIANS/H/Hubbard_Rob/Delta.sid");
        assert_eq!(
            entries[1].text,
            "(#1)\n  TITLE: Delta\nCOMMENT: Inspired by Glass Works,\n         by Philip Glass.\n(#12)\nCOMMENT: Hi-score tune."
        );
    }

    #[test]
    fn test_path_without_text_is_skipped() {
        let doc = "\
/GAMES/A-F/Empty.sid
/GAMES/A-F/Next.sid
COMMENT: Follows directly.
";
        let entries = parse(doc);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "/GAMES/A-F/Next.sid");
    }

    #[test]
    fn test_text_outside_an_entry_is_ignored() {
        let doc = "\
Stray text before any path.

#  /GAMES/A-F/Commented.sid
COMMENT: Nobody owns this.
";
        assert!(parse(doc).is_empty());
    }

    #[test]
    fn test_read_stil_attaches_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("DOCUMENTS")).unwrap();
        std::fs::write(
            dir.path().join(STIL_FILE),
            "/A.sid\nCOMMENT: First.\n\n/Missing.sid\nCOMMENT: Lost.\n",
        )
        .unwrap();
        let tunes = ["/A.sid", "/B.sid"]
            .iter()
            .map(|p| SidTune {
                path: p.to_string(),
                ..SidTune::default()
            })
            .collect();
        let mut catalog = Catalog::new(tunes, 80);

        let attached = read_stil(dir.path(), &mut catalog).unwrap();

        assert_eq!(attached, 1);
        assert_eq!(catalog.get(0).unwrap().stil, "COMMENT: First.");
        assert_eq!(catalog.get(1).unwrap().stil, "");
    }

    #[test]
    fn test_read_stil_without_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::default();

        assert_eq!(read_stil(dir.path(), &mut catalog).unwrap(), 0);
    }
}
