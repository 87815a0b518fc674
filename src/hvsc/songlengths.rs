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

//! Song length table parsing.
//!
//! The song length document is line oriented. A line starting with `;`
//! introduces a tune, its path following the two character prefix `"; "`.
//! Every line up to the next such marker is scanned for `m:ss` tokens, which
//! are assigned in order to the songs of the most recently introduced tune.
//!
//! ```text
//! ; /MUSICIANS/H/Hubbard_Rob/Commando.sid
//! 4:51 0:05 0:09
//! ```
//!
//! The parser is a single streaming pass, yielding one [`SongLengthEntry`]
//! per introduced tune.

use std::{
    io::{self, BufRead},
    sync::OnceLock,
    time::Duration,
};

use regex::Regex;
use tracing::{debug, warn};

const MARKER: u8 = b';';
const PREFIX_LEN: usize = 2;

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| Regex::new(r"[0-9]{1,2}:[0-9]{2}").expect("Invalid song length pattern"))
}

/// Per-song durations for one tune path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SongLengthEntry {
    pub(crate) path: String,
    pub(crate) lengths: Vec<Duration>,
}

/// Streaming parser over a song length document.
pub(crate) struct SongLengths<R> {
    reader: R,
    buf: Vec<u8>,
    current: Option<SongLengthEntry>,
    done: bool,
}

impl<R: BufRead> SongLengths<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            current: None,
            done: false,
        }
    }

    /// Reads the next line with any trailing line ending removed, or `None`
    /// at the end of the document.
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl<R: BufRead> Iterator for SongLengths<R> {
    type Item = io::Result<SongLengthEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.done = true;
                    return self.current.take().map(Ok);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if line.as_bytes().first() == Some(&MARKER) {
                let path = line.get(PREFIX_LEN..).unwrap_or_default().trim_end();
                if path.is_empty() {
                    warn!("Ignoring song length record without a path");
                    continue;
                }
                let entry = SongLengthEntry {
                    path: path.to_string(),
                    lengths: Vec::new(),
                };
                if let Some(previous) = self.current.replace(entry) {
                    return Some(Ok(previous));
                }
                continue;
            }

            match self.current.as_mut() {
                Some(entry) => entry.lengths.extend(parse_lengths(&line)),
                None if token_regex().is_match(&line) => {
                    debug!("Ignoring song lengths before the first tune: {}", line);
                }
                None => {}
            }
        }
    }
}

/// Finds every `m:ss` token in a line, in order of appearance.
pub(crate) fn parse_lengths(line: &str) -> Vec<Duration> {
    token_regex()
        .find_iter(line)
        .map(|m| parse_song_length(m.as_str()))
        .collect()
}

/// Parses a single `m:ss` token, yielding a zero duration if it is malformed.
pub(crate) fn parse_song_length(token: &str) -> Duration {
    let parsed = token
        .split_once(':')
        .and_then(|(m, s)| Some((m.parse::<u64>().ok()?, s.parse::<u64>().ok()?)));

    match parsed {
        Some((minutes, seconds)) => Duration::from_secs(minutes * 60 + seconds),
        None => {
            debug!("Unparseable song length: {}", token);
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> Vec<SongLengthEntry> {
        SongLengths::new(doc.as_bytes())
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_parse_records() {
        let doc = "\
; /MUSICIANS/H/Hubbard_Rob/Commando.sid
4:51 0:05 0:09
; /MUSICIANS/H/Hubbard_Rob/Monty_on_the_Run.sid
5:55
";
        let entries = parse(doc);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/MUSICIANS/H/Hubbard_Rob/Commando.sid");
        assert_eq!(entries[0].lengths, vec![secs(291), secs(5), secs(9)]);
        assert_eq!(entries[1].path, "/MUSICIANS/H/Hubbard_Rob/Monty_on_the_Run.sid");
        assert_eq!(entries[1].lengths, vec![secs(355)]);
    }

    #[test]
    fn test_tokens_inside_free_text() {
        let doc = "\
; /DEMOS/A-F/Example.sid
a1b2c3d4e5=3:10(G) 12:07(M),0:45 end
";
        let entries = parse(doc);

        assert_eq!(entries[0].lengths, vec![secs(190), secs(727), secs(45)]);
    }

    #[test]
    fn test_tokens_over_several_lines() {
        let doc = "; /A.sid\n1:00\n\n2:00 3:00\r\n";
        let entries = parse(doc);

        assert_eq!(entries[0].lengths, vec![secs(60), secs(120), secs(180)]);
    }

    #[test]
    fn test_record_without_lengths() {
        let entries = parse("; /A.sid\n; /B.sid\n0:30\n");

        assert_eq!(entries.len(), 2);
        assert!(entries[0].lengths.is_empty());
        assert_eq!(entries[1].lengths, vec![secs(30)]);
    }

    #[test]
    fn test_lengths_before_first_marker_are_ignored() {
        let entries = parse("[Database]\n1:23\n; /A.sid\n0:10\n");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lengths, vec![secs(10)]);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_malformed_token_is_zero() {
        assert_eq!(parse_song_length("1:0x"), Duration::ZERO);
        assert_eq!(parse_song_length("nonsense"), Duration::ZERO);
        assert_eq!(parse_song_length("02:30"), secs(150));
    }
}
