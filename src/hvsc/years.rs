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

//! Year extraction from the free-text "released" header field.
//!
//! Released credits look like `1987 Thalamus`, `1989-90 Rob Hubbard` or
//! `2005/06 Onslaught`. Every run of exactly two or four digits counts as a
//! year. Two-digit years below 70 are taken as 20xx, all others as 19xx.

use std::sync::OnceLock;

use regex::Regex;

static DIGITS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn digits_regex() -> &'static Regex {
    DIGITS_PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("Invalid digits pattern"))
}

/// Returns `(min, max)` of the years found in `released`, or `(0, 0)` when it
/// mentions none.
pub(crate) fn year_range(released: &str) -> (u16, u16) {
    let mut years = digits_regex()
        .find_iter(released)
        .filter_map(|m| parse_year(m.as_str()));

    let Some(first) = years.next() else {
        return (0, 0);
    };

    years.fold((first, first), |(min, max), y| (min.min(y), max.max(y)))
}

/// Parses a two or four digit year token.
pub(crate) fn parse_year(token: &str) -> Option<u16> {
    if token.len() != 2 && token.len() != 4 {
        return None;
    }

    let year = token.parse::<u16>().ok()?;
    Some(match year {
        0..=69 => 2000 + year,
        70..=99 => 1900 + year,
        _ => year,
    })
}
