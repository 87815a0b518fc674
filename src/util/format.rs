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

use std::time::Duration;

/// Formats a duration into a human-readable `MM:SS` string.
///
/// This is used for displaying elapsed time and song lengths in the player
/// interface. Fractions of a second are dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_time(Duration::from_secs(65)), "01:05");
/// assert_eq!(format_time(Duration::from_secs(3600)), "60:00");
/// ```
pub(crate) fn format_time(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// The year column text for a tune: the first year, or a range
/// `1987-88` when the credits span several years.
pub(crate) fn format_years(year_min: u16, year_max: u16) -> String {
    match (year_min, year_max) {
        (0, _) => String::new(),
        (min, max) if max > min => format!("{}-{:02}", min, max % 100),
        (min, _) => min.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::ZERO), "00:00");
        assert_eq!(format_time(Duration::from_millis(65_900)), "01:05");
        assert_eq!(format_time(Duration::from_secs(3600)), "60:00");
    }

    #[test]
    fn test_format_years() {
        assert_eq!(format_years(0, 0), "");
        assert_eq!(format_years(1985, 1985), "1985");
        assert_eq!(format_years(1987, 1988), "1987-88");
        assert_eq!(format_years(1999, 2001), "1999-01");
    }
}
