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

//! Substring search over the catalog.
//!
//! The [`FilterEngine`] keeps a [`FilteredView`] of the catalog: the tunes
//! whose title, author or path contain the query, ignoring case, in catalog
//! order. Each query computes a complete new view which then replaces the
//! previous one, so a view is never seen half updated. Filtering does no
//! I/O and cannot fail.

use crate::model::{Catalog, SidTune};

/// Lower-cased fields of one tune, prepared once per catalog.
struct SearchKey {
    title: String,
    author: String,
    path: String,
}

impl SearchKey {
    fn new(tune: &SidTune) -> Self {
        Self {
            title: tune.title().to_lowercase(),
            author: tune.author().to_lowercase(),
            path: tune.path.to_lowercase(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.contains(needle) || self.author.contains(needle) || self.path.contains(needle)
    }
}

/// An ordered subsequence of the catalog, held as catalog positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FilteredView {
    query: String,
    positions: Vec<usize>,
}

impl FilteredView {
    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    /// Number of tunes in the view.
    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Catalog position of the `n`th tune in the view.
    pub(crate) fn position(&self, n: usize) -> Option<usize> {
        self.positions.get(n).copied()
    }

    /// The `n`th tune in the view.
    pub(crate) fn get<'a>(&self, catalog: &'a Catalog, n: usize) -> Option<&'a SidTune> {
        self.position(n).and_then(|pos| catalog.get(pos))
    }

    /// Tunes in the view, in order, within `range` of view positions.
    pub(crate) fn slice<'a>(
        &'a self,
        catalog: &'a Catalog,
        range: std::ops::Range<usize>,
    ) -> impl Iterator<Item = &'a SidTune> + 'a {
        let end = range.end.min(self.positions.len());
        let start = range.start.min(end);
        self.positions[start..end]
            .iter()
            .filter_map(move |&pos| catalog.get(pos))
    }
}

pub(crate) struct FilterEngine {
    keys: Vec<SearchKey>,
    view: FilteredView,
}

impl FilterEngine {
    /// Prepares filtering over `catalog`, starting with an unfiltered view.
    pub(crate) fn new(catalog: &Catalog) -> Self {
        let keys: Vec<SearchKey> = catalog.tunes().iter().map(SearchKey::new).collect();
        let view = FilteredView {
            query: String::new(),
            positions: (0..keys.len()).collect(),
        };
        Self { keys, view }
    }

    pub(crate) fn view(&self) -> &FilteredView {
        &self.view
    }

    /// Replaces the current view with the tunes matching `query`. An empty
    /// query matches every tune.
    pub(crate) fn filter(&mut self, query: &str) -> &FilteredView {
        let needle = query.to_lowercase();

        let positions = if needle.is_empty() {
            (0..self.keys.len()).collect()
        } else {
            self.keys
                .iter()
                .enumerate()
                .filter(|(_, key)| key.matches(&needle))
                .map(|(pos, _)| pos)
                .collect()
        };

        self.view = FilteredView {
            query: query.to_string(),
            positions,
        };

        &self.view
    }
}
