//! Director movie counting
//!
//! [`DirectorCounts`] is owned by a single query. Pages are reduced into their
//! own partial counts and merged, so the final result does not depend on the
//! order in which pages or records arrive.

use std::collections::BTreeMap;

use crate::{MovieRecord, Page};

/// Movie count per director name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorCounts {
    counts: BTreeMap<String, u64>,
}

impl DirectorCounts {
    /// Create an empty counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every record of one page
    pub fn from_page(page: &Page) -> Self {
        let mut counts = Self::new();
        counts.add_page(page);
        counts
    }

    /// Count one record; records without a director are ignored
    pub fn add(&mut self, record: &MovieRecord) {
        if let Some(director) = record.director_name() {
            *self.counts.entry(director.to_string()).or_insert(0) += 1;
        }
    }

    /// Count every record of `page`
    pub fn add_page(&mut self, page: &Page) {
        for record in &page.data {
            self.add(record);
        }
    }

    /// Sum another set of counts into this one
    pub fn merge(&mut self, other: DirectorCounts) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (director, count) in other.counts {
            *self.counts.entry(director).or_insert(0) += count;
        }
    }

    /// Directors with strictly more than `threshold` movies, sorted by name
    pub fn above(&self, threshold: i64) -> Vec<String> {
        // Every counted director has at least one movie, so a negative threshold admits all.
        let minimum = u64::try_from(threshold).ok();
        self.counts
            .iter()
            .filter(|(_, count)| minimum.map_or(true, |t| **count > t))
            .map(|(director, _)| director.clone())
            .collect()
    }

    /// Movies counted for `director`
    pub fn count(&self, director: &str) -> u64 {
        self.counts.get(director).copied().unwrap_or(0)
    }

    /// Copy of the current counts
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts.clone()
    }

    /// Number of distinct directors
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing has been counted
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<'a> Extend<&'a MovieRecord> for DirectorCounts {
    fn extend<I: IntoIterator<Item = &'a MovieRecord>>(&mut self, iter: I) {
        for record in iter {
            self.add(record);
        }
    }
}

impl<'a> FromIterator<&'a MovieRecord> for DirectorCounts {
    fn from_iter<I: IntoIterator<Item = &'a MovieRecord>>(iter: I) -> Self {
        let mut counts = Self::new();
        counts.extend(iter);
        counts
    }
}
