//! Per-column character counts.
//!
//! A [`CharacterCountDistribution`] is an ordered list of columns, each a
//! map from character to count. It knows nothing about alignments: the live
//! view in [`crate::live_distribution`] drives it from alignment events.
//!
//! Counts are signed. Adding and subtracting never prune, so a column may
//! hold keys with zero (or, transiently, negative) counts until
//! [`CharacterCountDistribution::remove_zero_value_keys`] is called.
//!
//! Offsets and positions are 1-based; violating their documented ranges is a
//! programming error and panics.

use std::collections::HashMap;

use crate::model::is_gap;

/// Character counts of one column.
pub type CharCountMap = HashMap<u8, i64>;

/// Character proportions of one column.
pub type CharProportionMap = HashMap<u8, f64>;

/// Ordered per-column character counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterCountDistribution {
    columns: Vec<CharCountMap>,
}

impl CharacterCountDistribution {
    /// Creates an empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a distribution from explicit column maps.
    pub fn from_columns(columns: Vec<CharCountMap>) -> Self {
        Self { columns }
    }

    /// Creates `length` blank columns.
    pub fn with_length(length: usize) -> Self {
        Self {
            columns: vec![CharCountMap::new(); length],
        }
    }

    /// Counts the non-gap bytes of equally long rows, column by column.
    pub fn from_rows<'a, I>(rows: I, length: usize) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut dist = Self::with_length(length);
        for row in rows {
            debug_assert_eq!(row.len(), length);
            dist.add_chars(row, None, 1);
        }
        dist
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns all columns.
    pub fn columns(&self) -> &[CharCountMap] {
        &self.columns
    }

    /// Returns the 1-based column.
    pub fn column(&self, position: usize) -> Option<&CharCountMap> {
        position.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Sum of all counts in the 1-based column.
    pub fn total(&self, position: usize) -> i64 {
        self.column(position).map_or(0, |c| c.values().sum())
    }

    /// True when every count in the 1-based column is zero (or it has none).
    pub fn is_blank(&self, position: usize) -> bool {
        self.column(position)
            .map_or(true, |c| c.values().all(|&v| v == 0))
    }

    /// Adds `other` column-wise starting at the 1-based `offset`.
    ///
    /// # Panics
    ///
    /// If `offset` is outside `1..=len()` or `other` runs past the end.
    pub fn add(&mut self, other: &CharacterCountDistribution, offset: usize) {
        self.merge(other, offset, 1);
    }

    /// Subtracts `other` column-wise starting at the 1-based `offset`.
    /// Missing keys start at zero, so counts may go negative.
    ///
    /// # Panics
    ///
    /// Same conditions as [`CharacterCountDistribution::add`].
    pub fn subtract(&mut self, other: &CharacterCountDistribution, offset: usize) {
        self.merge(other, offset, -1);
    }

    fn merge(&mut self, other: &CharacterCountDistribution, offset: usize, sign: i64) {
        if other.is_empty() {
            return;
        }
        let begin = self.check_span(offset, other.len());
        for (dst, src) in self.columns[begin..begin + other.len()].iter_mut().zip(&other.columns) {
            for (&c, &n) in src {
                *dst.entry(c).or_insert(0) += sign * n;
            }
        }
    }

    /// Adds one count per character of `chars`, starting at the 1-based
    /// `offset`. Characters equal to `skip` are ignored; with `skip` set to
    /// `None`, gap characters are ignored.
    ///
    /// # Panics
    ///
    /// If `offset` is outside `1..=len()` or `chars` runs past the end.
    pub fn add_chars(&mut self, chars: &[u8], skip: Option<u8>, offset: usize) {
        self.merge_chars(chars, skip, offset, 1);
    }

    /// Subtracts one count per character of `chars`; mirror image of
    /// [`CharacterCountDistribution::add_chars`].
    pub fn subtract_chars(&mut self, chars: &[u8], skip: Option<u8>, offset: usize) {
        self.merge_chars(chars, skip, offset, -1);
    }

    fn merge_chars(&mut self, chars: &[u8], skip: Option<u8>, offset: usize, sign: i64) {
        if chars.is_empty() {
            return;
        }
        let begin = self.check_span(offset, chars.len());
        for (dst, &c) in self.columns[begin..begin + chars.len()].iter_mut().zip(chars) {
            let skipped = match skip {
                Some(s) => c == s,
                None => is_gap(c),
            };
            if !skipped {
                *dst.entry(c).or_insert(0) += sign;
            }
        }
    }

    /// Inserts `count` empty columns before the 1-based `position`, which
    /// may be `len()+1` to append.
    ///
    /// # Panics
    ///
    /// If `position` is outside `1..=len()+1`.
    pub fn insert_blanks(&mut self, position: usize, count: usize) {
        assert!(
            position >= 1 && position <= self.columns.len() + 1,
            "insert position {} outside 1..={}",
            position,
            self.columns.len() + 1
        );
        let at = position - 1;
        self.columns
            .splice(at..at, std::iter::repeat_with(CharCountMap::new).take(count));
    }

    /// Removes `count` columns starting at the 1-based `position`.
    ///
    /// # Panics
    ///
    /// If the span is not inside `1..=len()`.
    pub fn remove(&mut self, position: usize, count: usize) {
        if count == 0 {
            return;
        }
        let begin = self.check_span(position, count);
        self.columns.drain(begin..begin + count);
    }

    /// Deletes keys whose count is exactly zero within the 1-based columns
    /// `from..=to`; `(0, 0)` means every column.
    ///
    /// # Panics
    ///
    /// If the span is not inside `1..=len()`.
    pub fn remove_zero_value_keys(&mut self, from: usize, to: usize) {
        if self.columns.is_empty() {
            return;
        }
        let (from, to) = if from == 0 && to == 0 {
            (1, self.columns.len())
        } else {
            (from, to)
        };
        assert!(from <= to, "malformed span {from}..={to}");
        let begin = self.check_span(from, to - from + 1);
        for column in &mut self.columns[begin..to] {
            column.retain(|_, n| *n != 0);
        }
    }

    /// Returns a copy of the 1-based columns `from..=to`.
    pub fn slice(&self, from: usize, to: usize) -> CharacterCountDistribution {
        let begin = self.check_span(from, to - from + 1);
        Self {
            columns: self.columns[begin..to].to_vec(),
        }
    }

    /// Divides every count by `divisor`; an empty map per column when
    /// `divisor` is zero.
    pub fn proportions(&self, divisor: usize) -> Vec<CharProportionMap> {
        self.columns
            .iter()
            .map(|column| column_proportions(column, divisor))
            .collect()
    }

    /// Validates a 1-based span and returns its 0-based start.
    fn check_span(&self, offset: usize, count: usize) -> usize {
        assert!(
            offset >= 1 && offset <= self.columns.len(),
            "offset {} outside 1..={}",
            offset,
            self.columns.len()
        );
        assert!(
            offset + count - 1 <= self.columns.len(),
            "span of {} columns at {} runs past {}",
            count,
            offset,
            self.columns.len()
        );
        offset - 1
    }
}

/// Divides the counts of one column by `divisor`.
pub fn column_proportions(column: &CharCountMap, divisor: usize) -> CharProportionMap {
    if divisor == 0 {
        return CharProportionMap::new();
    }
    column
        .iter()
        .filter(|(_, &n)| n != 0)
        .map(|(&c, &n)| (c, n as f64 / divisor as f64))
        .collect()
}
