//! Data model for aligned sequences.
//!
//! This module contains the leaf data structures of the editor:
//! - `SequenceType`: the alphabet tag shared by an alignment and its rows
//! - `SequenceRow`: one aligned sequence plus its window into the ungapped source
//!
//! Column positions inside this module are 0-based indices into the aligned
//! bytes. Source positions (`start`/`stop`) are 1-based offsets into the
//! ungapped source sequence.

use std::fmt;

use crate::coords::ClosedRange;

/// Gap character used when the caller does not supply one.
pub const DEFAULT_GAP: u8 = b'-';

/// Returns true if the byte denotes "no residue".
#[inline]
pub fn is_gap(c: u8) -> bool {
    c == b'-' || c == b'.'
}

/// Alphabet of a sequence or alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SequenceType {
    /// DNA or RNA
    Nucleotide,
    /// Protein
    AminoAcid,
    /// Not determined
    #[default]
    Unknown,
}

impl SequenceType {
    /// Guesses the alphabet from residue content.
    ///
    /// Sequences are considered nucleotide when at least 90% of their
    /// non-gap characters are one of `ACGTUN` (case-insensitive).
    pub fn detect<'a, I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut residues = 0usize;
        let mut nucleotides = 0usize;
        for seq in sequences {
            for &c in seq.iter().filter(|&&c| !is_gap(c)) {
                residues += 1;
                if matches!(c.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'U' | b'N') {
                    nucleotides += 1;
                }
            }
        }

        if residues == 0 {
            SequenceType::Unknown
        } else if nucleotides * 10 >= residues * 9 {
            SequenceType::Nucleotide
        } else {
            SequenceType::AminoAcid
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceType::Nucleotide => write!(f, "nucleotide"),
            SequenceType::AminoAcid => write!(f, "amino acid"),
            SequenceType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Reasons a row cannot be constructed from import data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("row '{0}' contains no residues")]
    NoResidues(String),

    #[error("row '{id}': window {start}..{stop} is outside source of length {len}")]
    WindowOutOfRange {
        id: String,
        start: usize,
        stop: usize,
        len: usize,
    },

    #[error("row '{0}': aligned residues do not match the source window")]
    ContentMismatch(String),
}

/// A single aligned sequence.
///
/// The non-gap bytes of `aligned` are always exactly `source[start-1..stop]`
/// and there is always at least one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRow {
    /// Stable identifier (e.g. the FASTA header without '>')
    id: String,
    /// Alphabet of the source sequence
    sequence_type: SequenceType,
    /// Full ungapped source sequence
    source: Vec<u8>,
    /// Gapped representation, one byte per alignment column
    aligned: Vec<u8>,
    /// 1-based first source position present in `aligned`
    start: usize,
    /// 1-based last source position present in `aligned`
    stop: usize,
}

impl SequenceRow {
    /// Creates a row covering the whole ungapped source, without gaps.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<Vec<u8>>,
        sequence_type: SequenceType,
    ) -> Result<Self, RowError> {
        let id = id.into();
        let source = source.into();
        if source.is_empty() {
            return Err(RowError::NoResidues(id));
        }
        Ok(Self {
            id,
            sequence_type,
            aligned: source.clone(),
            start: 1,
            stop: source.len(),
            source,
        })
    }

    /// Creates a row from gapped text; the source is the text with gaps removed.
    pub fn from_gapped(
        id: impl Into<String>,
        aligned: impl Into<Vec<u8>>,
        sequence_type: SequenceType,
    ) -> Result<Self, RowError> {
        let aligned = aligned.into();
        let source: Vec<u8> = aligned.iter().copied().filter(|&c| !is_gap(c)).collect();
        let stop = source.len();
        Self::from_aligned(id, source, aligned, 1, stop, sequence_type)
    }

    /// Creates a row from the full import contract: ungapped source, aligned
    /// text and the 1-based source window the aligned text displays.
    pub fn from_aligned(
        id: impl Into<String>,
        source: impl Into<Vec<u8>>,
        aligned: impl Into<Vec<u8>>,
        start: usize,
        stop: usize,
        sequence_type: SequenceType,
    ) -> Result<Self, RowError> {
        let id = id.into();
        let source = source.into();
        let aligned = aligned.into();

        if start == 0 || start > stop || stop > source.len() {
            if source.is_empty() || aligned.iter().all(|&c| is_gap(c)) {
                return Err(RowError::NoResidues(id));
            }
            return Err(RowError::WindowOutOfRange {
                id,
                start,
                stop,
                len: source.len(),
            });
        }

        let residues = aligned.iter().copied().filter(|&c| !is_gap(c));
        if !residues.eq(source[start - 1..stop].iter().copied()) {
            return Err(RowError::ContentMismatch(id));
        }

        Ok(Self {
            id,
            sequence_type,
            source,
            aligned,
            start,
            stop,
        })
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Renames the row.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Returns the alphabet tag.
    pub fn sequence_type(&self) -> SequenceType {
        self.sequence_type
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.aligned.len()
    }

    /// Always false for a constructed row; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.aligned.is_empty()
    }

    /// Returns the aligned bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.aligned
    }

    /// Returns the aligned text (lossy for non-UTF-8 bytes).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.aligned)
    }

    /// Returns the full ungapped source sequence.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Returns the residues currently displayed, i.e. `source[start..=stop]`.
    pub fn ungapped(&self) -> &[u8] {
        &self.source[self.start - 1..self.stop]
    }

    /// 1-based first displayed source position.
    pub fn start(&self) -> usize {
        self.start
    }

    /// 1-based last displayed source position.
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Number of residues displayed.
    pub fn residue_count(&self) -> usize {
        self.stop - self.start + 1
    }

    /// Gets the byte at a 0-based column.
    pub fn char_at(&self, col: usize) -> Option<u8> {
        self.aligned.get(col).copied()
    }

    /// Number of gap bytes before the first residue.
    pub fn head_gaps(&self) -> usize {
        self.first_residue_column()
    }

    /// Number of gap bytes after the last residue.
    pub fn tail_gaps(&self) -> usize {
        self.aligned.len() - 1 - self.last_residue_column()
    }

    /// 0-based column of the first residue.
    pub fn first_residue_column(&self) -> usize {
        self.aligned
            .iter()
            .position(|&c| !is_gap(c))
            .unwrap_or(self.aligned.len())
    }

    /// 0-based column of the last residue.
    pub fn last_residue_column(&self) -> usize {
        self.aligned.iter().rposition(|&c| !is_gap(c)).unwrap_or(0)
    }

    /// Counts contiguous gaps immediately left of a 0-based column.
    pub fn gaps_left_of(&self, col: usize) -> usize {
        self.aligned[..col].iter().rev().take_while(|&&c| is_gap(c)).count()
    }

    /// Counts contiguous gaps immediately right of a 0-based column.
    pub fn gaps_right_of(&self, col: usize) -> usize {
        self.aligned[col + 1..].iter().take_while(|&&c| is_gap(c)).count()
    }

    /// Counts residues within the inclusive 0-based column span.
    pub fn residues_between(&self, from: usize, to: usize) -> usize {
        if from > to {
            return 0;
        }
        self.aligned[from..=to].iter().filter(|&&c| !is_gap(c)).count()
    }

    // ------------------------------------------------------------------
    // Mutation primitives used by `Alignment`. Callers keep all rows of an
    // alignment the same length.

    pub(crate) fn insert_gaps(&mut self, col: usize, count: usize, gap: u8) {
        self.aligned
            .splice(col..col, std::iter::repeat(gap).take(count));
    }

    pub(crate) fn remove_columns(&mut self, col: usize, count: usize) {
        debug_assert!(self.aligned[col..col + count].iter().all(|&c| is_gap(c)));
        self.aligned.drain(col..col + count);
    }

    pub(crate) fn aligned_mut(&mut self) -> &mut [u8] {
        &mut self.aligned
    }

    /// Moves the start to `new_start`, which must not exceed `stop`.
    ///
    /// Extension writes the new residues into the gaps directly left of the
    /// first residue (there must be enough). Trimming replaces the leading
    /// residues with `gap`. Returns the 0-based columns touched with their
    /// before/after bytes, or `None` for a no-op.
    pub(crate) fn set_start(&mut self, new_start: usize, gap: u8) -> Option<RowEdit> {
        debug_assert!(new_start >= 1 && new_start <= self.stop);
        if new_start == self.start {
            return None;
        }

        let first = self.first_residue_column();
        let edit = if new_start < self.start {
            let diff = self.start - new_start;
            debug_assert!(first >= diff, "not enough head gaps to extend");
            let cols = ClosedRange::new(first - diff, first - 1);
            let before = self.aligned[cols.begin..=cols.end].to_vec();
            self.aligned[cols.begin..=cols.end]
                .copy_from_slice(&self.source[new_start - 1..self.start - 1]);
            RowEdit::new(cols, before, &self.aligned)
        } else {
            let last = self.nth_residue_column(first, new_start - self.start, true);
            let cols = ClosedRange::new(first, last);
            let before = self.aligned[first..=last].to_vec();
            self.gap_out(cols, gap);
            RowEdit::new(cols, before, &self.aligned)
        };

        self.start = new_start;
        Some(edit)
    }

    /// Moves the stop to `new_stop`, which must not precede `start`.
    ///
    /// Mirror image of [`SequenceRow::set_start`].
    pub(crate) fn set_stop(&mut self, new_stop: usize, gap: u8) -> Option<RowEdit> {
        debug_assert!(new_stop >= self.start && new_stop <= self.source.len());
        if new_stop == self.stop {
            return None;
        }

        let last = self.last_residue_column();
        let edit = if new_stop > self.stop {
            let diff = new_stop - self.stop;
            debug_assert!(self.aligned.len() - 1 - last >= diff, "not enough tail gaps to extend");
            let cols = ClosedRange::new(last + 1, last + diff);
            let before = self.aligned[cols.begin..=cols.end].to_vec();
            self.aligned[cols.begin..=cols.end]
                .copy_from_slice(&self.source[self.stop..new_stop]);
            RowEdit::new(cols, before, &self.aligned)
        } else {
            let first = self.nth_residue_column(last, self.stop - new_stop, false);
            let cols = ClosedRange::new(first, last);
            let before = self.aligned[first..=last].to_vec();
            self.gap_out(cols, gap);
            RowEdit::new(cols, before, &self.aligned)
        };

        self.stop = new_stop;
        Some(edit)
    }
}

impl SequenceRow {
    /// Walks from `from` (a residue column) and returns the column of the
    /// `n`-th residue met, counting `from` itself as the first.
    fn nth_residue_column(&self, from: usize, n: usize, forward: bool) -> usize {
        debug_assert!(n >= 1);
        let found = if forward {
            self.aligned[from..]
                .iter()
                .enumerate()
                .filter(|(_, &c)| !is_gap(c))
                .nth(n - 1)
                .map(|(i, _)| from + i)
        } else {
            self.aligned[..=from]
                .iter()
                .enumerate()
                .rev()
                .filter(|(_, &c)| !is_gap(c))
                .nth(n - 1)
                .map(|(i, _)| i)
        };
        found.unwrap_or(from)
    }

    /// Replaces every residue inside the 0-based span with `gap`.
    fn gap_out(&mut self, cols: ClosedRange, gap: u8) {
        for c in &mut self.aligned[cols.begin..=cols.end] {
            if !is_gap(*c) {
                *c = gap;
            }
        }
    }
}

/// Columns of a row touched by a primitive edit, 0-based, with the bytes
/// they held before and after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowEdit {
    pub columns: ClosedRange,
    pub before: Vec<u8>,
    pub after: Vec<u8>,
}

impl RowEdit {
    fn new(columns: ClosedRange, before: Vec<u8>, aligned: &[u8]) -> Self {
        Self {
            columns,
            before,
            after: aligned[columns.begin..=columns.end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(aligned: &str) -> SequenceRow {
        SequenceRow::from_gapped("seq", aligned, SequenceType::Unknown).unwrap()
    }

    #[test]
    fn test_row_creation() {
        let r = SequenceRow::new("seq1", "ACGT", SequenceType::Nucleotide).unwrap();
        assert_eq!(r.id(), "seq1");
        assert_eq!(r.as_bytes(), b"ACGT");
        assert_eq!((r.start(), r.stop()), (1, 4));
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn test_from_aligned_validates_window() {
        let r = SequenceRow::from_aligned("s", "ABCDEF", "-CD--E", 3, 5, SequenceType::Unknown)
            .unwrap();
        assert_eq!(r.ungapped(), b"CDE");
        assert_eq!(r.head_gaps(), 1);
        assert_eq!(r.tail_gaps(), 0);

        let err = SequenceRow::from_aligned("s", "ABCDEF", "-CD--F", 3, 5, SequenceType::Unknown);
        assert!(matches!(err, Err(RowError::ContentMismatch(_))));

        let err = SequenceRow::from_aligned("s", "ABC", "ABC", 1, 4, SequenceType::Unknown);
        assert!(matches!(err, Err(RowError::WindowOutOfRange { .. })));
    }

    #[test]
    fn test_all_gap_row_refused() {
        let err = SequenceRow::from_gapped("s", "----", SequenceType::Unknown);
        assert!(matches!(err, Err(RowError::NoResidues(_))));
    }

    #[test]
    fn test_gap_counting() {
        let r = row("--AB---C-");
        assert_eq!(r.head_gaps(), 2);
        assert_eq!(r.tail_gaps(), 1);
        assert_eq!(r.first_residue_column(), 2);
        assert_eq!(r.last_residue_column(), 7);
        assert_eq!(r.gaps_left_of(7), 3);
        assert_eq!(r.gaps_right_of(3), 3);
        assert_eq!(r.residues_between(0, 4), 2);
    }

    #[test]
    fn test_set_start_extend_and_trim() {
        let mut r =
            SequenceRow::from_aligned("s", "ABCDEF", "---DEF", 4, 6, SequenceType::Unknown)
                .unwrap();

        let edit = r.set_start(2, b'-').unwrap();
        assert_eq!(r.as_bytes(), b"-BCDEF");
        assert_eq!(edit.columns, ClosedRange::new(1, 2));
        assert_eq!(edit.before, b"--");
        assert_eq!(edit.after, b"BC");

        let edit = r.set_start(4, b'.').unwrap();
        assert_eq!(r.as_bytes(), b"-..DEF");
        assert_eq!(edit.columns, ClosedRange::new(1, 2));
        assert_eq!(r.start(), 4);

        assert!(r.set_start(4, b'-').is_none());
    }

    #[test]
    fn test_set_stop_trim_skips_interior_gaps() {
        let mut r = row("AB-C--D");
        let edit = r.set_stop(2, b'-').unwrap();
        assert_eq!(r.as_bytes(), b"AB-----");
        assert_eq!(edit.columns, ClosedRange::new(3, 6));
        assert_eq!(edit.before, b"C--D");
        assert_eq!(r.stop(), 2);

        let edit = r.set_stop(4, b'-').unwrap();
        assert_eq!(r.as_bytes(), b"ABCD---");
        assert_eq!(edit.columns, ClosedRange::new(2, 3));
    }

    #[test]
    fn test_detect_sequence_type() {
        let nt: Vec<&[u8]> = vec![b"ACGT--ACGT", b"ACGTNACGTU"];
        assert_eq!(SequenceType::detect(nt), SequenceType::Nucleotide);
        let aa: Vec<&[u8]> = vec![b"MKVLHEW", b"MK-LQEW"];
        assert_eq!(SequenceType::detect(aa), SequenceType::AminoAcid);
        let none: Vec<&[u8]> = vec![b"---"];
        assert_eq!(SequenceType::detect(none), SequenceType::Unknown);
    }
}
