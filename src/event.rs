//! Change notifications.
//!
//! Every structural edit of an [`Alignment`](crate::alignment::Alignment)
//! records one or more [`AlignmentEvent`]s once the edit is complete. Live
//! views consume them in order and report their own, narrower events:
//! - `AlignmentEvent`: rows and columns touched in the alignment
//! - `DistributionEvent`: columns touched in a live character distribution
//! - `SymbolStringEvent`: positions touched in a live consensus string
//!
//! All positions are 1-based and all ranges inclusive. Events carry whatever
//! pre-edit data a consumer needs, so a queue of several events can be
//! replayed without looking back at the alignment.

use crate::coords::{union, ClosedRange, Rect};

/// Kind of subsequence boundary change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubseqOperation {
    /// Start moved left, residues added
    ExtendLeft,
    /// Stop moved right, residues added
    ExtendRight,
    /// Start moved right, residues replaced with gaps
    TrimLeft,
    /// Stop moved left, residues replaced with gaps
    TrimRight,
    /// Residues rearranged without changing start/stop
    Internal,
}

/// One row's contiguous change, with its content before and after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubseqChange {
    /// 1-based row
    pub row: usize,
    /// 1-based columns covered by `before`/`after`
    pub columns: ClosedRange,
    pub operation: SubseqOperation,
    /// Bytes the row held over `columns` before the change
    pub before: Vec<u8>,
    /// Bytes the row holds over `columns` after the change
    pub after: Vec<u8>,
}

impl SubseqChange {
    /// Returns the change that undoes this one.
    pub fn inverse(&self) -> SubseqChange {
        let operation = match self.operation {
            SubseqOperation::ExtendLeft => SubseqOperation::TrimLeft,
            SubseqOperation::ExtendRight => SubseqOperation::TrimRight,
            SubseqOperation::TrimLeft => SubseqOperation::ExtendLeft,
            SubseqOperation::TrimRight => SubseqOperation::ExtendRight,
            SubseqOperation::Internal => SubseqOperation::Internal,
        };
        SubseqChange {
            row: self.row,
            columns: self.columns,
            operation,
            before: self.after.clone(),
            after: self.before.clone(),
        }
    }
}

/// Returns the union of the columns touched by a batch of changes.
pub fn changed_columns(changes: &[SubseqChange]) -> Option<ClosedRange> {
    changes.iter().fold(None, |acc, c| union(acc, c.columns))
}

/// Returns the union of the rows touched by a batch of changes.
pub fn changed_rows(changes: &[SubseqChange]) -> Option<ClosedRange> {
    changes
        .iter()
        .fold(None, |acc, c| union(acc, ClosedRange::new(c.row, c.row)))
}

/// A change recorded by an alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentEvent {
    /// Rows now occupying `rows`, with their aligned bytes
    RowsInserted {
        rows: ClosedRange,
        content: Vec<Vec<u8>>,
    },
    /// Rows that occupied `rows`, with the aligned bytes they had
    RowsRemoved {
        rows: ClosedRange,
        content: Vec<Vec<u8>>,
    },
    /// Rows that occupied `rows` now start at row `to`
    RowsMoved { rows: ClosedRange, to: usize },
    /// Two rows exchanged places
    RowsSwapped { first: usize, second: usize },
    /// Rows were reordered by a sort
    RowsSorted,
    /// Every row was removed
    Reset { rows: usize, columns: usize },
    /// Gap-only columns now occupy `columns`
    GapColumnsInserted { columns: ClosedRange },
    /// This many all-gap columns were swept away
    GapColumnsRemoved { count: usize },
    /// Row content changed in place
    SubseqsChanged(Vec<SubseqChange>),
    /// The block in `rect` moved horizontally by `delta` and now covers
    /// `final_columns`; `block` holds its rows' bytes, top to bottom
    RegionSlid {
        rect: Rect,
        delta: isize,
        final_columns: ClosedRange,
        block: Vec<Vec<u8>>,
    },
}

/// A change reported by a live character distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionEvent {
    /// Columns added at these positions
    ColumnsInserted(ClosedRange),
    /// Columns that occupied these positions are gone
    ColumnsRemoved(ClosedRange),
    /// Counts or proportions changed in these columns
    DataChanged(ClosedRange),
}

/// A change reported by a live consensus string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolStringEvent {
    /// Symbols added at these positions
    SymbolsInserted(ClosedRange),
    /// Symbols that occupied these positions are gone
    SymbolsRemoved(ClosedRange),
    /// Symbols possibly changed at these positions
    SymbolsChanged(ClosedRange),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(row: usize, begin: usize, end: usize) -> SubseqChange {
        SubseqChange {
            row,
            columns: ClosedRange::new(begin, end),
            operation: SubseqOperation::ExtendLeft,
            before: vec![b'-'; end - begin + 1],
            after: vec![b'A'; end - begin + 1],
        }
    }

    #[test]
    fn test_changed_columns_union() {
        let changes = vec![change(1, 4, 5), change(3, 2, 2), change(2, 7, 9)];
        assert_eq!(changed_columns(&changes), Some(ClosedRange::new(2, 9)));
        assert_eq!(changed_rows(&changes), Some(ClosedRange::new(1, 3)));
        assert_eq!(changed_columns(&[]), None);
    }

    #[test]
    fn test_inverse_swaps_content() {
        let c = change(1, 4, 5);
        let inv = c.inverse();
        assert_eq!(inv.operation, SubseqOperation::TrimLeft);
        assert_eq!(inv.before, c.after);
        assert_eq!(inv.after, c.before);
        assert_eq!(inv.inverse(), c);
    }
}
