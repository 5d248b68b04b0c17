//! Gap column insertion and removal.

use super::{Alignment, EditError};
use crate::coords::ClosedRange;
use crate::event::AlignmentEvent;
use crate::model::is_gap;

impl Alignment {
    /// Inserts `count` gap columns before `column` in every row.
    ///
    /// `column` may be `length()+1` (or `-1`) to append. Returns the 1-based
    /// columns now occupied by the new gaps.
    pub fn insert_gap_columns(
        &mut self,
        column: isize,
        count: usize,
        gap: u8,
    ) -> Result<ClosedRange, EditError> {
        if !is_gap(gap) {
            return Err(EditError::InvalidGapChar(gap as char));
        }
        if count == 0 {
            return Err(EditError::ZeroCount);
        }
        let col = self.column_insertion_index(column)?;
        Ok(self.insert_gaps_at(col, count, gap))
    }

    /// Inserts gap columns at a validated 0-based position.
    pub(super) fn insert_gaps_at(&mut self, col: usize, count: usize, gap: u8) -> ClosedRange {
        log::debug!("insert {} gap columns at {}", count, col + 1);
        for row in &mut self.rows {
            row.insert_gaps(col, count, gap);
        }
        self.debug_check_invariants();

        let columns = ClosedRange::with_len(col + 1, count);
        self.emit(AlignmentEvent::GapColumnsInserted { columns });
        columns
    }

    /// Removes every column that holds only gaps.
    ///
    /// Contiguous all-gap columns are removed as one run, last run first so
    /// earlier positions stay valid. Returns the number of columns removed.
    pub fn remove_gap_columns(&mut self) -> usize {
        let runs = self.gap_column_runs();
        if runs.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for run in runs.iter().rev() {
            for row in &mut self.rows {
                row.remove_columns(run.begin, run.len());
            }
            removed += run.len();
        }
        log::debug!("removed {} gap columns in {} runs", removed, runs.len());
        self.debug_check_invariants();

        self.emit(AlignmentEvent::GapColumnsRemoved { count: removed });
        removed
    }

    /// Returns the 0-based runs of contiguous all-gap columns, left to right.
    fn gap_column_runs(&self) -> Vec<ClosedRange> {
        let mut runs: Vec<ClosedRange> = Vec::new();
        if self.rows.is_empty() {
            return runs;
        }

        for col in 0..self.length() {
            if !self.rows.iter().all(|r| is_gap(r.as_bytes()[col])) {
                continue;
            }
            match runs.last_mut() {
                Some(run) if run.end + 1 == col => run.end = col,
                _ => runs.push(ClosedRange::new(col, col)),
            }
        }
        runs
    }
}
