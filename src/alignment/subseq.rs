//! Subsequence boundary editing.
//!
//! Moving a row's start or stop is the primitive every boundary edit is
//! built on. It has three cases:
//! - extend: residues are written into the gaps next to the current edge,
//!   inserting exactly the missing gap columns at the alignment edge first
//! - trim: residues inside the window are replaced with gaps
//! - cross-over: a new start beyond the stop (or stop before the start)
//!   extends toward the new bound, then trims the old side down to it
//!
//! The batch operations (`extend_*`, `trim_*`, `level_*`) apply the
//! primitive to a block of rows relative to a column and never insert
//! columns themselves.

use super::{Alignment, EditError};
use crate::event::{AlignmentEvent, SubseqChange, SubseqOperation};
use crate::model::RowEdit;

fn to_change(row: usize, edit: RowEdit, operation: SubseqOperation) -> SubseqChange {
    SubseqChange {
        row: row + 1,
        columns: edit.columns.to_one_based(),
        operation,
        before: edit.before,
        after: edit.after,
    }
}

impl Alignment {
    /// Moves the start of a row's window to the 1-based source position
    /// `new_start`.
    ///
    /// Returns every change applied to the row (empty for a no-op). When
    /// extension needs more room than the row's leading gaps provide, the
    /// shortfall is inserted as gap columns at column 1 first, which is
    /// recorded as its own event.
    pub fn set_subseq_start(
        &mut self,
        row: isize,
        new_start: usize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        let r = self.row_index(row)?;
        self.check_source_position(r, new_start)?;
        let changes = self.set_start_at(r, new_start);
        Ok(self.emit_changes(changes))
    }

    /// Moves the stop of a row's window to the 1-based source position
    /// `new_stop`. Mirror image of [`Alignment::set_subseq_start`]; missing
    /// room is inserted after the last column.
    pub fn set_subseq_stop(
        &mut self,
        row: isize,
        new_stop: usize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        let r = self.row_index(row)?;
        self.check_source_position(r, new_stop)?;
        let changes = self.set_stop_at(r, new_stop);
        Ok(self.emit_changes(changes))
    }

    /// Extends each row in `top..=bottom` leftward into the gaps between its
    /// first residue and `column`, as far as its source allows.
    pub fn extend_subseqs_left(
        &mut self,
        top: isize,
        bottom: isize,
        column: isize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        self.for_each_row(top, bottom, column, Self::extend_left_at)
    }

    /// Extends each row in `top..=bottom` rightward into the gaps between
    /// its last residue and `column`, as far as its source allows.
    pub fn extend_subseqs_right(
        &mut self,
        top: isize,
        bottom: isize,
        column: isize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        self.for_each_row(top, bottom, column, Self::extend_right_at)
    }

    /// Trims the residues lying between each row's first residue and
    /// `column`, always leaving at least one residue.
    pub fn trim_subseqs_left(
        &mut self,
        top: isize,
        bottom: isize,
        column: isize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        self.for_each_row(top, bottom, column, Self::trim_left_at)
    }

    /// Trims the residues lying between `column` and each row's last
    /// residue, always leaving at least one residue.
    pub fn trim_subseqs_right(
        &mut self,
        top: isize,
        bottom: isize,
        column: isize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        self.for_each_row(top, bottom, column, Self::trim_right_at)
    }

    /// Makes each row start at `column` where possible: trims what lies left
    /// of it, then extends up to it.
    pub fn level_subseqs_left(
        &mut self,
        top: isize,
        bottom: isize,
        column: isize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        self.for_each_row(top, bottom, column, |aln, r, c| {
            let mut changes = if c > 0 { aln.trim_left_at(r, c - 1) } else { Vec::new() };
            changes.extend(aln.extend_left_at(r, c));
            changes
        })
    }

    /// Makes each row stop at `column` where possible: trims what lies right
    /// of it, then extends up to it.
    pub fn level_subseqs_right(
        &mut self,
        top: isize,
        bottom: isize,
        column: isize,
    ) -> Result<Vec<SubseqChange>, EditError> {
        self.for_each_row(top, bottom, column, |aln, r, c| {
            let mut changes = if c + 1 < aln.length() {
                aln.trim_right_at(r, c + 1)
            } else {
                Vec::new()
            };
            changes.extend(aln.extend_right_at(r, c));
            changes
        })
    }

    // ------------------------------------------------------------------

    fn check_source_position(&self, r: usize, position: usize) -> Result<(), EditError> {
        let len = self.rows[r].source().len();
        if position == 0 || position > len {
            return Err(EditError::PositionOutOfRange {
                row: r + 1,
                position,
                len,
            });
        }
        Ok(())
    }

    pub(super) fn emit_changes(&mut self, changes: Vec<SubseqChange>) -> Vec<SubseqChange> {
        if !changes.is_empty() {
            self.debug_check_invariants();
            self.emit(AlignmentEvent::SubseqsChanged(changes.clone()));
        }
        changes
    }

    /// Validates a row block and column, then applies `op` to each row with
    /// 0-based indices, collecting every change into a single event.
    fn for_each_row<F>(
        &mut self,
        top: isize,
        bottom: isize,
        column: isize,
        mut op: F,
    ) -> Result<Vec<SubseqChange>, EditError>
    where
        F: FnMut(&mut Alignment, usize, usize) -> Vec<SubseqChange>,
    {
        let span = self.row_span(top, bottom)?;
        let col = self.column_index(column)?;

        let mut changes = Vec::new();
        for r in span.begin..=span.end {
            changes.extend(op(self, r, col));
        }
        log::debug!(
            "{} subseq changes over rows {} at column {}",
            changes.len(),
            span.to_one_based(),
            col + 1
        );
        Ok(self.emit_changes(changes))
    }

    pub(super) fn set_start_at(&mut self, r: usize, new_start: usize) -> Vec<SubseqChange> {
        let gap = self.gap_char;
        let (start, stop) = (self.rows[r].start(), self.rows[r].stop());

        if new_start == start {
            Vec::new()
        } else if new_start < start {
            let needed = start - new_start;
            let head = self.rows[r].head_gaps();
            if needed > head {
                self.insert_gaps_at(0, needed - head, gap);
            }
            self.rows[r]
                .set_start(new_start, gap)
                .map(|edit| to_change(r, edit, SubseqOperation::ExtendLeft))
                .into_iter()
                .collect()
        } else if new_start <= stop {
            self.rows[r]
                .set_start(new_start, gap)
                .map(|edit| to_change(r, edit, SubseqOperation::TrimLeft))
                .into_iter()
                .collect()
        } else {
            log::trace!("row {} start {} crosses stop {}", r + 1, new_start, stop);
            let mut changes = self.set_stop_at(r, new_start);
            changes.extend(self.set_start_at(r, new_start));
            changes
        }
    }

    pub(super) fn set_stop_at(&mut self, r: usize, new_stop: usize) -> Vec<SubseqChange> {
        let gap = self.gap_char;
        let (start, stop) = (self.rows[r].start(), self.rows[r].stop());

        if new_stop == stop {
            Vec::new()
        } else if new_stop > stop {
            let needed = new_stop - stop;
            let tail = self.rows[r].tail_gaps();
            if needed > tail {
                let end = self.length();
                self.insert_gaps_at(end, needed - tail, gap);
            }
            self.rows[r]
                .set_stop(new_stop, gap)
                .map(|edit| to_change(r, edit, SubseqOperation::ExtendRight))
                .into_iter()
                .collect()
        } else if new_stop >= start {
            self.rows[r]
                .set_stop(new_stop, gap)
                .map(|edit| to_change(r, edit, SubseqOperation::TrimRight))
                .into_iter()
                .collect()
        } else {
            log::trace!("row {} stop {} crosses start {}", r + 1, new_stop, start);
            let mut changes = self.set_start_at(r, new_stop);
            changes.extend(self.set_stop_at(r, new_stop));
            changes
        }
    }

    fn extend_left_at(&mut self, r: usize, col: usize) -> Vec<SubseqChange> {
        let row = &self.rows[r];
        let first = row.first_residue_column();
        if col >= first {
            return Vec::new();
        }
        let n = (first - col).min(row.start() - 1);
        if n == 0 {
            return Vec::new();
        }
        let new_start = row.start() - n;
        self.set_start_at(r, new_start)
    }

    fn extend_right_at(&mut self, r: usize, col: usize) -> Vec<SubseqChange> {
        let row = &self.rows[r];
        let last = row.last_residue_column();
        if col <= last {
            return Vec::new();
        }
        let n = (col - last).min(row.source().len() - row.stop());
        if n == 0 {
            return Vec::new();
        }
        let new_stop = row.stop() + n;
        self.set_stop_at(r, new_stop)
    }

    fn trim_left_at(&mut self, r: usize, col: usize) -> Vec<SubseqChange> {
        let row = &self.rows[r];
        let first = row.first_residue_column();
        if col < first {
            return Vec::new();
        }
        let k = row
            .residues_between(first, col)
            .min(row.residue_count() - 1);
        if k == 0 {
            return Vec::new();
        }
        let new_start = row.start() + k;
        self.set_start_at(r, new_start)
    }

    fn trim_right_at(&mut self, r: usize, col: usize) -> Vec<SubseqChange> {
        let row = &self.rows[r];
        let last = row.last_residue_column();
        if col > last {
            return Vec::new();
        }
        let k = row
            .residues_between(col, last)
            .min(row.residue_count() - 1);
        if k == 0 {
            return Vec::new();
        }
        let new_stop = row.stop() - k;
        self.set_stop_at(r, new_stop)
    }
}
