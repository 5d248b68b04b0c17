//! Row management: insertion, removal and reordering.

use std::cmp::Ordering;

use super::{Alignment, EditError};
use crate::coords::ClosedRange;
use crate::event::AlignmentEvent;
use crate::model::SequenceRow;

impl Alignment {
    /// Adds a row after the last one.
    ///
    /// Refused when the row's alphabet differs from the alignment's or, if
    /// rows already exist, its length differs from `length()`.
    pub fn append(&mut self, row: SequenceRow) -> Result<(), EditError> {
        self.insert(-1, row)
    }

    /// Adds a row before the first one.
    pub fn prepend(&mut self, row: SequenceRow) -> Result<(), EditError> {
        self.insert(1, row)
    }

    /// Inserts a row so that it ends up at `at` (`1..=rows+1`, `-1` appends).
    pub fn insert(&mut self, at: isize, row: SequenceRow) -> Result<(), EditError> {
        let index = self.row_insertion_index(at)?;
        self.check_row(&row)?;

        log::debug!("insert row '{}' at {}", row.id(), index + 1);
        let content = vec![row.as_bytes().to_vec()];
        self.rows.insert(index, row);
        self.debug_check_invariants();
        self.emit(AlignmentEvent::RowsInserted {
            rows: ClosedRange::new(index + 1, index + 1),
            content,
        });
        Ok(())
    }

    /// Removes and returns the row at `index`.
    pub fn remove_at(&mut self, index: isize) -> Result<SequenceRow, EditError> {
        let i = self.row_index(index)?;
        let mut removed = self.remove_span(ClosedRange::new(i, i));
        Ok(removed.remove(0))
    }

    /// Removes `count` rows starting at `index`.
    pub fn remove_rows(
        &mut self,
        index: isize,
        count: usize,
    ) -> Result<Vec<SequenceRow>, EditError> {
        if count == 0 {
            return Err(EditError::ZeroCount);
        }
        let first = self.row_index(index)?;
        if count > self.rows.len() - first {
            return Err(EditError::RowOutOfRange {
                index,
                rows: self.rows.len(),
            });
        }
        Ok(self.remove_span(ClosedRange::with_len(first, count)))
    }

    /// Removes and returns the first row, if any.
    pub fn remove_first(&mut self) -> Option<SequenceRow> {
        self.remove_at(1).ok()
    }

    /// Removes and returns the last row, if any.
    pub fn remove_last(&mut self) -> Option<SequenceRow> {
        self.remove_at(-1).ok()
    }

    /// Removes every row.
    pub fn clear(&mut self) -> Vec<SequenceRow> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        let rows = self.rows.len();
        let columns = self.length();
        log::debug!("clear {} rows", rows);
        let removed = std::mem::take(&mut self.rows);
        self.emit(AlignmentEvent::Reset { rows, columns });
        removed
    }

    fn remove_span(&mut self, span: ClosedRange) -> Vec<SequenceRow> {
        log::debug!("remove rows {}", span.to_one_based());
        let removed: Vec<SequenceRow> = self.rows.drain(span.begin..=span.end).collect();
        let content = removed.iter().map(|r| r.as_bytes().to_vec()).collect();
        self.emit(AlignmentEvent::RowsRemoved {
            rows: span.to_one_based(),
            content,
        });
        removed
    }

    /// Moves the row at `from` so that it ends up at `to`.
    pub fn move_row(&mut self, from: isize, to: isize) -> Result<(), EditError> {
        self.move_row_range(from, from, to)
    }

    /// Moves the rows `first..=last` so that `first` ends up at `to`.
    ///
    /// `to` must leave room for the whole block: `1..=rows-block+1`.
    pub fn move_row_range(
        &mut self,
        first: isize,
        last: isize,
        to: isize,
    ) -> Result<(), EditError> {
        let span = self.row_span(first, last)?;
        let max_to = self.rows.len() - span.len() + 1;
        let target = match crate::coords::normalize_index(to, self.rows.len()) {
            t if t >= 1 && t <= max_to => t - 1,
            _ => {
                return Err(EditError::RowOutOfRange {
                    index: to,
                    rows: self.rows.len(),
                })
            }
        };
        self.move_span(span, target);
        Ok(())
    }

    /// Moves a row by `delta` positions, clamped to the list bounds.
    ///
    /// Returns the delta actually applied.
    pub fn move_row_relative(&mut self, row: isize, delta: isize) -> Result<isize, EditError> {
        self.move_row_range_relative(row, row, delta)
    }

    /// Moves the rows `first..=last` by `delta` positions, clamped so the
    /// block stays inside the list.
    ///
    /// Returns the delta actually applied.
    pub fn move_row_range_relative(
        &mut self,
        first: isize,
        last: isize,
        delta: isize,
    ) -> Result<isize, EditError> {
        let span = self.row_span(first, last)?;
        let min_delta = -(span.begin as isize);
        let max_delta = (self.rows.len() - 1 - span.end) as isize;
        let applied = delta.clamp(min_delta, max_delta);
        self.move_span(span, (span.begin as isize + applied) as usize);
        Ok(applied)
    }

    /// Moves a 0-based span so that its first row lands at 0-based `target`.
    fn move_span(&mut self, span: ClosedRange, target: usize) {
        if target == span.begin {
            return;
        }
        log::debug!("move rows {} to {}", span.to_one_based(), target + 1);
        let block: Vec<SequenceRow> = self.rows.drain(span.begin..=span.end).collect();
        self.rows.splice(target..target, block);
        self.emit(AlignmentEvent::RowsMoved {
            rows: span.to_one_based(),
            to: target + 1,
        });
    }

    /// Exchanges two rows.
    pub fn swap(&mut self, first: isize, second: isize) -> Result<(), EditError> {
        let a = self.row_index(first)?;
        let b = self.row_index(second)?;
        if a == b {
            return Ok(());
        }
        self.rows.swap(a, b);
        self.emit(AlignmentEvent::RowsSwapped {
            first: a + 1,
            second: b + 1,
        });
        Ok(())
    }

    /// Stable sort of the rows with a comparator.
    ///
    /// Nothing is recorded when the order is already sorted.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&SequenceRow, &SequenceRow) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| compare(&self.rows[a], &self.rows[b]));
        if order.iter().enumerate().all(|(i, &j)| i == j) {
            return;
        }

        let mut old: Vec<Option<SequenceRow>> = self.rows.drain(..).map(Some).collect();
        self.rows = order.into_iter().filter_map(|j| old[j].take()).collect();
        log::debug!("sorted {} rows", self.rows.len());
        self.emit(AlignmentEvent::RowsSorted);
    }
}
