//! The editable multiple sequence alignment.
//!
//! An [`Alignment`] owns an ordered list of equally long [`SequenceRow`]s and
//! exposes every structural edit the editor supports:
//! - `rows`: append/insert/remove/move/swap/sort rows
//! - `gaps`: insert gap columns, sweep all-gap columns
//! - `subseq`: move a row's start/stop and the extend/trim/level batches built on it
//! - `region`: collapse and slide rectangular regions
//!
//! Rows and columns are addressed with signed 1-based indices (negative
//! counts from the end). Indices are validated and turned into 0-based
//! positions on entry; every algorithm below works 0-based and converts back
//! to 1-based only when building return values and events.
//!
//! A failed operation returns an [`EditError`] before touching any state.
//! A successful one appends its [`AlignmentEvent`]s to a queue drained with
//! [`Alignment::take_events`].

mod gaps;
mod region;
mod rows;
mod subseq;

use thiserror::Error;

use crate::coords::{normalize_index, ClosedRange, Rect};
use crate::event::AlignmentEvent;
use crate::model::{is_gap, SequenceRow, SequenceType, DEFAULT_GAP};

/// Errors reported by alignment edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("row index {index} is out of range (alignment has {rows} rows)")]
    RowOutOfRange { index: isize, rows: usize },

    #[error("column index {index} is out of range (alignment length is {length})")]
    ColumnOutOfRange { index: isize, length: usize },

    #[error("row '{id}' has {found} columns but the alignment has {expected}")]
    LengthMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("row '{id}' is {found} but the alignment is {expected}")]
    SequenceTypeMismatch {
        id: String,
        expected: SequenceType,
        found: SequenceType,
    },

    #[error("the alignment has no rows")]
    NoRows,

    #[error("count must be positive")]
    ZeroCount,

    #[error("{0:?} is not a gap character")]
    InvalidGapChar(char),

    #[error("position {position} is outside the source of row {row} (1..={len})")]
    PositionOutOfRange {
        row: usize,
        position: usize,
        len: usize,
    },
}

/// An ordered collection of aligned rows sharing one length.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// Alphabet every row must share
    sequence_type: SequenceType,
    /// Rows, all of `length()` columns
    rows: Vec<SequenceRow>,
    /// Byte written when an edit creates gaps
    gap_char: u8,
    /// Optional display name
    pub name: Option<String>,
    /// Optional free-text description
    pub description: Option<String>,
    /// Events recorded since the last drain
    events: Vec<AlignmentEvent>,
}

impl Default for Alignment {
    fn default() -> Self {
        Self::new(SequenceType::Unknown)
    }
}

impl Alignment {
    /// Creates an empty alignment for the given alphabet.
    pub fn new(sequence_type: SequenceType) -> Self {
        Self {
            sequence_type,
            rows: Vec::new(),
            gap_char: DEFAULT_GAP,
            name: None,
            description: None,
            events: Vec::new(),
        }
    }

    /// Returns the alphabet tag.
    pub fn sequence_type(&self) -> SequenceType {
        self.sequence_type
    }

    /// Returns the gap byte written by edits.
    pub fn gap_char(&self) -> u8 {
        self.gap_char
    }

    /// Changes the gap byte written by subsequent edits.
    pub fn set_gap_char(&mut self, gap: u8) -> Result<(), EditError> {
        if !is_gap(gap) {
            return Err(EditError::InvalidGapChar(gap as char));
        }
        self.gap_char = gap;
        Ok(())
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns, or 0 when there are no rows.
    pub fn length(&self) -> usize {
        self.rows.first().map_or(0, SequenceRow::len)
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns all rows, top to bottom.
    pub fn rows(&self) -> &[SequenceRow] {
        &self.rows
    }

    /// Gets a row by signed 1-based index.
    pub fn row(&self, index: isize) -> Option<&SequenceRow> {
        match self.normalize_row(index) {
            0 => None,
            i => self.rows.get(i - 1),
        }
    }

    /// Gets the byte at a signed 1-based row and column.
    pub fn at(&self, row: isize, column: isize) -> Option<u8> {
        let col = self.normalize_column(column);
        if col == 0 {
            return None;
        }
        self.row(row)?.char_at(col - 1)
    }

    /// Normalizes a signed row index to a positive 1-based one, 0 if invalid.
    pub fn normalize_row(&self, index: isize) -> usize {
        normalize_index(index, self.rows.len())
    }

    /// Normalizes a signed column index to a positive 1-based one, 0 if invalid.
    pub fn normalize_column(&self, index: isize) -> usize {
        normalize_index(index, self.length())
    }

    /// Returns true if `index` addresses an existing row.
    pub fn is_valid_row(&self, index: isize) -> bool {
        self.normalize_row(index) != 0
    }

    /// Returns true if `index` addresses an existing column.
    pub fn is_valid_column(&self, index: isize) -> bool {
        self.normalize_column(index) != 0
    }

    /// Returns true if every row holds a gap at the signed 1-based column.
    pub fn is_gap_column(&self, column: isize) -> Result<bool, EditError> {
        let col = self.column_index(column)?;
        Ok(self.rows.iter().all(|r| is_gap(r.as_bytes()[col])))
    }

    /// Drains the events recorded since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<AlignmentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns true if events are waiting to be drained.
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn emit(&mut self, event: AlignmentEvent) {
        log::trace!("alignment event: {:?}", event);
        self.events.push(event);
    }

    // ------------------------------------------------------------------
    // Entry-point validation. All return 0-based positions.

    fn row_index(&self, index: isize) -> Result<usize, EditError> {
        match self.normalize_row(index) {
            0 => Err(EditError::RowOutOfRange {
                index,
                rows: self.rows.len(),
            }),
            i => Ok(i - 1),
        }
    }

    fn column_index(&self, index: isize) -> Result<usize, EditError> {
        if self.rows.is_empty() {
            return Err(EditError::NoRows);
        }
        match self.normalize_column(index) {
            0 => Err(EditError::ColumnOutOfRange {
                index,
                length: self.length(),
            }),
            i => Ok(i - 1),
        }
    }

    /// Row insertion point: `1..=rows+1`, with `-1` meaning "after the last".
    fn row_insertion_index(&self, index: isize) -> Result<usize, EditError> {
        match normalize_index(index, self.rows.len() + 1) {
            0 => Err(EditError::RowOutOfRange {
                index,
                rows: self.rows.len(),
            }),
            i => Ok(i - 1),
        }
    }

    /// Column insertion point: `1..=length+1`, with `-1` meaning "after the last".
    fn column_insertion_index(&self, index: isize) -> Result<usize, EditError> {
        if self.rows.is_empty() {
            return Err(EditError::NoRows);
        }
        match normalize_index(index, self.length() + 1) {
            0 => Err(EditError::ColumnOutOfRange {
                index,
                length: self.length(),
            }),
            i => Ok(i - 1),
        }
    }

    /// Validates two row bounds given in any order.
    fn row_span(&self, top: isize, bottom: isize) -> Result<ClosedRange, EditError> {
        let a = self.row_index(top)?;
        let b = self.row_index(bottom)?;
        Ok(ClosedRange::normalized(a, b))
    }

    /// Validates a rectangle; returns it 0-based.
    fn rect_index(&self, rect: Rect) -> Result<Rect, EditError> {
        let left = self.column_index(rect.left as isize)?;
        let right = self.column_index(rect.right as isize)?;
        let top = self.row_index(rect.top as isize)?;
        let bottom = self.row_index(rect.bottom as isize)?;
        Ok(Rect::new(left, top, right, bottom))
    }

    fn check_row(&self, row: &SequenceRow) -> Result<(), EditError> {
        if row.sequence_type() != self.sequence_type {
            return Err(EditError::SequenceTypeMismatch {
                id: row.id().to_string(),
                expected: self.sequence_type,
                found: row.sequence_type(),
            });
        }
        if !self.rows.is_empty() && row.len() != self.length() {
            return Err(EditError::LengthMismatch {
                id: row.id().to_string(),
                expected: self.length(),
                found: row.len(),
            });
        }
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn debug_check_invariants(&self) {
        let length = self.length();
        for row in &self.rows {
            debug_assert_eq!(row.len(), length, "row '{}' length drifted", row.id());
            debug_assert_eq!(
                row.as_bytes().iter().filter(|&&c| !is_gap(c)).count(),
                row.residue_count(),
                "row '{}' residues out of sync with start/stop",
                row.id()
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_invariants(&self) {}
}
