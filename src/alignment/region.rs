//! Rectangular region edits: collapsing and horizontal sliding.

use super::{Alignment, EditError};
use crate::coords::{ClosedRange, Rect};
use crate::event::{AlignmentEvent, SubseqChange, SubseqOperation};
use crate::model::is_gap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Alignment {
    /// Packs the residues of every row inside `rect` against its left edge.
    ///
    /// Residue order and the gap bytes themselves are preserved. Returns one
    /// `Internal` change per row that actually moved, spanning the outermost
    /// columns modified.
    pub fn collapse_left(&mut self, rect: Rect) -> Result<Vec<SubseqChange>, EditError> {
        self.collapse(rect, Side::Left)
    }

    /// Packs the residues of every row inside `rect` against its right edge.
    pub fn collapse_right(&mut self, rect: Rect) -> Result<Vec<SubseqChange>, EditError> {
        self.collapse(rect, Side::Right)
    }

    fn collapse(&mut self, rect: Rect, side: Side) -> Result<Vec<SubseqChange>, EditError> {
        let area = self.rect_index(rect)?;

        let mut changes = Vec::new();
        for r in area.top..=area.bottom {
            let segment = &mut self.rows[r].aligned_mut()[area.left..=area.right];
            let before = segment.to_vec();

            let (residues, gaps): (Vec<u8>, Vec<u8>) = before.iter().partition(|&&c| !is_gap(c));
            let after: Vec<u8> = match side {
                Side::Left => residues.into_iter().chain(gaps).collect(),
                Side::Right => gaps.into_iter().chain(residues).collect(),
            };

            let Some(first) = before.iter().zip(&after).position(|(a, b)| a != b) else {
                continue;
            };
            let last = before
                .iter()
                .zip(&after)
                .rposition(|(a, b)| a != b)
                .unwrap_or(first);
            segment.copy_from_slice(&after);

            changes.push(SubseqChange {
                row: r + 1,
                columns: ClosedRange::new(area.left + first + 1, area.left + last + 1),
                operation: SubseqOperation::Internal,
                before: before[first..=last].to_vec(),
                after: after[first..=last].to_vec(),
            });
        }

        log::debug!("collapse {:?} {}: {} rows changed", side, rect, changes.len());
        Ok(self.emit_changes(changes))
    }

    /// Number of positions the block in `rect` can slide left: the fewest
    /// contiguous gaps directly left of it across its rows.
    pub fn left_slidable_positions(&self, rect: Rect) -> Result<usize, EditError> {
        let area = self.rect_index(rect)?;
        Ok(self.slidable(area, Side::Left))
    }

    /// Number of positions the block in `rect` can slide right.
    pub fn right_slidable_positions(&self, rect: Rect) -> Result<usize, EditError> {
        let area = self.rect_index(rect)?;
        Ok(self.slidable(area, Side::Right))
    }

    fn slidable(&self, area: Rect, side: Side) -> usize {
        self.rows[area.top..=area.bottom]
            .iter()
            .map(|row| match side {
                Side::Left => row.gaps_left_of(area.left),
                Side::Right => row.gaps_right_of(area.right),
            })
            .min()
            .unwrap_or(0)
    }

    /// Slides the block bounded by the given (signed, any-order) columns and
    /// rows horizontally by up to `delta` positions.
    ///
    /// The block only moves over gaps: the distance is clamped to what every
    /// row in it allows in that direction. Returns the signed distance
    /// actually applied, 0 when blocked.
    pub fn slide_region(
        &mut self,
        left: isize,
        top: isize,
        right: isize,
        bottom: isize,
        delta: isize,
    ) -> Result<isize, EditError> {
        let l = self.column_index(left)?;
        let r = self.column_index(right)?;
        let t = self.row_index(top)?;
        let b = self.row_index(bottom)?;
        let area = Rect::new(l, t, r, b);

        if delta == 0 {
            return Ok(0);
        }
        let applied = if delta < 0 {
            -(self.slidable(area, Side::Left).min(delta.unsigned_abs()) as isize)
        } else {
            self.slidable(area, Side::Right).min(delta as usize) as isize
        };
        if applied == 0 {
            log::debug!("slide of {} by {} blocked", area, delta);
            return Ok(0);
        }

        let d = applied.unsigned_abs();
        for row in &mut self.rows[area.top..=area.bottom] {
            let bytes = row.aligned_mut();
            if applied < 0 {
                bytes[area.left - d..=area.right].rotate_left(d);
            } else {
                bytes[area.left..=area.right + d].rotate_right(d);
            }
        }

        let final_columns = area.columns().shifted(applied);
        let block = self.rows[area.top..=area.bottom]
            .iter()
            .map(|row| row.as_bytes()[final_columns.begin..=final_columns.end].to_vec())
            .collect();
        let rect = Rect::new(area.left + 1, area.top + 1, area.right + 1, area.bottom + 1);
        log::debug!("slide {} by {} (requested {})", rect, applied, delta);

        self.emit(AlignmentEvent::RegionSlid {
            rect,
            delta: applied,
            final_columns: final_columns.to_one_based(),
            block,
        });
        Ok(applied)
    }
}
