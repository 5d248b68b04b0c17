//! Character distribution kept in step with an alignment.
//!
//! [`LiveDistribution`] is seeded from an [`Alignment`] once and then updated
//! only from [`AlignmentEvent`]s. Each handler touches the columns named by
//! its event and nothing else, prunes zero-valued keys in that range, and
//! reports what it touched as [`DistributionEvent`]s.
//!
//! The divisor used for proportions is the number of rows. A change of row
//! count therefore changes every column's proportions, and is reported as
//! data changed over the whole width even though only the inserted or
//! removed rows' counts were touched.

use crate::alignment::Alignment;
use crate::coords::{union, ClosedRange};
use crate::distribution::{CharProportionMap, CharacterCountDistribution, column_proportions};
use crate::event::{AlignmentEvent, DistributionEvent, SubseqChange};

/// Non-gap character counts of an alignment, maintained incrementally.
#[derive(Debug, Clone, Default)]
pub struct LiveDistribution {
    distribution: CharacterCountDistribution,
    /// Rows currently counted
    rows: usize,
}

impl LiveDistribution {
    /// Counts the current content of `alignment`.
    pub fn new(alignment: &Alignment) -> Self {
        Self {
            distribution: from_scratch(alignment),
            rows: alignment.row_count(),
        }
    }

    /// Returns the maintained counts.
    pub fn distribution(&self) -> &CharacterCountDistribution {
        &self.distribution
    }

    /// Number of rows the counts are divided by.
    pub fn divisor(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.distribution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distribution.is_empty()
    }

    /// Proportions of the 1-based `column`.
    pub fn proportions(&self, column: usize) -> CharProportionMap {
        self.distribution
            .column(column)
            .map(|c| column_proportions(c, self.rows))
            .unwrap_or_default()
    }

    /// Applies one alignment event and reports the columns it changed.
    pub fn apply(&mut self, event: &AlignmentEvent) -> Vec<DistributionEvent> {
        let events = match event {
            AlignmentEvent::RowsInserted { content, .. } => self.rows_inserted(content),
            AlignmentEvent::RowsRemoved { content, .. } => self.rows_removed(content),
            AlignmentEvent::RowsMoved { .. }
            | AlignmentEvent::RowsSwapped { .. }
            | AlignmentEvent::RowsSorted => Vec::new(),
            AlignmentEvent::Reset { .. } => self.reset(),
            AlignmentEvent::GapColumnsInserted { columns } => self.gap_columns_inserted(*columns),
            AlignmentEvent::GapColumnsRemoved { count } => self.gap_columns_removed(*count),
            AlignmentEvent::SubseqsChanged(changes) => self.subseqs_changed(changes),
            AlignmentEvent::RegionSlid {
                rect,
                final_columns,
                block,
                ..
            } => self.region_slid(rect.columns(), *final_columns, block),
        };
        for e in &events {
            log::trace!("distribution event: {:?}", e);
        }
        events
    }

    fn whole(&self) -> ClosedRange {
        ClosedRange::with_len(1, self.distribution.len())
    }

    fn rows_inserted(&mut self, content: &[Vec<u8>]) -> Vec<DistributionEvent> {
        let Some(width) = content.first().map(Vec::len) else {
            return Vec::new();
        };
        let was_empty = self.rows == 0;
        if was_empty {
            self.distribution = CharacterCountDistribution::with_length(width);
        }
        self.rows += content.len();
        if width == 0 {
            return Vec::new();
        }

        for row in content {
            self.distribution.add_chars(row, None, 1);
        }
        self.distribution.remove_zero_value_keys(1, width);

        if was_empty {
            vec![DistributionEvent::ColumnsInserted(self.whole())]
        } else {
            vec![DistributionEvent::DataChanged(self.whole())]
        }
    }

    fn rows_removed(&mut self, content: &[Vec<u8>]) -> Vec<DistributionEvent> {
        if content.is_empty() {
            return Vec::new();
        }
        self.rows -= content.len();
        if self.distribution.is_empty() {
            return Vec::new();
        }
        if self.rows == 0 {
            return self.reset();
        }

        for row in content {
            self.distribution.subtract_chars(row, None, 1);
        }
        let width = self.distribution.len();
        self.distribution.remove_zero_value_keys(1, width);
        vec![DistributionEvent::DataChanged(self.whole())]
    }

    fn reset(&mut self) -> Vec<DistributionEvent> {
        self.rows = 0;
        if self.distribution.is_empty() {
            return Vec::new();
        }
        let removed = self.whole();
        self.distribution = CharacterCountDistribution::new();
        vec![DistributionEvent::ColumnsRemoved(removed)]
    }

    fn gap_columns_inserted(&mut self, columns: ClosedRange) -> Vec<DistributionEvent> {
        self.distribution.insert_blanks(columns.begin, columns.len());
        vec![DistributionEvent::ColumnsInserted(columns)]
    }

    /// The event only carries a count. The swept columns are exactly the
    /// blank ones: a column with no residue in any row counts nothing.
    fn gap_columns_removed(&mut self, count: usize) -> Vec<DistributionEvent> {
        let mut runs: Vec<ClosedRange> = Vec::new();
        for col in 1..=self.distribution.len() {
            if !self.distribution.is_blank(col) {
                continue;
            }
            match runs.last_mut() {
                Some(run) if run.end + 1 == col => run.end = col,
                _ => runs.push(ClosedRange::new(col, col)),
            }
        }

        let found: usize = runs.iter().map(ClosedRange::len).sum();
        if found != count {
            log::warn!(
                "gap sweep removed {} columns but {} blank columns were found",
                count,
                found
            );
        }

        // back to front so each reported range is valid when applied in order
        runs.iter()
            .rev()
            .map(|run| {
                self.distribution.remove(run.begin, run.len());
                DistributionEvent::ColumnsRemoved(*run)
            })
            .collect()
    }

    fn subseqs_changed(&mut self, changes: &[SubseqChange]) -> Vec<DistributionEvent> {
        let mut touched = None;
        for change in changes {
            self.distribution
                .subtract_chars(&change.before, None, change.columns.begin);
            self.distribution
                .add_chars(&change.after, None, change.columns.begin);
            touched = union(touched, change.columns);
        }
        match touched {
            Some(range) => {
                self.distribution.remove_zero_value_keys(range.begin, range.end);
                vec![DistributionEvent::DataChanged(range)]
            }
            None => Vec::new(),
        }
    }

    fn region_slid(
        &mut self,
        from: ClosedRange,
        to: ClosedRange,
        block: &[Vec<u8>],
    ) -> Vec<DistributionEvent> {
        let moved =
            CharacterCountDistribution::from_rows(block.iter().map(Vec::as_slice), from.len());
        self.distribution.subtract(&moved, from.begin);
        self.distribution.add(&moved, to.begin);

        let range = from.merge(&to);
        self.distribution.remove_zero_value_keys(range.begin, range.end);
        vec![DistributionEvent::DataChanged(range)]
    }
}

/// Counts an alignment's current content directly.
pub fn from_scratch(alignment: &Alignment) -> CharacterCountDistribution {
    CharacterCountDistribution::from_rows(
        alignment.rows().iter().map(|r| r.as_bytes()),
        alignment.length(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::tests::alignment;
    use crate::coords::Rect;
    use crate::model::{SequenceRow, SequenceType};

    /// Feeds every pending event to `live` and checks it against a recount.
    fn sync(aln: &mut Alignment, live: &mut LiveDistribution) -> Vec<DistributionEvent> {
        let mut out = Vec::new();
        for event in aln.take_events() {
            out.extend(live.apply(&event));
        }
        assert_eq!(live.distribution(), &from_scratch(aln));
        assert_eq!(live.divisor(), aln.row_count());
        out
    }

    #[test]
    fn test_gap_columns_inserted() {
        let mut aln = alignment(&["ACGTA", "AC-TA", "ACG-A"]);
        let mut live = LiveDistribution::new(&aln);
        aln.insert_gap_columns(1, 2, b'-').unwrap();
        let events = sync(&mut aln, &mut live);
        assert_eq!(events, vec![DistributionEvent::ColumnsInserted(ClosedRange::new(1, 2))]);
        assert_eq!(live.len(), 7);
    }

    #[test]
    fn test_gap_columns_removed_in_runs() {
        let mut aln = alignment(&["A-C", "G-T"]);
        let mut live = LiveDistribution::new(&aln);
        aln.insert_gap_columns(4, 2, b'-').unwrap();
        aln.insert_gap_columns(1, 1, b'.').unwrap();
        sync(&mut aln, &mut live);

        assert_eq!(aln.remove_gap_columns(), 4);
        let events = sync(&mut aln, &mut live);
        assert_eq!(
            events,
            vec![
                DistributionEvent::ColumnsRemoved(ClosedRange::new(5, 6)),
                DistributionEvent::ColumnsRemoved(ClosedRange::new(3, 3)),
                DistributionEvent::ColumnsRemoved(ClosedRange::new(1, 1)),
            ]
        );
    }

    #[test]
    fn test_rows_inserted_and_removed() {
        let mut aln = Alignment::new(SequenceType::Unknown);
        let mut live = LiveDistribution::new(&aln);
        aln.append(SequenceRow::from_gapped("a", "AC-", SequenceType::Unknown).unwrap())
            .unwrap();
        let events = sync(&mut aln, &mut live);
        assert_eq!(events, vec![DistributionEvent::ColumnsInserted(ClosedRange::new(1, 3))]);

        aln.append(SequenceRow::from_gapped("b", "A-G", SequenceType::Unknown).unwrap())
            .unwrap();
        let events = sync(&mut aln, &mut live);
        assert_eq!(events, vec![DistributionEvent::DataChanged(ClosedRange::new(1, 3))]);
        assert_eq!(live.proportions(1)[&b'A'], 1.0);
        assert_eq!(live.proportions(3)[&b'G'], 0.5);

        aln.remove_first().unwrap();
        sync(&mut aln, &mut live);
        assert!(live.distribution().column(2).unwrap().is_empty());

        aln.remove_last().unwrap();
        let events = sync(&mut aln, &mut live);
        assert_eq!(events, vec![DistributionEvent::ColumnsRemoved(ClosedRange::new(1, 3))]);
        assert!(live.is_empty());
    }

    #[test]
    fn test_reset_and_reordering() {
        let mut aln = alignment(&["AC", "GT", "-A"]);
        let mut live = LiveDistribution::new(&aln);
        aln.swap(1, 3).unwrap();
        aln.move_row(1, 3).unwrap();
        aln.sort_by(|a, b| a.id().cmp(b.id()));
        assert!(sync(&mut aln, &mut live).is_empty());

        aln.clear();
        let events = sync(&mut aln, &mut live);
        assert_eq!(events, vec![DistributionEvent::ColumnsRemoved(ClosedRange::new(1, 2))]);
    }

    #[test]
    fn test_subseqs_changed_touches_union() {
        let mut aln = alignment(&["--ACG-", "-TT---", "GGGG--"]);
        let mut live = LiveDistribution::new(&aln);
        aln.collapse_left(Rect::new(1, 1, 6, 3)).unwrap();
        let events = sync(&mut aln, &mut live);
        assert_eq!(events, vec![DistributionEvent::DataChanged(ClosedRange::new(1, 5))]);
    }

    #[test]
    fn test_region_slid() {
        let mut aln = alignment(&["--AB--", "-CD---"]);
        let mut live = LiveDistribution::new(&aln);
        aln.slide_region(3, 1, 4, 2, 2).unwrap();
        let events = sync(&mut aln, &mut live);
        assert_eq!(events, vec![DistributionEvent::DataChanged(ClosedRange::new(3, 6))]);
    }

    #[test]
    fn test_queue_of_several_events() {
        let mut aln = alignment(&["A-C-", "-GT-"]);
        let mut live = LiveDistribution::new(&aln);
        aln.insert_gap_columns(2, 1, b'-').unwrap();
        aln.remove_gap_columns();
        aln.slide_region(3, 2, 3, 2, -1).unwrap();
        aln.append(SequenceRow::from_gapped("x", "TT-", SequenceType::Unknown).unwrap())
            .unwrap();
        aln.remove_at(1).unwrap();
        sync(&mut aln, &mut live);
    }
}
