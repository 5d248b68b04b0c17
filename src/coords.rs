//! Coordinate helpers.
//!
//! Public entry points of the editor accept signed 1-based indices where a
//! negative value counts from the end (`-1` is the last row or column).
//! Everything is normalized here before reaching an algorithm, and the
//! range/rectangle types below are always inclusive on both ends.

use std::fmt;

/// Normalizes a signed 1-based index against `count` items.
///
/// Returns the positive 1-based index, or `0` when `index` is `0` or lies
/// outside `[-count, count]`.
pub fn normalize_index(index: isize, count: usize) -> usize {
    let count_i = count as isize;
    if index > 0 && index <= count_i {
        index as usize
    } else if index < 0 && -index <= count_i {
        (count_i + 1 + index) as usize
    } else {
        0
    }
}

/// An inclusive `[begin, end]` range of positions.
///
/// Used both for 1-based public ranges (event payloads, return values) and
/// 0-based internal spans; the owning API documents which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClosedRange {
    pub begin: usize,
    pub end: usize,
}

impl ClosedRange {
    /// Creates a range; `begin` must not exceed `end`.
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "malformed range {begin}..={end}");
        Self { begin, end }
    }

    /// A range covering `count` positions starting at `begin`.
    pub fn with_len(begin: usize, count: usize) -> Self {
        debug_assert!(count > 0);
        Self::new(begin, begin + count - 1)
    }

    /// Creates a range from two bounds given in any order.
    pub fn normalized(a: usize, b: usize) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.end - self.begin + 1
    }

    /// Never true; ranges always cover at least one position.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if `pos` lies inside the range.
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.begin && pos <= self.end
    }

    /// Smallest range covering both.
    pub fn merge(&self, other: &ClosedRange) -> ClosedRange {
        ClosedRange::new(self.begin.min(other.begin), self.end.max(other.end))
    }

    /// Shifts both bounds by a signed amount.
    pub fn shifted(&self, delta: isize) -> ClosedRange {
        ClosedRange::new(
            (self.begin as isize + delta) as usize,
            (self.end as isize + delta) as usize,
        )
    }

    /// Converts a 1-based range into a 0-based one.
    pub fn to_zero_based(&self) -> ClosedRange {
        ClosedRange::new(self.begin - 1, self.end - 1)
    }

    /// Converts a 0-based range into a 1-based one.
    pub fn to_one_based(&self) -> ClosedRange {
        ClosedRange::new(self.begin + 1, self.end + 1)
    }
}

impl fmt::Display for ClosedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.begin, self.end)
    }
}

/// Merges an optional accumulator with another range.
pub fn union(acc: Option<ClosedRange>, next: ClosedRange) -> Option<ClosedRange> {
    Some(match acc {
        Some(range) => range.merge(&next),
        None => next,
    })
}

/// An inclusive rectangle of alignment cells, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Rect {
    /// Creates a rectangle, swapping bounds given in reverse order.
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// Column span.
    pub fn columns(&self) -> ClosedRange {
        ClosedRange::new(self.left, self.right)
    }

    /// Row span.
    pub fn rows(&self) -> ClosedRange {
        ClosedRange::new(self.top, self.bottom)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[cols {}..{}, rows {}..{}]",
            self.left, self.right, self.top, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(1, 5), 1);
        assert_eq!(normalize_index(5, 5), 5);
        assert_eq!(normalize_index(-1, 5), 5);
        assert_eq!(normalize_index(-5, 5), 1);
        assert_eq!(normalize_index(0, 5), 0);
        assert_eq!(normalize_index(6, 5), 0);
        assert_eq!(normalize_index(-6, 5), 0);
        assert_eq!(normalize_index(1, 0), 0);
    }

    #[test]
    fn test_range_merge_and_shift() {
        let a = ClosedRange::new(3, 5);
        let b = ClosedRange::new(8, 9);
        assert_eq!(a.merge(&b), ClosedRange::new(3, 9));
        assert_eq!(a.shifted(-2), ClosedRange::new(1, 3));
        assert_eq!(a.len(), 3);
        assert_eq!(union(None, a), Some(a));
        assert_eq!(union(Some(b), a), Some(ClosedRange::new(3, 9)));
        assert_eq!(ClosedRange::normalized(7, 2), ClosedRange::new(2, 7));
    }

    #[test]
    fn test_rect_normalizes() {
        let r = Rect::new(6, 4, 2, 1);
        assert_eq!(r, Rect { left: 2, top: 1, right: 6, bottom: 4 });
        assert_eq!(r.width(), 5);
        assert_eq!(r.height(), 4);
    }
}
