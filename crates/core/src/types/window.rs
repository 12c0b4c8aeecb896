//! Closed date intervals for promotional placements.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`DateWindow`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// The end date precedes the start date.
    #[error("end date must not be before start date")]
    EndBeforeStart,
}

/// A closed date interval `[start, end]`, both endpoints inclusive.
///
/// Featured placements are scheduled as whole days; a window whose end
/// equals its start is a one-day placement. Two windows conflict when they
/// share at least one day, which includes windows that only touch at a
/// boundary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `end < start`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::EndBeforeStart`] when the interval is empty.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if end < start {
            return Err(WindowError::EndBeforeStart);
        }
        Ok(Self { start, end })
    }

    /// First day of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window (inclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether two closed intervals share at least one day.
    ///
    /// `[s1, e1]` and `[s2, e2]` overlap iff `s1 <= e2 && s2 <= e1`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `date` falls inside the window (endpoints included).
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(s: (i32, u32, u32), e: (i32, u32, u32)) -> DateWindow {
        DateWindow::new(day(s.0, s.1, s.2), day(e.0, e.1, e.2)).unwrap()
    }

    #[test]
    fn test_rejects_inverted_window() {
        assert_eq!(
            DateWindow::new(day(2024, 1, 10), day(2024, 1, 1)),
            Err(WindowError::EndBeforeStart)
        );
    }

    #[test]
    fn test_single_day_window() {
        let w = window((2024, 1, 5), (2024, 1, 5));
        assert!(w.contains(day(2024, 1, 5)));
        assert!(!w.contains(day(2024, 1, 6)));
    }

    #[test]
    fn test_overlap_is_commutative() {
        let a = window((2024, 1, 1), (2024, 1, 10));
        let b = window((2024, 1, 5), (2024, 1, 15));
        let c = window((2024, 2, 1), (2024, 2, 3));

        assert_eq!(a.overlaps(&b), b.overlaps(&a));
        assert_eq!(a.overlaps(&c), c.overlaps(&a));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_contained_window_overlaps() {
        let outer = window((2024, 1, 1), (2024, 1, 31));
        let inner = window((2024, 1, 10), (2024, 1, 12));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        // [Jan 1, Jan 10] then [Jan 11, Jan 20]: no shared day.
        let first = window((2024, 1, 1), (2024, 1, 10));
        let second = window((2024, 1, 11), (2024, 1, 20));
        assert!(!first.overlaps(&second));
    }

    #[test]
    fn test_boundary_day_overlaps() {
        // Closed intervals: sharing exactly the boundary day conflicts.
        let first = window((2024, 1, 1), (2024, 1, 10));
        let touching = window((2024, 1, 10), (2024, 1, 20));
        assert!(first.overlaps(&touching));
        assert!(touching.overlaps(&first));
    }

    #[test]
    fn test_identical_windows_overlap() {
        let w = window((2024, 1, 1), (2024, 1, 10));
        assert!(w.overlaps(&w));
    }

    #[test]
    fn test_contains_endpoints() {
        let w = window((2024, 3, 1), (2024, 3, 31));
        assert!(w.contains(day(2024, 3, 1)));
        assert!(w.contains(day(2024, 3, 31)));
        assert!(!w.contains(day(2024, 2, 29)));
        assert!(!w.contains(day(2024, 4, 1)));
    }
}
