//! Exam conflict detection.
//!
//! Two time windows conflict when they overlap as *closed* intervals:
//! an exam ending at 12:00 conflicts with one starting at 12:00.
//!
//! The detector knows nothing about rooms or courses. The student schedule
//! feeds it every exam the student sits; the admin scheduler feeds it only
//! the exams sharing the candidate's room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything occupying a span of time.
pub trait TimeWindow {
    fn starts_at(&self) -> DateTime<Utc>;
    fn ends_at(&self) -> DateTime<Utc>;
}

impl<T: TimeWindow + ?Sized> TimeWindow for &T {
    fn starts_at(&self) -> DateTime<Utc> {
        (**self).starts_at()
    }

    fn ends_at(&self) -> DateTime<Utc> {
        (**self).ends_at()
    }
}

/// A bare time window, used for candidate exams that are not stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Window {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Whether start is strictly before end.
    pub fn is_well_ordered(&self) -> bool {
        self.start_time < self.end_time
    }
}

impl TimeWindow for Window {
    fn starts_at(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn ends_at(&self) -> DateTime<Utc> {
        self.end_time
    }
}

/// Closed-interval overlap: `startA <= endB && startB <= endA`.
///
/// Applied verbatim even when a window is ill-ordered.
pub fn overlaps(a: &impl TimeWindow, b: &impl TimeWindow) -> bool {
    a.starts_at() <= b.ends_at() && b.starts_at() <= a.ends_at()
}

/// An unordered pair of conflicting items, reported once.
///
/// `indices` are the positions of `first` and `second` in the input slice.
#[derive(Debug, PartialEq, Eq)]
pub struct ConflictPair<'a, T> {
    pub first: &'a T,
    pub second: &'a T,
    pub indices: (usize, usize),
}

// Manual impls: derive would require `T: Clone`/`T: Copy`.
impl<T> Clone for ConflictPair<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ConflictPair<'_, T> {}

/// Every overlapping pair `(i, j)` with `i < j`, in discovery order.
///
/// Quadratic in the number of items, which is fine for the dozens to low
/// hundreds of exams one schedule holds.
pub fn find_conflicts<T: TimeWindow>(items: &[T]) -> Vec<ConflictPair<'_, T>> {
    let mut pairs = Vec::new();
    for (i, first) in items.iter().enumerate() {
        for (j, second) in items.iter().enumerate().skip(i + 1) {
            if overlaps(first, second) {
                pairs.push(ConflictPair {
                    first,
                    second,
                    indices: (i, j),
                });
            }
        }
    }
    pairs
}

/// Items overlapping `candidate`, in input order.
pub fn conflicting_with<'a, T, I>(candidate: &impl TimeWindow, items: I) -> Vec<&'a T>
where
    T: TimeWindow + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| overlaps(candidate, *item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, hour, minute, 0).unwrap()
    }

    fn window(from: u32, to: u32) -> Window {
        Window::new(at(from, 0), at(to, 0))
    }

    #[test]
    fn test_partial_overlap_conflicts() {
        assert!(overlaps(&window(10, 12), &window(11, 13)));
    }

    #[test]
    fn test_touching_endpoints_conflict() {
        assert!(overlaps(&window(10, 12), &window(12, 14)));
        assert!(overlaps(&window(12, 14), &window(10, 12)));
    }

    #[test]
    fn test_disjoint_windows_do_not_conflict() {
        assert!(!overlaps(&window(10, 12), &window(13, 14)));
        assert!(!overlaps(&window(13, 14), &window(10, 12)));
    }

    #[test]
    fn test_containment_conflicts() {
        assert!(overlaps(&window(9, 17), &window(11, 12)));
    }

    #[test]
    fn test_ill_ordered_window_does_not_panic() {
        let reversed = Window::new(at(12, 0), at(10, 0));
        assert!(!reversed.is_well_ordered());
        // 12:00 <= 11:30 fails, so no overlap with [11:00, 11:30]
        assert!(!overlaps(&reversed, &Window::new(at(11, 0), at(11, 30))));
        // but a window covering both of its endpoints still overlaps
        assert!(overlaps(&reversed, &window(9, 13)));
    }

    #[test]
    fn test_find_conflicts_reports_each_pair_once_in_order() {
        let exams = vec![window(10, 12), window(11, 13), window(13, 14), window(9, 10)];
        let pairs = find_conflicts(&exams);

        let indices: Vec<(usize, usize)> = pairs.iter().map(|p| p.indices).collect();

        // [10,12]-[11,13], [10,12]-[9,10] (touch at 10), [11,13]-[13,14] (touch at 13)
        assert_eq!(indices, vec![(0, 1), (0, 3), (1, 2)]);
    }

    #[test]
    fn test_find_conflicts_is_exhaustive_against_brute_force() {
        let exams: Vec<Window> = (0..12)
            .map(|k| {
                let start = at(8 + (k * 7 % 9), (k * 13 % 4) * 15);
                Window::new(start, start + chrono::Duration::minutes(45 + 30 * (k as i64 % 3)))
            })
            .collect();

        let pairs = find_conflicts(&exams);

        let mut expected = 0;
        for i in 0..exams.len() {
            for j in 0..exams.len() {
                if i < j && overlaps(&exams[i], &exams[j]) {
                    expected += 1;
                    assert!(pairs
                        .iter()
                        .any(|p| std::ptr::eq(p.first, &exams[i]) && std::ptr::eq(p.second, &exams[j])));
                }
            }
        }
        assert_eq!(pairs.len(), expected);
        assert!(pairs.iter().all(|p| !std::ptr::eq(p.first, p.second)));
    }

    #[test]
    fn test_empty_and_single_inputs() {
        assert!(find_conflicts::<Window>(&[]).is_empty());
        assert!(find_conflicts(&[window(10, 12)]).is_empty());
    }

    #[test]
    fn test_conflicting_with_candidate() {
        let existing = vec![window(10, 12), window(12, 14), window(15, 16)];
        let hits = conflicting_with(&window(11, 12), &existing);
        assert_eq!(hits.len(), 2);
        assert!(std::ptr::eq(hits[0], &existing[0]));
        assert!(std::ptr::eq(hits[1], &existing[1]));
    }

    #[test]
    fn test_pair_indices_point_at_its_items() {
        // equal windows, so only the index tells them apart
        let exams = vec![window(10, 12), window(15, 16), window(10, 12)];
        let pairs = find_conflicts(&exams);
        assert_eq!(pairs.len(), 1);
        let (i, j) = pairs[0].indices;
        assert_eq!((i, j), (0, 2));
        assert!(std::ptr::eq(pairs[0].first, &exams[i]));
        assert!(std::ptr::eq(pairs[0].second, &exams[j]));
    }
}
