//! Splits a date span into query-sized segments.
//!
//! The wellness service errors on requests spanning more than
//! [`MAX_SEGMENT_DAYS`](crate::config::MAX_SEGMENT_DAYS). Each segment covers
//! `max_span_days - 1` days past its start (both ends inclusive); the next one
//! starts the day after. The last segment is clipped to the overall end.

use chrono::{Days, NaiveDate};

use crate::errors::AppError;
use crate::models::DateRange;

/// Lazy iterator over the segments of `[start, end]`.
///
/// Cloning yields an independent iterator from the same position, so a fresh
/// `segment(..)` result can be walked any number of times.
#[derive(Debug, Clone)]
pub struct Segments {
    next_start: NaiveDate,
    end: NaiveDate,
    /// Days past a segment's start to its end; a step past chrono's last
    /// representable date clips to `end`.
    step: Days,
    done: bool,
}

/// Build the segment iterator for `[start, end]`.
pub fn segment(start: NaiveDate, end: NaiveDate, max_span_days: i64) -> Result<Segments, AppError> {
    if start > end {
        return Err(AppError::InvalidRange(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    if max_span_days < 1 {
        return Err(AppError::InvalidRange(format!(
            "max span must be at least 1 day, got {}",
            max_span_days
        )));
    }

    Ok(Segments {
        next_start: start,
        end,
        step: Days::new((max_span_days - 1).unsigned_abs()),
        done: false,
    })
}

impl Iterator for Segments {
    type Item = DateRange;

    fn next(&mut self) -> Option<DateRange> {
        if self.done {
            return None;
        }

        let start = self.next_start;
        let end = match start.checked_add_days(self.step) {
            Some(candidate) if candidate < self.end => candidate,
            _ => self.end,
        };

        if end == self.end {
            self.done = true;
        } else {
            self.next_start = end + Days::new(1);
        }

        Some(DateRange { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn assert_tiles(start: NaiveDate, end: NaiveDate, max: i64) {
        let segments: Vec<DateRange> = segment(start, end, max).unwrap().collect();
        assert!(!segments.is_empty());
        assert_eq!(segments[0].start, start);
        assert_eq!(segments.last().unwrap().end, end);
        for s in &segments {
            assert!(s.start <= s.end, "{:?} inverted", s);
            assert!(s.span_days() <= max, "{:?} longer than {}", s, max);
        }
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end + Duration::days(1), pair[1].start);
        }
    }

    #[test]
    fn test_single_day() {
        let segments: Vec<_> = segment(d(2020, 5, 5), d(2020, 5, 5), 32).unwrap().collect();
        assert_eq!(
            segments,
            vec![DateRange {
                start: d(2020, 5, 5),
                end: d(2020, 5, 5)
            }]
        );
    }

    #[test]
    fn test_exact_max_span_is_one_segment() {
        let segments: Vec<_> = segment(d(2017, 3, 1), d(2017, 4, 1), 32).unwrap().collect();
        assert_eq!(
            segments,
            vec![DateRange {
                start: d(2017, 3, 1),
                end: d(2017, 4, 1)
            }]
        );
    }

    #[test]
    fn test_one_day_over_max_span_splits() {
        let segments: Vec<_> = segment(d(2017, 3, 1), d(2017, 4, 2), 32).unwrap().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].end, d(2017, 4, 1));
        assert_eq!(
            segments[1],
            DateRange {
                start: d(2017, 4, 2),
                end: d(2017, 4, 2)
            }
        );
    }

    #[test]
    fn test_full_year() {
        let segments: Vec<_> = segment(d(2017, 1, 1), d(2017, 12, 31), 32).unwrap().collect();
        assert_eq!(segments.len(), 12);
        assert_eq!(segments[0].end, d(2017, 2, 1));
        assert_eq!(segments[1].start, d(2017, 2, 2));
        let last = segments.last().unwrap();
        assert_eq!(last.end, d(2017, 12, 31));
        assert!(last.span_days() < 32);
        assert_tiles(d(2017, 1, 1), d(2017, 12, 31), 32);
    }

    #[test]
    fn test_tiling_across_spans() {
        let start = d(2019, 12, 20);
        for max in [1, 2, 7, 31, 32, 400] {
            for len in [0, 1, 30, 31, 32, 33, 64, 365, 800] {
                assert_tiles(start, start + Duration::days(len), max);
            }
        }
    }

    #[test]
    fn test_max_span_one_yields_single_days() {
        let segments: Vec<_> = segment(d(2021, 2, 27), d(2021, 3, 2), 1).unwrap().collect();
        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(|s| s.start == s.end));
    }

    #[test]
    fn test_huge_max_span_is_one_segment() {
        let single: Vec<_> = segment(d(2017, 1, 1), d(2017, 1, 1), i64::MAX).unwrap().collect();
        assert_eq!(
            single,
            vec![DateRange {
                start: d(2017, 1, 1),
                end: d(2017, 1, 1)
            }]
        );

        let long: Vec<_> = segment(d(2000, 1, 1), d(2030, 12, 31), i64::MAX).unwrap().collect();
        assert_eq!(
            long,
            vec![DateRange {
                start: d(2000, 1, 1),
                end: d(2030, 12, 31)
            }]
        );
    }

    #[test]
    fn test_restartable() {
        let segments = segment(d(2017, 1, 1), d(2017, 6, 30), 32).unwrap();
        let first: Vec<_> = segments.clone().collect();
        let second: Vec<_> = segments.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = segment(d(2017, 2, 1), d(2017, 1, 1), 32).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }

    #[test]
    fn test_rejects_zero_span() {
        let err = segment(d(2017, 1, 1), d(2017, 2, 1), 0).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }
}
