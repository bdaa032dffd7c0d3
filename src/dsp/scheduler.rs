//! Rate limiting for the estimate-and-append cycle.

use std::time::{Duration, Instant};

/// Minimum spacing between updates so that `rows` rows span `time_span` seconds.
///
/// Returns `None` when nothing is visible or the span is not a usable duration,
/// in which case no update is ever due.
pub fn raster_interval(rows: usize, time_span: f64) -> Option<Duration> {
    if rows == 0 || !time_span.is_finite() || time_span <= 0.0 {
        return None;
    }
    let update_rate = rows as f64 / time_span;
    Duration::try_from_secs_f64(1.0 / update_rate).ok()
}

/// Minimum spacing for a display refreshing `display_rate` times per second.
pub fn rate_interval(display_rate: f64) -> Option<Duration> {
    if !display_rate.is_finite() || display_rate <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / display_rate).ok()
}

#[derive(Debug, Clone, Default)]
pub struct UpdateScheduler {
    last_update: Option<Instant>,
    accepted: u64,
    skipped: u64,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether the arrival at `now` runs the pipeline, recording it if so.
    pub fn poll(&mut self, now: Instant, min_interval: Option<Duration>) -> bool {
        let Some(min_interval) = min_interval else {
            self.skipped += 1;
            return false;
        };

        let due = self
            .last_update
            .is_none_or(|last| now.saturating_duration_since(last) >= min_interval);
        if due {
            self.last_update = Some(now);
            self.accepted += 1;
        } else {
            self.skipped += 1;
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_update = None;
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_follows_rows_and_span() {
        assert_eq!(raster_interval(100, 10.0), Some(Duration::from_millis(100)));
        assert_eq!(raster_interval(0, 10.0), None);
        assert_eq!(raster_interval(100, 0.0), None);
        assert_eq!(raster_interval(100, f64::NAN), None);
        assert_eq!(rate_interval(4.0), Some(Duration::from_millis(250)));
        assert_eq!(rate_interval(-1.0), None);
    }

    #[test]
    fn accepts_every_other_arrival_at_twice_the_rate() {
        let interval = raster_interval(100, 10.0);
        let mut scheduler = UpdateScheduler::new();
        let start = Instant::now();

        let decisions: Vec<bool> = (0..10)
            .map(|i| scheduler.poll(start + Duration::from_millis(50 * i), interval))
            .collect();

        assert_eq!(
            decisions,
            vec![true, false, true, false, true, false, true, false, true, false]
        );
        assert_eq!(scheduler.accepted(), 5);
        assert_eq!(scheduler.skipped(), 5);
    }

    #[test]
    fn first_arrival_is_always_due_and_reset_rearms() {
        let mut scheduler = UpdateScheduler::new();
        let now = Instant::now();
        let interval = Some(Duration::from_secs(3600));
        assert!(scheduler.poll(now, interval));
        assert!(!scheduler.poll(now + Duration::from_secs(1), interval));
        scheduler.reset();
        assert!(scheduler.poll(now + Duration::from_secs(2), interval));
    }

    #[test]
    fn nothing_is_due_without_an_interval() {
        let mut scheduler = UpdateScheduler::new();
        assert!(!scheduler.poll(Instant::now(), None));
        assert_eq!(scheduler.accepted(), 0);
    }
}
