use chrono::{DateTime, Duration, FixedOffset};

/// A simulation clock that walks a half-open period in fixed steps.
///
/// The `StepClock` yields the start timestamp of every whole step inside
/// `[start, end)`; a trailing partial step is dropped. Profile generators and
/// the engine share one clock so their samples line up.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use nanogrid_sim::sim::clock::StepClock;
///
/// let start = DateTime::parse_from_rfc3339("2025-01-01T00:00:00+00:00").unwrap();
/// let end = DateTime::parse_from_rfc3339("2025-01-01T01:10:00+00:00").unwrap();
/// let clock = StepClock::new(start, end, 30);
///
/// assert_eq!(clock.len(), 2);
/// let stamps: Vec<String> = clock.iter().map(|t| t.format("%H:%M").to_string()).collect();
/// assert_eq!(stamps, vec!["00:00", "00:30"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepClock {
    start: DateTime<FixedOffset>,
    step: Duration,
    total: usize,
}

impl StepClock {
    /// Creates a clock over `[start, end)` with `step_minutes` spacing.
    ///
    /// An empty or inverted period, or a zero step, yields no steps.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>, step_minutes: u32) -> Self {
        let step = Duration::minutes(i64::from(step_minutes));
        let span = (end - start).num_minutes();
        let total = if step_minutes == 0 || span <= 0 {
            0
        } else {
            usize::try_from(span / i64::from(step_minutes)).unwrap_or(usize::MAX)
        };
        Self { start, step, total }
    }

    /// Number of whole steps in the period.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    /// Step duration in hours.
    pub fn step_hours(&self) -> f64 {
        self.step.num_minutes() as f64 / 60.0
    }

    /// Timestamp of step `index`, or `None` past the last whole step.
    pub fn at(&self, index: usize) -> Option<DateTime<FixedOffset>> {
        if index >= self.total {
            return None;
        }
        let n = i64::try_from(index).ok()?;
        let offset = Duration::try_minutes(self.step.num_minutes().checked_mul(n)?)?;
        self.start.checked_add_signed(offset)
    }

    /// Iterates over the start timestamp of every step.
    pub fn iter(&self) -> impl Iterator<Item = DateTime<FixedOffset>> + '_ {
        (0..self.total).map_while(|i| self.at(i))
    }

    /// Whole days elapsed between the period start and `ts`.
    pub fn day_index(&self, ts: DateTime<FixedOffset>) -> i64 {
        (ts - self.start).num_days()
    }
}
