//! Split an hour offset plus a duration into day-sized pieces.

/// Hours of a span, broken down along midnight boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySplit {
    /// Hours between the start and the next midnight (capped by the duration).
    pub first_day_hours: f64,
    /// Count of complete 24-hour days following the first day.
    pub whole_days: u32,
    /// Leftover hours on the final, partial day.
    pub last_day_hours: f64,
}

impl From<DaySplit> for (f64, u32, f64) {
    fn from(s: DaySplit) -> Self {
        (s.first_day_hours, s.whole_days, s.last_day_hours)
    }
}

/// Split `[start_hour, start_hour + duration_hours)` into the hours left until
/// midnight, the whole days after it, and the hours of the last partial day.
///
/// ```
/// use curb_engine::split_time_range;
///
/// let split = split_time_range(16.0, 100.0);
/// assert_eq!(<(f64, u32, f64)>::from(split), (8.0, 3, 20.0));
/// ```
pub fn split_time_range(start_hour: f64, duration_hours: f64) -> DaySplit {
    let remaining = (duration_hours - (24.0 - start_hour)).max(0.0);
    let first_day_hours = duration_hours - remaining;
    let whole_days = (remaining / 24.0).floor();
    let last_day_hours = remaining - whole_days * 24.0;

    DaySplit {
        first_day_hours,
        whole_days: whole_days as u32,
        last_day_hours,
    }
}
