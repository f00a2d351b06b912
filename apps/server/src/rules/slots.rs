use std::collections::BTreeSet;

/// A time of day as minutes since midnight (0..=1439).
pub type Minutes = u16;

/// Build a `Minutes` value from hour/minute. Const so window tables can use it.
pub const fn hm(hour: u16, minute: u16) -> Minutes {
    hour * 60 + minute
}

/// Format as "HH:MM" for the wire.
pub fn format_hhmm(m: Minutes) -> String {
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// An open window within a single day. `start <= end`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Minutes,
    pub end: Minutes,
}

impl TimeRange {
    pub const fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: Minutes) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Expand windows into discrete bookable start times.
///
/// Emits every `step_min` increment from `start` through `end`. Both
/// endpoints are always included: when `end - start` is not a multiple of
/// the step, `end` itself is still emitted as a valid start. Duplicate times
/// covered by overlapping ranges appear once; output is ordered.
pub fn generate_slots(ranges: &[TimeRange], step_min: u16) -> Vec<Minutes> {
    let mut out = BTreeSet::new();
    if step_min == 0 {
        return Vec::new();
    }
    for range in ranges {
        if range.start > range.end {
            continue;
        }
        let mut t = range.start;
        while t < range.end {
            out.insert(t);
            t = t.saturating_add(step_min);
        }
        out.insert(range.end);
    }
    out.into_iter().collect()
}
