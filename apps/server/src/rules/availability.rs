use chrono::{Datelike, NaiveDate, Weekday};

use super::classify::ServiceType;
use super::slots::{generate_slots, hm, Minutes, TimeRange};

/// Slot step used everywhere unless a caller overrides it.
pub const DEFAULT_STEP_MIN: u16 = 30;

/// The per-service-type day partition. Sat/Sun/Mon share the long "weekend"
/// windows because the sitter's day job only frees up evenings Tue-Fri.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    WeekendLike,
    WeekdayLike,
}

pub fn day_kind(weekday: Weekday) -> DayKind {
    match weekday {
        Weekday::Sat | Weekday::Sun | Weekday::Mon => DayKind::WeekendLike,
        _ => DayKind::WeekdayLike,
    }
}

const WALK_WEEKEND: &[TimeRange] = &[TimeRange::new(hm(8, 0), hm(19, 30))];
const WALK_WEEKDAY: &[TimeRange] = &[TimeRange::new(hm(18, 30), hm(19, 30))];
const DROPIN_WEEKEND: &[TimeRange] = &[TimeRange::new(hm(6, 30), hm(20, 30))];
const DROPIN_WEEKDAY: &[TimeRange] = &[TimeRange::new(hm(18, 30), hm(20, 30))];
const OVERNIGHT_WEEKEND: &[TimeRange] = &[TimeRange::new(hm(6, 30), hm(20, 30))];
const OVERNIGHT_FRIDAY: &[TimeRange] = &[TimeRange::new(hm(18, 0), hm(20, 30))];
const ADDON_WEEKEND: &[TimeRange] = &[TimeRange::new(hm(6, 30), hm(20, 30))];
const ADDON_WEEKDAY: &[TimeRange] = &[TimeRange::new(hm(18, 30), hm(20, 30))];

/// The open windows for a service type on a given date.
///
/// Overnight stays do not follow the generic weekend/weekday split: a new
/// stay may only begin Friday (evening window), Saturday, or Sunday. Monday
/// is weekend-like for every other type but yields nothing here — pickups
/// can run as late as Monday night, new starts cannot.
pub fn windows_for(service_type: ServiceType, date: NaiveDate) -> &'static [TimeRange] {
    if service_type.is_overnight() {
        return match date.weekday() {
            Weekday::Fri => OVERNIGHT_FRIDAY,
            Weekday::Sat | Weekday::Sun => OVERNIGHT_WEEKEND,
            _ => &[],
        };
    }
    match (service_type, day_kind(date.weekday())) {
        (ServiceType::Walk, DayKind::WeekendLike) => WALK_WEEKEND,
        (ServiceType::Walk, DayKind::WeekdayLike) => WALK_WEEKDAY,
        (ServiceType::DropIn, DayKind::WeekendLike) => DROPIN_WEEKEND,
        (ServiceType::DropIn, DayKind::WeekdayLike) => DROPIN_WEEKDAY,
        (ServiceType::AddOn, DayKind::WeekendLike) => ADDON_WEEKEND,
        (ServiceType::AddOn, DayKind::WeekdayLike) => ADDON_WEEKDAY,
        _ => &[],
    }
}

/// All legal start times for a (service type, date) pair.
pub fn resolve(service_type: ServiceType, date: NaiveDate) -> Vec<Minutes> {
    generate_slots(windows_for(service_type, date), DEFAULT_STEP_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-02 is a Monday.
    const MON: (i32, u32, u32) = (2025, 6, 2);
    const TUE: (i32, u32, u32) = (2025, 6, 3);
    const WED: (i32, u32, u32) = (2025, 6, 4);
    const FRI: (i32, u32, u32) = (2025, 6, 6);
    const SAT: (i32, u32, u32) = (2025, 6, 7);
    const SUN: (i32, u32, u32) = (2025, 6, 8);

    fn d(t: (i32, u32, u32)) -> NaiveDate {
        date(t.0, t.1, t.2)
    }

    #[test]
    fn test_monday_is_weekend_like() {
        assert_eq!(day_kind(d(MON).weekday()), DayKind::WeekendLike);
        assert_eq!(day_kind(d(SAT).weekday()), DayKind::WeekendLike);
        assert_eq!(day_kind(d(SUN).weekday()), DayKind::WeekendLike);
        assert_eq!(day_kind(d(TUE).weekday()), DayKind::WeekdayLike);
        assert_eq!(day_kind(d(FRI).weekday()), DayKind::WeekdayLike);
    }

    #[test]
    fn test_walk_weekday_window() {
        let slots = resolve(ServiceType::Walk, d(WED));
        assert_eq!(slots, vec![hm(18, 30), hm(19, 0), hm(19, 30)]);
    }

    #[test]
    fn test_walk_weekend_window_bounds() {
        let slots = resolve(ServiceType::Walk, d(SAT));
        assert_eq!(slots.first(), Some(&hm(8, 0)));
        assert_eq!(slots.last(), Some(&hm(19, 30)));
        assert_eq!(slots.len(), 24);
    }

    #[test]
    fn test_dropin_windows() {
        let weekend = resolve(ServiceType::DropIn, d(MON));
        assert_eq!(weekend.first(), Some(&hm(6, 30)));
        assert_eq!(weekend.last(), Some(&hm(20, 30)));

        let weekday = resolve(ServiceType::DropIn, d(TUE));
        assert_eq!(weekday, vec![hm(18, 30), hm(19, 0), hm(19, 30), hm(20, 0), hm(20, 30)]);
    }

    #[test]
    fn test_overnight_monday_excluded() {
        assert!(resolve(ServiceType::OvernightBoarding, d(MON)).is_empty());
        assert!(resolve(ServiceType::OvernightSitting, d(MON)).is_empty());
    }

    #[test]
    fn test_overnight_midweek_excluded() {
        assert!(resolve(ServiceType::OvernightBoarding, d(TUE)).is_empty());
        assert!(resolve(ServiceType::OvernightBoarding, d(WED)).is_empty());
    }

    #[test]
    fn test_overnight_friday_evening_window() {
        let slots = resolve(ServiceType::OvernightBoarding, d(FRI));
        assert_eq!(slots, vec![hm(18, 0), hm(18, 30), hm(19, 0), hm(19, 30), hm(20, 0), hm(20, 30)]);
    }

    #[test]
    fn test_overnight_weekend_window() {
        let slots = resolve(ServiceType::OvernightSitting, d(SAT));
        assert_eq!(slots.first(), Some(&hm(6, 30)));
        assert_eq!(slots.last(), Some(&hm(20, 30)));
        let sunday = resolve(ServiceType::OvernightBoarding, d(SUN));
        assert_eq!(sunday.first(), Some(&hm(6, 30)));
    }

    #[test]
    fn test_other_never_bookable() {
        assert!(resolve(ServiceType::Other, d(SAT)).is_empty());
        assert!(resolve(ServiceType::Other, d(WED)).is_empty());
    }

    #[test]
    fn test_addon_windows_match_dropin() {
        assert_eq!(
            resolve(ServiceType::AddOn, d(SUN)),
            resolve(ServiceType::DropIn, d(SUN))
        );
    }
}
