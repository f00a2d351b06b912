//! The availability & pricing rules engine.
//!
//! Everything in this module is a pure function of its inputs: no I/O, no
//! shared state. The booking handler and the public availability endpoint
//! both call into here, so the window tables and pricing constants exist in
//! exactly one place.

pub mod availability;
pub mod classify;
pub mod conflict;
pub mod pricing;
pub mod slots;
pub mod validate;

pub use availability::{day_kind, resolve, DayKind, DEFAULT_STEP_MIN};
pub use classify::{classify, ServiceType};
pub use conflict::{is_taken, normalize_minute};
pub use pricing::{compute_total, WalkTier};
pub use slots::{format_hhmm, generate_slots, hm, Minutes, TimeRange};
pub use validate::{validate, Rejection, ValidatedBooking, ValidationContext};
