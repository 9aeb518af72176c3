//! Wrap-safe millisecond deadline arithmetic.
//!
//! All timing in the crate is expressed as `u32` milliseconds from an
//! arbitrary monotonic origin. Deadlines are stored as absolute instants
//! and compared with wrapping subtraction so a timer straddling the
//! `u32` rollover (~49.7 days) still fires.

/// True once `now_ms` has reached or passed `deadline_ms`.
///
/// Valid as long as the distance between the two instants is below half
/// the `u32` range, which every timer in this crate satisfies by orders
/// of magnitude.
pub fn deadline_reached(now_ms: u32, deadline_ms: u32) -> bool {
    now_ms.wrapping_sub(deadline_ms) < u32::MAX / 2
}
