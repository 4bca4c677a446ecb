//! Deciding whether two requests claim the same half-days.

use crate::types::TimeOffRequest;

/// Predicate telling whether a new request collides with an existing one.
///
/// Rules call it once per other request of the same employee; a request is
/// never compared with itself.
pub trait OverlapPolicy: Send + Sync {
    /// Whether `candidate` and `existing` share at least one half-day.
    fn overlaps(&self, candidate: &TimeOffRequest, existing: &TimeOffRequest) -> bool;
}

/// Policy that never reports an overlap.
// TODO: replace with an inclusive half-day interval comparison of start/end
// boundaries once the expected semantics are agreed with the HR team.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlapCheck;

impl OverlapPolicy for NoOverlapCheck {
    fn overlaps(&self, _candidate: &TimeOffRequest, _existing: &TimeOffRequest) -> bool {
        false
    }
}

impl<T: OverlapPolicy + ?Sized> OverlapPolicy for &T {
    fn overlaps(&self, candidate: &TimeOffRequest, existing: &TimeOffRequest) -> bool {
        (**self).overlaps(candidate, existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Boundary, HalfDay, RequestId, UserId};
    use chrono::NaiveDate;

    #[test]
    fn default_policy_accepts_identical_ranges() {
        let day = NaiveDate::from_ymd_opt(2027, 3, 1).expect("valid date");
        let make = || {
            TimeOffRequest::try_new(
                UserId::try_new("employee-fay").expect("valid user id"),
                RequestId::generate(),
                Boundary::new(day, HalfDay::Am),
                Boundary::new(day, HalfDay::Pm),
            )
            .expect("valid request")
        };

        assert!(!NoOverlapCheck.overlaps(&make(), &make()));
    }
}
