//! Pickup/return timeslot validation
//!
//! The library operates in fixed half-hour windows. A timeslot is the
//! RFC 3339 start timestamp of one such window; each slot implicitly
//! occupies the following 30 minutes. Validation is pure and stateless.

use chrono::{DateTime, Duration, FixedOffset, Timelike};

use crate::error::{AppError, AppResult};

/// Width of a pickup/return window in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// Validate one suggested-timeslot list.
///
/// Rules:
/// - every entry must parse as RFC 3339;
/// - the minute component must be exactly 0 or 30;
/// - two slots whose start times are strictly closer than 30 minutes
///   occupy overlapping windows (this also catches exact duplicates).
///
/// Pickup and return lists are validated independently; a single-element
/// list passes overlap checking by construction.
pub fn validate(slots: &[String]) -> AppResult<()> {
    let parsed = parse_slots(slots)?;

    for i in 0..parsed.len() {
        for j in (i + 1)..parsed.len() {
            let gap = (parsed[i].1 - parsed[j].1).abs();
            if gap < Duration::minutes(SLOT_MINUTES) {
                return Err(AppError::TimeslotOverlap(
                    parsed[i].0.clone(),
                    parsed[j].0.clone(),
                ));
            }
        }
    }

    Ok(())
}

fn parse_slots(slots: &[String]) -> AppResult<Vec<(String, DateTime<FixedOffset>)>> {
    let mut parsed = Vec::with_capacity(slots.len());
    for raw in slots {
        let slot = DateTime::parse_from_rfc3339(raw)
            .map_err(|_| AppError::InvalidTimeslotFormat(raw.clone()))?;
        if slot.minute() != 0 && slot.minute() != 30 {
            return Err(AppError::TimeslotNotHalfHourAligned(raw.clone()));
        }
        parsed.push((raw.clone(), slot));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_list_passes() {
        assert!(validate(&[]).is_ok());
    }

    #[test]
    fn single_slot_passes() {
        assert!(validate(&slots(&["2024-01-01T09:00:00Z"])).is_ok());
    }

    #[test]
    fn well_spaced_slots_pass() {
        assert!(validate(&slots(&[
            "2024-01-01T09:00:00Z",
            "2024-01-01T09:30:00Z",
            "2024-01-01T11:00:00Z",
        ]))
        .is_ok());
    }

    #[test]
    fn garbage_is_a_format_error() {
        let err = validate(&slots(&["next tuesday"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeslotFormat(_)));
    }

    #[test]
    fn minute_five_is_misaligned() {
        let err = validate(&slots(&["2024-01-01T09:05:00Z"])).unwrap_err();
        assert!(matches!(err, AppError::TimeslotNotHalfHourAligned(_)));
    }

    #[test]
    fn fifteen_minute_gap_overlaps() {
        let err = validate(&slots(&[
            "2024-01-01T09:00:00Z",
            "2024-01-01T09:15:00Z",
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::TimeslotOverlap(_, _)));
    }

    #[test]
    fn exact_duplicate_overlaps() {
        let err = validate(&slots(&[
            "2024-01-01T09:00:00Z",
            "2024-01-01T09:00:00Z",
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::TimeslotOverlap(_, _)));
    }

    #[test]
    fn thirty_minute_gap_does_not_overlap() {
        assert!(validate(&slots(&[
            "2024-01-01T09:00:00Z",
            "2024-01-01T09:30:00Z",
        ]))
        .is_ok());
    }

    #[test]
    fn offsets_are_compared_on_the_timeline() {
        // 09:00+01:00 and 08:30Z are the same half-hour apart regardless
        // of how the client spelled the offset.
        assert!(validate(&slots(&[
            "2024-01-01T09:00:00+01:00",
            "2024-01-01T08:30:00Z",
        ]))
        .is_ok());

        let err = validate(&slots(&[
            "2024-01-01T09:00:00+01:00",
            "2024-01-01T08:00:00Z",
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::TimeslotOverlap(_, _)));
    }

    #[test]
    fn misalignment_reported_before_overlap() {
        let err = validate(&slots(&[
            "2024-01-01T09:05:00Z",
            "2024-01-01T09:05:00Z",
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::TimeslotNotHalfHourAligned(_)));
    }
}
