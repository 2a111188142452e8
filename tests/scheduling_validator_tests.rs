//! Validator behavior across the whole rule set, with an injected clock.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use toursync::models::{PropertyId, Tour, TourId, TourStatus};
use toursync::scheduling::{
    validate_schedule_request, RejectionReason, ScheduleDecision, SchedulingPolicy,
};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 9, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// A Tuesday morning before every candidate slot used below.
fn now() -> NaiveDateTime {
    let now = at(1, 8, 0);
    assert_eq!(now.weekday(), Weekday::Tue);
    now
}

/// Wednesday 2026-09-02.
fn wednesday(hour: u32, minute: u32) -> NaiveDateTime {
    let t = at(2, hour, minute);
    assert_eq!(t.weekday(), Weekday::Wed);
    t
}

fn tour(id: i64, time: NaiveDateTime, status: TourStatus) -> Tour {
    Tour {
        id: TourId(id),
        property_id: PropertyId(1),
        tour_time: time,
        end_time: time + Duration::hours(1),
        status,
        client_name: "Grace Hopper".to_string(),
        phone_number: "+15551234567".to_string(),
        created_at: now(),
        updated_at: now(),
    }
}

fn check(candidate: NaiveDateTime, existing: &[Tour]) -> ScheduleDecision {
    validate_schedule_request(&SchedulingPolicy::default(), candidate, existing, None, now())
}

#[test]
fn rejects_weekends_at_any_hour() {
    let saturday = at(5, 10, 0);
    assert_eq!(saturday.weekday(), Weekday::Sat);
    let sunday = at(6, 14, 0);
    assert_eq!(sunday.weekday(), Weekday::Sun);
    for candidate in [saturday, sunday, at(5, 9, 0), at(6, 16, 30)] {
        assert_eq!(
            check(candidate, &[]),
            ScheduleDecision::Rejected(RejectionReason::NonWorkingDay),
            "candidate {}",
            candidate
        );
    }
}

#[test]
fn accepts_business_hours_outside_lunch() {
    for hour in [9, 10, 11, 13, 14, 15, 16] {
        assert_eq!(
            check(wednesday(hour, 0), &[]),
            ScheduleDecision::Accepted,
            "hour {}",
            hour
        );
    }
    // Half-open upper bound: 16:59 is the last bookable minute.
    assert_eq!(check(wednesday(16, 59), &[]), ScheduleDecision::Accepted);
}

#[test]
fn rejects_outside_business_hours() {
    for hour in [0, 7, 8, 17, 18, 23] {
        assert_eq!(
            check(wednesday(hour, 0), &[]),
            ScheduleDecision::Rejected(RejectionReason::OutsideBusinessHours),
            "hour {}",
            hour
        );
    }
}

#[test]
fn rejects_lunch_break() {
    for minute in [0, 30, 59] {
        assert_eq!(
            check(wednesday(12, minute), &[]),
            ScheduleDecision::Rejected(RejectionReason::DuringLunchBreak),
            "12:{:02}",
            minute
        );
    }
    // 13:00 is the first slot after lunch.
    assert_eq!(check(wednesday(13, 0), &[]), ScheduleDecision::Accepted);
}

#[test]
fn conflict_window_is_symmetric_and_inclusive() {
    let booked = wednesday(14, 0);
    let existing = [tour(1, booked, TourStatus::Scheduled)];

    for candidate in [
        booked - Duration::hours(1),
        booked - Duration::minutes(30),
        booked,
        booked + Duration::minutes(30),
        booked + Duration::hours(1),
    ] {
        assert_eq!(
            check(candidate, &existing),
            ScheduleDecision::Rejected(RejectionReason::SlotConflict),
            "candidate {}",
            candidate
        );
    }

    // One minute beyond the window on the late side is bookable; the early
    // side at 12:59 falls back into the lunch rule first, so use the late
    // side only.
    assert_eq!(
        check(booked + Duration::minutes(61), &existing),
        ScheduleDecision::Accepted
    );
}

#[test]
fn non_scheduled_tours_never_conflict() {
    let booked = wednesday(10, 0);
    for status in [
        TourStatus::Cancelled,
        TourStatus::Completed,
        TourStatus::NoShow,
    ] {
        let existing = [tour(1, booked, status)];
        assert_eq!(check(booked, &existing), ScheduleDecision::Accepted);
    }
}

#[test]
fn excluded_tour_does_not_conflict_with_itself() {
    let booked = wednesday(10, 0);
    let existing = [tour(7, booked, TourStatus::Scheduled)];
    let decision = validate_schedule_request(
        &SchedulingPolicy::default(),
        booked + Duration::minutes(15),
        &existing,
        Some(TourId(7)),
        now(),
    );
    assert_eq!(decision, ScheduleDecision::Accepted);
}

#[test]
fn rejects_past_and_present_candidates() {
    let policy = SchedulingPolicy::default();
    let clock = wednesday(10, 0);
    for candidate in [clock - Duration::hours(1), clock] {
        let decision = validate_schedule_request(&policy, candidate, &[], None, clock);
        assert_eq!(
            decision,
            ScheduleDecision::Rejected(RejectionReason::PastTime)
        );
    }
    let decision =
        validate_schedule_request(&policy, clock + Duration::minutes(1), &[], None, clock);
    assert_eq!(decision, ScheduleDecision::Accepted);
}

#[test]
fn decisions_are_deterministic() {
    let booked = wednesday(15, 0);
    let existing = [tour(1, booked, TourStatus::Scheduled)];
    let first = check(booked + Duration::minutes(30), &existing);
    let second = check(booked + Duration::minutes(30), &existing);
    assert_eq!(first, second);
}

#[test]
fn custom_policy_reshapes_the_rules() {
    let policy = SchedulingPolicy {
        working_days: vec![5, 6],
        business_hours: toursync::scheduling::HourRange { start: 8, end: 20 },
        lunch_break: toursync::scheduling::HourRange { start: 13, end: 14 },
        conflict_window_minutes: 30,
        ..Default::default()
    };
    let saturday = at(5, 18, 0);
    assert_eq!(saturday.weekday(), Weekday::Sat);
    assert_eq!(
        validate_schedule_request(&policy, saturday, &[], None, now()),
        ScheduleDecision::Accepted
    );
    assert_eq!(
        validate_schedule_request(&policy, wednesday(10, 0), &[], None, now()),
        ScheduleDecision::Rejected(RejectionReason::NonWorkingDay)
    );

    let existing = [tour(1, saturday, TourStatus::Scheduled)];
    assert_eq!(
        validate_schedule_request(
            &policy,
            saturday + Duration::minutes(31),
            &existing,
            None,
            now()
        ),
        ScheduleDecision::Accepted
    );
}
