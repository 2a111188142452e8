//! In-memory repository behavior: CRUD, atomic scheduling, status races and
//! property soft-deletes.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use toursync::db::repository::{
    FullRepository, PropertyRepository, RepositoryError, TourRepository,
};
use toursync::db::LocalRepository;
use toursync::models::{
    NewProperty, NewTour, PropertyDeleteOutcome, PropertyId, TourFilter, TourId, TourStatus,
    TourUpdate,
};
use toursync::scheduling::{RejectionReason, SchedulingPolicy, TransitionError};

fn now() -> NaiveDateTime {
    let now = NaiveDate::from_ymd_opt(2026, 9, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    assert_eq!(now.weekday(), Weekday::Tue);
    now
}

fn wednesday(hour: u32, minute: u32) -> NaiveDateTime {
    let t = NaiveDate::from_ymd_opt(2026, 9, 2)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    assert_eq!(t.weekday(), Weekday::Wed);
    t
}

fn new_tour(property_id: PropertyId, time: NaiveDateTime) -> NewTour {
    NewTour {
        property_id,
        tour_time: time,
        end_time: None,
        client_name: "Margaret Hamilton".to_string(),
        phone_number: "+15551230001".to_string(),
    }
}

async fn setup() -> (LocalRepository, SchedulingPolicy, PropertyId) {
    let repo = LocalRepository::new();
    let policy = SchedulingPolicy::default();
    let property = repo
        .create_property(
            NewProperty {
                address: "12 Main St".to_string(),
            },
            now(),
        )
        .await
        .unwrap();
    (repo, policy, property.id)
}

#[tokio::test]
async fn schedules_and_fetches_a_tour() {
    let (repo, policy, property_id) = setup().await;
    let tour = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tour.status, TourStatus::Scheduled);
    assert_eq!(tour.end_time, wednesday(11, 0));

    let fetched = repo.get_tour(tour.id).await.unwrap();
    assert_eq!(fetched, tour);
    assert_eq!(repo.tour_count(), 1);
}

#[tokio::test]
async fn second_booking_in_window_is_rejected() {
    let (repo, policy, property_id) = setup().await;
    repo.schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();

    let attempt = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 30)), &policy, now())
        .await
        .unwrap();
    assert_eq!(attempt.unwrap_err(), RejectionReason::SlotConflict);
    assert_eq!(repo.tour_count(), 1);

    // A second property is a separate calendar.
    let other = repo
        .create_property(
            NewProperty {
                address: "34 Oak Ave".to_string(),
            },
            now(),
        )
        .await
        .unwrap();
    let attempt = repo
        .schedule_tour(new_tour(other.id, wednesday(10, 30)), &policy, now())
        .await
        .unwrap();
    assert!(attempt.is_ok());
}

#[tokio::test]
async fn scheduling_requires_an_active_property() {
    let (repo, policy, property_id) = setup().await;

    let err = repo
        .schedule_tour(new_tour(PropertyId(999), wednesday(10, 0)), &policy, now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { .. }));

    repo.delete_property(property_id, now()).await.unwrap();
    let err = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { .. }));
}

#[tokio::test]
async fn listing_filters_by_property_and_status() {
    let (repo, policy, property_id) = setup().await;
    let first = repo
        .schedule_tour(new_tour(property_id, wednesday(15, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();
    let second = repo
        .schedule_tour(new_tour(property_id, wednesday(9, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();
    repo.update_tour_status(first.id, TourStatus::Cancelled, now())
        .await
        .unwrap()
        .unwrap();

    let all = repo.list_tours(TourFilter::default()).await.unwrap();
    // Ordered by tour_time, not insertion.
    assert_eq!(
        all.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    let scheduled = repo
        .list_tours(TourFilter {
            property_id: Some(property_id),
            status: Some(TourStatus::Scheduled),
        })
        .await
        .unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id, second.id);
}

#[tokio::test]
async fn reschedule_excludes_the_tour_itself() {
    let (repo, policy, property_id) = setup().await;
    let tour = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();

    // Nudging within its own window must not self-conflict.
    let moved = repo
        .reschedule_tour(
            tour.id,
            TourUpdate {
                tour_time: Some(wednesday(10, 30)),
                ..Default::default()
            },
            &policy,
            now(),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.tour_time, wednesday(10, 30));
    assert_eq!(moved.end_time, wednesday(11, 30));
}

#[tokio::test]
async fn reschedule_conflicts_with_other_tours() {
    let (repo, policy, property_id) = setup().await;
    let first = repo
        .schedule_tour(new_tour(property_id, wednesday(9, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();
    repo.schedule_tour(new_tour(property_id, wednesday(14, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();

    let attempt = repo
        .reschedule_tour(
            first.id,
            TourUpdate {
                tour_time: Some(wednesday(14, 30)),
                ..Default::default()
            },
            &policy,
            now(),
        )
        .await
        .unwrap();
    assert_eq!(attempt.unwrap_err(), RejectionReason::SlotConflict);

    // The failed attempt leaves the tour untouched.
    assert_eq!(
        repo.get_tour(first.id).await.unwrap().tour_time,
        wednesday(9, 0)
    );
}

#[tokio::test]
async fn only_scheduled_tours_can_move() {
    let (repo, policy, property_id) = setup().await;
    let tour = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();
    repo.update_tour_status(tour.id, TourStatus::Completed, now())
        .await
        .unwrap()
        .unwrap();

    let err = repo
        .reschedule_tour(
            tour.id,
            TourUpdate {
                tour_time: Some(wednesday(15, 0)),
                ..Default::default()
            },
            &policy,
            now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { .. }));

    // Contact details may still change.
    let updated = repo
        .reschedule_tour(
            tour.id,
            TourUpdate {
                phone_number: Some("+15559990000".to_string()),
                ..Default::default()
            },
            &policy,
            now(),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.phone_number, "+15559990000");
    assert_eq!(updated.status, TourStatus::Completed);
}

#[tokio::test]
async fn double_cancel_is_refused() {
    let (repo, policy, property_id) = setup().await;
    let tour = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();

    let first = repo
        .update_tour_status(tour.id, TourStatus::Cancelled, now())
        .await
        .unwrap();
    assert!(first.is_ok());

    let second = repo
        .update_tour_status(tour.id, TourStatus::Cancelled, now())
        .await
        .unwrap();
    assert_eq!(
        second.unwrap_err(),
        TransitionError::InvalidTransition {
            from: TourStatus::Cancelled,
            to: TourStatus::Cancelled,
        }
    );
}

#[tokio::test]
async fn cancelled_slot_frees_the_window() {
    let (repo, policy, property_id) = setup().await;
    let tour = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();
    repo.update_tour_status(tour.id, TourStatus::Cancelled, now())
        .await
        .unwrap()
        .unwrap();

    let attempt = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap();
    assert!(attempt.is_ok());
}

#[tokio::test]
async fn property_delete_blocked_by_scheduled_tours() {
    let (repo, policy, property_id) = setup().await;
    let tour = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();

    let outcome = repo.delete_property(property_id, now()).await.unwrap();
    assert_eq!(outcome, PropertyDeleteOutcome::Blocked { active_tours: 1 });

    repo.update_tour_status(tour.id, TourStatus::Cancelled, now())
        .await
        .unwrap()
        .unwrap();
    let outcome = repo.delete_property(property_id, now()).await.unwrap();
    match outcome {
        PropertyDeleteOutcome::Deleted(property) => {
            assert!(!property.is_active());
            assert_eq!(property.deleted_at, Some(now()));
        }
        other => panic!("expected deletion, got {:?}", other),
    }

    // Soft-deleted properties drop out of listings but stay fetchable.
    assert!(repo.list_properties().await.unwrap().is_empty());
    assert!(repo.get_property(property_id).await.is_ok());

    // Deleting again is a no-op, not an error.
    let again = repo.delete_property(property_id, now()).await.unwrap();
    assert!(matches!(again, PropertyDeleteOutcome::Deleted(_)));
}

#[tokio::test]
async fn duplicate_addresses_conflict() {
    let (repo, _policy, _property_id) = setup().await;
    let err = repo
        .create_property(
            NewProperty {
                address: "12 Main St".to_string(),
            },
            now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict { .. }));
}

#[tokio::test]
async fn deleting_a_tour_removes_it() {
    let (repo, policy, property_id) = setup().await;
    let tour = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap()
        .unwrap();

    repo.delete_tour(tour.id).await.unwrap();
    let err = repo.get_tour(tour.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let err = repo.delete_tour(TourId(999)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn unhealthy_repository_fails_with_retryable_errors() {
    let (repo, policy, property_id) = setup().await;
    repo.set_healthy(false);
    assert!(!repo.health_check().await.unwrap());

    let err = repo
        .schedule_tour(new_tour(property_id, wednesday(10, 0)), &policy, now())
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    repo.set_healthy(true);
    assert!(repo.health_check().await.unwrap());
}
