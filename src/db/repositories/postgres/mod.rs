//! Postgres repository backed by diesel and an r2d2 connection pool.
//!
//! Every mutating operation runs inside a transaction; the scheduling paths
//! additionally take a `FOR UPDATE` lock on the property row, so the
//! validate-and-write sequence is atomic across concurrent requests, exactly
//! like the in-memory backend's write lock. Diesel is synchronous, so all
//! database work happens on the blocking thread pool.

mod models;
mod schema;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::config::PostgresConfig;
use crate::db::repository::{
    ErrorContext, FullRepository, PropertyRepository, RepositoryError, RepositoryResult,
    TourRepository,
};
use crate::models::{
    NewProperty, NewTour, Property, PropertyDeleteOutcome, PropertyId, PropertyStatus, Tour,
    TourFilter, TourId, TourStatus, TourUpdate,
};
use crate::scheduling::{
    apply_status_transition, validate_schedule_request, ScheduleAttempt, SchedulingPolicy,
    TransitionAttempt,
};

use models::{NewPropertyRow, NewTourRow, PropertyRow, TourRow};
use schema::{properties, tours};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Postgres-backed repository.
pub struct PostgresRepository {
    pool: PgPool,
    retry_attempts: u32,
}

impl PostgresRepository {
    /// Build the pool and run pending migrations.
    pub fn new(config: &PostgresConfig) -> RepositoryResult<Self> {
        let url = config
            .resolved_url()
            .map_err(|e| RepositoryError::configuration(e.to_string()))?;
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection(format!("Failed to build connection pool: {}", e))
            })?;

        let repo = Self {
            pool,
            retry_attempts: config.retry_attempts,
        };
        repo.run_migrations()?;
        Ok(repo)
    }

    fn run_migrations(&self) -> RepositoryResult<()> {
        let mut conn = self.pool.get()?;
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::configuration(format!("Failed to run migrations: {}", e))
        })?;
        Ok(())
    }

    /// Run `f` on a pooled connection on the blocking thread pool, retrying
    /// transient failures up to the configured attempt count.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let attempts = self.retry_attempts.max(1);
        tokio::task::spawn_blocking(move || {
            for attempt in 1..=attempts {
                let result = pool
                    .get()
                    .map_err(RepositoryError::from)
                    .and_then(|mut conn| f(&mut conn));
                match result {
                    Err(err) if err.is_retryable() && attempt < attempts => {
                        log::warn!(
                            "{} attempt {}/{} failed: {}",
                            operation,
                            attempt,
                            attempts,
                            err
                        );
                        std::thread::sleep(Duration::from_millis(100 * u64::from(attempt)));
                    }
                    other => return other.map_err(|e| e.with_operation(operation)),
                }
            }
            Err(RepositoryError::internal("Retry loop exhausted").with_operation(operation))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Blocking task for {} failed: {}", operation, e))
        })?
    }
}

fn find_tour_for_update(conn: &mut PgConnection, id: TourId) -> RepositoryResult<Tour> {
    let row: Option<TourRow> = tours::table
        .find(id.value())
        .for_update()
        .first(conn)
        .optional()?;
    row.map(Tour::try_from).transpose()?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            format!("Tour {} not found", id),
            ErrorContext::default()
                .with_entity("tour")
                .with_entity_id(id),
        )
    })
}

fn find_property_for_update(
    conn: &mut PgConnection,
    id: PropertyId,
) -> RepositoryResult<Option<PropertyRow>> {
    let row = properties::table
        .find(id.value())
        .for_update()
        .first(conn)
        .optional()?;
    Ok(row)
}

/// Locks the property row and requires it to exist and be active.
fn require_active_property(conn: &mut PgConnection, id: PropertyId) -> RepositoryResult<()> {
    let context = ErrorContext::default()
        .with_entity("property")
        .with_entity_id(id);
    match find_property_for_update(conn, id)? {
        Some(row) if row.status == PropertyStatus::Active.as_str() => Ok(()),
        Some(_) => Err(RepositoryError::validation_with_context(
            format!("Property {} has been deleted", id),
            context,
        )),
        None => Err(RepositoryError::validation_with_context(
            format!("Property {} does not exist", id),
            context,
        )),
    }
}

fn scheduled_tours_for_property(
    conn: &mut PgConnection,
    property_id: PropertyId,
) -> RepositoryResult<Vec<Tour>> {
    let rows: Vec<TourRow> = tours::table
        .filter(tours::property_id.eq(property_id.value()))
        .filter(tours::status.eq(TourStatus::Scheduled.as_str()))
        .load(conn)?;
    rows.into_iter().map(Tour::try_from).collect()
}

#[async_trait]
impl TourRepository for PostgresRepository {
    async fn schedule_tour(
        &self,
        new_tour: NewTour,
        policy: &SchedulingPolicy,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleAttempt> {
        let policy = policy.clone();
        self.with_conn("schedule_tour", move |conn| {
            let new_tour = new_tour.clone();
            let policy = policy.clone();
            conn.transaction::<ScheduleAttempt, RepositoryError, _>(move |conn| {
                require_active_property(conn, new_tour.property_id)?;

                let existing = scheduled_tours_for_property(conn, new_tour.property_id)?;
                let decision =
                    validate_schedule_request(&policy, new_tour.tour_time, &existing, None, now);
                if let Some(reason) = decision.rejection() {
                    return Ok(Err(reason));
                }

                let end_time = policy.resolve_end_time(new_tour.tour_time, new_tour.end_time);
                if end_time <= new_tour.tour_time {
                    return Err(RepositoryError::validation(
                        "end_time must be after tour_time",
                    ));
                }

                let row = NewTourRow {
                    property_id: new_tour.property_id.value(),
                    tour_time: new_tour.tour_time,
                    end_time,
                    status: TourStatus::Scheduled.as_str().to_string(),
                    client_name: new_tour.client_name,
                    phone_number: new_tour.phone_number,
                    created_at: now,
                    updated_at: now,
                };
                let inserted: TourRow = diesel::insert_into(tours::table)
                    .values(&row)
                    .get_result(conn)?;
                Ok(Ok(Tour::try_from(inserted)?))
            })
        })
        .await
    }

    async fn get_tour(&self, id: TourId) -> RepositoryResult<Tour> {
        self.with_conn("get_tour", move |conn| {
            let row: Option<TourRow> = tours::table.find(id.value()).first(conn).optional()?;
            row.map(Tour::try_from).transpose()?.ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Tour {} not found", id),
                    ErrorContext::default()
                        .with_entity("tour")
                        .with_entity_id(id),
                )
            })
        })
        .await
    }

    async fn list_tours(&self, filter: TourFilter) -> RepositoryResult<Vec<Tour>> {
        self.with_conn("list_tours", move |conn| {
            let mut query = tours::table.into_boxed();
            if let Some(property_id) = filter.property_id {
                query = query.filter(tours::property_id.eq(property_id.value()));
            }
            if let Some(status) = filter.status {
                query = query.filter(tours::status.eq(status.as_str()));
            }
            let rows: Vec<TourRow> = query
                .order((tours::tour_time.asc(), tours::id.asc()))
                .load(conn)?;
            rows.into_iter().map(Tour::try_from).collect()
        })
        .await
    }

    async fn reschedule_tour(
        &self,
        id: TourId,
        update: TourUpdate,
        policy: &SchedulingPolicy,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleAttempt> {
        let policy = policy.clone();
        self.with_conn("reschedule_tour", move |conn| {
            let update = update.clone();
            let policy = policy.clone();
            conn.transaction::<ScheduleAttempt, RepositoryError, _>(move |conn| {
                let current = find_tour_for_update(conn, id)?;

                if update.changes_times() && current.status != TourStatus::Scheduled {
                    return Err(RepositoryError::validation_with_context(
                        format!("Cannot reschedule a tour in status '{}'", current.status),
                        ErrorContext::default()
                            .with_entity("tour")
                            .with_entity_id(id),
                    ));
                }

                let candidate_time = update.tour_time.unwrap_or(current.tour_time);
                if update.tour_time.is_some() {
                    // Lock the property row so a concurrent schedule_tour
                    // cannot slip into the window we are about to occupy.
                    find_property_for_update(conn, current.property_id)?;
                    let existing = scheduled_tours_for_property(conn, current.property_id)?;
                    let decision = validate_schedule_request(
                        &policy,
                        candidate_time,
                        &existing,
                        Some(id),
                        now,
                    );
                    if let Some(reason) = decision.rejection() {
                        return Ok(Err(reason));
                    }
                }

                let end_time = match (update.tour_time, update.end_time) {
                    (Some(start), None) => policy.resolve_end_time(start, None),
                    (_, Some(end)) => end,
                    (None, None) => current.end_time,
                };
                if end_time <= candidate_time {
                    return Err(RepositoryError::validation(
                        "end_time must be after tour_time",
                    ));
                }

                let client_name = update.client_name.unwrap_or(current.client_name);
                let phone_number = update.phone_number.unwrap_or(current.phone_number);
                let updated: TourRow = diesel::update(tours::table.find(id.value()))
                    .set((
                        tours::tour_time.eq(candidate_time),
                        tours::end_time.eq(end_time),
                        tours::client_name.eq(client_name),
                        tours::phone_number.eq(phone_number),
                        tours::updated_at.eq(now),
                    ))
                    .get_result(conn)?;
                Ok(Ok(Tour::try_from(updated)?))
            })
        })
        .await
    }

    async fn update_tour_status(
        &self,
        id: TourId,
        new_status: TourStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<TransitionAttempt> {
        self.with_conn("update_tour_status", move |conn| {
            conn.transaction::<TransitionAttempt, RepositoryError, _>(move |conn| {
                let current = find_tour_for_update(conn, id)?;
                match apply_status_transition(&current, new_status, now) {
                    Ok(updated) => {
                        let row: TourRow = diesel::update(tours::table.find(id.value()))
                            .set((
                                tours::status.eq(updated.status.as_str()),
                                tours::updated_at.eq(now),
                            ))
                            .get_result(conn)?;
                        Ok(Ok(Tour::try_from(row)?))
                    }
                    Err(err) => Ok(Err(err)),
                }
            })
        })
        .await
    }

    async fn delete_tour(&self, id: TourId) -> RepositoryResult<()> {
        self.with_conn("delete_tour", move |conn| {
            let deleted = diesel::delete(tours::table.find(id.value())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Tour {} not found", id),
                    ErrorContext::default()
                        .with_entity("tour")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PropertyRepository for PostgresRepository {
    async fn create_property(
        &self,
        new_property: NewProperty,
        now: NaiveDateTime,
    ) -> RepositoryResult<Property> {
        self.with_conn("create_property", move |conn| {
            let address = new_property.address.trim().to_string();
            if address.is_empty() {
                return Err(RepositoryError::validation(
                    "Property address must not be empty",
                ));
            }
            let row = NewPropertyRow {
                address,
                status: PropertyStatus::Active.as_str().to_string(),
                created_at: now,
                updated_at: now,
            };
            // The unique index on address turns duplicates into a Conflict
            // via the diesel error mapping.
            let inserted: PropertyRow = diesel::insert_into(properties::table)
                .values(&row)
                .get_result(conn)?;
            Property::try_from(inserted)
        })
        .await
    }

    async fn get_property(&self, id: PropertyId) -> RepositoryResult<Property> {
        self.with_conn("get_property", move |conn| {
            let row: Option<PropertyRow> =
                properties::table.find(id.value()).first(conn).optional()?;
            row.map(Property::try_from).transpose()?.ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Property {} not found", id),
                    ErrorContext::default()
                        .with_entity("property")
                        .with_entity_id(id),
                )
            })
        })
        .await
    }

    async fn list_properties(&self) -> RepositoryResult<Vec<Property>> {
        self.with_conn("list_properties", move |conn| {
            let rows: Vec<PropertyRow> = properties::table
                .filter(properties::status.eq(PropertyStatus::Active.as_str()))
                .order(properties::id.asc())
                .load(conn)?;
            rows.into_iter().map(Property::try_from).collect()
        })
        .await
    }

    async fn delete_property(
        &self,
        id: PropertyId,
        now: NaiveDateTime,
    ) -> RepositoryResult<PropertyDeleteOutcome> {
        self.with_conn("delete_property", move |conn| {
            conn.transaction::<PropertyDeleteOutcome, RepositoryError, _>(move |conn| {
                let row = find_property_for_update(conn, id)?.ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Property {} not found", id),
                        ErrorContext::default()
                            .with_entity("property")
                            .with_entity_id(id),
                    )
                })?;
                let current = Property::try_from(row)?;
                if !current.is_active() {
                    return Ok(PropertyDeleteOutcome::Deleted(current));
                }

                let active_tours: i64 = tours::table
                    .filter(tours::property_id.eq(id.value()))
                    .filter(tours::status.eq(TourStatus::Scheduled.as_str()))
                    .count()
                    .get_result(conn)?;
                if active_tours > 0 {
                    return Ok(PropertyDeleteOutcome::Blocked {
                        active_tours: active_tours as usize,
                    });
                }

                let updated: PropertyRow = diesel::update(properties::table.find(id.value()))
                    .set((
                        properties::status.eq(PropertyStatus::Deleted.as_str()),
                        properties::deleted_at.eq(Some(now)),
                        properties::updated_at.eq(now),
                    ))
                    .get_result(conn)?;
                Ok(PropertyDeleteOutcome::Deleted(Property::try_from(updated)?))
            })
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
