//! Registration rules and orchestration.
//!
//! All RSVP invariants live here: only published events accept registrations,
//! creators cannot register for their own events, capacity is enforced
//! against confirmed rows only, and cancelled rows are reactivated instead of
//! duplicated.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::error::Error;
use super::event::EventStatus;
use super::ports::{EventRepository, RegistrationRepository};
use super::registration::{
    Attendee, AvailabilitySummary, Registration, RegistrationOutcome, RegistrationStatus,
    RegistrationWithEvent,
};
use super::user::UserId;

/// Service applying registration rules over the repositories.
pub struct RegistrationService {
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
}

impl RegistrationService {
    /// Assemble the service from its repositories.
    pub fn new(
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self {
            events,
            registrations,
        }
    }

    /// Register a user for an event, reviving a cancelled row if one exists.
    ///
    /// # Errors
    ///
    /// Not-found for unknown events, invalid-request for unpublished, own, or
    /// full events, and conflict when the user already holds a confirmed
    /// registration.
    pub async fn register(
        &self,
        event_id: Uuid,
        user_id: &UserId,
    ) -> Result<RegistrationOutcome, Error> {
        let event = self
            .events
            .fetch_basic(event_id)
            .await?
            .ok_or_else(|| Error::not_found("event not found"))?;

        if event.status != EventStatus::Published {
            return Err(Error::invalid_request(
                "event is not open for registration",
            ));
        }
        if event.creator_id == *user_id {
            return Err(Error::invalid_request(
                "you cannot register for your own event",
            ));
        }

        let existing = self.registrations.find(event_id, user_id).await?;
        if existing
            .as_ref()
            .is_some_and(|row| row.status == RegistrationStatus::Confirmed)
        {
            return Err(Error::conflict("you are already registered for this event"));
        }

        // The viewer's own cancelled row never counts against capacity, so
        // the check is safe to run before reactivation.
        if let Some(capacity) = event.capacity {
            let confirmed = self.registrations.confirmed_count(event_id).await?;
            if confirmed >= i64::from(capacity) {
                return Err(Error::invalid_request("event is full"));
            }
        }

        let outcome = match existing {
            Some(cancelled) => {
                let registration = self
                    .registrations
                    .set_status(cancelled.id, RegistrationStatus::Confirmed)
                    .await?;
                RegistrationOutcome {
                    registration,
                    reactivated: true,
                }
            }
            None => {
                let registration = self
                    .registrations
                    .insert_confirmed(event_id, user_id)
                    .await?;
                RegistrationOutcome {
                    registration,
                    reactivated: false,
                }
            }
        };
        info!(
            %event_id,
            user_id = %outcome.registration.user_id,
            reactivated = outcome.reactivated,
            "registration confirmed"
        );
        Ok(outcome)
    }

    /// Cancel a user's confirmed registration.
    ///
    /// # Errors
    ///
    /// Not-found when no confirmed registration exists for the pair.
    pub async fn cancel(&self, event_id: Uuid, user_id: &UserId) -> Result<Registration, Error> {
        let existing = self.registrations.find(event_id, user_id).await?;
        match existing {
            Some(row) if row.status == RegistrationStatus::Confirmed => {
                let cancelled = self
                    .registrations
                    .set_status(row.id, RegistrationStatus::Cancelled)
                    .await?;
                info!(%event_id, user_id = %cancelled.user_id, "registration cancelled");
                Ok(cancelled)
            }
            _ => Err(Error::not_found("registration not found")),
        }
    }

    /// List confirmed attendees. Restricted to the event creator.
    ///
    /// # Errors
    ///
    /// Not-found for unknown events, forbidden for anyone but the creator.
    pub async fn attendees(&self, event_id: Uuid, caller: &UserId) -> Result<Vec<Attendee>, Error> {
        let event = self
            .events
            .fetch_basic(event_id)
            .await?
            .ok_or_else(|| Error::not_found("event not found"))?;
        if event.creator_id != *caller {
            return Err(Error::forbidden(
                "only the event creator can view attendees",
            ));
        }
        Ok(self.registrations.attendees(event_id).await?)
    }

    /// Capacity and registration state of an event for an optional viewer.
    ///
    /// # Errors
    ///
    /// Not-found for unknown events.
    pub async fn availability(
        &self,
        event_id: Uuid,
        viewer: Option<&UserId>,
    ) -> Result<AvailabilitySummary, Error> {
        let event = self
            .events
            .fetch_basic(event_id)
            .await?
            .ok_or_else(|| Error::not_found("event not found"))?;

        let confirmed = self.registrations.confirmed_count(event_id).await?;
        let is_registered = match viewer {
            Some(user_id) => self
                .registrations
                .find(event_id, user_id)
                .await?
                .is_some_and(|row| row.status == RegistrationStatus::Confirmed),
            None => false,
        };
        Ok(AvailabilitySummary::derive(
            confirmed,
            event.capacity,
            is_registered,
        ))
    }

    /// A user's confirmed registrations with event details, newest first.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn registrations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RegistrationWithEvent>, Error> {
        Ok(self.registrations.confirmed_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::event::{Event, LocationType};
    use crate::domain::ports::{MockEventRepository, MockRegistrationRepository};
    use chrono::{Duration, Utc};
    use rstest::rstest;

    fn event(creator: UserId, status: EventStatus, capacity: Option<i32>) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            creator_id: creator,
            title: "Rust Meetup".to_owned(),
            description: "Monthly meetup.".to_owned(),
            categories: vec!["technology".to_owned()],
            cover_image: None,
            location_type: LocationType::Physical,
            address: None,
            city: "Berlin".to_owned(),
            country: "Germany".to_owned(),
            coordinates: None,
            virtual_link: None,
            start_time: now + Duration::days(7),
            end_time: now + Duration::days(7) + Duration::hours(2),
            timezone: "Europe/Berlin".to_owned(),
            capacity,
            ticket_price: 0.0,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn registration(event_id: Uuid, user_id: UserId, status: RegistrationStatus) -> Registration {
        let now = Utc::now();
        Registration {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status,
            registered_at: now,
            updated_at: now,
        }
    }

    fn service(
        events: MockEventRepository,
        registrations: MockRegistrationRepository,
    ) -> RegistrationService {
        RegistrationService::new(Arc::new(events), Arc::new(registrations))
    }

    #[rstest]
    #[tokio::test]
    async fn registering_for_unknown_event_is_not_found() {
        let mut events = MockEventRepository::new();
        events.expect_fetch_basic().return_once(|_| Ok(None));
        let error = service(events, MockRegistrationRepository::new())
            .register(Uuid::new_v4(), &UserId::random())
            .await
            .expect_err("missing event");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(EventStatus::Draft)]
    #[case(EventStatus::Cancelled)]
    #[case(EventStatus::Completed)]
    #[tokio::test]
    async fn unpublished_events_reject_registration(#[case] status: EventStatus) {
        let mut events = MockEventRepository::new();
        let row = event(UserId::random(), status, None);
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let error = service(events, MockRegistrationRepository::new())
            .register(Uuid::new_v4(), &UserId::random())
            .await
            .expect_err("unpublished");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "event is not open for registration");
    }

    #[rstest]
    #[tokio::test]
    async fn creators_cannot_register_for_their_own_event() {
        let creator = UserId::random();
        let mut events = MockEventRepository::new();
        let row = event(creator, EventStatus::Published, None);
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let error = service(events, MockRegistrationRepository::new())
            .register(Uuid::new_v4(), &creator)
            .await
            .expect_err("own event");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "you cannot register for your own event");
    }

    #[rstest]
    #[tokio::test]
    async fn confirmed_registration_conflicts() {
        let user = UserId::random();
        let event_id = Uuid::new_v4();
        let mut events = MockEventRepository::new();
        let row = event(UserId::random(), EventStatus::Published, Some(10));
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let mut registrations = MockRegistrationRepository::new();
        let existing = registration(event_id, user, RegistrationStatus::Confirmed);
        registrations
            .expect_find()
            .return_once(move |_, _| Ok(Some(existing)));

        let error = service(events, registrations)
            .register(event_id, &user)
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn full_events_reject_registration() {
        let mut events = MockEventRepository::new();
        let row = event(UserId::random(), EventStatus::Published, Some(2));
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let mut registrations = MockRegistrationRepository::new();
        registrations.expect_find().return_once(|_, _| Ok(None));
        registrations.expect_confirmed_count().return_once(|_| Ok(2));

        let error = service(events, registrations)
            .register(Uuid::new_v4(), &UserId::random())
            .await
            .expect_err("full");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "event is full");
    }

    #[rstest]
    #[tokio::test]
    async fn new_registration_inserts_a_confirmed_row() {
        let user = UserId::random();
        let event_id = Uuid::new_v4();
        let mut events = MockEventRepository::new();
        let row = event(UserId::random(), EventStatus::Published, Some(10));
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let mut registrations = MockRegistrationRepository::new();
        registrations.expect_find().return_once(|_, _| Ok(None));
        registrations.expect_confirmed_count().return_once(|_| Ok(3));
        let inserted = registration(event_id, user, RegistrationStatus::Confirmed);
        registrations
            .expect_insert_confirmed()
            .return_once(move |_, _| Ok(inserted));

        let outcome = service(events, registrations)
            .register(event_id, &user)
            .await
            .expect("registered");
        assert!(!outcome.reactivated);
        assert_eq!(outcome.registration.status, RegistrationStatus::Confirmed);
    }

    #[rstest]
    #[tokio::test]
    async fn cancelled_row_is_reactivated_not_duplicated() {
        let user = UserId::random();
        let event_id = Uuid::new_v4();
        let mut events = MockEventRepository::new();
        let row = event(UserId::random(), EventStatus::Published, None);
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let mut registrations = MockRegistrationRepository::new();
        let cancelled = registration(event_id, user, RegistrationStatus::Cancelled);
        let cancelled_id = cancelled.id;
        registrations
            .expect_find()
            .return_once(move |_, _| Ok(Some(cancelled)));
        let revived = registration(event_id, user, RegistrationStatus::Confirmed);
        registrations
            .expect_set_status()
            .withf(move |id, status| *id == cancelled_id && *status == RegistrationStatus::Confirmed)
            .return_once(move |_, _| Ok(revived));
        registrations.expect_insert_confirmed().never();

        let outcome = service(events, registrations)
            .register(event_id, &user)
            .await
            .expect("reactivated");
        assert!(outcome.reactivated);
    }

    #[rstest]
    #[tokio::test]
    async fn cancelling_without_a_confirmed_row_is_not_found() {
        let user = UserId::random();
        let event_id = Uuid::new_v4();
        let mut registrations = MockRegistrationRepository::new();
        let already = registration(event_id, user, RegistrationStatus::Cancelled);
        registrations
            .expect_find()
            .return_once(move |_, _| Ok(Some(already)));

        let error = service(MockEventRepository::new(), registrations)
            .cancel(event_id, &user)
            .await
            .expect_err("nothing to cancel");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn cancelling_flips_the_status() {
        let user = UserId::random();
        let event_id = Uuid::new_v4();
        let mut registrations = MockRegistrationRepository::new();
        let confirmed = registration(event_id, user, RegistrationStatus::Confirmed);
        let confirmed_id = confirmed.id;
        registrations
            .expect_find()
            .return_once(move |_, _| Ok(Some(confirmed)));
        let cancelled = registration(event_id, user, RegistrationStatus::Cancelled);
        registrations
            .expect_set_status()
            .withf(move |id, status| {
                *id == confirmed_id && *status == RegistrationStatus::Cancelled
            })
            .return_once(move |_, _| Ok(cancelled));

        let result = service(MockEventRepository::new(), registrations)
            .cancel(event_id, &user)
            .await
            .expect("cancelled");
        assert_eq!(result.status, RegistrationStatus::Cancelled);
    }

    #[rstest]
    #[tokio::test]
    async fn attendees_are_restricted_to_the_creator() {
        let creator = UserId::random();
        let mut events = MockEventRepository::new();
        let row = event(creator, EventStatus::Published, None);
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));

        let error = service(events, MockRegistrationRepository::new())
            .attendees(Uuid::new_v4(), &UserId::random())
            .await
            .expect_err("not the creator");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn availability_reflects_the_viewers_confirmed_row() {
        let viewer = UserId::random();
        let event_id = Uuid::new_v4();
        let mut events = MockEventRepository::new();
        let row = event(UserId::random(), EventStatus::Published, Some(10));
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let mut registrations = MockRegistrationRepository::new();
        registrations.expect_confirmed_count().return_once(|_| Ok(4));
        let mine = registration(event_id, viewer, RegistrationStatus::Confirmed);
        registrations
            .expect_find()
            .return_once(move |_, _| Ok(Some(mine)));

        let summary = service(events, registrations)
            .availability(event_id, Some(&viewer))
            .await
            .expect("summary");
        assert!(summary.is_registered);
        assert_eq!(summary.available_spots, Some(6));
        assert!(!summary.is_full);
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_availability_never_reports_registered() {
        let mut events = MockEventRepository::new();
        let row = event(UserId::random(), EventStatus::Published, None);
        events.expect_fetch_basic().return_once(move |_| Ok(Some(row)));
        let mut registrations = MockRegistrationRepository::new();
        registrations.expect_confirmed_count().return_once(|_| Ok(7));
        registrations.expect_find().never();

        let summary = service(events, registrations)
            .availability(Uuid::new_v4(), None)
            .await
            .expect("summary");
        assert!(!summary.is_registered);
        assert_eq!(summary.capacity, None);
        assert_eq!(summary.available_spots, None);
    }
}
