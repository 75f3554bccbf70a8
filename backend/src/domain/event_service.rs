//! Event CRUD orchestration and ownership checks.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::error::Error;
use super::event::{Event, EventFilter, EventPage, EventPatch, EventWithCreator, NewEvent};
use super::ports::EventRepository;
use super::user::UserId;

/// Service applying ownership rules over the event repository.
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

impl EventService {
    /// Assemble the service from its repository.
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// Create an event. Payload validation happens at the HTTP boundary.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn create(&self, event: NewEvent) -> Result<Event, Error> {
        let created = self.events.insert(event).await?;
        info!(event_id = %created.id, creator = %created.creator_id, "event created");
        Ok(created)
    }

    /// Fetch one event with its creator.
    ///
    /// # Errors
    ///
    /// Not-found for unknown events.
    pub async fn get(&self, id: Uuid) -> Result<EventWithCreator, Error> {
        self.events
            .fetch(id)
            .await?
            .ok_or_else(|| Error::not_found("event not found"))
    }

    /// List events for a normalised filter.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list(&self, filter: EventFilter) -> Result<EventPage, Error> {
        Ok(self.events.list(&filter.normalised()).await?)
    }

    /// Apply a partial update. Restricted to the event creator.
    ///
    /// # Errors
    ///
    /// Not-found for unknown events, forbidden for anyone but the creator,
    /// invalid-request for an empty patch.
    pub async fn update(
        &self,
        id: Uuid,
        caller: &UserId,
        patch: EventPatch,
    ) -> Result<Event, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        self.check_ownership(id, caller, "update").await?;
        // The row can disappear between the ownership check and the update.
        self.events
            .update(id, &patch)
            .await?
            .ok_or_else(|| Error::not_found("event not found"))
    }

    /// Delete an event. Restricted to the event creator.
    ///
    /// # Errors
    ///
    /// Not-found for unknown events, forbidden for anyone but the creator.
    pub async fn delete(&self, id: Uuid, caller: &UserId) -> Result<(), Error> {
        self.check_ownership(id, caller, "delete").await?;
        if self.events.delete(id).await? {
            info!(event_id = %id, "event deleted");
            Ok(())
        } else {
            Err(Error::not_found("event not found"))
        }
    }

    async fn check_ownership(&self, id: Uuid, caller: &UserId, action: &str) -> Result<(), Error> {
        let event = self
            .events
            .fetch_basic(id)
            .await?
            .ok_or_else(|| Error::not_found("event not found"))?;
        if event.creator_id == *caller {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "only the event creator can {action} this event"
            )))
        }
    }
}
