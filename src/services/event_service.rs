use crate::entities::event_entity as events;
use crate::error::{AppError, AppResult};
use crate::models::{CreateEventRequest, EventResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
}

impl EventService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &CreateEventRequest) -> AppResult<EventResponse> {
        if req.title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event title must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let event = events::ActiveModel {
            title: Set(req.title.trim().to_string()),
            starts_at: Set(req.starts_at),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(event.into())
    }

    pub async fn get(&self, event_id: i64) -> AppResult<EventResponse> {
        let event = events::Entity::find_by_id(event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;
        Ok(event.into())
    }
}
