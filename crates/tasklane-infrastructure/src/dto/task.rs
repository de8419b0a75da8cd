//! Task DTO

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use tasklane_core::TasklaneError;
use tasklane_core::task::Task;

/// Task record as sent by the todo endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Timestamps are informational; an unparseable one is dropped, not fatal.
fn parse_timestamp(field: &str, raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            debug!(field, value = %raw, error = %e, "Ignoring unparseable task timestamp");
            None
        }
    }
}

impl TryFrom<TaskDto> for Task {
    type Error = TasklaneError;

    fn try_from(dto: TaskDto) -> Result<Self, Self::Error> {
        if dto.id.trim().is_empty() {
            return Err(TasklaneError::malformed("task id is empty"));
        }
        if dto.title.trim().is_empty() {
            return Err(TasklaneError::malformed("task title is empty"));
        }

        Ok(Task {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            completed: dto.completed,
            created_at: parse_timestamp("createdAt", dto.created_at),
            updated_at: parse_timestamp("updatedAt", dto.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Task, TasklaneError> {
        let dto: TaskDto = serde_json::from_str(json).map_err(|e| TasklaneError::malformed(e.to_string()))?;
        Task::try_from(dto)
    }

    #[test]
    fn test_document_store_shape() {
        let task = parse(
            r#"{"_id":"t1","title":"X","description":"","completed":true,
                "createdAt":"2024-05-01T10:00:00.000Z","__v":0,"user":"u1"}"#,
        )
        .unwrap();

        assert_eq!(task.id, "t1");
        assert_eq!(task.description.as_deref(), Some(""));
        assert!(task.completed);
        assert!(task.created_at.is_some());
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let err = parse(r#"{"id":"t1","completed":false}"#).unwrap_err();
        assert_eq!(err.kind(), tasklane_core::ErrorKind::Server);
    }

    #[test]
    fn test_empty_id_is_malformed() {
        assert!(parse(r#"{"id":"","title":"X"}"#).is_err());
    }

    #[test]
    fn test_blank_title_is_malformed() {
        let err = parse(r#"{"id":"t1","title":"   "}"#).unwrap_err();
        assert_eq!(err.kind(), tasklane_core::ErrorKind::Server);
    }

    #[test]
    fn test_bad_timestamp_is_dropped() {
        let task = parse(r#"{"id":"t1","title":"X","updatedAt":"yesterday"}"#).unwrap();
        assert!(task.updated_at.is_none());
        assert!(!task.completed);
    }

    #[test]
    fn test_null_description() {
        let task = parse(r#"{"id":"t1","title":"X","description":null}"#).unwrap();
        assert!(task.description.is_none());
    }
}
