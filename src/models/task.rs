use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{AnyPool, FromRow};
use std::fmt;

/// Display format of the creation date, e.g. `March 07, 2024`.
pub const DATE_FORMAT: &str = "%B %d, %Y";

/// Completion flag of a task.
/// Stored as the text `COMPLETE` / `NOT_COMPLETE`.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    NotComplete,
    Complete,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotComplete => "NOT_COMPLETE",
            TaskStatus::Complete => "COMPLETE",
        }
    }
}

/// A stored status that is neither `COMPLETE` nor `NOT_COMPLETE`.
#[derive(Debug)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown task status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl TryFrom<String> for TaskStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "NOT_COMPLETE" => Ok(TaskStatus::NotComplete),
            "COMPLETE" => Ok(TaskStatus::Complete),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// A single work item belonging to exactly one list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub list_id: i64,
    pub user_id: i64,
    pub text: String,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    /// Creation date, already formatted for display.
    pub date: String,
}

/// Everything needed to insert a task; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub list_id: i64,
    pub user_id: i64,
    pub text: String,
    pub status: TaskStatus,
    pub date: String,
}

impl NewTask {
    /// A not-yet-complete task stamped with `today`.
    pub fn new(list_id: i64, user_id: i64, text: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            list_id,
            user_id,
            text: text.into(),
            status: TaskStatus::default(),
            date: today.format(DATE_FORMAT).to_string(),
        }
    }

    /// Same as [`NewTask::new`] using the server's local date.
    pub fn stamped_today(list_id: i64, user_id: i64, text: impl Into<String>) -> Self {
        Self::new(list_id, user_id, text, Local::now().date_naive())
    }
}

const TASK_COLUMNS: &str = "id, list_id, user_id, text, status, date";

impl Task {
    /// Tasks of one list, oldest first.
    pub async fn for_list(pool: &AnyPool, list_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE list_id = $1 ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(list_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &AnyPool, id: i64) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &AnyPool, task: NewTask) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (list_id, user_id, text, status, date) VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.list_id)
        .bind(task.user_id)
        .bind(task.text)
        .bind(task.status.as_str())
        .bind(task.date)
        .fetch_one(pool)
        .await
    }

    /// Removes the task and returns it, or `None` if it did not exist.
    pub async fn delete(pool: &AnyPool, id: i64) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("DELETE FROM tasks WHERE id = $1 RETURNING {}", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flips the task's status and returns the updated row, or `None` if the
    /// task does not exist. Every call inverts; it never just sets "complete".
    ///
    /// The flip happens inside one `UPDATE`, so concurrent toggles each invert
    /// the value the previous one left behind.
    pub async fn toggle_status(pool: &AnyPool, id: i64) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET status = CASE status WHEN 'COMPLETE' THEN 'NOT_COMPLETE' ELSE 'COMPLETE' END
             WHERE id = $1
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
