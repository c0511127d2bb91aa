//! Task aggregate

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ClientId, ProjectId, RecurringTaskId, TaskId, TeamMemberId};
use crate::error::TaskError;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A unit of work on the task board
///
/// Tasks generated from a [`crate::RecurringTask`] carry the template's id in
/// `recurring_task_id`, but are otherwise independent of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<ProjectId>,
    pub client_id: Option<ClientId>,
    pub assignee_id: Option<TeamMemberId>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<Decimal>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub recurring_task_id: Option<RecurringTaskId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new_v7(),
            title: title.into(),
            description: None,
            project_id: None,
            client_id: None,
            assignee_id: None,
            priority: TaskPriority::default(),
            status: TaskStatus::Pending,
            due_date: None,
            estimated_hours: None,
            tags: Vec::new(),
            recurring_task_id: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_assignee(mut self, assignee_id: TeamMemberId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.update_status(TaskStatus::InProgress, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.update_status(TaskStatus::Completed, now)?;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.update_status(TaskStatus::Cancelled, now)
    }

    /// Moves a completed or cancelled task back to pending
    pub fn reopen(&mut self, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.update_status(TaskStatus::Pending, now)?;
        self.completed_at = None;
        Ok(())
    }

    /// Open tasks whose due date has passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress)
            && self.due_date.is_some_and(|due| today > due)
    }

    fn update_status(&mut self, status: TaskStatus, now: DateTime<Utc>) -> Result<(), TaskError> {
        if !self.can_transition_to(status) {
            return Err(TaskError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.updated_at = now;
        Ok(())
    }

    fn can_transition_to(&self, target: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self.status, target),
            (Pending, InProgress) |
            (Pending, Completed) |
            (InProgress, Pending) |
            (InProgress, Completed) |
            (Pending, Cancelled) |
            (InProgress, Cancelled) |
            (Completed, Pending) |
            (Cancelled, Pending)
        )
    }
}
