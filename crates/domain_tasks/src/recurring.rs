//! Recurring tasks
//!
//! A [`RecurringTask`] is a task blueprint with a schedule. Every time it
//! falls due, a new [`Task`] is created from the blueprint and dated on the
//! occurrence. The schedule fields are stored flat, the way the recurring-task
//! form submits them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::recurrence::{self, Recurring};
use core_kernel::validation::{validate_rule, validate_window};
use core_kernel::{
    ClientId, DateRange, Frequency, ProjectId, RecurrenceError, RecurrenceOptions, RecurrenceRule,
    RecurringTaskId, TeamMemberId, ValidationErrors,
};

use crate::task::{Task, TaskPriority};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTask {
    pub id: RecurringTaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub assignee_id: Option<TeamMemberId>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub estimated_hours: Option<Decimal>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub days_of_week: Option<BTreeSet<u8>>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub next_due: NaiveDate,
    #[serde(default)]
    pub last_generated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_interval() -> u32 {
    1
}

impl RecurringTask {
    /// Creates an active recurring task whose first occurrence is `start_date`
    pub fn new(
        title: impl Into<String>,
        rule: RecurrenceRule,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecurringTaskId::new_v7(),
            title: title.into(),
            description: None,
            project_id: None,
            client_id: None,
            assignee_id: None,
            priority: TaskPriority::default(),
            estimated_hours: None,
            tags: Vec::new(),
            frequency: rule.frequency,
            interval: rule.interval,
            days_of_week: rule.days_of_week,
            day_of_month: rule.day_of_month,
            start_date,
            end_date: None,
            is_active: true,
            next_due: start_date,
            last_generated: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
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

    pub fn with_estimated_hours(mut self, hours: Decimal) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    /// Re-enables generation without catching up on missed occurrences
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.updated_at = now;
    }

    /// Replaces the schedule; the pending occurrence is kept
    pub fn reschedule(&mut self, rule: RecurrenceRule, now: DateTime<Utc>) {
        self.frequency = rule.frequency;
        self.interval = rule.interval;
        self.days_of_week = rule.days_of_week;
        self.day_of_month = rule.day_of_month;
        self.updated_at = now;
    }

    pub fn rule(&self) -> RecurrenceRule {
        RecurrenceRule {
            frequency: self.frequency,
            interval: self.interval,
            days_of_week: self.days_of_week.clone(),
            day_of_month: self.day_of_month,
            custom_days: None,
        }
    }

    pub fn window(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// The next `count` occurrences after the pending one
    pub fn upcoming(&self, options: RecurrenceOptions, count: usize) -> Result<Vec<NaiveDate>, RecurrenceError> {
        recurrence::upcoming(self.next_due, &self.rule(), options, count)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(!self.title.trim().is_empty(), "title", "is required");
        errors.check(
            matches!(
                self.frequency,
                Frequency::Daily | Frequency::Weekly | Frequency::Monthly | Frequency::Yearly
            ),
            "frequency",
            "tasks recur daily, weekly, monthly or yearly",
        );
        validate_rule(&self.rule(), &mut errors);
        validate_window(&self.window(), &mut errors);
        if let Some(hours) = self.estimated_hours {
            errors.check(hours >= Decimal::ZERO, "estimatedHours", "must not be negative");
        }

        errors.into_result()
    }
}

impl Recurring for RecurringTask {
    type Instance = Task;

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn next_due(&self) -> NaiveDate {
        self.next_due
    }

    fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    fn recurrence_rule(&self) -> RecurrenceRule {
        self.rule()
    }

    fn instantiate(&self, occurrence: NaiveDate, now: DateTime<Utc>) -> Task {
        let mut task = Task::new(self.title.clone(), now).with_due_date(occurrence);
        task.description = self.description.clone();
        task.project_id = self.project_id;
        task.client_id = self.client_id;
        task.assignee_id = self.assignee_id;
        task.priority = self.priority;
        task.estimated_hours = self.estimated_hours;
        task.tags = self.tags.clone();
        task.recurring_task_id = Some(self.id);
        task
    }

    fn record_generation(&mut self, next_due: NaiveDate, generated_at: DateTime<Utc>) {
        self.next_due = next_due;
        self.last_generated = Some(generated_at);
        self.updated_at = generated_at;
    }

    fn deactivate(&mut self, at: DateTime<Utc>) {
        self.pause(at);
    }
}
