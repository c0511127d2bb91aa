//! Tests for domain_tasks

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::recurrence::Recurring;
use core_kernel::{ProjectId, RecurrenceOptions, RecurrenceRule, TeamMemberId};

use domain_tasks::{RecurringTask, Task, TaskError, TaskPriority, TaskStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

// ============================================================================
// Task Lifecycle Tests
// ============================================================================

mod task_tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("Write brief", at(2024, 1, 1));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_start_then_complete() {
        let mut task = Task::new("Write brief", at(2024, 1, 1));
        task.start(at(2024, 1, 2)).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        task.complete(at(2024, 1, 3)).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_at, Some(at(2024, 1, 3)));
        assert_eq!(task.updated_at, at(2024, 1, 3));
    }

    #[test]
    fn test_cannot_start_completed_task() {
        let mut task = Task::new("Write brief", at(2024, 1, 1));
        task.complete(at(2024, 1, 2)).unwrap();

        let result = task.start(at(2024, 1, 3));
        assert!(matches!(
            result,
            Err(TaskError::InvalidStatusTransition {
                from: TaskStatus::Completed,
                to: TaskStatus::InProgress
            })
        ));
    }

    #[test]
    fn test_reopen_clears_completion() {
        let mut task = Task::new("Write brief", at(2024, 1, 1));
        task.complete(at(2024, 1, 2)).unwrap();
        task.reopen(at(2024, 1, 3)).unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_cancelled_task_cannot_complete() {
        let mut task = Task::new("Write brief", at(2024, 1, 1));
        task.cancel(at(2024, 1, 2)).unwrap();
        assert!(task.complete(at(2024, 1, 3)).is_err());
    }

    #[test]
    fn test_overdue_only_while_open() {
        let mut task = Task::new("Write brief", at(2024, 1, 1)).with_due_date(date(2024, 1, 10));
        assert!(!task.is_overdue(date(2024, 1, 10)));
        assert!(task.is_overdue(date(2024, 1, 11)));

        task.complete(at(2024, 1, 12)).unwrap();
        assert!(!task.is_overdue(date(2024, 1, 20)));
    }

    #[test]
    fn test_task_without_due_date_is_never_overdue() {
        let task = Task::new("Someday", at(2024, 1, 1));
        assert!(!task.is_overdue(date(2030, 1, 1)));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    }
}

// ============================================================================
// Recurring Task Tests
// ============================================================================

mod recurring_task_tests {
    use super::*;

    fn weekly_report() -> RecurringTask {
        RecurringTask::new("Weekly report", RecurrenceRule::weekly(1), date(2024, 1, 1), at(2023, 12, 20))
            .with_description("Summarise hours per client")
            .with_project(ProjectId::new())
            .with_assignee(TeamMemberId::new())
            .with_priority(TaskPriority::High)
            .with_estimated_hours(dec!(1.5))
    }

    #[test]
    fn test_instantiate_snapshots_blueprint() {
        let template = weekly_report();
        let task = template.instantiate(date(2024, 1, 1), at(2024, 1, 1));

        assert_eq!(task.title, "Weekly report");
        assert_eq!(task.description.as_deref(), Some("Summarise hours per client"));
        assert_eq!(task.project_id, template.project_id);
        assert_eq!(task.assignee_id, template.assignee_id);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.estimated_hours, Some(dec!(1.5)));
        assert_eq!(task.due_date, Some(date(2024, 1, 1)));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.recurring_task_id, Some(template.id));
        assert_eq!(task.created_at, at(2024, 1, 1));
    }

    #[test]
    fn test_instances_get_fresh_ids() {
        let template = weekly_report();
        let first = template.instantiate(date(2024, 1, 1), at(2024, 1, 1));
        let second = template.instantiate(date(2024, 1, 8), at(2024, 1, 8));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_editing_template_leaves_instance_alone() {
        let mut template = weekly_report();
        let task = template.instantiate(date(2024, 1, 1), at(2024, 1, 1));

        template.title = "Renamed".to_string();
        assert_eq!(task.title, "Weekly report");
    }

    #[test]
    fn test_record_generation_advances_schedule() {
        let mut template = weekly_report();
        template.record_generation(date(2024, 1, 8), at(2024, 1, 1));

        assert_eq!(template.next_due, date(2024, 1, 8));
        assert_eq!(template.last_generated, Some(at(2024, 1, 1)));
        assert_eq!(template.start_date, date(2024, 1, 1));
    }

    #[test]
    fn test_pause_and_resume_keep_next_due() {
        let mut template = weekly_report();
        template.pause(at(2024, 1, 2));
        assert!(!template.is_active());

        template.resume(at(2024, 3, 1));
        assert!(template.is_active());
        assert_eq!(template.next_due, date(2024, 1, 1));
    }

    #[test]
    fn test_reschedule_keeps_pending_occurrence() {
        let mut template = weekly_report();
        template.reschedule(RecurrenceRule::monthly(1).on_day_of_month(15), at(2024, 1, 5));

        assert_eq!(template.next_due, date(2024, 1, 1));
        assert_eq!(template.rule(), RecurrenceRule::monthly(1).on_day_of_month(15));
        assert_eq!(template.updated_at, at(2024, 1, 5));

        let dates = template.upcoming(RecurrenceOptions::default(), 2).unwrap();
        assert_eq!(dates, vec![date(2024, 2, 15), date(2024, 3, 15)]);
    }

    #[test]
    fn test_upcoming_weekday_schedule() {
        let template = RecurringTask::new(
            "Standup notes",
            RecurrenceRule::weekly(1).on_days([1, 3]),
            date(2024, 1, 1),
            at(2024, 1, 1),
        );
        let dates = template.upcoming(RecurrenceOptions::default(), 3).unwrap();
        assert_eq!(dates, vec![date(2024, 1, 3), date(2024, 1, 8), date(2024, 1, 10)]);
    }

    #[test]
    fn test_valid_template_passes() {
        assert!(weekly_report().validate().is_ok());
    }

    #[test]
    fn test_negative_estimate_rejected() {
        let template = weekly_report().with_estimated_hours(dec!(-1));
        assert!(template.validate().unwrap_err().has_field("estimatedHours"));
    }

    #[test]
    fn test_deserializes_form_payload() {
        let json = r#"{
            "id": "0190b5a0-0000-7000-8000-000000000001",
            "title": "Invoice reminders",
            "frequency": "monthly",
            "dayOfMonth": 31,
            "startDate": "2024-01-31",
            "isActive": true,
            "nextDue": "2024-01-31",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let template: RecurringTask = serde_json::from_str(json).unwrap();

        assert_eq!(template.interval, 1);
        assert_eq!(template.rule(), RecurrenceRule::monthly(1).on_day_of_month(31));
        assert!(template.validate().is_ok());
    }
}
