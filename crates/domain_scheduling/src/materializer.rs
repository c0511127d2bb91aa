//! Template materialization
//!
//! A template is due when it is active and its next-due date is on or before
//! today in the agency's timezone. Materializing a due template produces one
//! instance dated at the pending occurrence and a copy of the template whose
//! next-due date has moved on by one step of its rule. Missed periods are not
//! caught up: a template that has been due for months still yields a single
//! instance per call.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::recurrence::{next_occurrence, Recurring};
use core_kernel::{RecurrenceOptions, Timezone};

use crate::error::SchedulingError;

/// Switches that govern a generation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPolicy {
    pub recurrence: RecurrenceOptions,
    /// Deactivate a template once its next occurrence would fall after its end date
    pub deactivate_past_end_date: bool,
    /// Timezone whose calendar date counts as "today"
    pub timezone: Timezone,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            recurrence: RecurrenceOptions::default(),
            deactivate_past_end_date: true,
            timezone: Timezone::default(),
        }
    }
}

/// The result of materializing one occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized<T, I> {
    pub instance: I,
    /// The template with its schedule advanced
    pub template: T,
    /// The occurrence the instance was generated for
    pub occurrence: NaiveDate,
    /// True when this generation ended the template's run
    pub deactivated: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateMaterializer {
    policy: GenerationPolicy,
}

impl TemplateMaterializer {
    pub fn new(policy: GenerationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    /// Calendar date of `now` in the policy timezone
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.policy.timezone.date_of(now)
    }

    pub fn is_due<T: Recurring>(&self, template: &T, now: DateTime<Utc>) -> bool {
        template.is_active() && template.next_due() <= self.today(now)
    }

    /// Produces one instance and the advanced template
    ///
    /// The template passed in is left untouched; the caller persists both
    /// returned values. Due-ness is not checked here, see
    /// [`generate_if_due`](Self::generate_if_due).
    ///
    /// # Errors
    ///
    /// * [`SchedulingError::InactiveTemplate`] if the template is paused or expired
    /// * [`SchedulingError::Recurrence`] if the next occurrence is not representable
    pub fn generate<T>(&self, template: &T, now: DateTime<Utc>) -> Result<Materialized<T, T::Instance>, SchedulingError>
    where
        T: Recurring + Clone,
    {
        if !template.is_active() {
            return Err(SchedulingError::InactiveTemplate);
        }

        let occurrence = template.next_due();
        let next_due = next_occurrence(occurrence, &template.recurrence_rule(), self.policy.recurrence)?;

        let instance = template.instantiate(occurrence, now);

        let mut updated = template.clone();
        updated.record_generation(next_due, now);

        let deactivated = self.policy.deactivate_past_end_date
            && template.end_date().is_some_and(|end| next_due > end);
        if deactivated {
            updated.deactivate(now);
        }

        Ok(Materialized {
            instance,
            template: updated,
            occurrence,
            deactivated,
        })
    }

    /// Like [`generate`](Self::generate), but returns `None` for templates that are not due
    pub fn generate_if_due<T>(
        &self,
        template: &T,
        now: DateTime<Utc>,
    ) -> Result<Option<Materialized<T, T::Instance>>, SchedulingError>
    where
        T: Recurring + Clone,
    {
        if self.is_due(template, now) {
            self.generate(template, now).map(Some)
        } else {
            Ok(None)
        }
    }
}
