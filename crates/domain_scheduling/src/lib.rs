//! Scheduling Domain
//!
//! Turns due recurring templates into concrete records.
//!
//! - [`TemplateMaterializer`] decides whether a template is due and produces
//!   one instance plus the advanced template. It is pure and never reads the
//!   clock.
//! - [`GenerationService`] runs a sweep over every stored template through the
//!   [`RecurringTaskPort`] and [`InvoiceTemplatePort`] ports and reports what
//!   happened.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = Arc::new(InMemoryScheduleStore::new());
//! let service = GenerationService::new(
//!     Arc::new(SystemClock),
//!     store.clone(),
//!     store.clone(),
//!     GenerationPolicy::default(),
//!     InvoiceNumberSequence::default(),
//! );
//! let report = service.run_sweep().await?;
//! ```

pub mod materializer;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod error;

pub use materializer::{GenerationPolicy, Materialized, TemplateMaterializer};
pub use ports::{InvoiceTemplatePort, RecurringTaskPort};
pub use adapters::InMemoryScheduleStore;
pub use service::{
    GeneratedRecord, GenerationService, SkipReason, SkippedTemplate, SweepFailure, SweepReport,
    TemplateKind,
};
pub use error::SchedulingError;
