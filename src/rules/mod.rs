//! Rules module - Auditors, the audit engine and its results

pub mod catalog;
pub mod categories;
pub mod engine;
pub mod results;

pub use engine::{Auditable, AuditEngine, RuleSet};
pub use results::{Finding, Report, Severity};
