//! Data models shared by the extractors, the reconciler and the collaborators.

pub mod config;
pub mod record;
pub mod report;
