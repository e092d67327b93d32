//! Infrastructure layer - storage backends, checklist sources and services

pub mod checklist;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
