//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Run the explicit post-write steps (cache invalidation, logging).

pub mod correction_service;
pub mod map_service;
