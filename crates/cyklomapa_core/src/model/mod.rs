//! Map data model.
//!
//! # Responsibility
//! - Define the record kinds persisted by core: statuses, layers, marker
//!   types, points of interest, corrections and static pages.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Repositories call `validate()` before any SQL mutation.

pub mod correction;
pub mod geometry;
pub mod layer;
pub mod marker;
pub mod page;
pub mod poi;
pub mod status;
pub mod validation;
