//! Domain model for the course catalog.
//!
//! # Responsibility
//! - Define the canonical `Course` record and the resolution input shape.
//! - Validate inputs before any persistence access.
//!
//! # Invariants
//! - Every course is identified by a stable `CourseId`.
//! - Latitude and longitude are carried together or not at all.

pub mod course;
