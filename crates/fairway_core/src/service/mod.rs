//! Use-case services on top of the repository layer.
//!
//! # Responsibility
//! - Orchestrate course resolution (lookup-before-create, conflict retry).
//! - Provide owner-scoped CRUD and the nearby-courses read path.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

pub mod course_service;
pub mod resolution;
