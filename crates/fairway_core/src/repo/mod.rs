//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract the resolution engine is injected with.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce model validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod course_repo;
