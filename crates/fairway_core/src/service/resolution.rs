//! Course resolution engine.
//!
//! # Responsibility
//! - Map any equivalent input onto one canonical course record.
//! - Create a record only after every identity signal comes up empty.
//!
//! # Invariants
//! - Lookup order is fixed: external catalog identity, then proximity, then
//!   name/location fallback.
//! - A store failure during lookups aborts the call; it is never treated as
//!   "no match" (that would mint duplicates on timeouts).
//! - A uniqueness conflict on create triggers exactly one re-resolution, so
//!   the loser of a creation race converges on the winner's record.

use crate::matching::{is_duplicate, MatchCandidate, DUPLICATE_RADIUS_KM};
use crate::model::course::{Course, CourseValidationError, NewCourse};
use crate::repo::course_repo::{CourseStore, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Radius of the strict dedup scan during resolution.
pub const DEDUP_RADIUS_METERS: f64 = DUPLICATE_RADIUS_KM * 1000.0;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Resolution failure taxonomy.
#[derive(Debug)]
pub enum ResolveError {
    /// Input rejected before any store access.
    InvalidInput(CourseValidationError),
    /// Store lookup or write failed; the caller should retry the call.
    Unavailable(RepoError),
    /// Create lost a uniqueness race and the re-resolution found no winner.
    ConflictRetryExhausted,
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid resolution input: {err}"),
            Self::Unavailable(err) => write!(f, "course store unavailable: {err}"),
            Self::ConflictRetryExhausted => {
                write!(f, "creation conflict persisted after re-resolution")
            }
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Unavailable(err) => Some(err),
            Self::ConflictRetryExhausted => None,
        }
    }
}

impl From<CourseValidationError> for ResolveError {
    fn from(value: CourseValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// Idempotent create-or-find over an injected course store.
///
/// Holds no state beyond the store reference; each `resolve` call is an
/// independent request-scoped operation. Concurrency safety is delegated to
/// the store's uniqueness constraints plus the conflict retry below.
pub struct CourseResolver<'store, S: CourseStore> {
    store: &'store S,
}

impl<'store, S: CourseStore> CourseResolver<'store, S> {
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    /// Resolves `input` to its canonical course, creating one if absent.
    ///
    /// Calling this twice with equivalent input returns the same record;
    /// no duplicate is created on the second call.
    ///
    /// # Errors
    /// - `InvalidInput` before any store access.
    /// - `Unavailable` when the store fails during lookups or the write.
    /// - `ConflictRetryExhausted` when a lost creation race cannot be
    ///   re-resolved to the winning record.
    pub fn resolve(&self, input: &NewCourse) -> ResolveResult<Course> {
        input.validate()?;

        if let Some(existing) = self.lookup(input)? {
            return Ok(existing);
        }

        match self.store.create_course(input) {
            Ok(created) => {
                info!(
                    "event=course_created module=resolution status=ok course={} par={}",
                    created.id, created.par
                );
                Ok(created)
            }
            Err(RepoError::Conflict(message)) => {
                warn!(
                    "event=course_create_conflict module=resolution status=retry error={message}"
                );
                match self.lookup(input)? {
                    Some(winner) => Ok(winner),
                    None => Err(ResolveError::ConflictRetryExhausted),
                }
            }
            Err(err) => Err(ResolveError::Unavailable(err)),
        }
    }

    fn lookup(&self, input: &NewCourse) -> ResolveResult<Option<Course>> {
        // Strongest, unambiguous identity signal first. A hit is returned
        // unchanged; input fields never overwrite the stored record.
        if let Some(external) = input.external_ref() {
            let found = self
                .store
                .find_by_external_id(&external.external_id, &external.source)
                .map_err(ResolveError::Unavailable)?;
            if found.is_some() {
                return Ok(found);
            }
        }

        // Proximity scan. Candidates arrive nearest-first, so the first
        // duplicate hit is also the tie-break winner.
        if let Some(coordinates) = input.coordinates() {
            let candidate = MatchCandidate::new(&input.name, Some(coordinates));
            let nearby = self
                .store
                .find_within_radius(
                    coordinates.latitude,
                    coordinates.longitude,
                    DEDUP_RADIUS_METERS,
                )
                .map_err(ResolveError::Unavailable)?;

            for hit in nearby {
                if is_duplicate(&candidate, &MatchCandidate::from_course(&hit.course)) {
                    return Ok(Some(hit.course));
                }
            }
        }

        // Name/location net. Pairs where both sides carry coordinates were
        // already adjudicated by the proximity rule, so they are skipped
        // here; identical names kilometers apart stay distinct.
        let input_has_coordinates = input.coordinates().is_some();
        let by_name = self
            .store
            .find_by_name_or_location(&input.name, input.location.as_deref())
            .map_err(ResolveError::Unavailable)?;

        for existing in by_name {
            if input_has_coordinates && existing.coordinates.is_some() {
                continue;
            }
            return Ok(Some(existing));
        }

        Ok(None)
    }
}
