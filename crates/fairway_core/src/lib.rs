//! Core domain logic for the Fairway round-tracking backend.
//! This crate is the single source of truth for course identity: every
//! equivalent course input must resolve to one canonical record.

pub mod db;
pub mod logging;
pub mod matching;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use matching::geo::distance_km;
pub use matching::name::normalize_name;
pub use matching::{is_duplicate, MatchCandidate, DUPLICATE_RADIUS_KM};
pub use model::course::{
    Coordinates, Course, CourseId, CourseValidationError, ExternalRef, NewCourse, DEFAULT_PAR,
};
pub use repo::course_repo::{
    CourseListQuery, CourseRepository, CourseStore, NearbyCourse, RepoError, RepoResult,
    SqliteCourseRepository,
};
pub use search::fts::{search_courses, SearchError, SearchHit, SearchQuery, SearchResult};
pub use service::course_service::{CourseService, CourseUpdate, NEARBY_RADIUS_KM};
pub use service::resolution::{
    CourseResolver, ResolveError, ResolveResult, DEDUP_RADIUS_METERS,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
