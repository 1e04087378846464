//! Course use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for embedding callers (HTTP handlers,
//!   import jobs).
//! - Enforce owner-only mutation before delegating to the repository.

use crate::model::course::{Course, CourseId, NewCourse};
use crate::repo::course_repo::{
    CourseListQuery, CourseRepository, NearbyCourse, RepoError, RepoResult,
};
use crate::service::resolution::{CourseResolver, ResolveResult};
use uuid::Uuid;

/// Default radius for the nearby-courses read path.
pub const NEARBY_RADIUS_KM: f64 = 25.0;

/// Owner-editable course fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub par: Option<u32>,
}

/// Use-case service wrapper for course operations.
pub struct CourseService<R: CourseRepository> {
    repo: R,
}

impl<R: CourseRepository> CourseService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves an input to its canonical course, creating one if absent.
    pub fn resolve_course(&self, input: &NewCourse) -> ResolveResult<Course> {
        CourseResolver::new(&self.repo).resolve(input)
    }

    /// Gets one course by stable ID.
    pub fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        self.repo.get_course(id)
    }

    /// Lists courses using filter and pagination options.
    pub fn list_courses(&self, query: &CourseListQuery) -> RepoResult<Vec<Course>> {
        self.repo.list_courses(query)
    }

    /// Returns courses within `radius_km` of a point, nearest first.
    ///
    /// Kilometer-scale companion of the dedup scan; both reuse the same
    /// distance primitive with different thresholds.
    pub fn nearby_courses(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        limit: Option<usize>,
    ) -> RepoResult<Vec<NearbyCourse>> {
        let mut hits = self
            .repo
            .find_within_radius(latitude, longitude, radius_km * 1000.0)?;
        if let Some(limit) = limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }

    /// Applies owner edits to name/location/par.
    ///
    /// # Errors
    /// - `NotFound` when the course does not exist.
    /// - `NotOwner` when `editor` did not create the course (imported and
    ///   seeded courses have no owner and cannot be edited).
    pub fn update_course(
        &self,
        id: CourseId,
        editor: Uuid,
        update: &CourseUpdate,
    ) -> RepoResult<Course> {
        let mut course = self.repo.get_course(id)?.ok_or(RepoError::NotFound(id))?;
        if course.owner_id != Some(editor) {
            return Err(RepoError::NotOwner(id));
        }

        if let Some(name) = &update.name {
            course.name = name.clone();
        }
        if let Some(location) = &update.location {
            course.location = Some(location.clone());
        }
        if let Some(par) = update.par {
            course.par = par;
        }

        self.repo.update_course(&course)?;
        Ok(course)
    }

    /// Deletes an owner's course.
    ///
    /// Cascading round/score cleanup belongs to the surrounding application.
    pub fn delete_course(&self, id: CourseId, editor: Uuid) -> RepoResult<()> {
        let course = self.repo.get_course(id)?.ok_or(RepoError::NotFound(id))?;
        if course.owner_id != Some(editor) {
            return Err(RepoError::NotOwner(id));
        }

        self.repo.delete_course(id)
    }
}
