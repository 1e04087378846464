//! Course domain model.
//!
//! # Responsibility
//! - Define the canonical record every equivalent input must resolve to.
//! - Validate resolution inputs before any store access.
//!
//! # Invariants
//! - `id` is stable and never reused for another course.
//! - `coordinates` carries both latitude and longitude or is absent.
//! - `external_ref` pairs an id with its source catalog; the pair is unique
//!   across the store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a canonical course record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CourseId = Uuid;

/// Par assigned when the caller does not supply one.
pub const DEFAULT_PAR: u32 = 72;

/// Geographic point in decimal degrees.
///
/// Existence of this value implies both components are present; partial
/// coordinates are rejected at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Identity of a record in a third-party course catalog.
///
/// At most one local course may carry a given `(external_id, source)` pair;
/// the store enforces this with a unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    pub external_id: String,
    pub source: String,
}

/// Canonical course record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Stable global ID used for linking rounds and scores.
    pub id: CourseId,
    /// Display name, user- or provider-supplied.
    pub name: String,
    /// Optional free-text locality (city/region).
    pub location: Option<String>,
    /// Optional geographic position used for proximity matching.
    pub coordinates: Option<Coordinates>,
    /// Course par, defaulted to 72 at creation.
    pub par: u32,
    /// Origin in a third-party catalog, when imported.
    pub external_ref: Option<ExternalRef>,
    /// Creating user for manually-added courses; absent for imports.
    pub owner_id: Option<Uuid>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Course {
    /// Checks record invariants, used on writes and on rows read back.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        if self.name.trim().is_empty() {
            return Err(CourseValidationError::MissingName);
        }
        if self.par == 0 {
            return Err(CourseValidationError::InvalidPar);
        }
        if let Some(Coordinates {
            latitude,
            longitude,
        }) = self.coordinates
        {
            if !latitude.is_finite() || !longitude.is_finite() {
                return Err(CourseValidationError::NonFiniteCoordinate {
                    latitude,
                    longitude,
                });
            }
            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                return Err(CourseValidationError::CoordinateOutOfRange {
                    latitude,
                    longitude,
                });
            }
        }
        Ok(())
    }
}

/// Input to course resolution.
///
/// Mirrors what an import or manual-add handler can supply; everything
/// beyond `name` is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub location: Option<String>,
    pub par: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub external_id: Option<String>,
    pub external_source: Option<String>,
    pub owner_id: Option<Uuid>,
}

/// Validation failure for resolution input.
///
/// All variants are rejected before any store access.
#[derive(Debug, Clone, PartialEq)]
pub enum CourseValidationError {
    /// `name` is empty or whitespace-only.
    MissingName,
    /// Exactly one of latitude/longitude was supplied.
    PartialCoordinates,
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate { latitude: f64, longitude: f64 },
    /// A coordinate is outside [-90, 90] / [-180, 180].
    CoordinateOutOfRange { latitude: f64, longitude: f64 },
    /// Exactly one of external_id/external_source was supplied.
    PartialExternalRef,
    /// Supplied par is zero.
    InvalidPar,
}

impl Display for CourseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "course name is required"),
            Self::PartialCoordinates => {
                write!(f, "latitude and longitude must be supplied together")
            }
            Self::NonFiniteCoordinate {
                latitude,
                longitude,
            } => write!(f, "non-finite coordinates ({latitude}, {longitude})"),
            Self::CoordinateOutOfRange {
                latitude,
                longitude,
            } => write!(f, "coordinates out of range ({latitude}, {longitude})"),
            Self::PartialExternalRef => {
                write!(f, "external id and external source must be supplied together")
            }
            Self::InvalidPar => write!(f, "par must be at least 1"),
        }
    }
}

impl Error for CourseValidationError {}

impl NewCourse {
    /// Creates an input carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks all input invariants.
    ///
    /// # Errors
    /// - `MissingName` for blank names.
    /// - `PartialCoordinates` / `NonFiniteCoordinate` / `CoordinateOutOfRange`
    ///   for broken positions.
    /// - `PartialExternalRef` when only half of the catalog identity is given.
    /// - `InvalidPar` when `par == Some(0)`.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        if self.name.trim().is_empty() {
            return Err(CourseValidationError::MissingName);
        }

        match (self.latitude, self.longitude) {
            (None, None) => {}
            (Some(latitude), Some(longitude)) => {
                if !latitude.is_finite() || !longitude.is_finite() {
                    return Err(CourseValidationError::NonFiniteCoordinate {
                        latitude,
                        longitude,
                    });
                }
                if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                    return Err(CourseValidationError::CoordinateOutOfRange {
                        latitude,
                        longitude,
                    });
                }
            }
            _ => return Err(CourseValidationError::PartialCoordinates),
        }

        if self.external_id.is_some() != self.external_source.is_some() {
            return Err(CourseValidationError::PartialExternalRef);
        }

        if self.par == Some(0) {
            return Err(CourseValidationError::InvalidPar);
        }

        Ok(())
    }

    /// Returns the position when both components are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Returns the catalog identity when both components are present.
    pub fn external_ref(&self) -> Option<ExternalRef> {
        match (&self.external_id, &self.external_source) {
            (Some(external_id), Some(source)) => Some(ExternalRef {
                external_id: external_id.clone(),
                source: source.clone(),
            }),
            _ => None,
        }
    }

    /// Par to persist: the supplied value or the 72 default.
    pub fn effective_par(&self) -> u32 {
        self.par.unwrap_or(DEFAULT_PAR)
    }
}
