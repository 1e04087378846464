//! Course store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the lookup/create contract consumed by the resolution engine.
//! - Provide owner-facing CRUD on top of the canonical `courses` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate model invariants before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `find_within_radius` hides its search strategy; callers only see
//!   nearest-first results within the radius.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::matching::geo::distance_km;
use crate::model::course::{
    Coordinates, Course, CourseId, CourseValidationError, ExternalRef, NewCourse,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const COURSE_SELECT_SQL: &str = "SELECT
    id,
    name,
    location,
    latitude,
    longitude,
    par,
    external_id,
    external_source,
    owner_id,
    created_at,
    updated_at
FROM courses";

// Kilometers per degree of latitude, rounded down so the bounding box never
// undershoots the requested radius.
const KM_PER_DEGREE: f64 = 111.0;

const REQUIRED_COURSE_COLUMNS: &[&str] = &[
    "id",
    "name",
    "location",
    "latitude",
    "longitude",
    "par",
    "external_id",
    "external_source",
    "owner_id",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for course persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CourseValidationError),
    Db(DbError),
    NotFound(CourseId),
    /// Caller is not the owner of the course it tried to modify.
    NotOwner(CourseId),
    /// A uniqueness constraint rejected the write (lost creation race).
    Conflict(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "course not found: {id}"),
            Self::NotOwner(id) => write!(f, "caller does not own course {id}"),
            Self::Conflict(message) => write!(f, "uniqueness conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted course data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CourseValidationError> for RepoError {
    fn from(value: CourseValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// A course found by a radius scan, with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyCourse {
    pub course: Course,
    pub distance_km: f64,
}

/// Query options for listing courses.
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub owner: Option<Uuid>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Store contract injected into the resolution engine.
///
/// Implementations decide how radius search is executed (native spatial
/// index, bounding box plus refine, in-memory scan); the engine only relies
/// on nearest-first ordering within the radius.
pub trait CourseStore {
    fn find_by_external_id(&self, external_id: &str, source: &str) -> RepoResult<Option<Course>>;
    fn find_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> RepoResult<Vec<NearbyCourse>>;
    fn find_by_name_or_location(
        &self,
        name: &str,
        location: Option<&str>,
    ) -> RepoResult<Vec<Course>>;
    fn create_course(&self, input: &NewCourse) -> RepoResult<Course>;
}

/// Full repository contract: the engine's store plus owner-facing CRUD.
pub trait CourseRepository: CourseStore {
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn list_courses(&self, query: &CourseListQuery) -> RepoResult<Vec<Course>>;
    fn update_course(&self, course: &Course) -> RepoResult<()>;
    fn delete_course(&self, id: CourseId) -> RepoResult<()>;
}

/// SQLite-backed course repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    /// Wraps a migrated connection after checking the schema it carries.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations never ran.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not carry what this repository needs.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version == 0 {
            return Err(RepoError::UninitializedConnection {
                expected_version: latest_version(),
                actual_version,
            });
        }

        if !table_exists(conn, "courses")? {
            return Err(RepoError::MissingRequiredTable("courses"));
        }

        let columns = table_columns(conn, "courses")?;
        for column in REQUIRED_COURSE_COLUMNS.iter().copied() {
            if !columns.iter().any(|present| present == column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: "courses",
                    column,
                });
            }
        }

        Ok(Self { conn })
    }
}

impl CourseStore for SqliteCourseRepository<'_> {
    fn find_by_external_id(&self, external_id: &str, source: &str) -> RepoResult<Option<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL}
             WHERE external_id = ?1 AND external_source = ?2;"
        ))?;

        let mut rows = stmt.query(params![external_id, source])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }

        Ok(None)
    }

    fn find_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> RepoResult<Vec<NearbyCourse>> {
        let radius_km = radius_meters / 1000.0;
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lng_delta = lat_delta / latitude.to_radians().cos().abs().max(0.01);

        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL}
             WHERE latitude BETWEEN ?1 AND ?2
               AND longitude BETWEEN ?3 AND ?4;"
        ))?;

        let mut rows = stmt.query(params![
            latitude - lat_delta,
            latitude + lat_delta,
            longitude - lng_delta,
            longitude + lng_delta,
        ])?;

        // The box prefilter overshoots at the corners; refine with the real
        // great-circle distance before ranking.
        let mut hits = Vec::new();
        while let Some(row) = rows.next()? {
            let course = parse_course_row(row)?;
            let Some(coordinates) = course.coordinates else {
                continue;
            };
            let dist = distance_km(
                latitude,
                longitude,
                coordinates.latitude,
                coordinates.longitude,
            );
            if dist <= radius_km {
                hits.push(NearbyCourse {
                    course,
                    distance_km: dist,
                });
            }
        }

        hits.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.course.id.cmp(&b.course.id))
        });

        Ok(hits)
    }

    fn find_by_name_or_location(
        &self,
        name: &str,
        location: Option<&str>,
    ) -> RepoResult<Vec<Course>> {
        let mut sql = format!(
            "{COURSE_SELECT_SQL}
             WHERE (name = ?1 COLLATE NOCASE OR instr(lower(name), lower(?1)) > 0)"
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(name.to_string())];

        if let Some(location) = location {
            sql.push_str(" AND location = ? COLLATE NOCASE");
            bind_values.push(Value::Text(location.to_string()));
        }

        sql.push_str(" ORDER BY created_at ASC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut courses = Vec::new();

        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }

        Ok(courses)
    }

    fn create_course(&self, input: &NewCourse) -> RepoResult<Course> {
        input.validate()?;

        let now = epoch_ms();
        let course = Course {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            location: input.location.clone(),
            coordinates: input.coordinates(),
            par: input.effective_par(),
            external_ref: input.external_ref(),
            owner_id: input.owner_id,
            created_at: now,
            updated_at: now,
        };

        self.conn
            .execute(
                "INSERT INTO courses (
                    id,
                    name,
                    location,
                    latitude,
                    longitude,
                    par,
                    external_id,
                    external_source,
                    owner_id,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    course.id.to_string(),
                    course.name.as_str(),
                    course.location.as_deref(),
                    course.coordinates.map(|c| c.latitude),
                    course.coordinates.map(|c| c.longitude),
                    course.par,
                    course.external_ref.as_ref().map(|r| r.external_id.as_str()),
                    course.external_ref.as_ref().map(|r| r.source.as_str()),
                    course.owner_id.map(|id| id.to_string()),
                    course.created_at,
                    course.updated_at,
                ],
            )
            .map_err(map_write_error)?;

        Ok(course)
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }

        Ok(None)
    }

    fn list_courses(&self, query: &CourseListQuery) -> RepoResult<Vec<Course>> {
        let mut sql = format!("{COURSE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = query.owner {
            sql.push_str(" AND owner_id = ?");
            bind_values.push(Value::Text(owner.to_string()));
        }

        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut courses = Vec::new();

        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }

        Ok(courses)
    }

    fn update_course(&self, course: &Course) -> RepoResult<()> {
        course.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE courses
                 SET
                    name = ?1,
                    location = ?2,
                    par = ?3,
                    updated_at = ?4
                 WHERE id = ?5;",
                params![
                    course.name.as_str(),
                    course.location.as_deref(),
                    course.par,
                    epoch_ms(),
                    course.id.to_string(),
                ],
            )
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound(course.id));
        }

        Ok(())
    }

    fn delete_course(&self, id: CourseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(ffi_err, message) = &err {
        if ffi_err.code == ErrorCode::ConstraintViolation {
            return RepoError::Conflict(
                message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            );
        }
    }

    RepoError::Db(DbError::Sqlite(err))
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in courses.id"))
    })?;

    let coordinates = match (
        row.get::<_, Option<f64>>("latitude")?,
        row.get::<_, Option<f64>>("longitude")?,
    ) {
        (None, None) => None,
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => {
            return Err(RepoError::InvalidData(format!(
                "course `{id}` has only one of latitude/longitude"
            )));
        }
    };

    let external_ref = match (
        row.get::<_, Option<String>>("external_id")?,
        row.get::<_, Option<String>>("external_source")?,
    ) {
        (None, None) => None,
        (Some(external_id), Some(source)) => Some(ExternalRef {
            external_id,
            source,
        }),
        _ => {
            return Err(RepoError::InvalidData(format!(
                "course `{id}` has only one of external_id/external_source"
            )));
        }
    };

    let owner_id = match row.get::<_, Option<String>>("owner_id")? {
        Some(value) => Some(Uuid::parse_str(&value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid uuid value `{value}` in courses.owner_id"
            ))
        })?),
        None => None,
    };

    let par_raw: i64 = row.get("par")?;
    let par = u32::try_from(par_raw).map_err(|_| {
        RepoError::InvalidData(format!("invalid par value `{par_raw}` in courses.par"))
    })?;

    let course = Course {
        id,
        name: row.get("name")?,
        location: row.get("location")?,
        coordinates,
        par,
        external_ref,
        owner_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    course.validate()?;
    Ok(course)
}

fn table_exists(conn: &Connection, table_name: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table_name: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table_name])?;
    let mut columns = Vec::new();

    while let Some(row) = rows.next()? {
        columns.push(row.get("name")?);
    }

    Ok(columns)
}

fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
