use fairway_core::db::migrations::{apply_migrations, latest_version};
use fairway_core::db::open_db_in_memory;
use fairway_core::{
    search_courses, CourseRepository, CourseStore, NewCourse, SearchError, SearchQuery,
    SqliteCourseRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;

#[test]
fn search_returns_created_course() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    let created = repo
        .create_course(&NewCourse::new("Whistling Straits"))
        .unwrap();

    let hits = search_courses(&conn, &SearchQuery::new("whistling")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].course_id, created.id);
    assert_eq!(hits[0].name, "Whistling Straits");
}

#[test]
fn search_matches_location_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut input = NewCourse::new("Pine Valley");
    input.location = Some("Clementon, NJ".to_string());
    let created = repo.create_course(&input).unwrap();

    let hits = search_courses(&conn, &SearchQuery::new("clementon")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].course_id, created.id);
}

#[test]
fn search_reflects_renames() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut course = repo.create_course(&NewCourse::new("Old Name Links")).unwrap();
    course.name = "Fresh Name Links".to_string();
    repo.update_course(&course).unwrap();

    let old_hits = search_courses(&conn, &SearchQuery::new("old")).unwrap();
    assert!(old_hits.is_empty());

    let new_hits = search_courses(&conn, &SearchQuery::new("fresh")).unwrap();
    assert_eq!(new_hits.len(), 1);
    assert_eq!(new_hits[0].course_id, course.id);
}

#[test]
fn search_excludes_deleted_courses() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let created = repo.create_course(&NewCourse::new("Vanishing Dunes")).unwrap();
    repo.delete_course(created.id).unwrap();

    let hits = search_courses(&conn, &SearchQuery::new("vanishing")).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn search_limit_is_applied() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let a = repo.create_course(&NewCourse::new("Shared Name Alpha")).unwrap();
    let b = repo.create_course(&NewCourse::new("Shared Name Bravo")).unwrap();
    let c = repo.create_course(&NewCourse::new("Shared Name Charlie")).unwrap();

    let mut query = SearchQuery::new("shared");
    query.limit = 2;
    let hits = search_courses(&conn, &query).unwrap();

    assert_eq!(hits.len(), 2);
    let ids: HashSet<_> = hits.into_iter().map(|hit| hit.course_id).collect();
    assert!(ids.is_subset(&HashSet::from([a.id, b.id, c.id])));
}

#[test]
fn blank_query_returns_empty_results() {
    let conn = open_db_in_memory().unwrap();
    let hits = search_courses(&conn, &SearchQuery::new("   ")).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn limit_zero_returns_empty_results() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    repo.create_course(&NewCourse::new("Limitless")).unwrap();

    let mut query = SearchQuery::new("limitless");
    query.limit = 0;

    let hits = search_courses(&conn, &query).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn escaped_query_text_does_not_fail_on_common_symbols() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    repo.create_course(&NewCourse::new("Colon Field")).unwrap();

    let hits = search_courses(&conn, &SearchQuery::new("a:b")).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn raw_fts_syntax_reports_invalid_query() {
    let conn = open_db_in_memory().unwrap();

    let mut query = SearchQuery::new("\"unterminated");
    query.raw_fts_syntax = true;

    let err = search_courses(&conn, &query).unwrap_err();
    assert!(matches!(err, SearchError::InvalidQuery { .. }));
}

#[test]
fn migration_backfill_indexes_existing_v1_courses() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO courses (id, name, location)
         VALUES ('11111111-2222-4333-8444-555555555555', 'Legacy Meadows', 'Omaha, NE');",
    )
    .unwrap();
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();

    apply_migrations(&mut conn).unwrap();
    let current_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(current_version, latest_version());

    let hits = search_courses(&conn, &SearchQuery::new("legacy")).unwrap();
    assert_eq!(hits.len(), 1);
}
