use fairway_core::db::migrations::latest_version;
use fairway_core::db::open_db_in_memory;
use fairway_core::{
    CourseListQuery, CourseRepository, CourseService, CourseStore, CourseUpdate, NewCourse,
    RepoError, SqliteCourseRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut input = NewCourse::new("Pebble Beach Golf Links");
    input.location = Some("Pebble Beach, CA".to_string());
    input.latitude = Some(36.5674);
    input.longitude = Some(-121.9500);
    input.par = Some(72);
    input.external_id = Some("pb-001".to_string());
    input.external_source = Some("golfapi".to_string());

    let created = repo.create_course(&input).unwrap();
    let loaded = repo.get_course(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.name, "Pebble Beach Golf Links");
    assert_eq!(loaded.location.as_deref(), Some("Pebble Beach, CA"));
    assert_eq!(loaded.par, 72);
    let coordinates = loaded.coordinates.unwrap();
    assert_eq!(coordinates.latitude, 36.5674);
    assert_eq!(coordinates.longitude, -121.9500);
    let external = loaded.external_ref.unwrap();
    assert_eq!(external.external_id, "pb-001");
    assert_eq!(external.source, "golfapi");
}

#[test]
fn create_defaults_par_to_72() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let created = repo.create_course(&NewCourse::new("Municipal Links")).unwrap();
    assert_eq!(created.par, 72);
}

#[test]
fn create_rejects_invalid_input_before_touching_the_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut input = NewCourse::new("Lopsided");
    input.latitude = Some(10.0);

    let err = repo.create_course(&input).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(count_courses(&conn), 0);
}

#[test]
fn duplicate_external_ref_maps_to_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut first = NewCourse::new("First Import");
    first.external_id = Some("ext-1".to_string());
    first.external_source = Some("golfapi".to_string());
    repo.create_course(&first).unwrap();

    let mut second = NewCourse::new("Second Import");
    second.external_id = Some("ext-1".to_string());
    second.external_source = Some("golfapi".to_string());

    let err = repo.create_course(&second).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)), "got {err}");
    assert_eq!(count_courses(&conn), 1);
}

#[test]
fn same_external_id_under_different_sources_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut first = NewCourse::new("From Catalog A");
    first.external_id = Some("42".to_string());
    first.external_source = Some("catalog-a".to_string());
    repo.create_course(&first).unwrap();

    let mut second = NewCourse::new("From Catalog B");
    second.external_id = Some("42".to_string());
    second.external_source = Some("catalog-b".to_string());
    repo.create_course(&second).unwrap();

    assert_eq!(count_courses(&conn), 2);
}

#[test]
fn find_by_external_id_returns_exact_pair() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut input = NewCourse::new("Old Course");
    input.external_id = Some("sta-1".to_string());
    input.external_source = Some("golfapi".to_string());
    let created = repo.create_course(&input).unwrap();

    let found = repo.find_by_external_id("sta-1", "golfapi").unwrap().unwrap();
    assert_eq!(found.id, created.id);

    assert!(repo.find_by_external_id("sta-1", "other").unwrap().is_none());
    assert!(repo.find_by_external_id("sta-2", "golfapi").unwrap().is_none());
}

#[test]
fn update_persists_edits_and_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut course = repo.create_course(&NewCourse::new("Draft Course")).unwrap();
    course.name = "Renamed Course".to_string();
    course.location = Some("Somewhere, WA".to_string());
    course.par = 70;
    repo.update_course(&course).unwrap();

    let loaded = repo.get_course(course.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Renamed Course");
    assert_eq!(loaded.location.as_deref(), Some("Somewhere, WA"));
    assert_eq!(loaded.par, 70);
    assert!(loaded.updated_at >= course.created_at);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let mut missing = repo.create_course(&NewCourse::new("Ephemeral")).unwrap();
    repo.delete_course(missing.id).unwrap();

    missing.name = "Still Missing".to_string();
    let err = repo.update_course(&missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));
}

#[test]
fn delete_removes_the_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let created = repo.create_course(&NewCourse::new("Short Lived")).unwrap();
    repo.delete_course(created.id).unwrap();

    assert!(repo.get_course(created.id).unwrap().is_none());
    let err = repo.delete_course(created.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == created.id));
}

#[test]
fn list_filters_by_owner_and_orders_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();

    let mut mine_b = NewCourse::new("Bravo Course");
    mine_b.owner_id = Some(owner);
    let mut mine_a = NewCourse::new("Alpha Course");
    mine_a.owner_id = Some(owner);
    let theirs = NewCourse::new("Imported Course");

    repo.create_course(&mine_b).unwrap();
    repo.create_course(&mine_a).unwrap();
    repo.create_course(&theirs).unwrap();

    let query = CourseListQuery {
        owner: Some(owner),
        ..CourseListQuery::default()
    };
    let mine = repo.list_courses(&query).unwrap();

    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].name, "Alpha Course");
    assert_eq!(mine[1].name, "Bravo Course");
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    for name in ["Charlie", "Alpha", "Bravo", "Delta"] {
        repo.create_course(&NewCourse::new(name)).unwrap();
    }

    let query = CourseListQuery {
        limit: Some(2),
        offset: 1,
        ..CourseListQuery::default()
    };
    let page = repo.list_courses(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name, "Bravo");
    assert_eq!(page[1].name, "Charlie");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteCourseRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_courses_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCourseRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("courses"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_courses_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE courses (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            location TEXT,
            latitude REAL,
            longitude REAL,
            par INTEGER NOT NULL DEFAULT 72,
            external_id TEXT,
            external_source TEXT
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCourseRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "courses",
            column: "owner_id"
        })
    ));
}

#[test]
fn service_update_requires_ownership() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    let service = CourseService::new(repo);
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let mut input = NewCourse::new("My Home Course");
    input.owner_id = Some(owner);
    let course = service.resolve_course(&input).unwrap();

    let update = CourseUpdate {
        par: Some(70),
        ..CourseUpdate::default()
    };

    let err = service
        .update_course(course.id, stranger, &update)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotOwner(id) if id == course.id));

    let updated = service.update_course(course.id, owner, &update).unwrap();
    assert_eq!(updated.par, 70);
    assert_eq!(service.get_course(course.id).unwrap().unwrap().par, 70);
}

#[test]
fn service_rejects_edits_on_unowned_imports() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    let service = CourseService::new(repo);

    let mut input = NewCourse::new("Imported Course");
    input.external_id = Some("imp-1".to_string());
    input.external_source = Some("golfapi".to_string());
    let course = service.resolve_course(&input).unwrap();

    let err = service
        .delete_course(course.id, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotOwner(id) if id == course.id));
}

#[test]
fn service_delete_requires_ownership_then_removes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    let service = CourseService::new(repo);
    let owner = Uuid::new_v4();

    let mut input = NewCourse::new("Disposable Course");
    input.owner_id = Some(owner);
    let course = service.resolve_course(&input).unwrap();

    service.delete_course(course.id, owner).unwrap();
    assert!(service.get_course(course.id).unwrap().is_none());
}

fn count_courses(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM courses;", [], |row| row.get(0))
        .unwrap()
}
