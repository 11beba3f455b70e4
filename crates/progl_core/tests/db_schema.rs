use progl_core::db::schema::table_exists;
use progl_core::{
    open_db, open_db_in_memory, reset_table, ConnectionConfig, DbError, DbLocation, Record,
    RecordRepository, SqliteRecordRepository,
};
use rusqlite::Connection;

#[test]
fn reset_table_twice_leaves_empty_table() {
    let db = open_db_in_memory().unwrap();
    let conn = db.conn().unwrap();

    assert!(!table_exists(conn).unwrap());
    reset_table(conn).unwrap();
    {
        let repo = SqliteRecordRepository::try_new(conn).unwrap();
        repo.insert(&Record::new(1, "Kenneth E. Iverson", "APL", "1966-11-27"))
            .unwrap();
        assert_eq!(repo.count().unwrap(), 1);
    }

    reset_table(conn).unwrap();
    reset_table(conn).unwrap();

    assert!(table_exists(conn).unwrap());
    let repo = SqliteRecordRepository::try_new(conn).unwrap();
    assert_eq!(repo.count().unwrap(), 0);
    assert!(repo.select_all().unwrap().is_empty());
}

#[test]
fn reset_table_creates_expected_columns() {
    let db = open_db_in_memory().unwrap();
    let conn = db.conn().unwrap();
    reset_table(conn).unwrap();

    let columns = table_columns(conn);
    assert_eq!(
        columns,
        vec![
            ("id".to_string(), "INTEGER".to_string(), true, 1),
            ("conceptor".to_string(), "VARCHAR(300)".to_string(), false, 0),
            ("language".to_string(), "VARCHAR(50)".to_string(), false, 0),
            ("creationDate".to_string(), "DATE".to_string(), false, 0),
        ]
    );
}

#[test]
fn open_file_database_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("db").join("progl.sqlite3");

    let mut db = open_db(&ConnectionConfig::file(&path)).unwrap();
    assert!(path.exists());
    assert_eq!(db.location(), &DbLocation::File(path.clone()));
    db.close().unwrap();
}

#[test]
fn open_fails_with_io_error_when_parent_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let err = open_db(&ConnectionConfig::file(blocker.join("progl.sqlite3"))).unwrap_err();
    assert!(matches!(err, DbError::Io { .. }), "unexpected error: {err}");
}

#[test]
fn open_fails_with_connection_error_when_location_is_a_directory() {
    let dir = tempfile::tempdir().unwrap();

    let err = open_db(&ConnectionConfig::file(dir.path())).unwrap_err();
    assert!(
        matches!(err, DbError::Connection { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn close_is_idempotent_and_blocks_further_use() {
    let mut db = open_db_in_memory().unwrap();
    assert!(db.is_open());

    db.close().unwrap();
    db.close().unwrap();

    assert!(!db.is_open());
    assert!(matches!(db.conn().unwrap_err(), DbError::Closed));
}

#[test]
fn data_survives_reopen_of_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConnectionConfig::file(dir.path().join("progl.sqlite3"));

    {
        let mut db = open_db(&config).unwrap();
        let conn = db.conn().unwrap();
        reset_table(conn).unwrap();
        SqliteRecordRepository::try_new(conn)
            .unwrap()
            .insert(&Record::new(15, "James Gosling", "Java", "1995-05-23"))
            .unwrap();
        db.close().unwrap();
    }

    let db = open_db(&config).unwrap();
    let repo = SqliteRecordRepository::try_new(db.conn().unwrap()).unwrap();
    let records = repo.select_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].language.as_deref(), Some("Java"));
}

fn table_columns(conn: &Connection) -> Vec<(String, String, bool, i64)> {
    let mut stmt = conn.prepare("PRAGMA table_info(PROGL);").unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>("name")?,
                row.get::<_, String>("type")?,
                row.get::<_, i64>("notnull")? == 1,
                row.get::<_, i64>("pk")?,
            ))
        })
        .unwrap();
    rows.map(|row| row.unwrap()).collect()
}
