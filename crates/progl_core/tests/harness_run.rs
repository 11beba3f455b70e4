use progl_core::db::schema::SchemaStep;
use progl_core::{
    open_db, reset_table, run_harness, BenchConfig, ConnectionConfig, CycleKind, DbError,
    HarnessConfig, HarnessError, HarnessState, RecordRepository, SqliteRecordRepository,
};

fn small_config(db: ConnectionConfig) -> HarnessConfig {
    HarnessConfig {
        db,
        bench: BenchConfig {
            scales: vec![5, 50],
        },
    }
}

#[test]
fn in_memory_run_walks_crud_and_benchmark_stages() {
    let report = run_harness(&small_config(ConnectionConfig::in_memory())).unwrap();

    assert_eq!(report.final_state, HarnessState::Closed);

    let stages: Vec<&str> = report
        .snapshots
        .iter()
        .map(|snapshot| snapshot.stage)
        .collect();
    assert_eq!(stages, vec!["after_seed", "after_update", "after_delete"]);

    let after_seed = &report.snapshots[0].records;
    assert_eq!(after_seed.len(), 16);
    let iverson = after_seed.iter().find(|record| record.id == 1).unwrap();
    assert_eq!(iverson.conceptor.as_deref(), Some("Kenneth E. Iverson"));

    let after_update = &report.snapshots[1].records;
    assert_eq!(after_update.len(), 16);
    let falkoff = after_update.iter().find(|record| record.id == 1).unwrap();
    assert_eq!(falkoff.conceptor.as_deref(), Some("Adin D. Falkoff"));
    assert_eq!(
        after_update
            .iter()
            .filter(|record| record.conceptor.as_deref() == Some("Adin D. Falkoff"))
            .count(),
        1
    );

    let after_delete = &report.snapshots[2].records;
    assert_eq!(after_delete.len(), 15);
    assert!(after_delete.iter().all(|record| record.id != 16));

    let kinds: Vec<(CycleKind, u64)> = report
        .bench
        .cycles
        .iter()
        .map(|cycle| (cycle.kind, cycle.records))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (CycleKind::Insert, 5),
            (CycleKind::Insert, 50),
            (CycleKind::Delete, 50),
        ]
    );
}

#[test]
fn file_run_resets_previous_contents_and_leaves_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let db_config = ConnectionConfig::file(dir.path().join("db").join("progl.sqlite3"));

    {
        let db = open_db(&db_config).unwrap();
        let conn = db.conn().unwrap();
        reset_table(conn).unwrap();
        conn.execute_batch("INSERT INTO PROGL (id, language) VALUES (999, 'Stale');")
            .unwrap();
    }

    let report = run_harness(&small_config(db_config.clone())).unwrap();
    assert!(report.snapshots[0]
        .records
        .iter()
        .all(|record| record.id != 999));

    let db = open_db(&db_config).unwrap();
    let repo = SqliteRecordRepository::try_new(db.conn().unwrap()).unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn unreachable_location_fails_with_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file in the way").unwrap();

    let err = run_harness(&small_config(ConnectionConfig::file(
        blocker.join("progl.sqlite3"),
    )))
    .unwrap_err();

    assert!(matches!(err, HarnessError::Connection(DbError::Io { .. })));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn schema_failure_mid_run_is_reported_and_releases_connection() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("progl.sqlite3");
    let db_config = ConnectionConfig::file(&db_path);

    {
        let db = open_db(&db_config).unwrap();
        db.conn()
            .unwrap()
            .execute_batch("CREATE VIEW PROGL AS SELECT 1 AS id;")
            .unwrap();
    }

    let err = run_harness(&small_config(db_config.clone())).unwrap_err();
    match &err {
        HarnessError::Schema(schema_err) => {
            assert!(matches!(schema_err.step, SchemaStep::DropTable));
        }
        other => panic!("expected schema error, got {other}"),
    }
    assert!(std::error::Error::source(&err).is_some());

    // SQLite removes the WAL file only when the last connection closes.
    let wal = dir.path().join("progl.sqlite3-wal");
    assert!(!wal.exists(), "connection still open: {}", wal.display());

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch("DROP VIEW PROGL;").unwrap();
    conn.close().unwrap();

    let report = run_harness(&small_config(db_config)).unwrap();
    assert_eq!(report.final_state, HarnessState::Closed);
}

#[test]
fn default_config_uses_default_scales() {
    let config = HarnessConfig::default();
    assert_eq!(config.bench.scales, vec![1_000, 10_000, 1_000_000]);
    assert_eq!(config.db, ConnectionConfig::default());
}
