use progl_core::{
    benchmark_record, open_db_in_memory, reset_table, BenchConfig, BenchService, CycleKind,
    Database, Record, RecordRepository, RepoError, SqliteRecordRepository,
};

fn fresh_db() -> Database {
    let db = open_db_in_memory().unwrap();
    reset_table(db.conn().unwrap()).unwrap();
    db
}

#[test]
fn each_cycle_starts_empty_and_leaves_exactly_n_rows() {
    let db = fresh_db();
    let repo = SqliteRecordRepository::try_new(db.conn().unwrap()).unwrap();
    let bench = BenchService::new(&repo);

    bench.run_cycle(1_000, benchmark_record).unwrap();
    assert_eq!(repo.select_all().unwrap().len(), 1_000);

    bench.run_cycle(10_000, benchmark_record).unwrap();
    let records = repo.select_all().unwrap();
    assert_eq!(records.len(), 10_000);
    let max_id = records.iter().map(|record| record.id).max().unwrap();
    assert_eq!(max_id, 9_999);
}

#[test]
fn cycle_clears_leftover_seed_data() {
    let db = fresh_db();
    let repo = SqliteRecordRepository::try_new(db.conn().unwrap()).unwrap();
    repo.insert(&Record::new(50_000, "left", "over", "2000-01-01"))
        .unwrap();

    BenchService::new(&repo)
        .run_cycle(10, benchmark_record)
        .unwrap();

    let records = repo.select_all().unwrap();
    assert_eq!(records.len(), 10);
    assert!(records.iter().all(|record| record.id < 10));
}

#[test]
fn failed_insert_aborts_cycle_without_retry() {
    let db = fresh_db();
    let repo = SqliteRecordRepository::try_new(db.conn().unwrap()).unwrap();

    let mut calls = 0;
    let err = BenchService::new(&repo)
        .run_cycle(100, |index| {
            calls += 1;
            // ids collide from the sixth record on
            benchmark_record(index.min(5))
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::ConstraintViolation { .. }));
    assert_eq!(calls, 7);
    assert_eq!(repo.count().unwrap(), 6);
}

#[test]
fn run_reports_insert_cycles_in_order_then_delete() {
    let db = fresh_db();
    let repo = SqliteRecordRepository::try_new(db.conn().unwrap()).unwrap();
    let config = BenchConfig {
        scales: vec![10, 100, 1_000],
    };

    let report = BenchService::new(&repo).run(&config).unwrap();

    let inserted: Vec<u64> = report.inserts().map(|cycle| cycle.records).collect();
    assert_eq!(inserted, vec![10, 100, 1_000]);

    assert_eq!(report.cycles.len(), 4);
    let delete = report.delete().unwrap();
    assert_eq!(delete.kind, CycleKind::Delete);
    assert_eq!(delete.records, 1_000);
    assert_eq!(report.cycles.last(), Some(delete));

    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn timed_delete_all_counts_removed_rows() {
    let db = fresh_db();
    let repo = SqliteRecordRepository::try_new(db.conn().unwrap()).unwrap();
    let bench = BenchService::new(&repo);
    bench.run_cycle(250, benchmark_record).unwrap();

    let delete = bench.timed_delete_all().unwrap();

    assert_eq!(delete.records, 250);
    assert!(repo.select_all().unwrap().is_empty());
}
