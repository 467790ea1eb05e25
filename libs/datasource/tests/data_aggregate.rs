use datasource::{Data, DataError, DbEngine, RepoError, StoreHealth};
use runtime::{BusConfig, CacheConfig, DataConfig, DocumentConfig, RelationalConfig};
use sea_orm::ConnectionTrait;

fn sqlite_memory() -> RelationalConfig {
    RelationalConfig {
        driver: "sqlite".into(),
        source: "sqlite::memory:".into(),
        max_conns: Some(4),
        auto_migrate: false,
    }
}

#[tokio::test]
async fn empty_config_yields_no_handles() {
    let tmp = tempfile::tempdir().unwrap();
    let data = Data::connect(&DataConfig::default(), tmp.path()).await.unwrap();

    assert!(data.relational().is_none());
    assert!(data.document().is_none());
    assert!(data.cache().is_none());
    assert!(data.bus().is_none());
    assert!(data.jetstream().is_none());

    let report = data.health().await;
    assert!(report.is_healthy());
    assert!(report.stores.values().all(|s| *s == StoreHealth::Absent));

    data.shutdown().await;
}

#[tokio::test]
async fn sqlite_memory_store_is_connected_and_healthy() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = DataConfig {
        relational: Some(sqlite_memory()),
        ..DataConfig::default()
    };
    let data = Data::connect(&cfg, tmp.path()).await.unwrap();

    let db = data.relational().expect("relational handle");
    assert_eq!(db.engine(), DbEngine::Sqlite);

    let report = data.health().await;
    assert_eq!(report.stores["relational"], StoreHealth::Up);
    assert_eq!(report.stores["cache"], StoreHealth::Absent);
    assert!(report.is_healthy());

    data.shutdown_relational().await;
    // second invocation finds the hook already taken
    data.shutdown_relational().await;

    let report = data.health().await;
    assert!(matches!(report.stores["relational"], StoreHealth::Down { .. }));
    assert!(!report.is_healthy());
}

#[tokio::test]
async fn sqlite_file_is_created_under_home_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = DataConfig {
        relational: Some(RelationalConfig {
            driver: "sqlite".into(),
            source: "sqlite://db/layout.db?mode=rwc".into(),
            max_conns: Some(2),
            auto_migrate: false,
        }),
        ..DataConfig::default()
    };
    let data = Data::connect(&cfg, tmp.path()).await.unwrap();
    assert!(tmp.path().join("db/layout.db").exists());
    data.shutdown().await;
}

#[tokio::test]
async fn missing_required_settings_fail_before_connecting() {
    let tmp = tempfile::tempdir().unwrap();

    let cases: Vec<(DataConfig, &str)> = vec![
        (
            DataConfig {
                relational: Some(RelationalConfig {
                    source: "sqlite::memory:".into(),
                    ..RelationalConfig::default()
                }),
                ..DataConfig::default()
            },
            "data.relational.driver",
        ),
        (
            DataConfig {
                relational: Some(RelationalConfig {
                    driver: "sqlite".into(),
                    ..RelationalConfig::default()
                }),
                ..DataConfig::default()
            },
            "data.relational.source",
        ),
        (
            DataConfig {
                document: Some(DocumentConfig::default()),
                ..DataConfig::default()
            },
            "data.document.database",
        ),
        (
            DataConfig {
                cache: Some(CacheConfig::default()),
                ..DataConfig::default()
            },
            "data.cache.addr",
        ),
        (
            DataConfig {
                bus: Some(BusConfig::default()),
                ..DataConfig::default()
            },
            "data.bus.addr",
        ),
    ];

    for (cfg, expected) in cases {
        match Data::connect(&cfg, tmp.path()).await {
            Err(DataError::MissingSetting(key)) => assert_eq!(key, expected),
            Err(other) => panic!("{expected}: unexpected error {other}"),
            Ok(_) => panic!("{expected}: connect should fail"),
        }
    }
}

#[tokio::test]
async fn later_failure_closes_earlier_stores() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = DataConfig {
        relational: Some(sqlite_memory()),
        cache: Some(CacheConfig::default()),
        ..DataConfig::default()
    };
    let err = Data::connect(&cfg, tmp.path()).await.err().unwrap();
    assert!(matches!(err, DataError::MissingSetting("data.cache.addr")));
}

#[tokio::test]
async fn driver_must_match_source() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = DataConfig {
        relational: Some(RelationalConfig {
            driver: "postgres".into(),
            source: "sqlite::memory:".into(),
            ..RelationalConfig::default()
        }),
        ..DataConfig::default()
    };
    let err = Data::connect(&cfg, tmp.path()).await.err().unwrap();
    assert!(matches!(
        err,
        DataError::InvalidSetting {
            key: "data.relational.driver",
            ..
        }
    ));
}

#[tokio::test]
async fn unique_violation_is_recognised() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = DataConfig {
        relational: Some(sqlite_memory()),
        ..DataConfig::default()
    };
    let data = Data::connect(&cfg, tmp.path()).await.unwrap();
    let db = data.relational().unwrap().sea();

    db.execute_unprepared("CREATE TABLE t (email TEXT NOT NULL UNIQUE)")
        .await
        .unwrap();
    db.execute_unprepared("INSERT INTO t (email) VALUES ('a@x.com')")
        .await
        .unwrap();
    let err = db
        .execute_unprepared("INSERT INTO t (email) VALUES ('a@x.com')")
        .await
        .unwrap_err();

    assert!(RepoError::from(err).is_unique_violation());
    data.shutdown().await;
}
