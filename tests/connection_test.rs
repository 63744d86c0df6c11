//! Tests for the connection provider and its configuration
//! Run with: cargo test --test connection_test

use lms_db::{ConnectionProvider, Database, DbConfig, ErrorKind};
use std::panic::{self, AssertUnwindSafe};
use tempfile::TempDir;

mod provider_tests {
    use super::*;

    #[test]
    fn test_opens_lazily() {
        let provider = ConnectionProvider::new(DbConfig::in_memory());
        assert!(!provider.is_open());

        provider.connection().unwrap();
        assert!(provider.is_open());
    }

    #[test]
    fn test_bundled_sqlite_version() {
        assert!(lms_db::sqlite_version().starts_with("3."));
    }

    #[test]
    fn test_reuses_one_connection() {
        // Each in-memory connection is its own database, so the table only
        // survives between calls if they share the connection
        let db = Database::with_config(DbConfig::in_memory());
        db.with_update("CREATE TABLE branches (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        db.with_update_params("INSERT INTO branches (name) VALUES (?)", |b| {
            b.bind_text("Central")?;
            Ok(())
        })
        .unwrap();

        let names = db
            .with_query("SELECT name FROM branches", |row| row.get_string("name"))
            .unwrap();
        assert_eq!(names, vec!["Central".to_string()]);
    }

    #[test]
    fn test_panicking_mapper_leaves_connection_usable() {
        let db = Database::with_config(DbConfig::in_memory());
        db.exec_batch(
            "CREATE TABLE branches (id INTEGER PRIMARY KEY);
             INSERT INTO branches (id) VALUES (1), (2);",
        )
        .unwrap();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            db.with_query("SELECT id FROM branches", |_| -> lms_db::Result<i32> {
                panic!("mapper bug")
            })
        }));
        assert!(outcome.is_err());

        let ids = db
            .with_query("SELECT id FROM branches ORDER BY id", |row| row.get_int("id"))
            .unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert!(!db.provider().connection().unwrap().is_busy());
    }

    #[test]
    fn test_open_failure_is_connection_error() {
        let db = Database::with_config(DbConfig::file("/nonexistent-lms-dir/nested/lms.db"));
        let err = db
            .with_query("SELECT 1 AS one", |row| row.get_int("one"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(!db.provider().is_open());
    }

    #[test]
    fn test_file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lms.db");

        {
            let db = Database::with_config(DbConfig::file(&path));
            db.exec_batch(
                "CREATE TABLE borrowers (card_no INTEGER PRIMARY KEY, name TEXT NOT NULL);
                 INSERT INTO borrowers (card_no, name) VALUES (7, 'Ada');",
            )
            .unwrap();
        }

        let db = Database::with_config(DbConfig::file(&path));
        let name = db
            .with_query_one_params(
                "SELECT name FROM borrowers WHERE card_no = ?",
                |row| row.get_string("name"),
                |b| {
                    b.bind_int(7)?;
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(name, Some("Ada".to_string()));
    }

    #[test]
    fn test_applies_pragmas() {
        let dir = TempDir::new().unwrap();
        let config = DbConfig {
            journal_mode: Some("WAL".to_string()),
            ..DbConfig::file(dir.path().join("wal.db"))
        };
        let db = Database::with_config(config);

        let mode = db
            .with_query_one("PRAGMA journal_mode", |row| row.get_string("journal_mode"))
            .unwrap();
        assert_eq!(mode.as_deref(), Some("wal"));

        let foreign_keys = db
            .with_query_one("PRAGMA foreign_keys", |row| row.get_int("foreign_keys"))
            .unwrap();
        assert_eq!(foreign_keys, Some(1));
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::with_config(DbConfig::in_memory());
        db.exec_batch(
            "CREATE TABLE branches (id INTEGER PRIMARY KEY);
             CREATE TABLE book_copies (
                 book_id INTEGER NOT NULL,
                 branch_id INTEGER NOT NULL REFERENCES branches(id)
             );",
        )
        .unwrap();

        let err = db
            .with_update_params(
                "INSERT INTO book_copies (book_id, branch_id) VALUES (?, ?)",
                |b| {
                    b.bind_int(1)?.bind_int(99)?;
                    Ok(())
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
    }

    #[test]
    fn test_invalid_journal_mode_rejected() {
        let config = DbConfig {
            journal_mode: Some("WAL; DROP TABLE x".to_string()),
            ..DbConfig::in_memory()
        };
        let err = ConnectionProvider::new(config).connection().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_from_url_variants() {
        assert_eq!(DbConfig::from_url("sqlite::memory:").unwrap().path, ":memory:");
        assert!(DbConfig::from_url("sqlite::memory:").unwrap().is_memory());
        assert_eq!(DbConfig::from_url("sqlite://data/lms.db").unwrap().path, "data/lms.db");
        assert_eq!(DbConfig::from_url("sqlite:lms.db").unwrap().path, "lms.db");
        assert_eq!(
            DbConfig::from_url("sqlite:///var/lib/lms.db").unwrap().path,
            "/var/lib/lms.db"
        );
    }

    #[test]
    fn test_from_url_rejects_other_schemes() {
        let err = DbConfig::from_url("mysql://localhost/library").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(DbConfig::from_url("sqlite:").is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = DbConfig::from_json(r#"{ "path": "lms.db", "journal_mode": "WAL" }"#).unwrap();
        assert_eq!(
            config,
            DbConfig {
                path: "lms.db".to_string(),
                foreign_keys: true,
                journal_mode: Some("WAL".to_string()),
                busy_timeout_ms: 5000,
            }
        );
    }

    #[test]
    fn test_from_json_invalid() {
        let err = DbConfig::from_json(r#"{ "busy_timeout_ms": "soon" }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}
