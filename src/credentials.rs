//! Local login table. Passwords are stored verbatim; a schema version change drops every user.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use tracing::{debug, info, warn};

pub const SCHEMA_VERSION: i32 = 1;

const CREATE_USERS: &str = "CREATE TABLE users (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL
)";

pub struct CredentialStore {
    conn: Connection,
}

impl CredentialStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open credential database {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .context("Failed to read schema version")?;
        match version {
            SCHEMA_VERSION => {}
            0 => {
                info!("Creating users table (schema v{})", SCHEMA_VERSION);
                conn.execute_batch(&format!(
                    "DROP TABLE IF EXISTS users; {CREATE_USERS}; PRAGMA user_version={SCHEMA_VERSION};"
                ))
                .context("Failed to create users table")?;
            }
            other => {
                warn!(
                    "Schema version {} differs from {}, recreating users table",
                    other, SCHEMA_VERSION
                );
                conn.execute_batch(&format!(
                    "BEGIN; DROP TABLE IF EXISTS users; {CREATE_USERS}; COMMIT; PRAGMA user_version={SCHEMA_VERSION};"
                ))
                .context("Failed to recreate users table")?;
            }
        }
        Ok(Self { conn })
    }

    pub fn register_user(&self, username: &str, password: &str) -> Result<bool> {
        if self.user_exists(username)? {
            debug!(username, "Registration rejected: username taken");
            return Ok(false);
        }
        match self.conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![username, password],
        ) {
            Ok(_) => {
                debug!(username, "Registered user");
                Ok(true)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                debug!(username, "Registration rejected by primary key");
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub fn user_exists(&self, username: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT username FROM users WHERE username = ?1",
                params![username],
                |_| Ok(()),
            )
            .optional()
            .context("Failed to look up user")?;
        Ok(found.is_some())
    }

    pub fn validate_user(&self, username: &str, password: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT username FROM users WHERE username = ?1 AND password = ?2",
                params![username, password],
                |_| Ok(()),
            )
            .optional()
            .context("Failed to validate user")?;
        debug!(username, valid = found.is_some(), "Validated credentials");
        Ok(found.is_some())
    }

    #[cfg(test)]
    fn stored_password(&self, username: &str) -> Option<String> {
        self.conn
            .query_row(
                "SELECT password FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()
            .expect("password query")
    }

    #[cfg(test)]
    fn row_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .expect("count query")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_keeps_first_password() {
        let store = CredentialStore::open_in_memory().unwrap();
        assert!(store.register_user("neo", "redpill").unwrap());
        assert!(!store.register_user("neo", "bluepill").unwrap());
        assert_eq!(store.row_count(), 1);
        assert_eq!(store.stored_password("neo").as_deref(), Some("redpill"));
    }

    #[test]
    fn validate_requires_exact_pair() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.register_user("trinity", "s3cret").unwrap();
        assert!(store.validate_user("trinity", "s3cret").unwrap());
        assert!(!store.validate_user("trinity", "s3creT").unwrap());
        assert!(!store.validate_user("trinity", "s3cre").unwrap());
        assert!(!store.validate_user("Trinity", "s3cret").unwrap());
        assert!(!store.validate_user("trinity ", "s3cret").unwrap());
        assert!(!store.validate_user("morpheus", "s3cret").unwrap());
    }

    #[test]
    fn exists_is_case_sensitive_and_untrimmed() {
        let store = CredentialStore::open_in_memory().unwrap();
        assert!(!store.user_exists("neo").unwrap());
        store.register_user("neo", "x").unwrap();
        assert!(store.user_exists("neo").unwrap());
        assert!(!store.user_exists("Neo").unwrap());
        assert!(!store.user_exists(" neo").unwrap());
        assert!(store.register_user("Neo", "y").unwrap());
    }

    #[test]
    fn empty_password_is_stored_verbatim() {
        let store = CredentialStore::open_in_memory().unwrap();
        assert!(store.register_user("smith", "").unwrap());
        assert!(store.validate_user("smith", "").unwrap());
        assert!(!store.validate_user("smith", " ").unwrap());
    }

    #[test]
    fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        {
            let store = CredentialStore::open(&path).unwrap();
            assert!(store.register_user("neo", "redpill").unwrap());
        }
        let store = CredentialStore::open(&path).unwrap();
        assert!(store.validate_user("neo", "redpill").unwrap());
        assert!(!store.register_user("neo", "other").unwrap());
    }

    #[test]
    fn version_change_drops_and_recreates_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        {
            let store = CredentialStore::open(&path).unwrap();
            store.register_user("neo", "redpill").unwrap();
        }
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA user_version=7;").unwrap();
        }
        let store = CredentialStore::open(&path).unwrap();
        assert!(!store.user_exists("neo").unwrap());
        assert_eq!(store.row_count(), 0);
        let version: i32 = store
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
