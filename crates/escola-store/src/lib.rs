// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Client-side key-value persistence: form drafts under `form_<id>` and
//! the theme preference under `theme`, the state the web page kept in
//! browser storage.

use anyhow::{Context, Result, anyhow, bail};
use escola_app::Theme;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const APP_NAME: &str = "escola";

const THEME_KEY: &str = "theme";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS client_state (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn bootstrap(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA).context("create schema")
    }

    /// Stores one form's field map as a JSON object under `form_<id>`.
    /// Overwrites any previous snapshot; snapshots are never expired.
    pub fn save_form(&self, form_id: &str, fields: &BTreeMap<String, String>) -> Result<()> {
        if form_id.trim().is_empty() {
            bail!("form id must not be empty");
        }
        let encoded = serde_json::to_string(fields)
            .with_context(|| format!("encode snapshot for form {form_id}"))?;
        self.put_raw(&form_key(form_id), &encoded)
    }

    /// Reads a form snapshot. Absent and unparseable snapshots both read
    /// as `None`; a corrupted value is treated like a missing one.
    pub fn load_form(&self, form_id: &str) -> Result<Option<BTreeMap<String, String>>> {
        let Some(raw) = self.get_raw(&form_key(form_id))? else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    /// Missing or unrecognized stored values read as the light theme.
    pub fn get_theme(&self) -> Result<Theme> {
        let raw = self.get_raw(THEME_KEY)?;
        Ok(raw
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or(Theme::Light))
    }

    pub fn put_theme(&self, theme: Theme) -> Result<()> {
        self.put_raw(THEME_KEY, theme.as_str())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM client_state WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read client state {key}"))
    }

    fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO client_state (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert client state {key}"))?;
        Ok(())
    }
}

fn form_key(form_id: &str) -> String {
    format!("form_{form_id}")
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("ESCOLA_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set ESCOLA_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("escola.db"))
}

/// Directory CSV exports and print views are written into.
pub fn export_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set XDG_DATA_HOME or platform equivalent")
    })?;
    let dir = data_root.join(APP_NAME).join("exports");
    fs::create_dir_all(&dir)
        .with_context(|| format!("create export directory {}", dir.display()))?;
    Ok(dir)
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

#[cfg(test)]
mod tests {
    use super::validate_db_path;

    #[test]
    fn memory_path_is_accepted() {
        assert!(validate_db_path(":memory:").is_ok());
    }

    #[test]
    fn uri_style_paths_are_rejected() {
        assert!(validate_db_path("https://evil.example/escola.db").is_err());
        assert!(validate_db_path("file:escola.db").is_err());
        assert!(validate_db_path("/tmp/escola.db?mode=ro").is_err());
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(validate_db_path("").is_err());
    }
}
