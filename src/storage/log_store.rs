//! CSV log storage implementation
//!
//! This module provides the append-only, file-backed implementation of the
//! Storage trait. Each crawled root gets two files:
//!
//! - `<stem>-history.log` with columns `Timestamp, URL`
//! - `<stem>-emails.csv` with columns `Email, Link Text, Context, URL`
//!
//! where `<stem>` is the root URL without its scheme and with characters
//! that are illegal in file names replaced by `-`.

use crate::email::email_key;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::EmailRecord;
use chrono::Local;
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::io::Write;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const HISTORY_HEADER: [&str; 2] = ["Timestamp", "URL"];
const EMAIL_HEADER: [&str; 4] = ["Email", "Link Text", "Context", "URL"];

/// Append-only CSV storage backend
pub struct LogStore {
    history_path: PathBuf,
    emails_path: PathBuf,
    visited: HashSet<String>,
    known_emails: HashSet<String>,
}

impl LogStore {
    /// Opens (creating if needed) the logs for a root URL
    ///
    /// Missing logs are created with their header row. Existing rows are
    /// loaded into memory so already visited URLs and already recorded
    /// addresses are skipped by this run.
    ///
    /// # Arguments
    ///
    /// * `root_url` - The root URL of the crawl
    /// * `output_dir` - Directory holding the logs (created if missing)
    ///
    /// # Returns
    ///
    /// * `Ok(LogStore)` - Logs opened and loaded
    /// * `Err(StorageError)` - A log could not be created or read
    pub fn open(root_url: &str, output_dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(output_dir).map_err(|e| io_error(output_dir, e))?;

        let (history_path, emails_path) = log_paths(root_url, output_dir);

        ensure_log(&history_path, &HISTORY_HEADER)?;
        ensure_log(&emails_path, &EMAIL_HEADER)?;

        let visited = load_keys(&history_path, "URL")?;
        let known_emails = load_keys(&emails_path, "Email")?;

        tracing::debug!(
            "Loaded {} visited URLs from {} and {} emails from {}",
            visited.len(),
            history_path.display(),
            known_emails.len(),
            emails_path.display()
        );

        Ok(Self {
            history_path,
            emails_path,
            visited,
            known_emails,
        })
    }

    /// Opens the logs for a root URL only if a previous run left them behind
    ///
    /// Nothing is created: `Ok(None)` means neither log exists in
    /// `output_dir`. A log that is missing while its sibling exists is
    /// recreated with its header, as [`LogStore::open`] does.
    pub fn open_existing(root_url: &str, output_dir: &Path) -> StorageResult<Option<Self>> {
        let (history_path, emails_path) = log_paths(root_url, output_dir);
        if !history_path.exists() && !emails_path.exists() {
            return Ok(None);
        }

        Self::open(root_url, output_dir).map(Some)
    }

    /// Path of the visited-URL log
    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Path of the email log
    pub fn emails_path(&self) -> &Path {
        &self.emails_path
    }

    fn append_history(&self, row: &[&str]) -> StorageResult<()> {
        append_row(&self.history_path, row)
    }

    fn append_email(&self, row: &[&str]) -> StorageResult<()> {
        append_row(&self.emails_path, row)
    }
}

impl Storage for LogStore {
    fn record_visit(&mut self, url: &str) -> StorageResult<bool> {
        let key = url.to_lowercase();
        if self.visited.contains(&key) {
            return Ok(false);
        }

        let timestamp = Local::now().to_rfc3339();
        self.append_history(&[timestamp.as_str(), url])?;
        self.visited.insert(key);
        Ok(true)
    }

    fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&url.to_lowercase())
    }

    fn visited_count(&self) -> usize {
        self.visited.len()
    }

    fn record_email(&mut self, record: &EmailRecord) -> StorageResult<bool> {
        let key = email_key(&record.email);
        if self.known_emails.contains(&key) {
            return Ok(false);
        }

        self.append_email(&[
            record.email.as_str(),
            record.link_text.as_str(),
            record.context.as_str(),
            record.source_url.as_str(),
        ])?;
        self.known_emails.insert(key);
        Ok(true)
    }

    fn is_known_email(&self, email: &str) -> bool {
        self.known_emails.contains(&email_key(email))
    }

    fn known_email_count(&self) -> usize {
        self.known_emails.len()
    }

    fn email_count(&self) -> StorageResult<u64> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.emails_path)
            .map_err(|e| csv_error(&self.emails_path, e))?;

        let mut count = 0;
        for record in reader.records() {
            record.map_err(|e| csv_error(&self.emails_path, e))?;
            count += 1;
        }
        Ok(count)
    }
}

/// Derives the file-name stem for a root URL
///
/// # Examples
///
/// ```
/// use email_harvester::storage::log_file_stem;
///
/// assert_eq!(log_file_stem("https://example.com/contact/"), "example.com-contact-");
/// assert_eq!(log_file_stem("http://localhost:8080"), "localhost-8080");
/// ```
pub fn log_file_stem(root_url: &str) -> String {
    root_url
        .replace("http://", "")
        .replace("https://", "")
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '-',
            c if c == '\x7f' || c < '\x20' => '-',
            c => c,
        })
        .collect()
}

/// Returns the history and email log paths for a root URL
pub fn log_paths(root_url: &str, output_dir: &Path) -> (PathBuf, PathBuf) {
    let stem = log_file_stem(root_url);
    (
        output_dir.join(format!("{}-history.log", stem)),
        output_dir.join(format!("{}-emails.csv", stem)),
    )
}

/// Creates a log with its header row if it does not exist or is empty
fn ensure_log(path: &Path, header: &[&str]) -> StorageResult<()> {
    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(io_error(path, e)),
    };

    if needs_header {
        tracing::info!("Creating {}", path.display());
        let mut writer = Writer::from_path(path).map_err(|e| csv_error(path, e))?;
        writer
            .write_record(header)
            .map_err(|e| csv_error(path, e))?;
        writer.flush().map_err(|e| io_error(path, e))?;
    }

    Ok(())
}

/// Reads one column of a log into a set of lower-cased keys
fn load_keys(path: &Path, column: &str) -> StorageResult<HashSet<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let index = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| StorageError::MissingColumn {
            path: path.display().to_string(),
            column: column.to_string(),
        })?;

    let mut keys = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        if let Some(value) = record.get(index) {
            if !value.is_empty() {
                keys.insert(value.to_lowercase());
            }
        }
    }

    Ok(keys)
}

/// Appends one row to a log
///
/// The row is encoded in memory first and handed to the file in a single
/// write, so a failed append never leaves half a row behind. The file is
/// reopened for every row and a log that has become unwritable fails the
/// call that tried to write to it.
fn append_row(path: &Path, row: &[&str]) -> StorageResult<()> {
    let mut line = Vec::new();
    {
        let mut encoder = WriterBuilder::new().has_headers(false).from_writer(&mut line);
        encoder.write_record(row).map_err(|e| csv_error(path, e))?;
        encoder.flush().map_err(|e| io_error(path, e))?;
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    file.write_all(&line).map_err(|e| io_error(path, e))?;
    file.flush().map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StorageError {
    StorageError::Csv {
        path: path.display().to_string(),
        source,
    }
}
