//! Append-only audit log writer
//!
//! Each entry is one JSON line, written with a single append. A trailing
//! line cut short by an interrupted write is skipped on read; a bad line
//! anywhere else is an error.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{WalletError, WalletResult};

use super::entry::AuditEntry;

/// Writes audit entries to a JSONL file
pub struct AuditLogger {
    log_path: PathBuf,
}

fn io_error<'a>(action: &'a str, path: &'a Path) -> impl FnOnce(io::Error) -> WalletError + 'a {
    move |e| WalletError::Io(format!("Failed to {} audit log {}: {}", action, path.display(), e))
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append an entry to the log
    pub fn log(&self, entry: &AuditEntry) -> WalletResult<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| WalletError::Json(format!("Failed to serialize audit entry: {}", e)))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(io_error("open", &self.log_path))?;
        file.write_all(line.as_bytes())
            .map_err(io_error("append to", &self.log_path))
    }

    /// Read all entries, oldest first
    pub fn read_all(&self) -> WalletResult<Vec<AuditEntry>> {
        let contents = match fs::read_to_string(&self.log_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("read", &self.log_path)(e)),
        };

        let complete = contents.ends_with('\n');
        let lines: Vec<&str> = contents.lines().collect();
        let mut entries = Vec::with_capacity(lines.len());

        for (line_num, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) if !complete && line_num + 1 == lines.len() => {
                    warn!(line = line_num + 1, error = %e, "skipping truncated audit entry");
                }
                Err(e) => {
                    return Err(WalletError::Json(format!(
                        "Failed to parse audit entry at line {}: {}",
                        line_num + 1,
                        e
                    )))
                }
            }
        }

        Ok(entries)
    }

    /// Read the most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> WalletResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    fn card_entry(i: usize) -> AuditEntry {
        AuditEntry::create(
            EntityType::Card,
            format!("card-{}", i),
            Some(format!("Card {}", i)),
            &json!({"name": format!("Card {}", i)}),
        )
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.log(&card_entry(0)).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Card);
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();
        for i in 0..10 {
            logger.log(&card_entry(i)).unwrap();
        }

        let recent = logger.read_recent(3).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["card-7", "card-8", "card-9"]);
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert!(logger.read_all().unwrap().is_empty());
        assert!(logger.read_recent(5).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_last_line_is_skipped() {
        let (logger, temp) = create_test_logger();
        logger.log(&card_entry(0)).unwrap();
        logger.log(&card_entry(1)).unwrap();

        let path = temp.path().join("audit.log");
        let mut contents = fs::read_to_string(&path).unwrap();
        contents.push_str("{\"timestamp\":\"2024-");
        fs::write(&path, contents).unwrap();

        assert_eq!(logger.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_line_in_the_middle_fails() {
        let (logger, temp) = create_test_logger();
        logger.log(&card_entry(0)).unwrap();

        let path = temp.path().join("audit.log");
        let mut contents = fs::read_to_string(&path).unwrap();
        contents.push_str("garbage\n");
        fs::write(&path, contents).unwrap();
        logger.log(&card_entry(1)).unwrap();

        assert!(matches!(logger.read_all(), Err(WalletError::Json(_))));
    }

    #[test]
    fn test_reopen_appends() {
        let (logger, temp) = create_test_logger();
        logger.log(&card_entry(0)).unwrap();

        let logger2 = AuditLogger::new(temp.path().join("audit.log"));
        logger2.log(&card_entry(1)).unwrap();
        assert_eq!(logger.read_all().unwrap().len(), 2);
    }
}
