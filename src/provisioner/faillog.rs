//! Append-only log of rejected launch attempts.
//!
//! One line per rejection:
//! `{rfc3339 timestamp}---{availability domain}---{kind}---{message}`

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Appends rejection lines to a file so a long-running grab session
/// leaves a trail the operator can inspect later.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one rejection. The file is opened per write; a grab session
    /// writes a line every few seconds at most.
    pub fn append(&self, availability_domain: &str, kind: &str, message: &str) -> Result<()> {
        let line = format!(
            "{}---{}---{}---{}",
            chrono::Utc::now().to_rfc3339(),
            availability_domain,
            kind,
            message
        );
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
