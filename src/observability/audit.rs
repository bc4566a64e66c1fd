//! Append-only security event log.
//!
//! # Responsibilities
//! - Record blocked IPs, suspicious detections and form submissions
//! - Rotate the file by size, keeping a fixed number of backups
//!
//! # Design Decisions
//! - Plain text, one timestamped line per event; the only durable artifact
//!   this service produces
//! - Writes happen under a mutex; a failed write is logged and swallowed,
//!   the request pipeline never fails on audit I/O

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;

struct AuditInner {
    file: File,
    size: u64,
}

/// Size-rotated append log for security-relevant events.
pub struct SecurityLog {
    inner: Mutex<AuditInner>,
    path: PathBuf,
    max_size: u64,
    max_backups: usize,
}

impl SecurityLog {
    pub fn open(path: PathBuf, max_size: u64, max_backups: usize) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            inner: Mutex::new(AuditInner { file, size }),
            path,
            max_size,
            max_backups,
        })
    }

    /// Append one event line, rotating first if the file is full.
    pub fn log(&self, event: &str, detail: &str) {
        let line = format!("{} - {} - {}\n", Utc::now().to_rfc3339(), event, detail);

        let mut inner = self.inner.lock().expect("audit log mutex poisoned");
        if inner.size + line.len() as u64 > self.max_size {
            if let Err(e) = self.rotate(&mut inner) {
                tracing::error!(error = %e, "audit log rotation failed");
            }
        }
        match inner.file.write_all(line.as_bytes()) {
            Ok(()) => inner.size += line.len() as u64,
            Err(e) => tracing::error!(error = %e, "audit log write failed"),
        }
    }

    /// Shift `log.N` backups up by one and reopen a fresh file.
    fn rotate(&self, inner: &mut AuditInner) -> std::io::Result<()> {
        inner.file.flush()?;

        for n in (1..self.max_backups).rev() {
            let from = self.backup_path(n);
            if from.exists() {
                std::fs::rename(&from, self.backup_path(n + 1))?;
            }
        }
        if self.max_backups > 0 {
            std::fs::rename(&self.path, self.backup_path(1))?;
        } else {
            std::fs::remove_file(&self.path)?;
        }

        inner.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        inner.size = 0;
        Ok(())
    }

    fn backup_path(&self, n: usize) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(format!(".{n}"));
        PathBuf::from(os)
    }
}
