//! Shared logging setup for fieldscan binaries.
//!
//! Two `fmt` layers are installed: a size-rotated log file under
//! `~/.fieldscan/logs` and stderr. The file layer always receives the full
//! filter; the console layer can be quieted for batch runs.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "fieldscan=info,fieldscan_inference=info";
const QUIET_CONSOLE_FILTER: &str = "fieldscan=warn";

/// Logging configuration shared by fieldscan binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Mirror the file filter on stderr instead of only warnings.
    pub verbose: bool,
}

/// Initialize tracing with a rotating file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let log_file = RotatingLogFile::open(log_dir, config.app_name, RotationPolicy::default())
        .with_context(|| format!("Failed to open log file for {}", config.app_name))?;

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new(QUIET_CONSOLE_FILTER)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(())
}

/// Get the fieldscan home directory: ~/.fieldscan
///
/// `FIELDSCAN_HOME` overrides the location. Falls back to the current
/// directory when no home directory can be determined.
pub fn fieldscan_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("FIELDSCAN_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fieldscan")
}

/// Get the logs directory: ~/.fieldscan/logs
pub fn logs_dir() -> PathBuf {
    fieldscan_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// How many generations to keep and how large each may grow.
#[derive(Debug, Clone, Copy)]
pub struct RotationPolicy {
    /// Live file plus numbered backups; at least 1.
    pub generations: usize,
    pub max_bytes: u64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            generations: 5,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// `<app>.log` plus `<app>.log.1` .. `<app>.log.N-1`, newest first.
struct RotatingLogFile {
    dir: PathBuf,
    stem: String,
    policy: RotationPolicy,
    file: File,
    written: u64,
}

impl RotatingLogFile {
    fn open(dir: PathBuf, app_name: &str, policy: RotationPolicy) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let stem: String = app_name
            .chars()
            .map(|ch| match ch {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => ch,
                _ => '_',
            })
            .collect();
        let policy = RotationPolicy {
            generations: policy.generations.max(1),
            ..policy
        };

        let live = dir.join(format!("{}.log", stem));
        let file = OpenOptions::new().create(true).append(true).open(&live)?;
        let written = file.metadata()?.len();

        let mut log = Self {
            dir,
            stem,
            policy,
            file,
            written,
        };
        if log.written > log.policy.max_bytes {
            log.roll()?;
        }
        Ok(log)
    }

    /// Generation 0 is the live file.
    fn generation(&self, index: usize) -> PathBuf {
        match index {
            0 => self.dir.join(format!("{}.log", self.stem)),
            n => self.dir.join(format!("{}.log.{}", self.stem, n)),
        }
    }

    /// Shift every generation one step older, dropping the last, then start
    /// an empty live file.
    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let last = self.policy.generations - 1;
        if last > 0 {
            let oldest = self.generation(last);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (0..last).rev() {
                let from = self.generation(index);
                if from.exists() {
                    fs::rename(&from, self.generation(index + 1))?;
                }
            }
        }

        // A single generation keeps no backups; `create` truncates.
        self.file = File::create(self.generation(0))?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.policy.max_bytes {
            self.roll()?;
        }
        let bytes = self.file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn policy(generations: usize, max_bytes: u64) -> RotationPolicy {
        RotationPolicy {
            generations,
            max_bytes,
        }
    }

    #[test]
    fn app_name_becomes_a_safe_stem() {
        let temp = TempDir::new().unwrap();
        let log =
            RotatingLogFile::open(temp.path().to_path_buf(), "field scan/run", policy(2, 64))
                .unwrap();
        assert_eq!(log.stem, "field_scan_run");
        assert!(temp.path().join("field_scan_run.log").exists());
    }

    #[test]
    fn log_rolls_when_size_exceeded() {
        let temp = TempDir::new().unwrap();
        let mut log =
            RotatingLogFile::open(temp.path().to_path_buf(), "fieldscan", policy(3, 16)).unwrap();

        log.write_all(b"0123456789").unwrap();
        log.write_all(b"abcdefghij").unwrap();
        log.flush().unwrap();

        let live = fs::read_to_string(temp.path().join("fieldscan.log")).unwrap();
        let previous = fs::read_to_string(temp.path().join("fieldscan.log.1")).unwrap();
        assert_eq!(live, "abcdefghij");
        assert_eq!(previous, "0123456789");
    }

    #[test]
    fn oldest_generation_is_dropped() {
        let temp = TempDir::new().unwrap();
        let mut log =
            RotatingLogFile::open(temp.path().to_path_buf(), "scan", policy(2, 4)).unwrap();

        for chunk in [b"aaaa", b"bbbb", b"cccc"] {
            log.write_all(chunk).unwrap();
        }
        log.flush().unwrap();

        assert!(!temp.path().join("scan.log.2").exists());
        assert_eq!(fs::read_to_string(temp.path().join("scan.log.1")).unwrap(), "bbbb");
        assert_eq!(fs::read_to_string(temp.path().join("scan.log")).unwrap(), "cccc");
    }

    #[test]
    fn single_generation_truncates_in_place() {
        let temp = TempDir::new().unwrap();
        let mut log =
            RotatingLogFile::open(temp.path().to_path_buf(), "solo", policy(1, 4)).unwrap();

        log.write_all(b"aaaa").unwrap();
        log.write_all(b"bb").unwrap();
        log.flush().unwrap();

        assert!(!temp.path().join("solo.log.1").exists());
        assert_eq!(fs::read_to_string(temp.path().join("solo.log")).unwrap(), "bb");
    }

    #[test]
    fn oversized_existing_log_is_rolled_on_open() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("big.log"), b"0123456789").unwrap();

        let log = RotatingLogFile::open(temp.path().to_path_buf(), "big", policy(2, 4)).unwrap();
        assert_eq!(log.written, 0);
        assert_eq!(
            fs::read_to_string(temp.path().join("big.log.1")).unwrap(),
            "0123456789"
        );
    }
}
