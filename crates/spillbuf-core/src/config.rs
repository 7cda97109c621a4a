//! Buffer configuration that downstream crates can serialize/deserialize.
//!
//! Options are validated when they are set, never when a buffer is in use.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest buffer kept in RAM before spilling to temporary storage (1 MiB).
pub const DEFAULT_MEM_BYTES: u64 = 1_048_576;

/// Sentinel for "no size ceiling".
pub const DEFAULT_MAX_BYTES: i64 = -1;

/// Transfer chunk used by bulk copies; matches the smallest efficient read.
pub const DEFAULT_BUFFER_BYTES: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Bytes held in memory before the remainder is spilled.
    pub mem_bytes: u64,

    /// Ceiling on the total (memory + spilled) size. `None` means unbounded.
    pub max_bytes: Option<u64>,

    /// Directory for anonymous spill files. `None` uses the system temp dir.
    pub spill_dir: Option<String>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            mem_bytes: DEFAULT_MEM_BYTES,
            max_bytes: None,
            spill_dir: None,
        }
    }
}

impl BufferConfig {
    /// Set the in-memory threshold. Negative values are rejected.
    pub fn with_mem_bytes(mut self, mem_bytes: i64) -> Result<Self> {
        if mem_bytes < 0 {
            return Err(Error::Config(format!(
                "mem_bytes should be >= 0, got {mem_bytes}"
            )));
        }
        self.mem_bytes = mem_bytes as u64;
        Ok(self)
    }

    /// Opt into a size ceiling. An explicit ceiling must be positive; to stay
    /// unbounded, don't call this at all.
    pub fn with_max_bytes(mut self, max_bytes: i64) -> Result<Self> {
        if max_bytes <= 0 {
            return Err(Error::Config(format!(
                "max_bytes should be > 0, got {max_bytes}"
            )));
        }
        self.max_bytes = Some(max_bytes as u64);
        Ok(self)
    }

    pub fn with_spill_dir(mut self, dir: impl Into<String>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    /// Check a config that was built field-by-field or deserialized.
    pub fn validate(&self) -> Result<()> {
        if self.max_bytes == Some(0) {
            return Err(Error::Config("max_bytes should be > 0".into()));
        }
        if let Some(dir) = &self.spill_dir {
            if dir.trim().is_empty() {
                return Err(Error::Config("spill_dir must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(doc: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(doc)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SPILLBUF_MEM_BYTES`: in-memory threshold in bytes
    /// - `SPILLBUF_MAX_BYTES`: size ceiling in bytes (non-positive = unbounded)
    /// - `SPILLBUF_SPILL_DIR`: directory for spill files
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(s) = lookup("SPILLBUF_MEM_BYTES") {
            cfg = cfg.with_mem_bytes(parse_i64("SPILLBUF_MEM_BYTES", &s)?)?;
        }

        if let Some(s) = lookup("SPILLBUF_MAX_BYTES") {
            let v = parse_i64("SPILLBUF_MAX_BYTES", &s)?;
            if v > 0 {
                cfg = cfg.with_max_bytes(v)?;
            }
        }

        if let Some(s) = lookup("SPILLBUF_SPILL_DIR") {
            cfg.spill_dir = Some(s);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_i64(key: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| Error::Config(format!("{key}: cannot parse '{raw}': {e}")))
}
