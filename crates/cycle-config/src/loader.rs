//! Parse and load user configuration.

use std::{ffi::OsStr, fs, path::Path};

use ron::error::SpannedError;
use tracing::debug;

use crate::{Config, Error, error::excerpt_at, raw::RawConfig};

/// Parse a configuration from RON source.
pub fn from_ron_str(source: &str) -> Result<Config, Error> {
    let raw: RawConfig = ron::from_str(source).map_err(|e| parse_error(source, &e))?;
    Config::from_raw(raw)
}

/// Load a configuration from a `.ron` file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    if path.extension() != Some(OsStr::new("ron")) {
        return Err(Error::Read {
            path: Some(path.to_path_buf()),
            message: "Unsupported config format (expected a .ron file)".to_string(),
        });
    }
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    let config = from_ron_str(&source).map_err(|e| e.with_path(path))?;
    debug!(path = %path.display(), groups = config.groups().len(), "config_loaded");
    Ok(config)
}

/// Convert a RON error into a located parse error.
fn parse_error(source: &str, e: &SpannedError) -> Error {
    let line = e.span.start.line;
    let col = e.span.start.col;
    Error::Parse {
        path: None,
        line,
        col,
        message: e.code.to_string(),
        excerpt: excerpt_at(source, line, col),
    }
}
