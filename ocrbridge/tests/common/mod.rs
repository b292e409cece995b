// Common test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use ocrbridge::config::OcrConfig;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A shell script standing in for the OCR engine.
///
/// The script receives `<input> <output> -l <language>` exactly like the real
/// engine, so `$1` is the input file and `$2` the output base name.
pub struct StubEngine {
    dir: TempDir,
    pub path: PathBuf,
}

impl StubEngine {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
pub fn stub_engine(name: &str, body: &str) -> StubEngine {
    let dir = tempfile::tempdir().expect("Failed to create stub directory");
    stub_engine_in(dir, name, body)
}

/// Like [`stub_engine`], but inside a directory chosen by the caller.
#[cfg(unix)]
pub fn stub_engine_in(dir: TempDir, name: &str, body: &str) -> StubEngine {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write stub engine");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to mark stub engine executable");

    StubEngine { dir, path }
}

pub fn config_for(engine: &Path, scratch_root: &Path) -> OcrConfig {
    OcrConfig {
        executable: engine.to_path_buf(),
        scratch_dir: scratch_root.to_path_buf(),
        ..OcrConfig::default()
    }
}

/// Number of entries directly inside `dir`.
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Failed to list {}: {e}", dir.display()))
        .count()
}

/// Quote a path for embedding in a stub script.
pub fn sh_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}
