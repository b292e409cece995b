use std::env;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{OcrBridgeError, Result};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) if val.trim().is_empty() => None,
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Name of the variable Tesseract reads to locate its trained data.
pub const TESSDATA_PREFIX: &str = "TESSDATA_PREFIX";

/// Default subdirectory of an installation that holds `*.traineddata` files.
pub const DEFAULT_TESSDATA_SUBDIR: &str = "tessdata";

#[derive(Debug, Clone)]
pub struct Config {
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Engine executable. A bare name is looked up in `install_dir` first, then on PATH.
    pub executable: PathBuf,
    /// Working directory of the engine process.
    pub install_dir: Option<PathBuf>,
    /// Trained-data directory handed to the engine as `TESSDATA_PREFIX`.
    pub data_dir: Option<PathBuf>,
    /// Language code passed via `-l`, e.g. `eng` or `eng+deu`.
    pub language: String,
    /// Root under which one scratch directory per call is created.
    pub scratch_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            install_dir: None,
            data_dir: None,
            language: "eng".to_string(),
            scratch_dir: env::temp_dir().join("ocrbridge"),
        }
    }
}

impl OcrConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            executable: parse_env_or("TESSERACT_EXE", defaults.executable),
            install_dir: parse_env_opt("TESSERACT_DIR"),
            data_dir: parse_env_opt("TESSERACT_DATA_DIR"),
            language: env::var("OCR_LANGUAGE").unwrap_or(defaults.language),
            scratch_dir: parse_env_or("OCR_SCRATCH_DIR", defaults.scratch_dir),
        }
    }

    /// The data directory the engine should see, if any.
    ///
    /// An explicit `data_dir` wins; otherwise an installation directory implies
    /// `<install_dir>/tessdata`. With neither, the engine keeps whatever it inherits.
    pub fn effective_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            self.install_dir
                .as_ref()
                .map(|dir| dir.join(DEFAULT_TESSDATA_SUBDIR))
        })
    }

    /// Anchor relative directories at the current directory.
    ///
    /// The engine runs from `install_dir`, so a relative path handed to it would
    /// be resolved a second time from there.
    pub fn with_absolute_dirs(mut self) -> Result<Self> {
        self.install_dir = self.install_dir.as_deref().map(absolute).transpose()?;
        self.data_dir = self.data_dir.as_deref().map(absolute).transpose()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(OcrBridgeError::Validation(
                "OCR language must not be empty".to_string(),
            ));
        }
        if self.language.chars().any(char::is_whitespace) {
            return Err(OcrBridgeError::Validation(format!(
                "OCR language '{}' must not contain whitespace",
                self.language
            )));
        }
        if self.executable.as_os_str().is_empty() {
            return Err(OcrBridgeError::Validation(
                "OCR executable path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::from_env(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
