use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::{debug, info};

use super::command::{build_command, resolve_executable};
use super::input::write_input;
use super::scratch::ScratchSession;
use crate::config::OcrConfig;
use crate::error::{OcrBridgeError, Result};

/// Extension the engine appends to the output base name.
const OUTPUT_EXTENSION: &str = "txt";

/// Runs the external OCR engine once per call, staging input in a scratch directory.
#[derive(Debug, Clone)]
pub struct OcrInvoker {
    config: OcrConfig,
}

impl OcrInvoker {
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;
        let config = config.with_absolute_dirs()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Check that the engine can be started and answers `--version`.
    pub fn is_available(&self) -> bool {
        let mut command = std::process::Command::new(resolve_executable(&self.config));
        command
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(install_dir) = &self.config.install_dir {
            command.current_dir(install_dir);
        }

        command.status().map(|s| s.success()).unwrap_or(false)
    }

    /// Extract text from `images`, treated as the pages of one document in order.
    ///
    /// Blocks until the engine exits. An empty slice returns an empty string
    /// without touching the filesystem or spawning anything.
    pub fn extract<R: Read + Seek>(&self, images: &mut [R]) -> Result<String> {
        if images.is_empty() {
            return Ok(String::new());
        }

        let session = ScratchSession::create(&self.config.scratch_dir)?;
        let input_path = session.new_file_path();
        let output_base = session.new_file_path();

        write_input(images, &session, &input_path)?;
        self.run_engine(&input_path, &output_base, images.len())
    }

    pub fn extract_bytes<B: AsRef<[u8]>>(&self, images: &[B]) -> Result<String> {
        let mut cursors: Vec<Cursor<&[u8]>> =
            images.iter().map(|b| Cursor::new(b.as_ref())).collect();
        self.extract(&mut cursors)
    }

    pub fn extract_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<String> {
        let mut files = paths
            .iter()
            .map(|p| File::open(p.as_ref()))
            .collect::<std::io::Result<Vec<File>>>()?;
        self.extract(&mut files)
    }

    /// Run [`extract_bytes`](Self::extract_bytes) on the blocking pool.
    ///
    /// Dropping the future does not stop the engine; the child runs to completion.
    pub async fn extract_async(&self, images: Vec<Vec<u8>>) -> Result<String> {
        let invoker = self.clone();
        tokio::task::spawn_blocking(move || invoker.extract_bytes(&images))
            .await
            .map_err(|e| OcrBridgeError::Internal(format!("OCR task panicked: {e}")))?
    }

    fn run_engine(
        &self,
        input_path: &Path,
        output_base: &Path,
        image_count: usize,
    ) -> Result<String> {
        let mut command = build_command(&self.config, input_path, output_base);
        let program = PathBuf::from(command.get_program());

        info!(
            program = %program.display(),
            images = image_count,
            language = %self.config.language,
            "Running OCR engine"
        );

        let output = command
            .output()
            .map_err(|source| OcrBridgeError::Spawn { program, source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OcrBridgeError::OcrEngine {
                code: output.status.code(),
                stderr,
            });
        }

        let text_path = output_text_path(output_base);
        let text = fs::read_to_string(&text_path).map_err(|source| {
            OcrBridgeError::MissingOutput {
                path: text_path.clone(),
                source,
            }
        })?;

        debug!(chars = text.chars().count(), "OCR engine finished");
        Ok(text)
    }
}

/// `<output_base>.txt`, appended rather than substituted.
fn output_text_path(output_base: &Path) -> PathBuf {
    let mut path = OsString::from(output_base.as_os_str());
    path.push(".");
    path.push(OUTPUT_EXTENSION);
    PathBuf::from(path)
}
