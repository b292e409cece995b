//! OCR (Optical Character Recognition) Module
//!
//! Extracts text from images by running the Tesseract executable as a child
//! process. Nothing here decodes images; bytes are handed to the engine as-is.
//!
//! # Architecture
//!
//! - `ScratchSession` owns a per-call directory under the configured scratch
//!   root and removes it on drop
//! - `write_input` stages one image verbatim, or several images plus a
//!   manifest listing their paths in order
//! - `build_command` assembles `<exe> <input> <output> -l <language>` with the
//!   trained-data directory set on the child only
//! - `OcrInvoker` ties these together and reads back `<output>.txt`
//!
//! # Configuration
//!
//! Behavior is controlled via `OcrConfig` (see `config.rs`):
//! - `executable`: engine binary, resolved against `install_dir` first
//! - `install_dir`: working directory for the engine
//! - `data_dir`: exported to the child as `TESSDATA_PREFIX`
//! - `language`: value of the `-l` flag
//! - `scratch_dir`: root for per-call scratch directories
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrInvoker::new(config.ocr.clone())?;
//! let text = ocr.extract_files(&["page-1.png", "page-2.png"])?;
//! ```

mod command;
mod input;
mod invoker;
mod scratch;

pub use command::{build_command, resolve_executable};
pub use input::write_input;
pub use invoker::OcrInvoker;
pub use scratch::ScratchSession;
