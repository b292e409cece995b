use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrBridgeError {
    #[error("Scratch directory error at {}: {source}", .path.display())]
    ScratchCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine failed ({}): {stderr}", describe_exit(.code))]
    OcrEngine { code: Option<i32>, stderr: String },

    #[error("OCR engine produced no output at {}: {source}", .path.display())]
    MissingOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start OCR engine {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, OcrBridgeError>;
