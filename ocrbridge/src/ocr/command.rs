use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::{OcrConfig, TESSDATA_PREFIX};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Resolve the executable the way a shell started in `install_dir` would.
///
/// A bare name that exists inside the installation directory wins over PATH;
/// any other relative path is taken relative to the installation directory.
pub fn resolve_executable(config: &OcrConfig) -> PathBuf {
    let executable = &config.executable;
    let Some(install_dir) = &config.install_dir else {
        return executable.clone();
    };
    if executable.is_absolute() {
        return executable.clone();
    }

    let is_bare_name = executable.components().count() == 1;
    if !is_bare_name {
        return install_dir.join(executable);
    }

    let candidates = [
        install_dir.join(executable),
        install_dir.join(format!(
            "{}{}",
            executable.display(),
            std::env::consts::EXE_SUFFIX
        )),
    ];
    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| executable.clone())
}

/// Build `<exe> <input> <output> -l <language>` with stdio captured.
///
/// The trained-data directory is set on the child only; the caller's
/// environment is left untouched.
pub fn build_command(config: &OcrConfig, input_path: &Path, output_base: &Path) -> Command {
    let mut command = Command::new(resolve_executable(config));
    command
        .arg(input_path)
        .arg(output_base)
        .arg("-l")
        .arg(&config.language)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(install_dir) = &config.install_dir {
        command.current_dir(install_dir);
    }
    if let Some(data_dir) = config.effective_data_dir() {
        command.env(TESSDATA_PREFIX, data_dir);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    command
}
