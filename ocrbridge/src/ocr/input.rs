use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use super::scratch::ScratchSession;
use crate::error::{OcrBridgeError, Result};

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Stage `images` as the engine's input file at `input_path`.
///
/// A single image is copied verbatim to `input_path`. Several images are each
/// written to their own file in the session, and `input_path` becomes a
/// manifest listing those files one absolute path per line, in input order.
pub fn write_input<R: Read + Seek>(
    images: &mut [R],
    session: &ScratchSession,
    input_path: &Path,
) -> Result<()> {
    match images.len() {
        0 => Ok(()),
        1 => {
            let bytes = stage_image(&mut images[0], session, input_path)?;
            debug!(bytes, "Staging single image");
            Ok(())
        }
        _ => {
            let mut manifest = Vec::new();
            for image in images.iter_mut() {
                let image_path = session.new_file_path();
                stage_image(image, session, &image_path)?;

                manifest.extend_from_slice(manifest_line(&image_path)?);
                manifest.push(b'\n');
            }
            debug!(images = images.len(), "Staging image manifest");
            session.write_file(input_path, &manifest)
        }
    }
}

/// Rewind `image` and stream it into `path`, returning the number of bytes copied.
///
/// Read failures belong to the caller's stream and surface as `Io`; write
/// failures belong to the scratch directory.
fn stage_image<R: Read + Seek>(
    image: &mut R,
    session: &ScratchSession,
    path: &Path,
) -> Result<u64> {
    image.seek(SeekFrom::Start(0))?;
    let mut file = session.create_file(path)?;
    let scratch_error = |source: io::Error| OcrBridgeError::ScratchCreation {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = [0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;
    loop {
        let n = match image.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        file.write_all(&buf[..n]).map_err(scratch_error)?;
        copied += n as u64;
    }
    file.flush().map_err(scratch_error)?;
    Ok(copied)
}

/// The path exactly as the filesystem knows it; the engine reads raw bytes.
#[cfg(unix)]
fn manifest_line(path: &Path) -> Result<&[u8]> {
    use std::os::unix::ffi::OsStrExt;
    Ok(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn manifest_line(path: &Path) -> Result<&[u8]> {
    path.to_str()
        .map(str::as_bytes)
        .ok_or_else(|| OcrBridgeError::ScratchCreation {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                "scratch path is not valid Unicode and cannot be listed in a manifest",
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    #[test]
    fn test_single_image_copied_verbatim() {
        let root = tempfile::tempdir().unwrap();
        let session = ScratchSession::create(root.path()).unwrap();
        let input = session.new_file_path();
        let payload: Vec<u8> = (0..=255u8).collect();

        write_input(&mut [Cursor::new(payload.clone())], &session, &input).unwrap();

        assert_eq!(fs::read(&input).unwrap(), payload);
        assert_eq!(fs::read_dir(session.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_single_image_rewound_before_copy() {
        let root = tempfile::tempdir().unwrap();
        let session = ScratchSession::create(root.path()).unwrap();
        let input = session.new_file_path();

        let mut image = Cursor::new(b"PNGDATA".to_vec());
        image.set_position(4);

        write_input(std::slice::from_mut(&mut image), &session, &input).unwrap();
        assert_eq!(fs::read(&input).unwrap(), b"PNGDATA");
    }

    #[test]
    fn test_manifest_lists_images_in_order() {
        let root = tempfile::tempdir().unwrap();
        let session = ScratchSession::create(root.path()).unwrap();
        let input = session.new_file_path();
        let mut images = vec![
            Cursor::new(b"first".to_vec()),
            Cursor::new(b"second".to_vec()),
            Cursor::new(b"third".to_vec()),
        ];

        write_input(&mut images, &session, &input).unwrap();

        let manifest = fs::read_to_string(&input).unwrap();
        assert!(manifest.ends_with('\n'));
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines.len(), 3);

        let contents: Vec<Vec<u8>> = lines
            .iter()
            .map(|line| {
                let path = Path::new(line);
                assert!(path.is_absolute());
                assert_eq!(path.parent(), Some(session.path()));
                fs::read(path).unwrap()
            })
            .collect();
        assert_eq!(
            contents,
            vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]
        );

        // three images plus the manifest
        assert_eq!(fs::read_dir(session.path()).unwrap().count(), 4);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream went away"))
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn test_stream_read_failure_is_io_error() {
        let root = tempfile::tempdir().unwrap();
        let session = ScratchSession::create(root.path()).unwrap();
        let input = session.new_file_path();

        let result = write_input(&mut [FailingReader], &session, &input);
        assert!(matches!(result, Err(OcrBridgeError::Io(_))));
    }

    #[test]
    fn test_large_image_streamed_intact() {
        let root = tempfile::tempdir().unwrap();
        let session = ScratchSession::create(root.path()).unwrap();
        let input = session.new_file_path();
        let payload: Vec<u8> = (0..(COPY_BUFFER_SIZE * 3 + 17))
            .map(|i| (i % 253) as u8)
            .collect();

        write_input(&mut [Cursor::new(payload.clone())], &session, &input).unwrap();
        assert_eq!(fs::read(&input).unwrap(), payload);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_manifest_keeps_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = tempfile::tempdir().unwrap();
        let odd_root = root.path().join(OsStr::from_bytes(b"scr\xffatch"));
        let session = ScratchSession::create(&odd_root).unwrap();
        let input = session.new_file_path();
        let mut images = vec![Cursor::new(b"one".to_vec()), Cursor::new(b"two".to_vec())];

        write_input(&mut images, &session, &input).unwrap();

        let manifest = fs::read(&input).unwrap();
        let pages: Vec<Vec<u8>> = manifest
            .split(|b| *b == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| fs::read(Path::new(OsStr::from_bytes(line))).unwrap())
            .collect();
        assert_eq!(pages, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let session = ScratchSession::create(root.path()).unwrap();
        let input = session.new_file_path();
        let mut images: Vec<Cursor<Vec<u8>>> = Vec::new();

        write_input(&mut images, &session, &input).unwrap();
        assert!(!input.exists());
    }
}
