use crate::error::ProexyError;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Remove a directory tree, retrying failed attempts with doubling backoff.
///
/// Another process holding a file open (a viewer, a virus scanner) can make
/// removal fail transiently. A missing directory counts as removed.
pub fn remove_dir_all_with_retry(path: &Path, retries: u32, backoff: Duration) -> io::Result<()> {
    let mut attempt = 0;
    loop {
        match std::fs::remove_dir_all(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) if attempt < retries => {
                let wait = backoff * 2u32.saturating_pow(attempt);
                log::warn!(
                    "removing {} failed ({e}), retrying in {} ms",
                    path.display(),
                    wait.as_millis()
                );
                std::thread::sleep(wait);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Delete `path` if present and create it again, empty.
pub fn reset_dir(path: &Path, retries: u32, backoff: Duration) -> Result<(), ProexyError> {
    let setup = |e: io::Error| ProexyError::Setup {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    remove_dir_all_with_retry(path, retries, backoff).map_err(setup)?;
    std::fs::create_dir_all(path).map_err(setup)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_existing_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Oman Certificates");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("old.pdf"), b"x").unwrap();

        reset_dir(&dir, 0, Duration::ZERO).unwrap();
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn missing_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("fresh");
        remove_dir_all_with_retry(&dir, 2, Duration::ZERO).unwrap();
        reset_dir(&dir, 2, Duration::ZERO).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn reset_over_a_file_is_a_setup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("blocker");
        std::fs::write(&file, b"x").unwrap();
        let err = reset_dir(&file, 1, Duration::ZERO).unwrap_err();
        assert!(matches!(err, ProexyError::Setup { .. }));
    }
}
