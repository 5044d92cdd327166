use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Creates the result directory for this run.
///
/// If `base` is taken, `base.1`, `base.2`, ... are tried in turn.
pub fn create_result_dir(base: &Path) -> Result<PathBuf> {
    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;
    }

    let mut candidate = base.to_path_buf();
    let mut suffix = 1u32;
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => break,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                candidate = suffixed(base, suffix);
                suffix += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create directory: {:?}", candidate));
            }
        }
    }

    verify_writable(&candidate)?;
    tracing::info!("Result directory: {:?}", candidate);
    Ok(candidate)
}

fn suffixed(base: &Path, n: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{}", n));
    PathBuf::from(name)
}

fn verify_writable(path: &Path) -> Result<()> {
    let test_file = path.join(".write_test");
    fs::write(&test_file, b"test")
        .with_context(|| format!("Directory not writable: {:?}", path))?;
    fs::remove_file(&test_file)
        .with_context(|| format!("Failed to remove test file: {:?}", test_file))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_run_uses_base_name() {
        let tmp = TempDir::new().unwrap();
        let dir = create_result_dir(&tmp.path().join("telescope")).unwrap();
        assert_eq!(dir, tmp.path().join("telescope"));
        assert!(dir.is_dir());
        assert!(!dir.join(".write_test").exists());
    }

    #[test]
    fn test_existing_names_get_incrementing_suffix() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("telescope");

        let first = create_result_dir(&base).unwrap();
        let second = create_result_dir(&base).unwrap();
        let third = create_result_dir(&base).unwrap();

        assert_eq!(first, base);
        assert_eq!(second, tmp.path().join("telescope.1"));
        assert_eq!(third, tmp.path().join("telescope.2"));
    }

    #[test]
    fn test_io_failure_carries_context() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        let err = create_result_dir(&blocker.join("telescope")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to create parent directory"));
        assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());
    }
}
