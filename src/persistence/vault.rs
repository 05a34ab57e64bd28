use super::files::{atomic_write, create_new, read_file};
use crate::error::{TimelogError, TimelogResult};
use anyhow::Context;
use std::path::Path;
use std::time::SystemTime;

/// File storage the timelog store writes through.
///
/// Mirrors the host's vault: create refuses to overwrite, read and modify
/// work on whole-file content.
pub trait Vault {
    /// Create `path` with `content`; `AlreadyExists` if it is already there
    fn create(&self, path: &Path, content: &str) -> TimelogResult<()>;

    /// Read the whole file
    fn read(&self, path: &Path) -> TimelogResult<String>;

    /// Replace the whole file
    fn modify(&self, path: &Path, content: &str) -> TimelogResult<()>;

    /// Last modification time, `None` when the storage can't tell
    fn modified(&self, path: &Path) -> TimelogResult<Option<SystemTime>>;
}

/// Vault backed by the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsVault;

impl Vault for FsVault {
    fn create(&self, path: &Path, content: &str) -> TimelogResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        if create_new(path, content)? {
            Ok(())
        } else {
            Err(TimelogError::AlreadyExists(path.display().to_string()))
        }
    }

    fn read(&self, path: &Path) -> TimelogResult<String> {
        Ok(read_file(path)?)
    }

    fn modify(&self, path: &Path, content: &str) -> TimelogResult<()> {
        Ok(atomic_write(path, content)?)
    }

    fn modified(&self, path: &Path) -> TimelogResult<Option<SystemTime>> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat file: {}", path.display()))?;
        Ok(meta.modified().ok())
    }
}

#[cfg(test)]
pub use failing::FailingVault;

#[cfg(test)]
mod failing {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// `FsVault` whose writes can be switched to fail; clones share the switch
    #[derive(Debug, Clone, Default)]
    pub struct FailingVault {
        fail_writes: Rc<Cell<bool>>,
    }

    impl FailingVault {
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.set(fail);
        }
    }

    impl Vault for FailingVault {
        fn create(&self, path: &Path, content: &str) -> TimelogResult<()> {
            FsVault.create(path, content)
        }

        fn read(&self, path: &Path) -> TimelogResult<String> {
            FsVault.read(path)
        }

        fn modify(&self, path: &Path, content: &str) -> TimelogResult<()> {
            if self.fail_writes.get() {
                return Err(anyhow::anyhow!("disk full writing {}", path.display()).into());
            }
            FsVault.modify(path, content)
        }

        fn modified(&self, path: &Path) -> TimelogResult<Option<SystemTime>> {
            FsVault.modified(path)
        }
    }
}
