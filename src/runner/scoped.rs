//! Scoped resources
//!
//! Guards that undo a change when they go out of scope, including early
//! returns through `?`.

use crate::runner::Context;
use std::env;
use std::fs;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Working-directory override for a [`Context`]
///
/// Derefs to the context, so commands run through the guard use the new
/// directory. The previous directory comes back on drop.
pub struct CdGuard<'a> {
    ctx: &'a mut Context,
    previous: PathBuf,
}

impl<'a> CdGuard<'a> {
    pub(crate) fn new(ctx: &'a mut Context, target: PathBuf) -> Self {
        debug!(dir = %target.display(), "entering directory");
        let previous = std::mem::replace(&mut ctx.working_dir, target);
        CdGuard { ctx, previous }
    }
}

impl Deref for CdGuard<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.ctx
    }
}

impl DerefMut for CdGuard<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx
    }
}

impl Drop for CdGuard<'_> {
    fn drop(&mut self) {
        self.ctx.working_dir = std::mem::take(&mut self.previous);
    }
}

/// A file copied into a directory for the guard's lifetime
#[derive(Debug)]
pub struct TempCopy {
    path: PathBuf,
}

impl TempCopy {
    /// Copy `src` into `dest_dir`, keeping its file name
    pub fn new(src: impl AsRef<Path>, dest_dir: impl AsRef<Path>) -> io::Result<Self> {
        let src = src.as_ref();
        let file_name = src.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' has no file name", src.display()),
            )
        })?;
        let path = dest_dir.as_ref().join(file_name);
        fs::copy(src, &path)?;
        debug!(from = %src.display(), to = %path.display(), "copied temporary file");
        Ok(TempCopy { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempCopy {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove temporary copy");
        }
    }
}

/// Process-wide working directory change
///
/// Affects every thread; prefer [`Context::cd`] for commands run through a
/// context.
#[derive(Debug)]
pub struct ProcessCwd {
    previous: PathBuf,
}

impl ProcessCwd {
    pub fn enter(path: impl AsRef<Path>) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(path.as_ref())?;
        debug!(dir = %path.as_ref().display(), "changed process directory");
        Ok(ProcessCwd { previous })
    }

    /// Directory restored on drop
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for ProcessCwd {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            warn!(dir = %self.previous.display(), error = %e, "failed to restore working directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn copy_then_fail(src: &Path, dest: &Path) -> io::Result<PathBuf> {
        let copy = TempCopy::new(src, dest)?;
        assert!(copy.path().exists());
        Err(io::Error::new(io::ErrorKind::Other, format!("{}", copy.path().display())))
    }

    #[test]
    fn test_temp_copy_removed_on_drop() {
        let src_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let src = src_dir.path().join("requirements.txt");
        fs::write(&src, "flask\n").unwrap();

        let copied = {
            let copy = TempCopy::new(&src, dest_dir.path()).unwrap();
            assert_eq!(fs::read_to_string(copy.path()).unwrap(), "flask\n");
            copy.path().to_path_buf()
        };
        assert!(!copied.exists());
        assert!(src.exists());
    }

    #[test]
    fn test_temp_copy_removed_on_early_return() {
        let src_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let src = src_dir.path().join("app.yaml");
        fs::write(&src, "runtime: python").unwrap();

        let err = copy_then_fail(&src, dest_dir.path()).unwrap_err();
        assert!(!PathBuf::from(err.to_string()).exists());
    }

    #[test]
    fn test_temp_copy_missing_source() {
        let dest_dir = TempDir::new().unwrap();
        assert!(TempCopy::new(dest_dir.path().join("nope.txt"), dest_dir.path()).is_err());
    }

    #[test]
    fn test_cd_guard_restores_after_error() {
        fn failing(ctx: &mut Context) -> anyhow::Result<()> {
            let guard = ctx.cd("build");
            assert!(guard.working_dir.ends_with("build"));
            anyhow::bail!("boom")
        }

        let mut ctx = Context::new().with_working_dir(PathBuf::from("/work"));
        assert!(failing(&mut ctx).is_err());
        assert_eq!(ctx.working_dir, PathBuf::from("/work"));
    }
}
