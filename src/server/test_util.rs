//! Scratch directories for tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

// Writing an executable while another test thread forks can leave the write
// end open in the child, and exec then fails with ETXTBSY. Writes and spawns
// both take this lock.
static EXEC_LOCK: Mutex<()> = Mutex::new(());

/// Hold this while running child processes.
pub fn exec_lock() -> MutexGuard<'static, ()> {
    EXEC_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A directory under the system temp dir, removed on drop
pub struct Scratch {
    root: PathBuf
}

impl Scratch {
    pub fn new() -> Scratch {
        let root = std::env::temp_dir().join(format!(
            "tiny-server-test-{}-{}",
            process::id(),
            NEXT_ID.fetch_add(1, Ordering::SeqCst)));
        fs::create_dir_all(&root).unwrap();
        Scratch { root: root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Creates `relative` (and its parents) with the given contents and mode.
    pub fn file(&self, relative: &str, contents: &[u8], mode: u32) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        let _guard = exec_lock();
        fs::write(&path, contents).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}
