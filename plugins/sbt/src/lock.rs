//! Process-wide locks keyed by artifact path.
//!
//! Two builds writing the same jar would race on the file, so they are serialized. Builds of
//! different artifacts do not wait for each other.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>;

/// Registry of per-target locks.
///
/// Targets are keyed after resolving `.` and `..` lexically. Symlinks are not followed, so two
/// different links to the same file still get separate locks.
#[derive(Debug, Default)]
pub struct TargetLocks {
    locks: Arc<Registry>,
}

/// Held for the duration of a build; releases the target on drop.
///
/// The last guard for a target also removes its entry from the registry.
#[derive(Debug)]
pub struct TargetGuard {
    guard: Option<OwnedMutexGuard<()>>,
    registry: Arc<Registry>,
    key: PathBuf,
}

impl Drop for TargetGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = lock_registry(&self.registry);
        // Waiters hold a clone of the Arc, so a count of one means nobody else wants it.
        if locks
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

fn lock_registry(registry: &Registry) -> MutexGuard<'_, HashMap<PathBuf, Arc<AsyncMutex<()>>>> {
    match registry.lock() {
        Ok(locks) => locks,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Drop `.` and fold `..` into its parent without touching the filesystem.
pub fn lock_key(target: &Path) -> PathBuf {
    let mut key = PathBuf::new();
    for component in target.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match key.components().next_back() {
                Some(Component::Normal(_)) => {
                    key.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => key.push(Component::ParentDir),
            },
            other => key.push(other),
        }
    }
    key
}

impl TargetLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every builder in this process.
    pub fn global() -> &'static TargetLocks {
        static GLOBAL: OnceLock<TargetLocks> = OnceLock::new();
        GLOBAL.get_or_init(TargetLocks::new)
    }

    fn entry(&self, key: &Path) -> Arc<AsyncMutex<()>> {
        let mut locks = lock_registry(&self.locks);
        Arc::clone(locks.entry(key.to_path_buf()).or_default())
    }

    fn guard(&self, key: PathBuf, guard: OwnedMutexGuard<()>) -> TargetGuard {
        TargetGuard {
            guard: Some(guard),
            registry: Arc::clone(&self.locks),
            key,
        }
    }

    /// Take the lock for `target` if nobody holds it.
    pub fn try_acquire(&self, target: &Path) -> Option<TargetGuard> {
        let key = lock_key(target);
        let guard = self.entry(&key).try_lock_owned().ok()?;
        Some(self.guard(key, guard))
    }

    /// Wait until the lock for `target` is free and take it.
    pub async fn acquire(&self, target: &Path) -> TargetGuard {
        let key = lock_key(target);
        let guard = self.entry(&key).lock_owned().await;
        self.guard(key, guard)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        lock_registry(&self.locks).len()
    }
}
