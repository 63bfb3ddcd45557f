//! Scoped environment overrides for tests.
//!
//! Environment variables are process-global, so every test that touches them holds
//! [`env_lock`] for as long as its [`EnvGuard`] lives.

use std::sync::{Mutex, OnceLock};

/// Process-wide lock serializing environment mutation.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock` while tests may run on parallel threads.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Set of environment overrides, undone in reverse order on drop.
#[derive(Debug, Default)]
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key=value` until the guard drops.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.save(key);
        write_var(key, Some(value));
        self
    }

    /// Unset `key` until the guard drops.
    pub fn remove(mut self, key: &str) -> Self {
        self.save(key);
        write_var(key, None);
        self
    }

    fn save(&mut self, key: &str) {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.saved.pop() {
            write_var(&key, previous.as_deref());
        }
    }
}
