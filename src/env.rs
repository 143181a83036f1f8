//! Environment variable access behind a trait.
//!
//! Configuration is resolved through [`ReadEnv`] instead of calling
//! `std::env` directly, so tests can feed an [`InMemoryEnv`] without
//! mutating the process environment.
//!
//! ```
//! use quote_proxy::env::{ReadEnv, SystemEnv};
//!
//! fn listen_port<E: ReadEnv>(env: &E) -> u16 {
//!     env.var("QUOTE_PROXY_PORT")
//!         .ok()
//!         .and_then(|p| p.parse().ok())
//!         .unwrap_or(8080)
//! }
//!
//! let port = listen_port(&SystemEnv);
//! ```

use std::env;

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Zero-sized type that delegates to `std::env`.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

/// In-memory variable map for tests. Never touches the process environment.
///
/// Uses `RefCell` for interior mutability, so all methods take `&self`.
#[cfg(test)]
pub struct InMemoryEnv {
    vars: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl InMemoryEnv {
    pub fn new() -> Self {
        Self {
            vars: std::cell::RefCell::new(std::collections::HashMap::new()),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.borrow_mut().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars.borrow_mut().remove(key);
    }
}

#[cfg(test)]
impl Default for InMemoryEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        self.vars
            .borrow()
            .get(key)
            .cloned()
            .ok_or(env::VarError::NotPresent)
    }
}
