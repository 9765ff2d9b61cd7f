//! Environment variable access

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::platform::PlatformFamily;

/// Read-only view of a host environment
pub trait EnvironmentAccessor: Send + Sync {
    /// Read an environment variable, `None` if unset
    fn var(&self, name: &str) -> Option<String>;

    /// Operating system family of the host
    fn platform(&self) -> PlatformFamily;
}

/// The current process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl EnvironmentAccessor for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        // Not representable as a variable name; std may panic on these.
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return None;
        }
        std::env::var(name).ok()
    }

    fn platform(&self) -> PlatformFamily {
        PlatformFamily::current()
    }
}

/// Fixed in-memory environment with a chosen platform
///
/// Every `var` call is counted, so callers can check whether the
/// environment was consulted at all.
#[derive(Debug)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
    platform: PlatformFamily,
    lookups: AtomicUsize,
}

impl StaticEnvironment {
    pub fn new(platform: PlatformFamily) -> Self {
        Self {
            vars: HashMap::new(),
            platform,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Number of `var` calls served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl EnvironmentAccessor for StaticEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.vars.get(name).cloned()
    }

    fn platform(&self) -> PlatformFamily {
        self.platform
    }
}
