//! Platform registry
//!
//! Maps dialect names to platform factories. Registration is append-only
//! and expected at process start; lookups are read-many. A process-wide
//! default registry carries the built-in dialects, and tests can construct
//! isolated registries of their own.

use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Constructor for a platform implementation
pub type PlatformFactory = fn() -> Result<Platform>;

static BUILTINS: &[(&str, PlatformFactory)] = &[
    ("hsqldb", Platform::hsqldb),
    ("mysql", Platform::mysql),
    ("postgresql", Platform::postgresql),
    ("oracle", Platform::oracle),
    ("mssql", Platform::mssql),
];

/// Registry of named platform implementations
pub struct PlatformRegistry {
    platforms: Mutex<IndexMap<String, PlatformFactory>>,
}

impl PlatformRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            platforms: Mutex::new(IndexMap::new()),
        }
    }

    /// Create a registry with the built-in dialects registered
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        {
            let mut platforms = registry.lock();
            for (name, factory) in BUILTINS {
                platforms.insert((*name).to_string(), *factory);
            }
        }
        registry
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, PlatformFactory>> {
        self.platforms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a platform under a name.
    ///
    /// The registry is append-only; re-registering a name is a
    /// configuration error.
    pub fn register(&self, name: &str, factory: PlatformFactory) -> Result<()> {
        let mut platforms = self.lock();
        if platforms.contains_key(&name.to_lowercase()) {
            return Err(Error::ConfigError(format!(
                "platform '{}' is already registered",
                name
            )));
        }
        platforms.insert(name.to_lowercase(), factory);
        Ok(())
    }

    /// Look up a platform by name
    pub fn platform(&self, name: &str) -> Result<Platform> {
        let factory = {
            let platforms = self.lock();
            platforms.get(&name.to_lowercase()).copied()
        };
        match factory {
            Some(factory) => factory(),
            None => Err(Error::ConfigError(format!(
                "unknown platform '{}', registered: {}",
                name,
                self.names().join(", ")
            ))),
        }
    }

    /// The registered platform names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_REGISTRY: Lazy<PlatformRegistry> = Lazy::new(PlatformRegistry::with_builtins);

/// The process-wide registry holding the built-in dialects
pub fn default_registry() -> &'static PlatformRegistry {
    &DEFAULT_REGISTRY
}

/// Look up a platform in the default registry
pub fn platform_for(name: &str) -> Result<Platform> {
    default_registry().platform(name)
}
