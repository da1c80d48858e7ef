// src/infrastructure/cache/namespaces.rs
use std::collections::HashMap;
use std::sync::Mutex;

use crate::application::ports::cache::CacheSettings;
use crate::infrastructure::lock::mutex_lock;

const SOURCE: &str = "cache::namespaces";

/// Namespace the registry starts in, standing for the host's general cache.
pub const HOST_NAMESPACE: &str = "default";

/// Configured namespaces plus the currently selected one, shared by the
/// store adapters.
///
/// Scoped selections nest and may interleave: the namespace that was active
/// before the first open scope comes back when the last one leaves.
pub struct NamespaceRegistry {
    configured: Mutex<HashMap<String, CacheSettings>>,
    active: Mutex<Selection>,
}

struct Selection {
    current: String,
    restore: String,
    scopes: usize,
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        let mut configured = HashMap::new();
        configured.insert(HOST_NAMESPACE.to_string(), CacheSettings::default());
        Self {
            configured: Mutex::new(configured),
            active: Mutex::new(Selection {
                current: HOST_NAMESPACE.to_string(),
                restore: HOST_NAMESPACE.to_string(),
                scopes: 0,
            }),
        }
    }
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, namespace: &str, settings: CacheSettings) {
        mutex_lock(&self.configured, SOURCE, "configure").insert(namespace.to_string(), settings);
    }

    pub fn is_configured(&self, namespace: &str) -> bool {
        mutex_lock(&self.configured, SOURCE, "is_configured").contains_key(namespace)
    }

    /// Settings of `namespace`; unknown namespaces get the defaults.
    pub fn settings(&self, namespace: &str) -> CacheSettings {
        mutex_lock(&self.configured, SOURCE, "settings")
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }

    pub fn current(&self) -> String {
        mutex_lock(&self.active, SOURCE, "current").current.clone()
    }

    /// Select `namespace`. Inside open scopes it also becomes the namespace
    /// restored when they close.
    pub fn switch(&self, namespace: &str) {
        let mut active = mutex_lock(&self.active, SOURCE, "switch");
        active.current = namespace.to_string();
        if active.scopes > 0 {
            active.restore = namespace.to_string();
        }
    }

    pub fn enter(&self, namespace: &str) {
        let mut active = mutex_lock(&self.active, SOURCE, "enter");
        if active.scopes == 0 {
            active.restore = active.current.clone();
        }
        active.scopes += 1;
        active.current = namespace.to_string();
    }

    pub fn leave(&self) {
        let mut active = mutex_lock(&self.active, SOURCE, "leave");
        active.scopes = active.scopes.saturating_sub(1);
        if active.scopes == 0 {
            active.current = active.restore.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_in_host_namespace() {
        let registry = NamespaceRegistry::new();
        assert_eq!(registry.current(), HOST_NAMESPACE);
        assert!(registry.is_configured(HOST_NAMESPACE));
        assert!(!registry.is_configured("slugger"));
    }

    #[test]
    fn configure_and_switch() {
        let registry = NamespaceRegistry::new();
        let settings = CacheSettings {
            ttl: Duration::from_secs(60),
            key_prefix: "slugger_test_".into(),
            ..CacheSettings::default()
        };
        registry.configure("SluggerTest", settings.clone());
        registry.switch("SluggerTest");

        assert_eq!(registry.current(), "SluggerTest");
        assert_eq!(registry.settings("SluggerTest"), settings);
        assert_eq!(registry.settings("unknown"), CacheSettings::default());
    }

    #[test]
    fn interleaved_scopes_restore_the_outer_namespace() {
        let registry = NamespaceRegistry::new();
        registry.enter("slugger");
        registry.enter("slugger");
        registry.leave();
        assert_eq!(registry.current(), "slugger");
        registry.enter("SluggerTest");
        registry.leave();
        registry.leave();
        assert_eq!(registry.current(), HOST_NAMESPACE);
    }

    #[test]
    fn switching_inside_a_scope_sticks_after_it() {
        let registry = NamespaceRegistry::new();
        registry.enter("slugger");
        registry.switch("views");
        registry.leave();
        assert_eq!(registry.current(), "views");
    }
}
