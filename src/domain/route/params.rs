use std::collections::BTreeMap;

/// Result of parsing an incoming path: route elements (`controller`,
/// `action`, template captures), passed arguments and `key:value` named
/// arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub elements: BTreeMap<String, String>,
    pub pass: Vec<String>,
    pub named: BTreeMap<String, String>,
}

impl RouteParams {
    pub fn element(&self, name: &str) -> Option<&str> {
        self.elements.get(name).map(String::as_str)
    }
}

/// Parameters used to build an outgoing path. Keyed entries hold route
/// elements and named arguments alike; the router decides which is which.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    pub keyed: BTreeMap<String, String>,
    pub pass: Vec<String>,
}

impl UrlParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.keyed.insert(key.into(), value.to_string());
        self
    }

    #[must_use]
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.pass.push(value.to_string());
        self
    }
}
