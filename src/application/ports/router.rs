// src/application/ports/router.rs
use crate::domain::route::{RouteParams, UrlParams};

/// The host's path matcher that a sluggable route wraps.
pub trait PathRouter: Send + Sync {
    /// Match a raw path. `None` lets other routes try it.
    fn parse(&self, path: &str) -> Option<RouteParams>;

    /// Render parameters back into a path. `None` when this route cannot
    /// express them.
    fn build(&self, url: &UrlParams) -> Option<String>;
}
