pub mod slug_cache;
pub mod slug_table;
pub mod sluggable_route;

pub use slug_cache::{DEFAULT_NAMESPACE, NamespaceScope, SlugCache};
pub use slug_table::SlugTableBuilder;
pub use sluggable_route::{RouteRequest, SluggableRoute, SluggableRouteBuilder};
