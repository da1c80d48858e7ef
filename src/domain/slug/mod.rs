pub mod collision;
pub mod repository;
pub mod table;
pub mod value_objects;

pub use collision::{CollisionResolver, group_key};
pub use repository::{SlugSourceRepository, SourceSchema};
pub use table::SlugTable;
pub use value_objects::{PrimaryKey, SlugRow, SourceName};
