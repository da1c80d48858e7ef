pub mod cache;
pub mod database;
mod lock;
pub mod repositories;
pub mod routing;
pub mod time;
pub mod util;
