pub mod errors;
pub mod route;
pub mod slug;
