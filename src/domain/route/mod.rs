pub mod options;
pub mod params;

pub use options::{BindingMode, ParamTarget, RouteOptions, SourceConfig, SourceOptions};
pub use params::{RouteParams, UrlParams};
