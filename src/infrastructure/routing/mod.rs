mod template;

pub use template::TemplateRoute;
