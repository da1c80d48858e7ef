//! Path templates such as `/:controller/:action/:id/*`.
//!
//! | Template                      | Path                          | Result                                   |
//! |-------------------------------|-------------------------------|------------------------------------------|
//! | `/:controller/:action/*`      | `/posts/view/a/b`             | elements `controller`, `action`; pass `a`, `b` |
//! | `/:controller/:action/*`      | `/posts/view/page:2`          | named `page -> 2`                         |
//! | `/:controller/:action/:id/*`  | `/posts/view/7`               | element `id -> 7`                         |
//!
//! Trailing slashes are ignored on both templates and paths.

use std::collections::BTreeSet;

use crate::application::ports::router::PathRouter;
use crate::domain::route::{RouteParams, UrlParams};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Element(String),
}

/// A [`PathRouter`] driven by a path template. Static segments must match
/// exactly, `:name` segments capture a route element and a trailing `*`
/// accepts any number of passed (`value`) or named (`key:value`) arguments.
#[derive(Debug, Clone)]
pub struct TemplateRoute {
    segments: Vec<Segment>,
    greedy: bool,
    pass: Vec<String>,
}

impl TemplateRoute {
    pub fn new(template: &str) -> Self {
        let template = template.trim_end_matches('/');
        let (template, greedy) = match template.strip_suffix("/*") {
            Some(prefix) => (prefix, true),
            None if template == "*" => ("", true),
            None => (template, false),
        };
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Element(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();

        Self {
            segments,
            greedy,
            pass: Vec::new(),
        }
    }

    /// Route elements whose captured values are also prepended to the
    /// passed arguments, in the given order.
    #[must_use]
    pub fn pass<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass = elements.into_iter().map(Into::into).collect();
        self
    }

    fn element_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Element(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }
}

fn named_arg(segment: &str) -> Option<(&str, &str)> {
    segment
        .split_once(':')
        .filter(|(key, _)| !key.is_empty())
}

impl PathRouter for TemplateRoute {
    fn parse(&self, path: &str) -> Option<RouteParams> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() < self.segments.len() || (!self.greedy && parts.len() > self.segments.len())
        {
            return None;
        }

        let mut params = RouteParams::default();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Static(expected) if expected == part => {}
                Segment::Static(_) => return None,
                Segment::Element(name) => {
                    params.elements.insert(name.clone(), (*part).to_string());
                }
            }
        }

        for part in &parts[self.segments.len()..] {
            match named_arg(part) {
                Some((key, value)) => {
                    params.named.insert(key.to_string(), value.to_string());
                }
                None => params.pass.push((*part).to_string()),
            }
        }

        let mut passed: Vec<String> = self
            .pass
            .iter()
            .filter_map(|name| params.elements.get(name).cloned())
            .collect();
        passed.append(&mut params.pass);
        params.pass = passed;
        Some(params)
    }

    fn build(&self, url: &UrlParams) -> Option<String> {
        let elements: BTreeSet<&str> = self.element_names().collect();
        let mut parts = Vec::with_capacity(self.segments.len() + url.pass.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(value) => parts.push(value.clone()),
                Segment::Element(name) => parts.push(url.keyed.get(name)?.clone()),
            }
        }

        let named: Vec<String> = url
            .keyed
            .iter()
            .filter(|(key, _)| !elements.contains(key.as_str()))
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        if !self.greedy && (!url.pass.is_empty() || !named.is_empty()) {
            return None;
        }
        parts.extend(url.pass.iter().cloned());
        parts.extend(named);

        Some(format!("/{}", parts.join("/")))
    }
}
