// src/domain/route/options.rs
use crate::domain::errors::DomainResult;
use crate::domain::slug::SourceName;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Where a source's identifier lives in the route parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamTarget {
    /// A passed argument by position.
    Positional(usize),
    /// A template element (`:post_id`) that is also passed.
    RouteElement(String),
    /// A `key:value` named argument.
    Named(String),
}

impl ParamTarget {
    /// Read the `param` option: absent means the first passed argument, a
    /// leading `:` selects a route element (or a position when numeric), and
    /// anything else names a named argument.
    pub fn parse(param: Option<&str>) -> Self {
        match param {
            None => Self::Positional(0),
            Some(raw) => match raw.strip_prefix(':') {
                Some(element) => match element.parse::<usize>() {
                    Ok(position) => Self::Positional(position),
                    Err(_) => Self::RouteElement(element.to_string()),
                },
                None => Self::Named(raw.to_string()),
            },
        }
    }
}

/// How matched slugs are folded back into parsed parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingMode {
    /// Bind into the location chosen by each source's `param` option.
    #[default]
    Param,
    /// Bind every source to the named key equal to its name; incoming slugs
    /// are replaced by a trailing `Source:pk` passed argument.
    PassedArgs,
}

/// Per-source options as written by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceOptions {
    pub slug_field: Option<String>,
    pub param: Option<String>,
}

impl SourceOptions {
    #[must_use]
    pub fn slug_field(mut self, field: impl Into<String>) -> Self {
        self.slug_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: SourceName,
    pub options: SourceOptions,
}

impl SourceConfig {
    pub fn target(&self, binding: BindingMode) -> ParamTarget {
        match binding {
            BindingMode::Param => ParamTarget::parse(self.options.param.as_deref()),
            BindingMode::PassedArgs => ParamTarget::Named(self.name.as_str().to_string()),
        }
    }

    pub fn slug_field(&self) -> Option<&str> {
        self.options.slug_field.as_deref()
    }
}

/// Static configuration of a sluggable route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptions {
    #[serde(deserialize_with = "deserialize_models")]
    pub models: Vec<SourceConfig>,
    pub prepend_pk: bool,
    pub auto_invalidate: bool,
    pub require_match: bool,
    pub binding: BindingMode,
}

impl RouteOptions {
    /// Options slugging the given sources with default per-source settings.
    pub fn for_models<I, S>(names: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models = names
            .into_iter()
            .map(|name| {
                Ok(SourceConfig {
                    name: SourceName::new(name)?,
                    options: SourceOptions::default(),
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Self {
            models,
            ..Self::default()
        })
    }

    pub fn with_model(mut self, name: SourceName, options: SourceOptions) -> Self {
        self.models.retain(|model| model.name != name);
        self.models.push(SourceConfig { name, options });
        self
    }

    pub fn with_prepend_pk(mut self, prepend_pk: bool) -> Self {
        self.prepend_pk = prepend_pk;
        self
    }

    pub fn with_auto_invalidate(mut self, auto_invalidate: bool) -> Self {
        self.auto_invalidate = auto_invalidate;
        self
    }

    pub fn with_require_match(mut self, require_match: bool) -> Self {
        self.require_match = require_match;
        self
    }

    pub fn with_binding(mut self, binding: BindingMode) -> Self {
        self.binding = binding;
        self
    }

    pub fn model(&self, name: &SourceName) -> Option<&SourceConfig> {
        self.models.iter().find(|model| &model.name == name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelsSpec {
    List(Vec<ModelEntry>),
    Map(BTreeMap<SourceName, SourceOptions>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelEntry {
    Name(SourceName),
    Configured(BTreeMap<SourceName, SourceOptions>),
}

fn deserialize_models<'de, D>(deserializer: D) -> Result<Vec<SourceConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<(SourceName, SourceOptions)> = match ModelsSpec::deserialize(deserializer)? {
        ModelsSpec::List(list) => list
            .into_iter()
            .flat_map(|entry| match entry {
                ModelEntry::Name(name) => vec![(name, SourceOptions::default())],
                ModelEntry::Configured(map) => map.into_iter().collect(),
            })
            .collect(),
        ModelsSpec::Map(map) => map.into_iter().collect(),
    };

    let mut models: Vec<SourceConfig> = Vec::with_capacity(entries.len());
    for (name, options) in entries {
        models.retain(|model| model.name != name);
        models.push(SourceConfig { name, options });
    }
    Ok(models)
}
