use crate::handler::{RequestHead, ResponseHeaders};
use serde::Deserialize;
use serde::de::Deserializer;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Produces a directive value while a request is being handled
///
/// Implementations must not block. The returned string is inserted as-is,
/// so it must not contain `;` or `,`.
pub trait DynamicSource: Send + Sync {
    fn resolve(&self, req: &RequestHead, res: &dyn ResponseHeaders) -> String;
}

impl<F> DynamicSource for F
where
    F: Fn(&RequestHead, &dyn ResponseHeaders) -> String + Send + Sync,
{
    fn resolve(&self, req: &RequestHead, res: &dyn ResponseHeaders) -> String {
        self(req, res)
    }
}

/// One source expression of a directive
#[derive(Clone)]
pub enum Source {
    Literal(String),
    Dynamic(Arc<dyn DynamicSource>),
}

impl Source {
    pub fn dynamic(source: impl DynamicSource + 'static) -> Self {
        Self::Dynamic(Arc::new(source))
    }

    /// Wraps a closure evaluated for every request.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestHead, &dyn ResponseHeaders) -> String + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Dynamic(_) => None,
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Dynamic(a), Self::Dynamic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

/// Value of one directive in a [`Directives`] map
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveValue {
    /// Drop this directive from the defaults. Not allowed for `default-src`.
    Unset,
    /// Allow the policy to have no `default-src`. Only valid on `default-src`.
    DangerouslyDisableDefaultSrc,
    Sources(Vec<Source>),
}

impl DirectiveValue {
    pub fn sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        Self::Sources(sources.into_iter().map(Into::into).collect())
    }

    /// Converts a configuration value.
    ///
    /// `null` unsets, a string is a single source, an array lists sources and
    /// `{"dangerouslyDisableDefaultSrc": true}` is the default-src sentinel.
    fn from_json(name: &str, value: Value) -> Result<Self, String> {
        let invalid = |value: &Value| {
            format!(
                "Content-Security-Policy received an invalid directive value for {:?}: {}",
                name, value
            )
        };

        match value {
            Value::Null => Ok(Self::Unset),
            Value::String(ref source) if source.is_empty() => Err(invalid(&value)),
            Value::String(source) => Ok(Self::Sources(vec![Source::Literal(source)])),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(source) => Ok(Source::Literal(source)),
                    other => Err(invalid(&other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Sources),
            Value::Object(ref map)
                if map.len() == 1 && map.get("dangerouslyDisableDefaultSrc") == Some(&Value::Bool(true)) =>
            {
                Ok(Self::DangerouslyDisableDefaultSrc)
            }
            other => Err(invalid(&other)),
        }
    }
}

/// Ordered directive map. Names are kept exactly as given; normalization and
/// duplicate detection happen when a policy is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives(Vec<(String, DirectiveValue)>);

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directive with literal sources. An empty list renders the bare name.
    pub fn directive<I, S>(self, name: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        self.with_value(name, DirectiveValue::sources(sources))
    }

    pub fn with_value(mut self, name: impl Into<String>, value: DirectiveValue) -> Self {
        self.0.push((name.into(), value));
        self
    }

    pub fn unset(self, name: impl Into<String>) -> Self {
        self.with_value(name, DirectiveValue::Unset)
    }

    pub fn dangerously_disable_default_src(self) -> Self {
        self.with_value("default-src", DirectiveValue::DangerouslyDisableDefaultSrc)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<'de> Deserialize<'de> for Directives {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        map.into_iter()
            .map(|(name, value)| {
                DirectiveValue::from_json(&name, value)
                    .map(|value| (name, value))
                    .map_err(D::Error::custom)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Directives)
    }
}

/// The baseline policy, returned as a fresh copy on every call
pub fn get_default_directives() -> Directives {
    Directives::new()
        .directive("default-src", ["'self'"])
        .directive("base-uri", ["'self'"])
        .directive("font-src", ["'self'", "https:", "data:"])
        .directive("form-action", ["'self'"])
        .directive("frame-ancestors", ["'self'"])
        .directive("img-src", ["'self'", "data:"])
        .directive("object-src", ["'none'"])
        .directive("script-src", ["'self'"])
        .directive("script-src-attr", ["'none'"])
        .directive("style-src", ["'self'", "https:", "'unsafe-inline'"])
        .directive("upgrade-insecure-requests", Vec::<&str>::new())
}
