//! Route declarations.
//!
//! A [`Route`] binds a path pattern and a unique name to a [`ViewProvider`]
//! and some [`RouteMeta`]. Patterns are made of literal segments and named
//! parameters written as `:name`.

use crate::component::ViewProvider;
use crate::error::{InvalidPathSnafu, MissingParamSnafu, Result};
use snafu::ensure;
use std::collections::BTreeMap;
use std::fmt;

/// Parameters captured from dynamic path segments.
pub type Params = BTreeMap<String, String>;

/// Metadata attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Page title shown in front of the application name.
    pub title: Option<String>,
}

impl RouteMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// The title if it is present and not empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path pattern such as `/equipment/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self> {
        ensure!(raw.starts_with('/'), InvalidPathSnafu { path: raw });

        let normalized = normalize_path(raw);
        let segments = split_segments(&normalized)
            .map(|s| match s.strip_prefix(':') {
                Some(name) if !name.is_empty() => Ok(Segment::Param(name.to_string())),
                Some(_) => InvalidPathSnafu { path: raw }.fail(),
                None => Ok(Segment::Literal(s.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: normalized,
            segments,
        })
    }

    /// The `/` pattern.
    pub fn root() -> Self {
        Self {
            raw: "/".to_string(),
            segments: Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The pattern with every parameter name erased. Two patterns with the
    /// same shape match exactly the same paths.
    pub fn shape(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(lit) => format!("/{lit}"),
                Segment::Param(_) => "/:".to_string(),
            })
            .collect()
    }

    /// Match a normalized path, capturing parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut params = Params::new();
        let mut parts = split_segments(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// Build a concrete path by substituting parameters.
    pub fn build(&self, route_name: &str, params: &Params) -> Result<String> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(lit) => path.push_str(lit),
                Segment::Param(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty());
                    let value = match value {
                        Some(value) => value,
                        None => {
                            return MissingParamSnafu {
                                name: route_name,
                                param: name.as_str(),
                            }
                            .fail()
                        }
                    };
                    path.push_str(value);
                }
            }
        }
        Ok(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip query and fragment, collapse repeated slashes and drop a
/// trailing slash. Empty input becomes `/`.
pub fn normalize_path(target: &str) -> String {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    let segments: Vec<&str> = split_segments(target[..end].trim()).collect();
    format!("/{}", segments.join("/"))
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A single entry of the route table.
#[derive(Clone)]
pub struct Route {
    pub(crate) pattern: PathPattern,
    pub name: String,
    pub view: ViewProvider,
    pub meta: RouteMeta,
}

impl Route {
    pub fn new(path: &str, name: impl Into<String>, view: ViewProvider) -> Result<Self> {
        Ok(Self {
            pattern: PathPattern::parse(path)?,
            name: name.into(),
            view,
            meta: RouteMeta::default(),
        })
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.pattern.as_str())
            .field("name", &self.name)
            .field("view", &self.view)
            .field("meta", &self.meta)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/equipment/"), "/equipment");
        assert_eq!(normalize_path("/equipment?page=2#top"), "/equipment");
        assert_eq!(normalize_path("reservations"), "/reservations");
        assert_eq!(normalize_path("?tab=1"), "/");
        assert_eq!(normalize_path("//equipment///ICP-MS-01/"), "/equipment/ICP-MS-01");
    }

    #[test]
    fn test_pattern_shape_ignores_param_names() {
        let by_id = PathPattern::parse("/equipment/:id").unwrap();
        let by_code = PathPattern::parse("/equipment/:code").unwrap();
        assert_eq!(by_id.shape(), "/equipment/:");
        assert_eq!(by_id.shape(), by_code.shape());
        assert_eq!(PathPattern::parse("/a//b").unwrap().as_str(), "/a/b");
        assert_eq!(PathPattern::root().shape(), "/");
    }

    #[test]
    fn test_pattern_literal_match() {
        let pattern = PathPattern::parse("/laboratories").unwrap();
        assert_eq!(pattern.matches("/laboratories"), Some(Params::new()));
        assert_eq!(pattern.matches("/laboratories/3"), None);
        assert_eq!(pattern.matches("/"), None);
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/equipment").is_none());
        assert_eq!(pattern.build("Home", &Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_pattern_captures_params() {
        let pattern = PathPattern::parse("/equipment/:id").unwrap();
        let params = pattern.matches("/equipment/ICP-MS-01").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("ICP-MS-01"));

        let path = pattern.build("EquipmentDetail", &params).unwrap();
        assert_eq!(path, "/equipment/ICP-MS-01");
    }

    #[test]
    fn test_build_missing_param() {
        let pattern = PathPattern::parse("/equipment/:id").unwrap();
        let err = pattern.build("EquipmentDetail", &Params::new()).unwrap_err();
        assert!(matches!(err, crate::Error::MissingParam { .. }));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("equipment"),
            Err(crate::Error::InvalidPath { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/equipment/:"),
            Err(crate::Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_meta_empty_title_is_absent() {
        assert_eq!(RouteMeta::titled("").title(), None);
        assert_eq!(RouteMeta::titled("首页").title(), Some("首页"));
        assert_eq!(RouteMeta::new().title(), None);
    }
}
