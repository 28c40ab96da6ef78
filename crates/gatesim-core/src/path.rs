//! Hierarchical `parent::child` vertex names.
//!
//! Every vertex in a merged graph carries the namespaces of all the graphs
//! it passed through, outermost first. Callers rarely spell the full path:
//! a partial name resolves to the single vertex whose name ends with the
//! query's segments (see [`expand`]).

use std::fmt;

use crate::error::GraphError;

/// Separator between path segments.
pub const SEPARATOR: &str = "::";

/// A `::`-segmented vertex name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Split a `::`-joined name into segments.
    pub fn parse(name: &str) -> Self {
        Self {
            segments: name.split(SEPARATOR).map(str::to_owned).collect(),
        }
    }

    /// Path segments, outermost namespace first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The innermost segment (the vertex's own local name).
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// This name moved under `namespace`.
    pub fn qualified(&self, namespace: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(namespace.to_owned());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// Whether this name ends with the segments of `query`, in order.
    pub fn matches(&self, query: &QualifiedName) -> bool {
        self.segments.ends_with(&query.segments)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(SEPARATOR))
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

/// Resolve a partial name against candidate full names.
///
/// A candidate matches when the query is a suffix of it, so `D0::Q` finds
/// `FD::D0::Q` but `Q::D0` finds nothing.
///
/// # Errors
///
/// - [`GraphError::VertexNotFound`] if nothing matches
/// - [`GraphError::AmbiguousReference`] if more than one candidate matches
pub fn expand<'a, I>(query: &QualifiedName, candidates: I) -> Result<&'a QualifiedName, GraphError>
where
    I: IntoIterator<Item = &'a QualifiedName>,
{
    let matched: Vec<&QualifiedName> = candidates
        .into_iter()
        .filter(|candidate| candidate.matches(query))
        .collect();

    match matched.as_slice() {
        [] => Err(GraphError::VertexNotFound(query.to_string())),
        [single] => Ok(*single),
        many => Err(GraphError::AmbiguousReference {
            query: query.to_string(),
            matches: many.iter().map(ToString::to_string).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name = QualifiedName::parse("FD::D0::Q");
        assert_eq!(name.segments(), ["FD", "D0", "Q"]);
        assert_eq!(name.leaf(), "Q");
        assert_eq!(name.to_string(), "FD::D0::Q");
    }

    #[test]
    fn test_qualified_prepends_namespace() {
        let name = QualifiedName::parse("HA0::A").qualified("FA");
        assert_eq!(name.to_string(), "FA::HA0::A");
    }

    #[test]
    fn test_matches_is_suffix() {
        let full = QualifiedName::parse("ADD::FA0::HA1::S");
        assert!(full.matches(&"HA1::S".into()));
        assert!(full.matches(&"ADD::FA0::HA1::S".into()));
        assert!(!full.matches(&"FA0::S".into()));
        assert!(!full.matches(&"S::HA1".into()));
        assert!(!full.matches(&"HA0::S".into()));
    }

    #[test]
    fn test_expand_prefers_suffix_over_namespace() {
        // The enclosing namespace shares the leaf's name.
        let names: Vec<QualifiedName> = vec!["NOT::A".into(), "NOT::X".into(), "NOT::NOT".into()];
        assert_eq!(expand(&"NOT".into(), &names).unwrap().to_string(), "NOT::NOT");
    }

    #[test]
    fn test_expand_unique() {
        let names: Vec<QualifiedName> = vec!["FD::D0::Q".into(), "FD::D1::Q".into()];
        let found = expand(&"D1::Q".into(), &names).unwrap();
        assert_eq!(found.to_string(), "FD::D1::Q");
    }

    #[test]
    fn test_expand_ambiguous() {
        let names: Vec<QualifiedName> = vec!["FD::D0::Q".into(), "FD::D1::Q".into()];
        let err = expand(&"Q".into(), &names).unwrap_err();
        assert_eq!(
            err,
            GraphError::AmbiguousReference {
                query: "Q".into(),
                matches: vec!["FD::D0::Q".into(), "FD::D1::Q".into()],
            }
        );
    }

    #[test]
    fn test_expand_not_found() {
        let names: Vec<QualifiedName> = vec!["FD::D0::Q".into()];
        assert_eq!(
            expand(&"D2::Q".into(), &names),
            Err(GraphError::VertexNotFound("D2::Q".into()))
        );
    }
}
