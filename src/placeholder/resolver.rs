//! Path lookup of a single placeholder inside a JSON tree

use std::fmt;

use serde_json::Value as JsonValue;

use super::error::{json_kind, LookupFailure, PlaceholderError};

/// The two token namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Per-instance `arguments` of the current component
    Args,
    /// The description's shared `data` tree
    Data,
}

impl Namespace {
    /// Namespaces in expansion order: arguments before data
    pub const ORDER: [Namespace; 2] = [Namespace::Args, Namespace::Data];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Args => "args",
            Namespace::Data => "data",
        }
    }

    /// Opening marker of a token in this namespace, e.g. `{{data.`
    pub fn opening_marker(&self) -> &'static str {
        match self {
            Namespace::Args => "{{args.",
            Namespace::Data => "{{data.",
        }
    }

    /// Rebuild the full token text for a path
    pub fn token(&self, path: &str) -> String {
        format!("{}{}}}}}", self.opening_marker(), path)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a component inside a repeated group (all 0-based)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopContext {
    pub index: usize,
    pub column: usize,
    pub row: usize,
}

impl LoopContext {
    pub fn new(index: usize, column: usize, row: usize) -> Self {
        Self { index, column, row }
    }

    /// Loop value for a path segment, if the segment is a loop marker
    pub fn marker_value(&self, segment: &str) -> Option<usize> {
        match segment {
            "@index" => Some(self.index),
            "@column" => Some(self.column),
            "@row" => Some(self.row),
            _ => None,
        }
    }
}

/// Resolves dotted paths of one namespace against one root tree
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    namespace: Namespace,
    root: &'a JsonValue,
    loop_ctx: LoopContext,
    component: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(
        namespace: Namespace,
        root: &'a JsonValue,
        loop_ctx: LoopContext,
        component: &'a str,
    ) -> Self {
        Self {
            namespace,
            root,
            loop_ctx,
            component,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Resolve `path` (the text between `{{ns.` and `}}`) to its string form
    pub fn resolve(&self, path: &str) -> Result<String, PlaceholderError> {
        let mut current = self.root;

        for segment in path.split('.') {
            let key = match self.loop_ctx.marker_value(segment) {
                Some(value) => value.to_string(),
                None => segment.to_string(),
            };
            current = step(current, &key).map_err(|reason| {
                PlaceholderError::missing(
                    self.namespace,
                    self.namespace.token(path),
                    self.component,
                    reason,
                )
            })?;
        }

        scalar_to_string(current).ok_or_else(|| PlaceholderError::InvalidValueType {
            namespace: self.namespace,
            token: self.namespace.token(path),
            component: self.component.to_string(),
            value: current.clone(),
        })
    }
}

/// Descend one level into a mapping or sequence
fn step<'v>(current: &'v JsonValue, key: &str) -> Result<&'v JsonValue, LookupFailure> {
    match current {
        JsonValue::Object(map) => map.get(key).ok_or_else(|| LookupFailure::NoSuchKey {
            key: key.to_string(),
        }),
        JsonValue::Array(items) => {
            let index = parse_index(key).ok_or_else(|| LookupFailure::NotAnIndex {
                key: key.to_string(),
            })?;
            items.get(index).ok_or(LookupFailure::IndexOutOfRange {
                index,
                len: items.len(),
            })
        }
        other => Err(LookupFailure::NotAContainer {
            key: key.to_string(),
            kind: json_kind(other),
        }),
    }
}

/// Strict sequence index: ASCII digits only, no sign or whitespace
fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(namespace: Namespace, root: &JsonValue, path: &str) -> Result<String, PlaceholderError> {
        Resolver::new(namespace, root, LoopContext::default(), "test").resolve(path)
    }

    #[test]
    fn test_resolve_nested_mapping() {
        let data = json!({ "mixer": { "master": { "label": "Main" } } });
        assert_eq!(resolve(Namespace::Data, &data, "mixer.master.label").unwrap(), "Main");
    }

    #[test]
    fn test_resolve_sequence_index() {
        let data = json!({ "items": ["A", "B", "C"] });
        assert_eq!(resolve(Namespace::Data, &data, "items.2").unwrap(), "C");
    }

    #[test]
    fn test_resolve_numbers() {
        let data = json!({ "int": 42, "neg": -3, "float": 0.25, "whole": 7.0 });
        assert_eq!(resolve(Namespace::Data, &data, "int").unwrap(), "42");
        assert_eq!(resolve(Namespace::Data, &data, "neg").unwrap(), "-3");
        assert_eq!(resolve(Namespace::Data, &data, "float").unwrap(), "0.25");
        assert_eq!(resolve(Namespace::Data, &data, "whole").unwrap(), "7.0");
    }

    #[test]
    fn test_loop_markers_select_elements() {
        let data = json!({ "grid": [["a", "b"], ["c", "d"]], "names": ["x", "y", "z"] });
        let ctx = LoopContext::new(2, 1, 0);

        let resolver = Resolver::new(Namespace::Data, &data, ctx, "cell");
        assert_eq!(resolver.resolve("grid.@row.@column").unwrap(), "b");
        assert_eq!(resolver.resolve("names.@index").unwrap(), "z");
    }

    #[test]
    fn test_loop_marker_matches_numeric_mapping_key() {
        let args = json!({ "labels": { "0": "zero", "1": "one" } });
        let resolver = Resolver::new(Namespace::Args, &args, LoopContext::new(1, 0, 0), "btn");
        assert_eq!(resolver.resolve("labels.@index").unwrap(), "one");
    }

    #[test]
    fn test_missing_key_fails_with_namespace_error() {
        let tree = json!({ "a": { "b": "c" } });

        let err = resolve(Namespace::Data, &tree, "a.x").unwrap_err();
        assert_eq!(
            err,
            PlaceholderError::MissingData {
                token: "{{data.a.x}}".to_string(),
                component: "test".to_string(),
                reason: LookupFailure::NoSuchKey {
                    key: "x".to_string()
                },
            }
        );

        let err = resolve(Namespace::Args, &tree, "nope").unwrap_err();
        assert!(matches!(err, PlaceholderError::MissingArgument { .. }));
    }

    #[test]
    fn test_out_of_range_index() {
        let data = json!({ "items": ["A", "B"] });
        let err = resolve(Namespace::Data, &data, "items.2").unwrap_err();
        assert!(matches!(
            err,
            PlaceholderError::MissingData {
                reason: LookupFailure::IndexOutOfRange { index: 2, len: 2 },
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_index_is_rejected() {
        let data = json!({ "items": ["A", "B"] });
        for bad in ["first", "-1", "+1", " 1", ""] {
            let err = resolve(Namespace::Data, &data, &format!("items.{}", bad)).unwrap_err();
            assert!(
                matches!(
                    err,
                    PlaceholderError::MissingData {
                        reason: LookupFailure::NotAnIndex { .. },
                        ..
                    }
                ),
                "segment {:?} should not be an index",
                bad
            );
        }
    }

    #[test]
    fn test_descending_into_scalar_fails() {
        let data = json!({ "title": "Mixer" });
        let err = resolve(Namespace::Data, &data, "title.length").unwrap_err();
        assert!(matches!(
            err,
            PlaceholderError::MissingData {
                reason: LookupFailure::NotAContainer { kind: "string", .. },
                ..
            }
        ));
    }

    #[test]
    fn test_non_scalar_result_is_invalid_value_type() {
        let data = json!({ "items": ["A"], "page": { "name": "one" }, "on": true, "nothing": null });
        for path in ["items", "page", "on", "nothing"] {
            let err = resolve(Namespace::Data, &data, path).unwrap_err();
            match err {
                PlaceholderError::InvalidValueType {
                    namespace, value, ..
                } => {
                    assert_eq!(namespace, Namespace::Data);
                    assert_eq!(value, data[path]);
                }
                other => panic!("expected InvalidValueType for {}, got {:?}", path, other),
            }
        }
    }

    #[test]
    fn test_token_text() {
        assert_eq!(Namespace::Args.token("a.b"), "{{args.a.b}}");
        assert_eq!(Namespace::Data.token("@index"), "{{data.@index}}");
    }
}
