//! Error types for placeholder resolution

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::resolver::Namespace;

/// Why a single traversal step failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupFailure {
    /// Mapping has no member with this key
    #[error("no key '{key}'")]
    NoSuchKey { key: String },

    /// Sequence index past the end
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Segment used against a sequence is not a non-negative integer
    #[error("'{key}' is not a valid sequence index")]
    NotAnIndex { key: String },

    /// Tried to descend into a scalar or null
    #[error("cannot look up '{key}' in a {kind}")]
    NotAContainer { key: String, kind: &'static str },
}

/// Errors raised while expanding placeholder tokens
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaceholderError {
    /// An `{{args.…}}` token did not resolve
    #[error("can't find argument {token} for component '{component}': {reason}")]
    MissingArgument {
        token: String,
        component: String,
        reason: LookupFailure,
    },

    /// A `{{data.…}}` token did not resolve
    #[error("can't find data {token} for component '{component}': {reason}")]
    MissingData {
        token: String,
        component: String,
        reason: LookupFailure,
    },

    /// The token resolved to something other than a string or number
    #[error("{namespace} lookup {token} for component '{component}' is not a string or number (found {})", json_kind(.value))]
    InvalidValueType {
        namespace: Namespace,
        token: String,
        component: String,
        value: JsonValue,
    },
}

impl PlaceholderError {
    /// Create the missing-value error matching a namespace
    pub fn missing(
        namespace: Namespace,
        token: impl Into<String>,
        component: impl Into<String>,
        reason: LookupFailure,
    ) -> Self {
        let token = token.into();
        let component = component.into();
        match namespace {
            Namespace::Args => Self::MissingArgument {
                token,
                component,
                reason,
            },
            Namespace::Data => Self::MissingData {
                token,
                component,
                reason,
            },
        }
    }

    /// Namespace the failing token belongs to
    pub fn namespace(&self) -> Namespace {
        match self {
            Self::MissingArgument { .. } => Namespace::Args,
            Self::MissingData { .. } => Namespace::Data,
            Self::InvalidValueType { namespace, .. } => *namespace,
        }
    }

    /// The full token text, e.g. `{{data.items.0}}`
    pub fn token(&self) -> &str {
        match self {
            Self::MissingArgument { token, .. }
            | Self::MissingData { token, .. }
            | Self::InvalidValueType { token, .. } => token,
        }
    }

    /// Component that triggered the lookup
    pub fn component(&self) -> &str {
        match self {
            Self::MissingArgument { component, .. }
            | Self::MissingData { component, .. }
            | Self::InvalidValueType { component, .. } => component,
        }
    }
}

/// Human-readable name of a JSON value's variant
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "sequence",
        JsonValue::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_picks_variant_from_namespace() {
        let reason = LookupFailure::NoSuchKey {
            key: "x".to_string(),
        };
        let err = PlaceholderError::missing(Namespace::Args, "{{args.x}}", "btn", reason.clone());
        assert!(matches!(err, PlaceholderError::MissingArgument { .. }));
        assert_eq!(err.namespace(), Namespace::Args);

        let err = PlaceholderError::missing(Namespace::Data, "{{data.x}}", "btn", reason);
        assert!(matches!(err, PlaceholderError::MissingData { .. }));
        assert_eq!(err.token(), "{{data.x}}");
        assert_eq!(err.component(), "btn");
    }

    #[test]
    fn test_display_names_token_and_component() {
        let err = PlaceholderError::missing(
            Namespace::Data,
            "{{data.items.4}}",
            "label_1",
            LookupFailure::IndexOutOfRange { index: 4, len: 2 },
        );
        let message = err.to_string();
        assert!(message.contains("{{data.items.4}}"));
        assert!(message.contains("label_1"));
        assert!(message.contains("out of range"));
    }

    #[test]
    fn test_invalid_value_type_display() {
        let err = PlaceholderError::InvalidValueType {
            namespace: Namespace::Args,
            token: "{{args.colors}}".to_string(),
            component: "fader".to_string(),
            value: json!(["red"]),
        };
        assert!(err.to_string().contains("found sequence"));
        assert!(err.to_string().starts_with("args lookup"));
    }
}
