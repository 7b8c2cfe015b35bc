//! Scan-and-splice expansion of placeholder tokens in a text field

use serde_json::Value as JsonValue;

use super::error::PlaceholderError;
use super::resolver::{LoopContext, Namespace, Resolver};

const CLOSING_MARKER: &str = "}}";

/// How unresolved tokens are handled, per namespace
///
/// A tolerated failure is logged and the token is replaced by an empty string.
/// Otherwise the failure aborts expansion of the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceholderPolicy {
    pub ignore_missing_args: bool,
    pub ignore_missing_data: bool,
}

impl PlaceholderPolicy {
    /// Every failure is fatal
    pub fn strict() -> Self {
        Self::default()
    }

    /// Every failure degrades to an empty substitution
    pub fn permissive() -> Self {
        Self {
            ignore_missing_args: true,
            ignore_missing_data: true,
        }
    }

    pub fn with_ignore_missing_args(mut self, ignore: bool) -> Self {
        self.ignore_missing_args = ignore;
        self
    }

    pub fn with_ignore_missing_data(mut self, ignore: bool) -> Self {
        self.ignore_missing_data = ignore;
        self
    }

    /// Whether failures in `namespace` are tolerated
    pub fn tolerates(&self, namespace: Namespace) -> bool {
        match namespace {
            Namespace::Args => self.ignore_missing_args,
            Namespace::Data => self.ignore_missing_data,
        }
    }
}

/// Everything a single expansion call looks values up in
#[derive(Debug, Clone, Copy)]
pub struct ExpansionContext<'a> {
    pub component: &'a str,
    pub data: &'a JsonValue,
    pub args: &'a JsonValue,
    pub loop_ctx: LoopContext,
    pub policy: PlaceholderPolicy,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(component: &'a str, data: &'a JsonValue, args: &'a JsonValue) -> Self {
        Self {
            component,
            data,
            args,
            loop_ctx: LoopContext::default(),
            policy: PlaceholderPolicy::default(),
        }
    }

    pub fn with_loop(mut self, loop_ctx: LoopContext) -> Self {
        self.loop_ctx = loop_ctx;
        self
    }

    pub fn with_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn resolver(&self, namespace: Namespace) -> Resolver<'a> {
        let root = match namespace {
            Namespace::Args => self.args,
            Namespace::Data => self.data,
        };
        Resolver::new(namespace, root, self.loop_ctx, self.component)
    }
}

/// Expand all placeholder tokens and loop markers in `text`
///
/// `args` tokens are expanded first, then `data` tokens, each in a single
/// forward pass. Finally the loop markers are replaced literally with their
/// 1-based values (`@index_0` stays 0-based).
pub fn expand(text: &str, ctx: &ExpansionContext<'_>) -> Result<String, PlaceholderError> {
    let mut result = text.to_string();

    for namespace in Namespace::ORDER {
        result = expand_namespace(result, &ctx.resolver(namespace), ctx.policy)?;
    }

    Ok(replace_loop_markers(&result, ctx.loop_ctx))
}

fn expand_namespace(
    mut text: String,
    resolver: &Resolver<'_>,
    policy: PlaceholderPolicy,
) -> Result<String, PlaceholderError> {
    let namespace = resolver.namespace();
    let opening = namespace.opening_marker();
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(opening) {
        let start = cursor + found;
        let path_start = start + opening.len();
        let Some(path_len) = text[path_start..].find(CLOSING_MARKER) else {
            // Unterminated token: leave the rest of the text as is
            break;
        };
        let path_end = path_start + path_len;

        let replacement = match resolver.resolve(&text[path_start..path_end]) {
            Ok(value) => value,
            Err(err) if policy.tolerates(namespace) => {
                tracing::warn!(
                    namespace = %namespace,
                    token = err.token(),
                    component = err.component(),
                    "{}",
                    err
                );
                String::new()
            }
            Err(err) => return Err(err),
        };

        text.replace_range(start..path_end + CLOSING_MARKER.len(), &replacement);
        cursor = start + replacement.len();
    }

    Ok(text)
}

fn replace_loop_markers(text: &str, loop_ctx: LoopContext) -> String {
    // `@index_0` first, `@index` would otherwise eat its prefix
    text.replace("@index_0", &loop_ctx.index.to_string())
        .replace("@index", &one_based(loop_ctx.index))
        .replace("@column", &one_based(loop_ctx.column))
        .replace("@row", &one_based(loop_ctx.row))
}

/// `position + 1` as text; widened so `usize::MAX` cannot overflow
fn one_based(position: usize) -> String {
    (position as u128 + 1).to_string()
}
