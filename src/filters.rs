//! Template filters available to every layout template
//!
//! - `placeholders`: expands `{{data.…}}`, `{{args.…}}` and loop markers
//! - `b64encode`: base64 of the UTF-8 text (TouchOSC stores names this way)
//! - `merge`: shallow merge of mappings, later keys win
//!
//! ```text
//! {% set arguments = component.default_arguments | merge(node.arguments) %}
//! <control name="{{ node.name | placeholders(component=node.name, args=arguments, index=i) | b64encode }}" />
//! ```

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use minijinja::value::{Kwargs, Rest, Value};
use minijinja::{Environment, Error, ErrorKind};
use serde_json::{Map, Value as JsonValue};

use crate::placeholder::{expand, ExpansionContext, LoopContext, Namespace, PlaceholderPolicy};

/// Component name used in diagnostics when the template passes none
const ANONYMOUS_COMPONENT: &str = "<anon>";

/// The `placeholders` filter, bound to one description's data tree
#[derive(Debug, Clone)]
pub struct PlaceholderFilter {
    data: JsonValue,
    policy: PlaceholderPolicy,
}

impl PlaceholderFilter {
    pub fn new(data: Option<&JsonValue>, policy: PlaceholderPolicy) -> Self {
        Self {
            data: data.cloned().unwrap_or(JsonValue::Null),
            policy,
        }
    }

    /// Expand `value`
    ///
    /// Keyword arguments: `component` (name for diagnostics), `args` (the
    /// component's arguments), `data` (overrides the description data),
    /// `index`, `column`, `row` (0-based loop position).
    pub fn apply(&self, value: &Value, kwargs: &Kwargs) -> Result<String, Error> {
        let text = value_to_text(value);

        let component: Option<Value> = kwargs.get("component")?;
        let data: Option<Value> = kwargs.get("data")?;
        let args: Option<Value> = kwargs.get("args")?;
        let index: Option<usize> = kwargs.get("index")?;
        let column: Option<usize> = kwargs.get("column")?;
        let row: Option<usize> = kwargs.get("row")?;
        kwargs.assert_all_used()?;

        let component = component
            .filter(|c| !c.is_undefined() && !c.is_none())
            .map(|c| value_to_text(&c))
            .unwrap_or_else(|| ANONYMOUS_COMPONENT.to_string());

        let data = match data {
            Some(data) => Cow::Owned(to_json(&data)?),
            None => Cow::Borrowed(&self.data),
        };
        // Only args tokens written in the field itself can reference arguments
        let args = match args {
            Some(args) if text.contains(Namespace::Args.opening_marker()) => to_json(&args)?,
            _ => JsonValue::Null,
        };

        let loop_ctx = LoopContext::new(index.unwrap_or(0), column.unwrap_or(0), row.unwrap_or(0));
        let ctx = ExpansionContext::new(&component, &data, &args)
            .with_loop(loop_ctx)
            .with_policy(self.policy);

        expand(&text, &ctx)
            .map_err(|err| Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err))
    }
}

/// Base64 (standard alphabet, padded) of the value's UTF-8 text
pub fn b64encode(value: Value) -> String {
    STANDARD.encode(value_to_text(&value).as_bytes())
}

/// Shallow left-to-right merge of mappings; `none` and undefined are skipped
pub fn merge(base: Value, rest: Rest<Value>) -> Result<Value, Error> {
    let mut merged = Map::new();

    for value in std::iter::once(&base).chain(rest.iter()) {
        if value.is_undefined() || value.is_none() {
            continue;
        }
        match to_json(value)? {
            JsonValue::Object(map) => merged.extend(map),
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("merge expects mappings, got {}", value.kind()),
                ))
            }
        }
    }

    Ok(Value::from_serialize(&merged))
}

/// Register all filters on `env`
pub fn register(env: &mut Environment<'_>, placeholders: PlaceholderFilter) {
    env.add_filter("placeholders", move |value: Value, kwargs: Kwargs| {
        placeholders.apply(&value, &kwargs)
    });
    env.add_filter("b64encode", b64encode);
    env.add_filter("merge", merge);
}

fn value_to_text(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

fn to_json(value: &Value) -> Result<JsonValue, Error> {
    serde_json::to_value(value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("value cannot be used as a lookup tree: {}", e),
        )
    })
}
