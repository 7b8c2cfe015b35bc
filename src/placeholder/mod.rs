//! Placeholder expansion for `{{data.…}}` / `{{args.…}}` tokens
//!
//! Template fields may reference values from two namespaces:
//!
//! - `data`: the description's shared, read-only `data` tree
//! - `args`: the `arguments` of the component currently being rendered
//!
//! Path segments may use the loop markers `@index`, `@column` and `@row`, which
//! are replaced by the (0-based) position of the component inside a repeated
//! group before the lookup. After both namespaces are expanded, the literal
//! markers left in the text are replaced by 1-based positions.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use touchosc_compiler::placeholder::{expand, ExpansionContext, LoopContext};
//!
//! let data = json!({ "channels": ["Kick", "Snare"] });
//! let args = json!({ "prefix": "CH" });
//! let ctx = ExpansionContext::new("fader", &data, &args).with_loop(LoopContext::new(1, 0, 0));
//!
//! let text = expand("{{args.prefix}} @index: {{data.channels.@index}}", &ctx).unwrap();
//! assert_eq!(text, "CH 2: Snare");
//! ```

mod error;
mod expander;
mod resolver;

pub use error::{LookupFailure, PlaceholderError};
pub(crate) use error::json_kind;
pub use expander::{expand, ExpansionContext, PlaceholderPolicy};
pub use resolver::{LoopContext, Namespace, Resolver};
