//! # Trace Context
//!
//! Request-scoped values passed explicitly into every logging call.
//!
//! A [`Context`] is an immutable chain of string key/value pairs. Deriving a
//! child with [`Context::with_value`] never changes the parent, and clones
//! are cheap (one `Arc` bump), so a request handler can build the context
//! once and hand it to everything it calls.
//!
//! The enricher only looks at [`TRACE_ID_KEY`]:
//!
//! ```rust
//! use sklog_core::trace::{enrich_with_trace, Context};
//!
//! let ctx = Context::background().with_trace_id("abc123");
//! let fields = enrich_with_trace(&ctx, &[]);
//! assert_eq!(fields[0].key, "TraceID");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::field::Field;

/// Context key holding the trace identifier.
pub const TRACE_ID_KEY: &str = "trace_id";

/// Field name the trace identifier is logged under.
pub const TRACE_ID_FIELD: &str = "TraceID";

#[derive(Debug)]
struct Node
{
    key: Cow<'static, str>,
    value: String,
    parent: Option<Arc<Node>>,
}

/// Immutable request-scoped key/value chain
#[derive(Debug, Clone, Default)]
pub struct Context
{
    head: Option<Arc<Node>>,
}

impl Context
{
    /// Empty root context.
    #[must_use]
    pub fn background() -> Self
    {
        Self::default()
    }

    /// Child context with `key` bound to `value`, shadowing any outer binding.
    #[must_use]
    pub fn with_value(&self, key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self
    {
        Self {
            head: Some(Arc::new(Node {
                key: key.into(),
                value: value.into(),
                parent: self.head.clone(),
            })),
        }
    }

    /// Child context carrying `trace_id` under [`TRACE_ID_KEY`].
    #[must_use]
    pub fn with_trace_id(&self, trace_id: impl Into<String>) -> Self
    {
        self.with_value(TRACE_ID_KEY, trace_id)
    }

    /// Innermost value bound to `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str>
    {
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if current.key == key {
                return Some(&current.value);
            }
            node = current.parent.as_deref();
        }
        None
    }

    /// Trace identifier, if one is bound and non-empty.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str>
    {
        self.value(TRACE_ID_KEY).filter(|id| !id.is_empty())
    }
}

/// Append `TraceID=<id>` to `fields` when `ctx` carries a trace identifier.
///
/// Without one the input is returned borrowed and unchanged.
#[must_use]
pub fn enrich_with_trace<'a>(ctx: &Context, fields: &'a [Field]) -> Cow<'a, [Field]>
{
    match ctx.trace_id() {
        Some(trace_id) => {
            let mut enriched = Vec::with_capacity(fields.len() + 1);
            enriched.extend_from_slice(fields);
            enriched.push(Field::string(TRACE_ID_FIELD, trace_id));
            Cow::Owned(enriched)
        }
        None => Cow::Borrowed(fields),
    }
}
