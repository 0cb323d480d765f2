//! Template context: maps a decoded data value onto a [`tera::Context`].
//!
//! | Data value        | Context                                    |
//! |-------------------|--------------------------------------------|
//! | `null`            | empty                                      |
//! | object            | each key becomes a top-level variable      |
//! | anything else     | bound to the single variable `data`        |

use serde_json::Value;

use crate::error::RenderError;

/// Name under which non-object data is exposed to templates.
pub const DATA_VAR: &str = "data";

/// Build the [`tera::Context`] for one render.
pub fn build_context(data: &Value) -> Result<tera::Context, RenderError> {
    match data {
        Value::Null => Ok(tera::Context::new()),
        Value::Object(_) => tera::Context::from_value(data.clone()).map_err(RenderError::Context),
        other => {
            let mut ctx = tera::Context::new();
            ctx.insert(DATA_VAR, other);
            Ok(ctx)
        }
    }
}
