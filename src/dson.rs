//! Read-only access to a parsed DSON document.
//!
//! DSON is JSON with a DAZ-specific schema, so `serde_json::Value` serves as the
//! tree.  The resolver only talks to the `DsonNode` trait, which keeps it
//! independent of the parser.
use serde_json::Value;
use crate::error::Result;


pub fn parse(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Path queries over a document tree.  A path is a dot-separated list of field
/// names, e.g. `"channel.current_value"`.  The empty path names the node itself.
pub trait DsonNode: Sized {
    fn query(&self, path: &str) -> Option<&Self>;

    fn get_str(&self, path: &str) -> Option<&str>;

    /// Read a scalar as `f32`.  Returns `None` if the path is missing, holds
    /// something that is not a scalar, or does not fit a finite `f32`.
    fn get_f32(&self, path: &str) -> Option<f32>;

    /// Elements of the array at `path`, in document order.  Missing paths and
    /// non-arrays yield nothing.
    fn children(&self, path: &str) -> &[Self];
}

impl DsonNode for Value {
    fn query(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |v, key| v.as_object()?.get(key))
    }

    fn get_str(&self, path: &str) -> Option<&str> {
        self.query(path)?.as_str()
    }

    fn get_f32(&self, path: &str) -> Option<f32> {
        let x = match self.query(path)? {
            Value::Number(n) => n.as_f64().map(|x| x as f32),
            Value::String(s) => s.trim().parse::<f32>().ok(),
            Value::Bool(b) => Some(if *b { 1. } else { 0. }),
            _ => None,
        };
        x.filter(|x| x.is_finite())
    }

    fn children(&self, path: &str) -> &[Value] {
        match self.query(path) {
            Some(Value::Array(v)) => v.as_slice(),
            _ => &[],
        }
    }
}
