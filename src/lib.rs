pub mod error;

pub mod dson;
pub mod export;
pub mod loader;
pub mod morph;
pub mod writer;

pub use crate::error::{Error, Result};
