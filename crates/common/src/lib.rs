//! Common utilities and types shared across the gplrel tools.

pub mod error;
pub mod hash;

pub use error::{Error, Result};
