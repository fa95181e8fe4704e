//! gridflat_engine - Reference scanning and recursive formula flattening.

pub mod engine;
pub mod error;

pub use error::{FlattenError, Result};
