//! Error types for formula flattening.

use thiserror::Error;

use crate::engine::Address;

/// Errors that end a flattening run. None of them leave partial output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    #[error("No formula in selected cell {address}")]
    NoFormula { address: Address },

    #[error("Unresolved reference '{token}' in formula of {address}")]
    UnresolvedReference { token: String, address: Address },

    #[error("Circular reference: {}", format_path(.path))]
    CyclicReference { path: Vec<Address> },

    #[error("Expansion exceeds maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },
}

fn format_path(path: &[Address]) -> String {
    path.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, FlattenError>;
