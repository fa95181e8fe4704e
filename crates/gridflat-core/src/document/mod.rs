//! Document state (workbook plus the host's active sheet and selection).

mod state;
mod workbook;

pub use state::Document;
pub use workbook::{Sheet, Workbook};
