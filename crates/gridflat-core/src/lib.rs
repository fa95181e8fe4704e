//! gridflat-core - Workbook model, file loaders and the flatten report boundary.

pub mod document;
pub mod error;
pub mod report;
pub mod storage;

pub use document::{Document, Sheet, Workbook};
pub use error::{GridflatError, Result};
pub use report::{FlattenReport, Presenter, REPORT_TITLE};

pub use gridflat_engine::engine::{Address, CellRef, FlattenOptions};
