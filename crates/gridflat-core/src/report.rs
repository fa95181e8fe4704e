//! Flatten result and the presentation boundary.
//!
//! Computing a flattened formula and showing it are separate steps: the
//! document produces a [`FlattenReport`], and a [`Presenter`] shows it (a
//! message box in an office host, the terminal for the CLI).

use std::fmt;
use std::io;

use gridflat_engine::engine::Address;

/// Title of the informational message showing a result.
pub const REPORT_TITLE: &str = "Flatten formula result";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlattenReport {
    pub address: Address,
    pub original: String,
    pub flattened: String,
}

impl fmt::Display for FlattenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Current cell: {},{}",
            self.address.cell.col, self.address.cell.row
        )?;
        writeln!(f, "Original Formula : {}", self.original)?;
        writeln!(f, "Flattened:")?;
        write!(f, "{}", self.flattened)
    }
}

/// Where results and failures are shown.
pub trait Presenter {
    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()>;

    fn show_error(&mut self, message: &str) -> io::Result<()>;

    fn show_report(&mut self, report: &FlattenReport) -> io::Result<()> {
        self.show_info(REPORT_TITLE, &report.to_string())
    }
}
