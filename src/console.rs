//! Terminal presenter: results on stdout, failures on stderr.

use gridflat_core::{FlattenReport, Presenter};
use std::io::{self, Write};

pub struct ConsolePresenter<O: Write, E: Write> {
    out: O,
    err: E,
    quiet: bool,
}

impl<O: Write, E: Write> ConsolePresenter<O, E> {
    pub fn new(out: O, err: E, quiet: bool) -> Self {
        ConsolePresenter { out, err, quiet }
    }
}

impl<O: Write, E: Write> Presenter for ConsolePresenter<O, E> {
    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", title)?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }

    fn show_error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.err, "Error: {}", message)?;
        self.err.flush()
    }

    fn show_report(&mut self, report: &FlattenReport) -> io::Result<()> {
        if self.quiet {
            writeln!(self.out, "{}", report.flattened)?;
            return self.out.flush();
        }
        self.show_info(gridflat_core::REPORT_TITLE, &report.to_string())
    }
}
