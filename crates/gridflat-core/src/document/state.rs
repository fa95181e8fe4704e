use std::path::Path;

use gridflat_engine::engine::{Address, CellRef, CellSource, FlattenOptions, Flattener};
use log::info;

use super::workbook::Workbook;
use crate::error::{GridflatError, Result};
use crate::report::FlattenReport;
use crate::storage;

/// A loaded workbook together with the host state a macro would see:
/// which sheet is active and which cell is selected.
#[derive(Debug)]
pub struct Document {
    workbook: Workbook,
    active_sheet: String,
    selection: CellRef,
}

impl Document {
    /// Load a workbook from disk. The first sheet is active and `A1` is selected.
    pub fn open(path: &Path) -> Result<Document> {
        let workbook = storage::load_workbook(path)?;
        info!(
            "loaded {} ({} sheet(s))",
            path.display(),
            workbook.sheet_names().count()
        );
        Document::from_workbook(workbook)
    }

    pub fn from_workbook(workbook: Workbook) -> Result<Document> {
        let active_sheet = workbook
            .first_sheet()
            .map(|sheet| sheet.name.clone())
            .ok_or(GridflatError::EmptyWorkbook)?;
        Ok(Document {
            workbook,
            active_sheet,
            selection: CellRef::new(0, 0),
        })
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn active_sheet(&self) -> &str {
        &self.active_sheet
    }

    pub fn set_active_sheet(&mut self, name: &str) -> Result<()> {
        let sheet = self
            .workbook
            .sheet(name)
            .ok_or_else(|| GridflatError::UnknownSheet(name.to_string()))?;
        self.active_sheet = sheet.name.clone();
        Ok(())
    }

    /// Select a cell given as `B3` (on the active sheet) or `Sheet2.B3`.
    /// A sheet-qualified selection also activates that sheet.
    pub fn select(&mut self, text: &str) -> Result<()> {
        let address = Address::parse(text, &self.active_sheet)
            .ok_or_else(|| GridflatError::InvalidCell(text.to_string()))?;
        self.set_active_sheet(&address.sheet)?;
        self.selection = address.cell;
        Ok(())
    }

    /// The selected cell, qualified with the active sheet.
    pub fn selection(&self) -> Address {
        Address::new(self.active_sheet.clone(), self.selection)
    }

    /// Flatten the formula in the selected cell. The workbook is only read.
    pub fn flatten_selection(&self, options: &FlattenOptions) -> Result<FlattenReport> {
        let address = self.selection();
        let flattened = Flattener::new(&self.workbook)
            .with_options(options.clone())
            .flatten(&address)?;
        let original = self.workbook.formula(&address).unwrap_or_default();

        Ok(FlattenReport {
            address,
            original,
            flattened,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_grd_content;
    use gridflat_engine::FlattenError;
    use pretty_assertions::assert_eq;

    fn document() -> Document {
        let workbook = parse_grd_content(
            r#"
[Sheet1]
A1: =B1*2
B1: =C1+1
C1: 3
D1: "label"

[Rates]
A1: =B1/100
B1: 7
"#,
        )
        .unwrap();
        Document::from_workbook(workbook).unwrap()
    }

    #[test]
    fn test_defaults_to_first_sheet_and_a1() {
        let doc = document();
        assert_eq!(doc.active_sheet(), "Sheet1");
        assert_eq!(doc.selection().to_string(), "Sheet1.A1");
    }

    #[test]
    fn test_flatten_selection_builds_report() {
        let doc = document();
        let report = doc.flatten_selection(&FlattenOptions::default()).unwrap();
        assert_eq!(report.original, "=B1*2");
        assert_eq!(report.flattened, "=(3+1)*2");
    }

    #[test]
    fn test_select_qualified_switches_sheet() {
        let mut doc = document();
        doc.select("rates.A1").unwrap();
        assert_eq!(doc.active_sheet(), "Rates");
        let report = doc.flatten_selection(&FlattenOptions::default()).unwrap();
        assert_eq!(report.flattened, "=7/100");
    }

    #[test]
    fn test_select_rejects_bad_input() {
        let mut doc = document();
        assert!(matches!(doc.select("A1:B2"), Err(GridflatError::InvalidCell(_))));
        assert!(matches!(doc.select("Nope.A1"), Err(GridflatError::UnknownSheet(_))));
        assert!(matches!(doc.set_active_sheet("Nope"), Err(GridflatError::UnknownSheet(_))));
    }

    #[test]
    fn test_flatten_selection_without_formula() {
        let mut doc = document();
        doc.select("D1").unwrap();
        let err = doc.flatten_selection(&FlattenOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GridflatError::Flatten(FlattenError::NoFormula { .. })
        ));
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        assert!(matches!(
            Document::from_workbook(Workbook::new()),
            Err(GridflatError::EmptyWorkbook)
        ));
    }
}
