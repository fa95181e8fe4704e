//! Workbook: an ordered collection of named sheets.

use gridflat_engine::engine::{
    Address, Cell, CellRef, CellSource, Grid, Literal, sheet_names_match,
};

/// A named sheet with sparse cell storage.
#[derive(Debug)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

impl Sheet {
    pub fn new(name: &str) -> Sheet {
        Sheet {
            name: name.to_string(),
            grid: Grid::new(),
        }
    }

    pub fn set(&self, cell_ref: CellRef, cell: Cell) {
        self.grid.insert(cell_ref, cell);
    }

    pub fn get(&self, cell_ref: &CellRef) -> Option<Cell> {
        self.grid.get(cell_ref).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Workbook {
        Workbook::default()
    }

    /// Look up a sheet by name (case-insensitive).
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| sheet_names_match(&s.name, name))
    }

    /// Return the named sheet, appending a new one if it does not exist yet.
    pub fn sheet_or_insert(&mut self, name: &str) -> &Sheet {
        let idx = match self.sheets.iter().position(|s| sheet_names_match(&s.name, name)) {
            Some(idx) => idx,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &self.sheets[idx]
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn cell(&self, address: &Address) -> Option<Cell> {
        self.sheet(&address.sheet)?.get(&address.cell)
    }
}

impl CellSource for Workbook {
    fn formula(&self, address: &Address) -> Option<String> {
        self.cell(address)?.formula()
    }

    fn value(&self, address: &Address) -> Literal {
        self.cell(address)
            .map(|cell| cell.literal())
            .unwrap_or(Literal::Empty)
    }
}
