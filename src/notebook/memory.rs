use crate::document::Parameters;
use crate::error::BookError;

use super::cell::{CellData, NotebookData};
use super::Notebook;

/// In-process notebook used by the command line front end and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotebook {
    cells: Vec<CellData>,
    metadata: Parameters,
}

impl MemoryNotebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty notebook that already carries parameters.
    pub fn with_metadata(metadata: Parameters) -> Self {
        Self {
            cells: Vec::new(),
            metadata,
        }
    }

    pub fn into_data(self) -> NotebookData {
        NotebookData {
            cells: self.cells,
            metadata: self.metadata,
        }
    }
}

impl From<NotebookData> for MemoryNotebook {
    fn from(data: NotebookData) -> Self {
        Self {
            cells: data.cells,
            metadata: data.metadata,
        }
    }
}

impl Notebook for MemoryNotebook {
    fn cells(&self) -> Vec<CellData> {
        self.cells.clone()
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn insert_cell(&mut self, index: usize, cell: CellData) -> Result<(), BookError> {
        if index > self.cells.len() {
            return Err(BookError::CellOutOfRange {
                index,
                count: self.cells.len(),
            });
        }
        self.cells.insert(index, cell);
        Ok(())
    }

    fn append_text(&mut self, index: usize, delta: &str) -> Result<(), BookError> {
        let count = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(BookError::CellOutOfRange { index, count })?;
        cell.text.push_str(delta);
        Ok(())
    }

    fn metadata(&self) -> Parameters {
        self.metadata.clone()
    }

    fn set_metadata(&mut self, metadata: Parameters) {
        self.metadata = metadata;
    }
}
