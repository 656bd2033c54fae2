//! The host cell view consumed by the serializer, the parameter store and
//! the generation driver.

mod cell;
mod memory;

pub use cell::{CellData, CellKind, NotebookData};
pub use memory::MemoryNotebook;

use crate::document::Parameters;
use crate::error::BookError;

/// An editable, ordered list of cells with a single document-level
/// metadata slot holding the parameter mapping.
pub trait Notebook: Send {
    /// Snapshot of the cells in order.
    fn cells(&self) -> Vec<CellData>;

    fn cell_count(&self) -> usize;

    /// Insert a cell so that it ends up at `index`.
    fn insert_cell(&mut self, index: usize, cell: CellData) -> Result<(), BookError>;

    /// Append streamed text to the end of an existing cell.
    fn append_text(&mut self, index: usize, delta: &str) -> Result<(), BookError>;

    fn metadata(&self) -> Parameters;

    /// Replace the whole metadata slot in one update.
    fn set_metadata(&mut self, metadata: Parameters);

    /// Insert a cell at the end and return its index.
    fn push_cell(&mut self, cell: CellData) -> Result<usize, BookError> {
        let index = self.cell_count();
        self.insert_cell(index, cell)?;
        Ok(index)
    }

    /// Snapshot of cells and metadata together.
    fn snapshot(&self) -> NotebookData {
        NotebookData {
            cells: self.cells(),
            metadata: self.metadata(),
        }
    }
}
