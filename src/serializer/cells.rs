use crate::document::{ConversationDocument, Message};
use crate::notebook::{CellData, NotebookData};

/// One code cell per turn; parameters go to the notebook metadata slot.
pub fn to_notebook(document: &ConversationDocument) -> NotebookData {
    NotebookData {
        cells: document
            .messages
            .iter()
            .map(|msg| CellData::code(msg.role.clone(), msg.content.clone()))
            .collect(),
        metadata: document.parameters.clone(),
    }
}

/// Rebuild a document from the view. Non-code cells are skipped.
pub fn from_notebook(data: &NotebookData) -> ConversationDocument {
    ConversationDocument::new(
        data.cells
            .iter()
            .filter(|cell| cell.is_code())
            .map(|cell| Message::new(cell.language.clone(), cell.text.clone()))
            .collect(),
        data.metadata.clone(),
    )
}
