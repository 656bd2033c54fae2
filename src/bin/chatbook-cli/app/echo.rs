use std::io::{self, Stdout, Write};

use chatbook::document::{Parameters, ROLE_ASSISTANT};
use chatbook::error::BookError;
use chatbook::notebook::{CellData, MemoryNotebook, Notebook};

const FLUSH_THRESHOLD: usize = 32;

/// A [`MemoryNotebook`] that mirrors new turns and streamed text to a
/// terminal. Output failures are logged; the notebook itself is never
/// affected by them.
pub struct EchoNotebook<W = Stdout> {
    inner: MemoryNotebook,
    out: W,
    buffer: String,
}

impl EchoNotebook {
    pub fn new(inner: MemoryNotebook) -> Self {
        Self::with_writer(inner, io::stdout())
    }
}

impl<W: Write> EchoNotebook<W> {
    pub fn with_writer(inner: MemoryNotebook, out: W) -> Self {
        Self {
            inner,
            out,
            buffer: String::new(),
        }
    }

    pub fn finish(mut self) -> MemoryNotebook {
        self.buffer.push('\n');
        self.flush();
        self.inner
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let written = self
            .out
            .write_all(self.buffer.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(err) = written {
            log::warn!("failed to echo output: {err}");
        }
        self.buffer.clear();
    }
}

impl<W: Write + Send> Notebook for EchoNotebook<W> {
    fn cells(&self) -> Vec<CellData> {
        self.inner.cells()
    }

    fn cell_count(&self) -> usize {
        self.inner.cell_count()
    }

    fn insert_cell(&mut self, index: usize, cell: CellData) -> Result<(), BookError> {
        self.flush();
        if cell.language == ROLE_ASSISTANT {
            self.buffer.push_str("\n< ");
        } else {
            self.buffer
                .push_str(&format!("\n[{}] {}", cell.language, cell.text));
        }
        self.inner.insert_cell(index, cell)
    }

    fn append_text(&mut self, index: usize, delta: &str) -> Result<(), BookError> {
        self.inner.append_text(index, delta)?;
        self.buffer.push_str(delta);
        if self.buffer.len() >= FLUSH_THRESHOLD {
            self.flush();
        }
        Ok(())
    }

    fn metadata(&self) -> Parameters {
        self.inner.metadata()
    }

    fn set_metadata(&mut self, metadata: Parameters) {
        self.inner.set_metadata(metadata)
    }
}
