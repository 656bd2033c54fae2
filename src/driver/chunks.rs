use std::str::FromStr;

/// How supplied content is cut into user turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChunkMode {
    /// The whole content is one turn
    #[default]
    Whole,
    /// One turn per line
    Lines,
}

impl FromStr for ChunkMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_lowercase().as_str() {
            "whole" => Ok(Self::Whole),
            "lines" | "line" => Ok(Self::Lines),
            other => Err(format!("unknown split mode '{other}' (expected whole or lines)")),
        }
    }
}

/// Split content into chunks. Blank chunks are kept here; the driver skips them.
pub fn split_chunks(content: &str, mode: ChunkMode) -> Vec<String> {
    match mode {
        ChunkMode::Whole => vec![content.to_string()],
        ChunkMode::Lines => content.lines().map(str::to_string).collect(),
    }
}
