use bytes::Bytes;
use futures::stream::StreamExt;

use crate::error::BookError;

use super::TextStream;

const EVENT_DELIMITER: &str = "\n\n";

/// Turn a server-sent-events response into a stream of parsed deltas.
/// `parser` returns `Ok(None)` for events that carry no text.
pub(crate) fn sse_text_stream<F>(response: reqwest::Response, parser: F) -> TextStream
where
    F: Fn(&str) -> Result<Option<String>, BookError> + Send + 'static,
{
    let stream = response
        .bytes_stream()
        .scan(EventBuffer::default(), move |buffer, chunk| {
            let results = match chunk {
                Ok(bytes) => buffer.parse_events(&bytes, &parser),
                Err(err) => vec![Err(BookError::Http(err.to_string()))],
            };
            async move { Some(results) }
        })
        .flat_map(futures::stream::iter);
    Box::pin(stream)
}

/// Accumulates raw bytes and yields complete events. Multi-byte characters
/// and events may both be split across network chunks.
#[derive(Default)]
pub(crate) struct EventBuffer {
    text: String,
    pending: Vec<u8>,
}

impl EventBuffer {
    pub(crate) fn push(&mut self, bytes: &Bytes) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(err) => err.valid_up_to(),
        };
        if valid > 0 {
            self.text
                .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
            self.pending.drain(..valid);
        }
        self.text = self.text.replace("\r\n", "\n");

        let mut events = Vec::new();
        while let Some(pos) = self.text.find(EVENT_DELIMITER) {
            let end = pos + EVENT_DELIMITER.len();
            events.push(self.text[..end].to_string());
            self.text.drain(..end);
        }
        events
    }

    fn parse_events<F>(&mut self, bytes: &Bytes, parser: &F) -> Vec<Result<String, BookError>>
    where
        F: Fn(&str) -> Result<Option<String>, BookError>,
    {
        self.push(bytes)
            .iter()
            .filter_map(|event| parser(event).transpose())
            .collect()
    }
}
