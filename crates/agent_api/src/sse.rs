/// Sentinel payload marking the end of the stream; dropped without decoding.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Incremental frame reader for SSE text streams.
///
/// Chunks may split a frame anywhere, or carry several frames at once.
/// Complete blocks are drained on every feed; the trailing incomplete block
/// stays buffered for the next chunk.
#[derive(Debug, Default)]
pub struct FrameReader {
    buffer: String,
}

impl FrameReader {
    /// Feed arbitrary bytes into the reader and drain complete frame payloads.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut payloads = Vec::new();

        while let Some(split) = self.buffer.find("\n\n") {
            let block = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);

            if let Some(payload) = extract_data_payload(&block) {
                if payload == DONE_SENTINEL {
                    continue;
                }

                payloads.push(payload);
            }
        }

        payloads
    }

    /// Split a complete SSE payload string in one shot.
    pub fn split_payloads(input: &str) -> Vec<String> {
        let mut reader = Self::default();
        reader.feed(input.as_bytes())
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn extract_data_payload(block: &str) -> Option<String> {
    let data_lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}
