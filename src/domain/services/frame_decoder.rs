#[cfg(test)]
#[path = "frame_decoder_test.rs"]
mod tests;

/// Reassembles raw byte buffers into newline terminated frames.
///
/// Buffers arrive in order with no duplication, but a frame may be split
/// anywhere, including in the middle of a multi-byte UTF-8 sequence. The
/// decoder buffers bytes and only splits at `\n`, so partial sequences stay
/// buffered until the rest arrives. Emitted frames are the same for any
/// chunking of the same byte sequence.
///
/// Blank lines are emitted as empty frames; callers skip frames that are
/// empty after trimming.
#[derive(Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = vec![];
        while let Some(pos) = self.buffer.iter().position(|byte| return *byte == b'\n') {
            let line = self.buffer.drain(..=pos).collect::<Vec<u8>>();
            frames.push(decode_line(&line[..line.len() - 1]));
        }

        return frames;
    }

    /// Flushes the trailing partial line once the stream ends. Backends may
    /// or may not terminate their last record with a newline; both are
    /// legal.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }

        let line = std::mem::take(&mut self.buffer);
        return Some(decode_line(&line));
    }
}

fn decode_line(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    return String::from_utf8_lossy(line).to_string();
}
