//! Repeat section writer
//!
//! Emits a fixed sequence cycled end to end and wrapped into lines, using the
//! same framing as the random sections: every line, including a short final
//! one, ends with a newline.

use std::io::{self, Write};

/// Write `total` symbols of `sequence` repeated, wrapped at `line_width`
///
/// Returns the number of bytes written. An empty sequence or zero total
/// writes nothing.
pub fn write_repeat<W: Write + ?Sized>(
    sink: &mut W,
    sequence: &[u8],
    total: usize,
    line_width: usize,
) -> io::Result<u64> {
    assert!(line_width > 0, "line width must be greater than 0");
    if sequence.is_empty() || total == 0 {
        return Ok(0);
    }

    let mut line = Vec::with_capacity(line_width + 1);
    let mut offset = 0;
    let mut remaining = total;
    let mut written = 0u64;

    while remaining > 0 {
        let width = remaining.min(line_width);
        line.clear();
        while line.len() < width {
            let take = (width - line.len()).min(sequence.len() - offset);
            line.extend_from_slice(&sequence[offset..offset + take]);
            offset = (offset + take) % sequence.len();
        }
        line.push(b'\n');

        sink.write_all(&line)?;
        written += line.len() as u64;
        remaining -= width;
    }

    Ok(written)
}
