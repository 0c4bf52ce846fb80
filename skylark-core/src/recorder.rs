use core::fmt::Write;
use embassy_time::Instant;

use crate::bus::BusFrame;

/// Upper bound for one recorder line: four decimal fields plus separators.
pub const MAX_RECORD_LINE_LEN: usize = 48;

/// Blocking append interface of the on-board storage writer.
///
/// The writer is external to the aggregation core and best-effort by
/// contract: it may block, it may fail internally, and the recorder neither
/// observes nor reacts to either. Only the aggregation task may hold an
/// implementation.
pub trait BlockWriter {
    fn append(&mut self, bytes: &[u8]);
}

/// Writer for builds without a recorder; satisfies the type without storing.
pub struct NullWriter;

impl BlockWriter for NullWriter {
    fn append(&mut self, _bytes: &[u8]) {}
}

/// Bounded formatting cursor for building a record line without allocating.
#[repr(align(4))]
pub struct LineBuffer<const N: usize> {
    buf: [u8; N],
    pos: usize,
}

impl<const N: usize> LineBuffer<N> {
    pub fn new() -> Self {
        Self {
            buf: [0u8; N],
            pos: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    pub fn clear(&mut self) {
        self.pos = 0;
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for LineBuffer<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        if self.buf.len() - self.pos < bytes.len() {
            return Err(core::fmt::Error);
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}

/// Tees every raw frame to on-board storage as one tab-separated ASCII line:
/// `<seq>\t<uptime_ticks>\t<tag>\t<payload_signed>\n`.
///
/// Runs on the aggregation task; the possibly-blocking write is an accepted
/// soft-real-time concession, and the raw stream it preserves is what makes
/// the reassembler's stale-slot policy recoverable after flight.
pub struct FrameRecorder<W: BlockWriter> {
    writer: W,
    seq: u32,
}

impl<W: BlockWriter> FrameRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, seq: 0 }
    }

    /// Format and append one frame. Formatting cannot realistically fail at
    /// this buffer size; if it ever does the line is dropped, matching the
    /// recorder's best-effort contract.
    pub fn record(&mut self, frame: &BusFrame) {
        self.seq = self.seq.wrapping_add(1);
        let uptime = Instant::now().as_ticks() as u32;

        let mut line = LineBuffer::<MAX_RECORD_LINE_LEN>::new();
        if write!(
            line,
            "{}\t{}\t{}\t{}\n",
            self.seq,
            uptime,
            frame.tag,
            frame.payload_i32()
        )
        .is_ok()
        {
            self.writer.append(line.as_bytes());
        }
    }

    pub fn sequence(&self) -> u32 {
        self.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MeasurementTag;

    #[derive(Default)]
    struct CaptureWriter {
        lines: Vec<String>,
    }

    impl BlockWriter for &mut CaptureWriter {
        fn append(&mut self, bytes: &[u8]) {
            self.lines.push(String::from_utf8(bytes.to_vec()).unwrap());
        }
    }

    #[test]
    fn line_format_is_tab_separated_ascii() {
        let mut capture = CaptureWriter::default();
        {
            let mut recorder = FrameRecorder::new(&mut capture);
            recorder.record(&BusFrame::new(0x80, 55, MeasurementTag::AccelY, (-2000i32) as u32));
        }

        assert_eq!(capture.lines.len(), 1);
        let line = &capture.lines[0];
        assert!(line.ends_with('\n'));
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "1");
        assert_eq!(fields[2], "3");
        assert_eq!(fields[3], "-2000");
        // Uptime is whatever the kernel clock said; it only has to parse.
        fields[1].parse::<u32>().unwrap();
    }

    #[test]
    fn sequence_increases_per_frame() {
        let mut capture = CaptureWriter::default();
        {
            let mut recorder = FrameRecorder::new(&mut capture);
            for _ in 0..3 {
                recorder.record(&BusFrame::new(0x80, 1, MeasurementTag::Pressure, 100));
            }
            assert_eq!(recorder.sequence(), 3);
        }
        let seqs: Vec<&str> = capture
            .lines
            .iter()
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        assert_eq!(seqs, ["1", "2", "3"]);
    }

    #[test]
    fn line_buffer_rejects_overflow() {
        let mut buf = LineBuffer::<4>::new();
        assert!(write!(buf, "abcd").is_ok());
        assert!(write!(buf, "e").is_err());
        assert_eq!(buf.as_bytes(), b"abcd");
        buf.clear();
        assert!(write!(buf, "ok").is_ok());
    }
}
