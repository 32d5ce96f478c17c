//! Line assembly from raw UART bytes

/// Longest accepted command line, excluding the terminator
pub const LINE_CAPACITY: usize = 64;

/// One complete command line
pub type Line = heapless::String<LINE_CAPACITY>;

/// Result of feeding a terminator byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete, non-empty line
    Line(Line),
    /// The line was too long or not ASCII and has been dropped
    Discarded,
}

/// Accumulates bytes until CR or LF
///
/// Empty lines (such as the LF of a CRLF pair) are swallowed. After an
/// overflow the rest of the line is dropped and reported once at the
/// terminator.
#[derive(Debug, Default)]
pub struct LineBuffer {
    line: Line,
    discarding: bool,
}

impl LineBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            line: Line::new(),
            discarding: false,
        }
    }

    /// Feed one byte; returns an event when a line ends
    pub fn push(&mut self, byte: u8) -> Option<LineEvent> {
        match byte {
            b'\r' | b'\n' => {
                if core::mem::take(&mut self.discarding) {
                    self.line.clear();
                    return Some(LineEvent::Discarded);
                }
                if self.line.is_empty() {
                    return None;
                }
                Some(LineEvent::Line(core::mem::take(&mut self.line)))
            }
            _ if self.discarding => None,
            _ if byte.is_ascii() && !byte.is_ascii_control() => {
                if self.line.push(byte as char).is_err() {
                    self.discarding = true;
                }
                None
            }
            _ => {
                self.discarding = true;
                None
            }
        }
    }
}
