//! Streaming section scanner.
//!
//! [`SectionScanner`] turns an arbitrarily chunked byte stream into complete
//! sections delimited by [`DELIMITER`]. The delimiter search always runs on
//! the carry-over buffer plus the new chunk, so a token split across two
//! chunks is found exactly as if the input had arrived in one piece.
//!
//! # Memory
//!
//! While a section is open nothing is discarded: the buffer grows until the
//! closing delimiter arrives. Peak memory is therefore bounded by the largest
//! single section in the input, not by a fixed constant. Preamble bytes before
//! the first delimiter are dropped as they are scanned.

use memchr::memmem::Finder;

use crate::grammar::DELIMITER;

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    /// No delimiter seen yet; incoming bytes are preamble.
    AwaitingFirstDelimiter,
    /// Inside a section; bytes accumulate until the next delimiter.
    InSection,
}

/// The raw bytes between two delimiters.
///
/// Owned by the scanner until handed out, then consumed by the record
/// assembler. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    index: usize,
    bytes: Vec<u8>,
}

impl RawSection {
    /// Creates a section from its discovery index and bytes.
    #[must_use]
    pub fn new(index: usize, bytes: Vec<u8>) -> Self {
        Self { index, bytes }
    }

    /// Zero-based position of this section in discovery order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The section bytes, delimiters excluded.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the section and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Incremental scanner reconstructing sections from byte chunks.
///
/// Exactly one writer may feed a scanner at a time; `feed` takes
/// `&mut self`, so the borrow checker enforces that.
///
/// # Examples
///
/// ```
/// use docusplit_core::scanner::SectionScanner;
///
/// let mut scanner = SectionScanner::new();
/// let mut sections = Vec::new();
/// sections.extend(scanner.feed(b"junk**%%DO"));
/// sections.extend(scanner.feed(b"CUfirst**%"));
/// sections.extend(scanner.feed(b"%DOCUsecond"));
/// sections.extend(scanner.finish());
///
/// assert_eq!(sections.len(), 2);
/// assert_eq!(sections[0].bytes(), b"first");
/// assert_eq!(sections[1].bytes(), b"second");
/// ```
#[derive(Debug)]
pub struct SectionScanner {
    finder: Finder<'static>,
    buffer: Vec<u8>,
    /// Offset in `buffer` before which no delimiter can start.
    scanned: usize,
    state: ScannerState,
    next_index: usize,
    bytes_fed: u64,
}

impl Default for SectionScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionScanner {
    /// Creates a scanner in the [`ScannerState::AwaitingFirstDelimiter`]
    /// state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            finder: Finder::new(DELIMITER),
            buffer: Vec::new(),
            scanned: 0,
            state: ScannerState::AwaitingFirstDelimiter,
            next_index: 0,
            bytes_fed: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Number of bytes held in the carry-over buffer.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes fed so far.
    #[must_use]
    pub fn bytes_fed(&self) -> u64 {
        self.bytes_fed
    }

    /// Number of sections emitted so far.
    #[must_use]
    pub fn sections_emitted(&self) -> usize {
        self.next_index
    }

    /// Appends `chunk` and returns every section it closed, in order.
    ///
    /// Chunks may have any size, including zero, and may split the
    /// delimiter at any byte.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RawSection> {
        self.bytes_fed += chunk.len() as u64;
        self.buffer.extend_from_slice(chunk);

        // Sections are copied out by offset and the buffer is drained once,
        // so one large chunk costs linear time however many sections it holds.
        let mut closed = Vec::new();
        let mut consumed = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.finder.find(&self.buffer[from..]) {
            let start = from + offset;
            let end = start + DELIMITER.len();

            match self.state {
                ScannerState::AwaitingFirstDelimiter => {
                    self.state = ScannerState::InSection;
                }
                ScannerState::InSection => {
                    let bytes = self.buffer[consumed..start].to_vec();
                    closed.push(RawSection::new(self.next_index, bytes));
                    self.next_index += 1;
                }
            }
            consumed = end;
            from = end;
        }
        self.buffer.drain(..consumed);

        // A delimiter can still start in the last `len - 1` bytes.
        let keep = DELIMITER.len() - 1;
        if self.state == ScannerState::AwaitingFirstDelimiter && self.buffer.len() > keep {
            self.buffer.drain(..self.buffer.len() - keep);
        }
        self.scanned = self.buffer.len().saturating_sub(keep);

        closed
    }

    /// Ends the input and returns the trailing section, if any.
    ///
    /// Emits nothing when no delimiter was ever seen or when the last
    /// delimiter was the final input.
    #[must_use]
    pub fn finish(self) -> Option<RawSection> {
        match self.state {
            ScannerState::InSection if !self.buffer.is_empty() => {
                Some(RawSection::new(self.next_index, self.buffer))
            }
            _ => None,
        }
    }

    /// Abandons the stream and returns how many pending bytes were dropped.
    ///
    /// Used when the byte source fails mid-stream: an open section that has
    /// not been closed by a delimiter or by [`finish`](Self::finish) must
    /// never be emitted partially.
    pub fn abandon(self) -> usize {
        match self.state {
            ScannerState::InSection => self.buffer.len(),
            ScannerState::AwaitingFirstDelimiter => 0,
        }
    }
}
