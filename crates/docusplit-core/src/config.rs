//! Parsing and extraction configuration.

/// Default read size for streaming parses: 64 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default replacement for characters that are illegal in file names.
pub const DEFAULT_PLACEHOLDER: char = '_';

/// Configuration for parsing an archive.
///
/// # Examples
///
/// ```
/// use docusplit_core::ParseConfig;
///
/// let config = ParseConfig::default()
///     .with_chunk_size(8 * 1024)
///     .with_parallel(false);
/// assert_eq!(config.chunk_size, 8 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Number of bytes requested from the source per read. Zero is treated
    /// as one.
    pub chunk_size: usize,

    /// Assemble sections on the rayon thread pool. Record order is the same
    /// either way.
    pub parallel: bool,
}

impl Default for ParseConfig {
    /// Creates a `ParseConfig` with default settings.
    ///
    /// Default values:
    /// - `chunk_size`: 64 KiB
    /// - `parallel`: true
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
        }
    }
}

impl ParseConfig {
    /// Sets the read chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enables or disables parallel section assembly.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Chunk size actually used for reads.
    #[must_use]
    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// Configuration for writing records to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Replacement for characters that are illegal in file names.
    pub placeholder: char,

    /// Create the destination directory (and parents) when it does not
    /// exist.
    pub create_missing: bool,
}

impl Default for ExtractConfig {
    /// Creates an `ExtractConfig` with default settings.
    ///
    /// Default values:
    /// - `placeholder`: `_`
    /// - `create_missing`: true
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER,
            create_missing: true,
        }
    }
}

impl ExtractConfig {
    /// Sets the placeholder character.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Sets whether a missing destination is created.
    #[must_use]
    pub fn with_create_missing(mut self, create_missing: bool) -> Self {
        self.create_missing = create_missing;
        self
    }
}
