//! Line-delimited JSON sink for extracted fragments.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use sitesearch_shared::{PageFragment, Result, SiteSearchError};

/// Output path meaning "write to standard output".
pub const STDOUT_PATH: &str = "-";

/// Writes one JSON object per fragment, one fragment per line.
///
/// Each page's batch is flushed as a unit, so a crash mid-crawl leaves only
/// whole pages in the output.
pub struct FragmentWriter<W: Write> {
    inner: W,
    written: usize,
}

impl FragmentWriter<Box<dyn Write + Send>> {
    /// Open `path` for writing, truncating any existing file and creating
    /// missing parent directories. `-` writes to stdout.
    pub fn create(path: &str) -> Result<Self> {
        if path == STDOUT_PATH {
            return Ok(Self::new(Box::new(BufWriter::new(io::stdout()))));
        }

        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SiteSearchError::io(parent, e))?;
        }

        let file = File::create(path).map_err(|e| SiteSearchError::io(path, e))?;
        debug!(path = %path.display(), "opened fragment output");
        Ok(Self::new(Box::new(BufWriter::new(file))))
    }
}

impl<W: Write> FragmentWriter<W> {
    /// Wrap an arbitrary writer.
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Append one page's fragments and flush.
    pub fn write_page(&mut self, fragments: &[PageFragment]) -> Result<()> {
        for fragment in fragments {
            serde_json::to_writer(&mut self.inner, fragment)
                .map_err(|e| SiteSearchError::Output(format!("failed to serialize fragment: {e}")))?;
            self.inner
                .write_all(b"\n")
                .map_err(|e| SiteSearchError::Output(e.to_string()))?;
        }
        self.inner
            .flush()
            .map_err(|e| SiteSearchError::Output(format!("flush failed: {e}")))?;
        self.written += fragments.len();
        Ok(())
    }

    /// Total fragments written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
