use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Append target that receives the mine layout once per match, one
/// `row col special(0|1)` line per mine in row-major order.
///
/// Losing the solution output must never disrupt a running match, so the
/// minefield logs and swallows any write failure.
pub struct SolutionSink {
    target: Box<dyn Write + Send>,
}

impl SolutionSink {
    pub fn new(target: impl Write + Send + 'static) -> Self {
        Self {
            target: Box::new(target),
        }
    }

    /// Creates (or truncates) the solution file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl Write for SolutionSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.target.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.target.flush()
    }
}

impl fmt::Debug for SolutionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionSink").finish_non_exhaustive()
    }
}
