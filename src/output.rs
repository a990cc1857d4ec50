use crate::{
    codegen::{Block, render},
    errors::{BindingError, BindingResult},
};
use std::{fs, path::Path};
use tracing::debug;

/// Destination for generated code. Lines are appended in emission order and
/// never read back by the generators.
pub trait LineSink {
    fn dump(&mut self, line: &str);

    fn blank(&mut self) {
        self.dump("");
    }

    fn dump_all<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        Self: Sized,
    {
        for line in lines {
            self.dump(line.as_ref());
        }
    }

    /// Renders blocks starting at `depth` indentation levels.
    fn dump_blocks(&mut self, blocks: &[Block], depth: usize)
    where
        Self: Sized,
    {
        self.dump_all(render(blocks, depth));
    }
}

impl LineSink for Vec<String> {
    fn dump(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// In-memory output that is published to disk only once generation succeeds.
#[derive(Debug, Default)]
pub struct OutputFile {
    lines: Vec<String>,
}

impl OutputFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Writes to a sibling temporary file and renames it over `path`, so a
    /// reader never observes a half-written file.
    pub fn publish(&self, path: &Path) -> BindingResult<()> {
        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp = Path::new(&tmp_name);
        fs::write(tmp, self.contents()).map_err(|error| BindingError::io(tmp, error))?;
        fs::rename(tmp, path).map_err(|error| BindingError::io(path, error))?;
        debug!(path = %path.display(), lines = self.lines.len(), "published output");
        Ok(())
    }
}

impl LineSink for OutputFile {
    fn dump(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
