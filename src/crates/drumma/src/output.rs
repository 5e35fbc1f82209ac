//! Writing the finished score to a file or stdout.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Where the score goes: a file, or stdout for `None` and `-`
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_all(file, text).with_context(|| format!("Failed to write {}", path.display()))
        }
        _ => write_all(io::stdout().lock(), text).context("Failed to write to stdout"),
    }
}

/// Write and flush, treating a reader that hung up early (`drumma x.mid | head`)
/// as a normal end
pub fn write_all(mut out: impl Write, text: &str) -> io::Result<()> {
    match out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!("output closed early");
            Ok(())
        }
        other => other,
    }
}
