//! Reader — streaming line access and file identity for cache keys.
//!
//! Lines are read as raw bytes and converted lossily, so a stray invalid
//! byte never aborts a pass. NUL bytes are stripped on the way in: the
//! template engine reserves NUL as its internal join sentinel.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ToolError;

/// Identifies one observed file state: path plus size and mtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub path: PathBuf,
    pub size: u64,
    pub modified_millis: u64,
}

pub async fn identify(path: &Path) -> Result<FileIdentity, ToolError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| ToolError::from_io(path, e))?;
    let modified_millis = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Ok(FileIdentity {
        path: path.to_path_buf(),
        size: meta.len(),
        modified_millis,
    })
}

pub struct LineStream {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
}

impl std::fmt::Debug for LineStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineStream").field("path", &self.path).finish()
    }
}

pub async fn open_lines(path: &Path) -> Result<LineStream, ToolError> {
    let file = File::open(path)
        .await
        .map_err(|e| ToolError::from_io(path, e))?;
    Ok(LineStream {
        path: path.to_path_buf(),
        reader: BufReader::new(file),
        buf: Vec::new(),
    })
}

impl LineStream {
    /// The next line without its terminator, or `None` at end of file.
    pub async fn next_line(&mut self) -> Result<Option<String>, ToolError> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .await
            .map_err(|e| ToolError::from_io(&self.path, e))?;
        if n == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        let mut line = String::from_utf8_lossy(&self.buf).into_owned();
        if line.contains('\0') {
            line = line.replace('\0', "");
        }
        Ok(Some(line))
    }
}
