//! Byte sources feeding the CSV tokenizer.
//!
//! Files opened by path go through a `BufReader` with an explicit capacity so
//! the in-flight buffer is bounded by configuration. Iterators of text lines
//! are adapted into a `Read` so they can use the same tokenizer path.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Open `path` for reading behind a buffer of `cap` bytes.
pub fn bounded_from_path<P: AsRef<Path>>(path: P, cap: usize) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(cap.max(1), file))
}

/// `Read` over an iterator of already-decoded text lines.
///
/// Each item is treated as one line; a trailing newline is supplied when the
/// item lacks one. Lines are pulled only as the tokenizer asks for bytes.
pub struct LineSource<I> {
    lines: I,
    current: Vec<u8>,
    pos: usize,
}

impl<I> LineSource<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            current: Vec::new(),
            pos: 0,
        }
    }
}

impl<I> Read for LineSource<I>
where
    I: Iterator<Item = String>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.current.len() {
            match self.lines.next() {
                Some(line) => {
                    self.current = line.into_bytes();
                    if !self.current.ends_with(b"\n") {
                        self.current.push(b'\n');
                    }
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }
        let pending = &self.current[self.pos..];
        let n = pending.len().min(buf.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_get_terminators() {
        let lines = vec!["a,b".to_string(), "c,d\n".to_string()];
        let mut out = String::new();
        LineSource::new(lines.into_iter())
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "a,b\nc,d\n");
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let err = bounded_from_path("definitely/missing/file.csv", 1024).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
