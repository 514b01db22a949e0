//! Strict streaming text decoding in front of the CSV tokenizer.
//!
//! `DecodingReader` turns bytes in any `encoding_rs` encoding into UTF-8.
//! Unlike the usual lossy decoders it refuses malformed input: the first bad
//! sequence becomes an `io::Error` wrapping a `DecodeError`, which the CSV
//! adapter surfaces as `Error::Decode`.

use std::io::{self, Read};

use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{DecodeError, Error, Result};

const CHUNK: usize = 8 * 1024;

/// Resolve a WHATWG encoding label (`utf-8`, `latin1`, `utf-16`, ...).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let trimmed = label.trim();
    Encoding::for_label(trimmed.as_bytes())
        // `utf_8_sig` style spellings are common in configs written for other tools
        .or_else(|| Encoding::for_label(trimmed.replace('_', "-").as_bytes()))
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Pick BOM behaviour per encoding: UTF-8 drops a leading BOM, UTF-16 uses
/// it to choose endianness, everything else is decoded literally.
fn new_decoder(encoding: &'static Encoding) -> Decoder {
    if encoding == UTF_8 {
        encoding.new_decoder_with_bom_removal()
    } else if encoding == UTF_16LE || encoding == UTF_16BE {
        encoding.new_decoder()
    } else {
        encoding.new_decoder_without_bom_handling()
    }
}

pub struct DecodingReader<R: Read> {
    inner: R,
    decoder: Decoder,
    encoding: &'static Encoding,
    raw: Vec<u8>,
    decoded: String,
    pos: usize,
    consumed: u64,
    eof: bool,
    /// Malformed input found after some text decoded cleanly; raised once
    /// that text has been read.
    pending: Option<DecodeError>,
}

impl<R: Read> DecodingReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            decoder: new_decoder(encoding),
            encoding,
            raw: vec![0u8; CHUNK],
            decoded: String::new(),
            pos: 0,
            consumed: 0,
            eof: false,
            pending: None,
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Decode the next raw chunk into `self.decoded`. Returns false at end of input.
    fn refill(&mut self) -> io::Result<bool> {
        self.decoded.clear();
        self.pos = 0;
        if let Some(err) = self.pending.take() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, err));
        }
        if self.eof {
            return Ok(false);
        }

        let n = loop {
            match self.inner.read(&mut self.raw) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        let last = n == 0;
        let src = &self.raw[..n];

        let needed = self
            .decoder
            .max_utf8_buffer_length_without_replacement(src.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "decode buffer overflow"))?;
        self.decoded.reserve(needed);

        let (result, read) = self
            .decoder
            .decode_to_string_without_replacement(src, &mut self.decoded, last);
        match result {
            DecoderResult::InputEmpty => {}
            DecoderResult::Malformed(bad, extra) => {
                let position = (self.consumed + read as u64)
                    .saturating_sub(u64::from(bad) + u64::from(extra));
                let err = DecodeError {
                    encoding: self.encoding.name(),
                    position,
                };
                self.eof = true;
                if self.decoded.is_empty() {
                    return Err(io::Error::new(io::ErrorKind::InvalidData, err));
                }
                self.pending = Some(err);
                return Ok(true);
            }
            DecoderResult::OutputFull => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "decoder output buffer too small",
                ));
            }
        }
        self.consumed += read as u64;
        if last {
            self.eof = true;
        }
        Ok(!self.decoded.is_empty() || !last)
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.decoded.len() {
            if !self.refill()? {
                return Ok(0);
            }
        }
        let pending = &self.decoded.as_bytes()[self.pos..];
        let n = pending.len().min(buf.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
fn decode_all(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let mut out = String::new();
    let mut reader = DecodingReader::new(bytes, encoding);
    reader.read_to_string(&mut out).map_err(|e| {
        match e.get_ref().and_then(|inner| inner.downcast_ref::<DecodeError>()) {
            Some(decode) => Error::Decode(decode.clone()),
            None => Error::Io(e),
        }
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_labels() {
        assert_eq!(resolve_encoding("utf-8").unwrap(), UTF_8);
        assert_eq!(resolve_encoding("UTF8").unwrap(), UTF_8);
        assert_eq!(resolve_encoding("utf_8").unwrap(), UTF_8);
        assert_eq!(resolve_encoding("utf-16").unwrap(), UTF_16LE);
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(Error::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let text = decode_all(b"\xef\xbb\xbfcol1,col2\n", UTF_8).unwrap();
        assert_eq!(text, "col1,col2\n");
    }

    #[test]
    fn test_latin1_decodes() {
        let enc = resolve_encoding("iso8859-1").unwrap();
        let text = decode_all(b"1,\xe6\n", enc).unwrap();
        assert_eq!(text, "1,\u{e6}\n");
    }

    #[test]
    fn test_utf16_with_bom() {
        let enc = resolve_encoding("utf-16").unwrap();
        let bytes = b"\xff\xfea\x00,\x00b\x00";
        assert_eq!(decode_all(bytes, enc).unwrap(), "a,b");
    }

    #[test]
    fn test_malformed_utf8_is_an_error() {
        let err = decode_all(b"ok\n1,\xe6\n", UTF_8).unwrap_err();
        match err {
            Error::Decode(d) => {
                assert_eq!(d.encoding, "UTF-8");
                assert_eq!(d.position, 5);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_text_before_malformed_bytes_is_delivered_first() {
        let mut reader = DecodingReader::new(&b"ok\n\xff"[..], UTF_8);
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"ok\n");
        let err = reader.read(&mut buf).unwrap_err();
        assert!(err.get_ref().unwrap().is::<DecodeError>());
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_multibyte_sequence_split_across_reads() {
        // A reader that hands out one byte at a time.
        struct Trickle<'a>(&'a [u8]);
        impl Read for Trickle<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }

        let mut out = String::new();
        DecodingReader::new(Trickle("α,ॐ,𝔸".as_bytes()), UTF_8)
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "α,ॐ,𝔸");
    }
}
