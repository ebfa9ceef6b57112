//! Compression support for JT segment payloads.
//!
//! JT uses raw zlib streams for compressible segment bodies and for the
//! lossless vertex payload. There is no size prefix on the wire; the
//! framing around each payload carries the byte counts.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Compress data with zlib at best compression.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress a zlib stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::invalid(format!("zlib stream corrupt: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_inflate() {
        let original =
            b"Vertex data tends to repeat and should compress well when repeated. ".repeat(100);

        let compressed = deflate(&original).unwrap();
        assert!(compressed.len() < original.len());

        let decompressed = inflate(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_deflate_empty() {
        let compressed = deflate(&[]).unwrap();
        // zlib emits a header even for empty input
        assert!(!compressed.is_empty());
        assert_eq!(inflate(&compressed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_inflate_garbage_is_error() {
        assert!(inflate(b"definitely not a zlib stream").is_err());
    }
}
