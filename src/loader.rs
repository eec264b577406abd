use std::fs;
use std::io::{self, Read};
use std::path::Path;
use byteorder::{ReadBytesExt, LE};
use flate2::read::MultiGzDecoder;
use tracing::{debug, info};
use crate::error::{Error, Result};


const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Upper bound on the deflate expansion ratio, used to sanity-check the gzip trailer.
const MAX_DEFLATE_RATIO: usize = 1032;
/// Largest buffer reserved up front from the trailer hint.
const MAX_PREALLOC: usize = 64 << 20;


#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Take a `.duf` without a gzip header as plain DSON text.  DAZ Studio writes
    /// these when file compression is turned off.
    pub accept_uncompressed: bool,
}


pub fn is_duf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("duf"))
}

/// Read a `.duf` file and return its DSON text.
pub fn load(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<String> {
    let path = path.as_ref();
    info!("parsing .duf file: {}", path.display());
    if !is_duf_path(path) {
        return Err(Error::Format(path.to_owned()));
    }

    let raw = fs::read(path)?;
    let bytes = decompress(&raw, opts)?;
    decode(bytes)
}

pub fn decompress(raw: &[u8], opts: &LoadOptions) -> Result<Vec<u8>> {
    if !raw.starts_with(&GZIP_MAGIC) {
        if opts.accept_uncompressed {
            debug!("no gzip header, reading {} bytes as plain text", raw.len());
            return Ok(raw.to_owned());
        }
        return Err(Error::Decompression(io::Error::new(
            io::ErrorKind::InvalidData,
            "missing gzip header",
        )));
    }

    let mut out = Vec::with_capacity(expected_size(raw));
    MultiGzDecoder::new(raw)
        .read_to_end(&mut out)
        .map_err(Error::Decompression)?;
    debug!("decompressed {} bytes into {}", raw.len(), out.len());
    Ok(out)
}

/// Uncompressed size recorded in the gzip trailer (ISIZE, modulo 2^32).  Only a
/// hint for preallocation; implausible values are ignored.
fn expected_size(raw: &[u8]) -> usize {
    if raw.len() < 18 {
        return 0;
    }
    let mut trailer = &raw[raw.len() - 4 ..];
    let size = match trailer.read_u32::<LE>() {
        Ok(x) => x as usize,
        Err(_) => return 0,
    };
    if size > raw.len().saturating_mul(MAX_DEFLATE_RATIO) {
        return 0;
    }
    size.min(MAX_PREALLOC)
}

fn decode(bytes: Vec<u8>) -> Result<String> {
    let mut s = String::from_utf8(bytes)?;
    if s.starts_with('\u{feff}') {
        s.replace_range(.. '\u{feff}'.len_utf8(), "");
    }
    Ok(s)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_extension_check() {
        assert!(is_duf_path(Path::new("scene.duf")));
        assert!(is_duf_path(Path::new("dir/Scene.DUF")));
        assert!(!is_duf_path(Path::new("scene.dsf")));
        assert!(!is_duf_path(Path::new("scene")));
        assert!(!is_duf_path(Path::new("scene.duf.bak")));
    }

    #[test]
    fn test_wrong_extension_is_format_error() {
        let err = load("morphs.json", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load("/nonexistent/dir/scene.duf", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_decompress_gzip() {
        let text = br#"{"scene":{}}"#;
        let raw = gzip(text);
        assert_eq!(expected_size(&raw), text.len());
        let out = decompress(&raw, &LoadOptions::default()).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_expected_size_is_capped() {
        // Valid-looking trailer claiming 1 GiB behind a 2 MiB stream.
        let mut raw = vec![0; 2 << 20];
        raw[0 .. 2].copy_from_slice(&GZIP_MAGIC);
        let n = raw.len();
        raw[n - 4 ..].copy_from_slice(&(1_u32 << 30).to_le_bytes());
        assert_eq!(expected_size(&raw), MAX_PREALLOC);

        raw[n - 4 ..].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(expected_size(&raw[n - 64 ..]), 0);
    }

    #[test]
    fn test_plain_text_requires_opt_in() {
        let text = br#"{"scene":{}}"#;
        let err = decompress(text, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));

        let opts = LoadOptions { accept_uncompressed: true };
        assert_eq!(decompress(text, &opts).unwrap(), text);
    }

    #[test]
    fn test_truncated_stream() {
        let raw = gzip(&[b'x'; 4096]);
        let err = decompress(&raw[.. raw.len() / 2], &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(b"\xef\xbb\xbf{}".to_vec()).unwrap(), "{}");
        assert!(matches!(decode(vec![0xff, 0xfe, 0x00]), Err(Error::Encoding(_))));
    }
}
