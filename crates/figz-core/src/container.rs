//! Container framing: archive detection, the tagged raw stream, and length-prefixed chunks.

use crate::{Error, Result};
use flate2::read::DeflateDecoder;
use std::io::{Cursor, Read};

/// Local-archive signature.
pub const ARCHIVE_MAGIC: &[u8; 2] = b"PK";
/// Name of the archive entry holding the raw tagged stream.
pub const ARCHIVE_ENTRY: &str = "canvas.fig";
/// Literal tags that open a raw stream.
pub const RAW_TAGS: [&[u8; TAG_LEN]; 2] = [b"fig-jam.", b"fig-kiwi"];

pub const TAG_LEN: usize = 8;
const VERSION_LEN: usize = 4;
const LENGTH_PREFIX_LEN: usize = 4;

/// Chunk holding the compiled message schema. Not interpreted by the container pipeline.
pub const SCHEMA_CHUNK: usize = 0;
/// Chunk holding the deflate-compressed scene payload.
pub const SCENE_CHUNK: usize = 1;
const MIN_CHUNKS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Archive,
    Raw,
}

/// Decides the framing from the leading bytes.
pub fn detect_framing(bytes: &[u8]) -> Result<Framing> {
    if bytes.len() < TAG_LEN {
        return Err(Error::TooSmall {
            size: bytes.len(),
            minimum: TAG_LEN,
        });
    }
    if bytes.starts_with(ARCHIVE_MAGIC) {
        return Ok(Framing::Archive);
    }
    if RAW_TAGS.iter().any(|tag| bytes.starts_with(*tag)) {
        return Ok(Framing::Raw);
    }
    Err(Error::UnsupportedFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub tag: [u8; TAG_LEN],
    pub version: u32,
    pub chunks: Vec<Vec<u8>>,
}

impl Container {
    /// Reads either framing and splits the chunk stream.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        match detect_framing(bytes)? {
            Framing::Archive => {
                let data = read_archive_entry(bytes)?;
                if !RAW_TAGS.iter().any(|tag| data.starts_with(*tag)) {
                    return Err(Error::MalformedContainer {
                        message: format!("archive entry {ARCHIVE_ENTRY} is not a tagged stream"),
                    });
                }
                Self::read_raw(&data)
            }
            Framing::Raw => Self::read_raw(bytes),
        }
    }

    fn read_raw(bytes: &[u8]) -> Result<Self> {
        let header_len = TAG_LEN + VERSION_LEN;
        if bytes.len() < header_len {
            return Err(Error::MalformedContainer {
                message: format!(
                    "stream of {} bytes ends before the version field",
                    bytes.len()
                ),
            });
        }

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[..TAG_LEN]);
        let version = read_u32_le(bytes, TAG_LEN);

        let chunks = split_chunks(&bytes[header_len..])?
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect::<Vec<_>>();
        if chunks.len() < MIN_CHUNKS {
            return Err(Error::MalformedContainer {
                message: format!(
                    "invalid chunk count; expected at least {MIN_CHUNKS}, got {}",
                    chunks.len()
                ),
            });
        }

        tracing::debug!(version, chunks = chunks.len(), "read container");
        Ok(Self {
            tag,
            version,
            chunks,
        })
    }

    pub fn tag_str(&self) -> &str {
        std::str::from_utf8(&self.tag).unwrap_or("")
    }

    pub fn chunk(&self, index: usize) -> Option<&[u8]> {
        self.chunks.get(index).map(Vec::as_slice)
    }

    /// Inflates a chunk's raw deflate stream.
    pub fn inflate_chunk(&self, index: usize) -> Result<Vec<u8>> {
        let chunk = self.chunk(index).ok_or_else(|| Error::MalformedContainer {
            message: format!("missing chunk {index}"),
        })?;
        inflate(chunk).map_err(|source| Error::Inflate { index, source })
    }

    /// The inflated scene payload handed to the record decoder.
    pub fn scene_payload(&self) -> Result<Vec<u8>> {
        self.inflate_chunk(SCENE_CHUNK)
    }
}

/// Splits a stream of `(u32 LE length, payload)` pairs. The stream must end exactly on a chunk
/// boundary.
pub fn split_chunks(stream: &[u8]) -> Result<Vec<&[u8]>> {
    let mut chunks = Vec::new();
    let mut offset = 0usize;

    while offset < stream.len() {
        let available = stream.len() - offset;
        if available < LENGTH_PREFIX_LEN {
            return Err(Error::TruncatedChunk {
                index: chunks.len(),
                offset,
                declared: LENGTH_PREFIX_LEN,
                available,
            });
        }
        let declared = read_u32_le(stream, offset) as usize;
        offset += LENGTH_PREFIX_LEN;

        let available = stream.len() - offset;
        if declared > available {
            return Err(Error::TruncatedChunk {
                index: chunks.len(),
                offset,
                declared,
                available,
            });
        }
        chunks.push(&stream[offset..offset + declared]);
        offset += declared;
    }

    Ok(chunks)
}

pub(crate) fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

fn read_archive_entry(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = archive.by_name(ARCHIVE_ENTRY).map_err(|err| match err {
        zip::result::ZipError::FileNotFound => Error::Archive {
            message: format!("unable to locate internal {ARCHIVE_ENTRY} in archive"),
        },
        other => other.into(),
    })?;

    let expected = entry.size();
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|err| Error::Archive {
            message: format!("unable to decompress {ARCHIVE_ENTRY}: {err}"),
        })?;

    let actual = data.len() as u64;
    if actual != expected {
        return Err(Error::SizeMismatch { expected, actual });
    }
    Ok(data)
}

fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
