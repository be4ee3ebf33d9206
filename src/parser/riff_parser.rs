//! Generic RIFF chunk walker.
//!
//! Lists sibling chunks one level deep; descending into a `RIFF` or `LIST` chunk is explicit
//! through [`walk_list`].
//!
//! Reference: <https://www.mmsp.ece.mcgill.ca/Documents/AudioFormats/WAVE/Docs/riffmci.pdf>

use crate::parser::primitive_parser::{parse_fourcc, parse_u32, position};
use crate::RuxError;
use nom::{IResult, Parser};
use serde::Serialize;

/// Tag + size fields preceding every chunk payload
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Size of the form type of `RIFF` and `LIST` chunks
pub const FORM_TYPE_SIZE: usize = 4;

/// Descriptor of a chunk inside a source buffer.
///
/// `offset` points at the payload start, past the tag and size fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub chunk_type: String,
    pub size: u32,
    pub offset: u32,
}

impl Chunk {
    /// Exclusive end of the payload, padding excluded.
    pub const fn end(&self) -> usize {
        self.offset as usize + self.size as usize
    }

    /// Borrow the payload bytes from the buffer the chunk was walked on.
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], RuxError> {
        data.get(self.offset as usize..self.end()).ok_or_else(|| {
            RuxError::BoundsError(format!(
                "chunk '{}' payload [{}..{}) outside buffer of {} bytes",
                self.chunk_type,
                self.offset,
                self.end(),
                data.len()
            ))
        })
    }

    pub fn is_container(&self) -> bool {
        self.chunk_type == "RIFF" || self.chunk_type == "LIST"
    }
}

fn parse_chunk_header(i: &[u8]) -> IResult<&[u8], (String, u32)> {
    (parse_fourcc, parse_u32).parse(i)
}

/// List the chunks found in `data[start..start + length]`.
///
/// Each declared size is padded to an even boundary to locate the next sibling.
pub fn walk_chunks(data: &[u8], start: usize, length: usize) -> Result<Vec<Chunk>, RuxError> {
    let end = start
        .checked_add(length)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            RuxError::BoundsError(format!(
                "chunk range [{start}..{start}+{length}) outside buffer of {} bytes",
                data.len()
            ))
        })?;
    let range = &data[start..end];
    let mut input = range;
    let mut chunks = Vec::new();
    while !input.is_empty() {
        let chunk_start = start + position(range, input);
        let (rest, (chunk_type, size)) = parse_chunk_header(input).map_err(|_| {
            RuxError::BoundsError(format!(
                "truncated chunk header at offset {chunk_start}, {} bytes left",
                input.len()
            ))
        })?;
        let declared = size as usize;
        if declared > rest.len() {
            return Err(RuxError::BoundsError(format!(
                "chunk '{chunk_type}' at offset {chunk_start} declares {declared} bytes but only {} remain",
                rest.len()
            )));
        }
        let padded = declared + (declared & 1);
        if padded > rest.len() {
            log::warn!("chunk '{chunk_type}' at offset {chunk_start} is missing its pad byte");
        }
        log::debug!("chunk '{chunk_type}' at offset {chunk_start} size {size}");
        chunks.push(Chunk {
            chunk_type,
            size,
            offset: (chunk_start + CHUNK_HEADER_SIZE) as u32,
        });
        input = &rest[padded.min(rest.len())..];
    }
    Ok(chunks)
}

/// Read the form type of a `RIFF`/`LIST` chunk and list the chunks nested inside it.
///
/// Fails if `chunk` is not a container or its form type differs from `form_type`.
pub fn walk_list(data: &[u8], chunk: &Chunk, form_type: &str) -> Result<Vec<Chunk>, RuxError> {
    if !chunk.is_container() {
        return Err(RuxError::structural(
            &format!("container chunk for '{form_type}'"),
            format!("'{}'", chunk.chunk_type),
        ));
    }
    let payload = chunk.payload(data)?;
    let (_, signature) = parse_fourcc(payload).map_err(|_| {
        RuxError::BoundsError(format!(
            "chunk '{}' too small for its form type",
            chunk.chunk_type
        ))
    })?;
    if signature != form_type {
        return Err(RuxError::structural(
            &format!("'{}' form type '{form_type}'", chunk.chunk_type),
            format!("'{signature}'"),
        ));
    }
    walk_chunks(
        data,
        chunk.offset as usize + FORM_TYPE_SIZE,
        chunk.size as usize - FORM_TYPE_SIZE,
    )
}
