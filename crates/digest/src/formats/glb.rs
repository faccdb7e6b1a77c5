//! glTF binary container.
//!
//! Layout: a 12-byte header (`glTF` magic, version, total length, all
//! little-endian `u32`) followed by chunks of `length | type | data`. The
//! first chunk must be JSON; an optional BIN chunk follows it.

use super::{gltf, parse_object};
use crate::error::{ErrorKind, Result};
use crate::{DigestRow, friendly_size};
use tracing::instrument;

const MAGIC: &[u8; 4] = b"glTF";
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

fn read_u32(content: &[u8], offset: usize) -> Option<u32> {
    let bytes = content.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

struct Chunk<'a> {
    kind: u32,
    data: &'a [u8],
}

fn chunks(body: &[u8]) -> Result<Vec<Chunk<'_>>> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    while offset < body.len() {
        let (Some(length), Some(kind)) = (read_u32(body, offset), read_u32(body, offset + 4)) else {
            exn::bail!(ErrorKind::InvalidContainer("truncated chunk header"));
        };
        let start = offset + CHUNK_HEADER_LEN;
        let Some(data) = body.get(start..start + length as usize) else {
            exn::bail!(ErrorKind::InvalidContainer("chunk extends past the end of the file"));
        };
        chunks.push(Chunk { kind, data });
        offset = start + data.len();
    }
    Ok(chunks)
}

#[instrument(skip_all)]
pub(crate) fn digest(content: &[u8]) -> Result<Vec<DigestRow>> {
    if content.len() < HEADER_LEN || &content[..4] != MAGIC {
        exn::bail!(ErrorKind::InvalidContainer("missing glTF magic"));
    }
    let (Some(version), Some(length)) = (read_u32(content, 4), read_u32(content, 8)) else {
        exn::bail!(ErrorKind::InvalidContainer("truncated header"));
    };
    let Some(body) = content.get(HEADER_LEN..length as usize) else {
        exn::bail!(ErrorKind::InvalidContainer("declared length does not match the file"));
    };

    let chunks = chunks(body)?;
    let Some(json) = chunks.first().filter(|c| c.kind == CHUNK_JSON) else {
        exn::bail!(ErrorKind::InvalidContainer("first chunk is not JSON"));
    };
    let document = parse_object(json.data)?;

    let mut rows = vec![DigestRow::new("container", format!("glTF binary v{version}"))];
    if let Some(bin) = chunks.iter().skip(1).find(|c| c.kind == CHUNK_BIN) {
        rows.push(DigestRow::new("binary chunk", friendly_size(bin.data.len() as u64)));
    }
    rows.extend(gltf::rows(&document));
    Ok(rows)
}
