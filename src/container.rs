//! Low-level map container codec.
//!
//! The container is a length-prefixed, offset-indexed binary format: a 4-byte
//! magic, eight little-endian u32 header fields, an item-type index table,
//! cumulative offset tables, the serialized items and finally the
//! zlib-compressed data blocks. Encoding and decoding are byte-exact inverses
//! for the structural region, and data blocks round-trip through compression.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;

use crate::error::{MapError, Result};

/// File magic.
pub const MAGIC: [u8; 4] = *b"DATA";

/// The only supported format version.
pub const FORMAT_VERSION: u32 = 4;

/// One structural record of the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: u16,
    pub type_id: u16,
    pub payload: Vec<u32>,
}

impl Item {
    pub fn new(id: u16, type_id: u16, payload: Vec<u32>) -> Self {
        Self {
            id,
            type_id,
            payload,
        }
    }

    /// Serialized size: type/id word, payload length word, payload words.
    fn byte_len(&self) -> usize {
        (self.payload.len() + 2) * 4
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        let type_and_id = ((self.type_id as u32) << 16) | self.id as u32;
        out.extend_from_slice(&type_and_id.to_le_bytes());
        out.extend_from_slice(&((self.payload.len() * 4) as u32).to_le_bytes());
        for word in &self.payload {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }
}

/// The eight header fields following the magic.
#[derive(Clone, Copy, Debug)]
pub struct Header {
    pub version: u32,
    pub size: u32,
    pub swaplen: u32,
    pub num_item_types: u32,
    pub num_items: u32,
    pub num_data: u32,
    pub item_area_size: u32,
    pub data_area_size: u32,
}

/// Check the magic and read the header fields.
pub fn parse_header(bytes: &[u8]) -> Result<Header> {
    let mut r = Reader::new(bytes);
    let magic = r.read_bytes(4)?;
    if magic != MAGIC {
        return Err(MapError::MalformedContainer(format!(
            "bad magic {:?}",
            magic
        )));
    }
    let header = Header {
        version: r.read_u32()?,
        size: r.read_u32()?,
        swaplen: r.read_u32()?,
        num_item_types: r.read_u32()?,
        num_items: r.read_u32()?,
        num_data: r.read_u32()?,
        item_area_size: r.read_u32()?,
        data_area_size: r.read_u32()?,
    };
    if header.version != FORMAT_VERSION {
        return Err(MapError::UnsupportedVersion(header.version));
    }
    Ok(header)
}

/// Encode items and data blocks into container bytes.
///
/// Items are grouped by type in ascending type-id order regardless of their
/// construction order (stable, so ids keep their relative order within a
/// type), and the `(type, first, count)` index table is computed over the
/// output ordering. Every data block is compressed independently.
pub fn encode(items: &[Item], data: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut ordered: Vec<&Item> = items.iter().collect();
    ordered.sort_by_key(|item| item.type_id);

    let compressed = data
        .iter()
        .map(|block| compress_block(block))
        .collect::<Result<Vec<Vec<u8>>>>()?;

    let mut type_groups: Vec<(u16, u32, u32)> = Vec::new();
    for (i, item) in ordered.iter().enumerate() {
        match type_groups.last_mut() {
            Some(group) if group.0 == item.type_id => group.2 += 1,
            _ => type_groups.push((item.type_id, i as u32, 1)),
        }
    }

    let item_area_size: usize = ordered.iter().map(|item| item.byte_len()).sum();
    let data_area_size: usize = compressed.iter().map(|block| block.len()).sum();
    // Header math preserved literally from the established on-disk format:
    // swaplen counts everything between the first three header fields and the
    // compressed data region.
    let swaplen =
        36 - 16 + 12 * type_groups.len() + 4 * ordered.len() + 8 * data.len() + item_area_size;
    let size = swaplen + data_area_size;

    debug!(
        "encoding container: {} items in {} type groups, {} data blocks, {} bytes compressed",
        ordered.len(),
        type_groups.len(),
        data.len(),
        data_area_size
    );

    let mut out = Vec::with_capacity(4 + 12 + size);
    out.extend_from_slice(&MAGIC);
    for field in [
        FORMAT_VERSION,
        size as u32,
        swaplen as u32,
        type_groups.len() as u32,
        ordered.len() as u32,
        data.len() as u32,
        item_area_size as u32,
        data_area_size as u32,
    ] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    for (type_id, first, count) in &type_groups {
        out.extend_from_slice(&(*type_id as u32).to_le_bytes());
        out.extend_from_slice(&first.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
    }
    let mut offset = 0u32;
    for item in &ordered {
        out.extend_from_slice(&offset.to_le_bytes());
        offset += item.byte_len() as u32;
    }
    let mut offset = 0u32;
    for block in &compressed {
        out.extend_from_slice(&offset.to_le_bytes());
        offset += block.len() as u32;
    }
    for block in data {
        out.extend_from_slice(&(block.len() as u32).to_le_bytes());
    }
    for item in &ordered {
        item.write_to(&mut out);
    }
    for block in &compressed {
        out.extend_from_slice(block);
    }
    Ok(out)
}

/// Decode a container into its items and decompressed data blocks.
///
/// Every declared count, offset and length is checked against the buffer, and
/// each block's decompressed size is verified against the stored uncompressed
/// length.
pub fn decode(bytes: &[u8]) -> Result<(Vec<Item>, Vec<Vec<u8>>)> {
    let header = parse_header(bytes)?;
    let mut r = Reader::new(bytes);
    r.skip(4 + 32)?; // magic + header, already parsed

    // item-type index table; only validated here, the items carry their own
    // type ids
    for _ in 0..header.num_item_types {
        let _type_id = r.read_u32()?;
        let first = r.read_u32()?;
        let count = r.read_u32()?;
        let end = first as u64 + count as u64;
        if end > header.num_items as u64 {
            return Err(MapError::MalformedContainer(format!(
                "item type group {}..{} exceeds item count {}",
                first, end, header.num_items
            )));
        }
    }

    for _ in 0..header.num_items {
        let _item_offset = r.read_u32()?;
    }

    let mut data_offsets = Vec::new();
    for _ in 0..header.num_data {
        data_offsets.push(r.read_u32()?);
    }
    let mut uncompressed_lengths = Vec::new();
    for _ in 0..header.num_data {
        uncompressed_lengths.push(r.read_u32()?);
    }

    let mut items = Vec::new();
    for _ in 0..header.num_items {
        let type_and_id = r.read_u32()?;
        let payload_bytes = r.read_u32()?;
        if payload_bytes % 4 != 0 {
            return Err(MapError::MalformedContainer(format!(
                "item payload length {} is not a multiple of 4",
                payload_bytes
            )));
        }
        let mut payload = Vec::new();
        for _ in 0..payload_bytes / 4 {
            payload.push(r.read_u32()?);
        }
        items.push(Item {
            id: (type_and_id & 0xffff) as u16,
            type_id: (type_and_id >> 16) as u16,
            payload,
        });
    }

    let data_area = r.read_bytes(header.data_area_size as usize)?;
    let mut data = Vec::new();
    for (i, (&start, &uncompressed_len)) in data_offsets
        .iter()
        .zip(uncompressed_lengths.iter())
        .enumerate()
    {
        let end = data_offsets
            .get(i + 1)
            .copied()
            .unwrap_or(header.data_area_size);
        if start > end || end > header.data_area_size {
            return Err(MapError::MalformedContainer(format!(
                "data block {} spans {}..{} outside data area of {} bytes",
                i, start, end, header.data_area_size
            )));
        }
        let block = decompress_block(&data_area[start as usize..end as usize])?;
        if block.len() != uncompressed_len as usize {
            return Err(MapError::MalformedContainer(format!(
                "data block {} decompressed to {} bytes, expected {}",
                i,
                block.len(),
                uncompressed_len
            )));
        }
        data.push(block);
    }

    debug!(
        "decoded container: {} items, {} data blocks",
        items.len(),
        data.len()
    );
    Ok((items, data))
}

fn compress_block(block: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(block)?;
    Ok(encoder.finish()?)
}

fn decompress_block(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut out)
        .map_err(|err| MapError::MalformedContainer(format!("decompression failed: {}", err)))?;
    Ok(out)
}

/// Bounds-checked little-endian cursor over the container bytes.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or_else(|| {
            MapError::MalformedContainer("offset overflow while reading".to_string())
        })?;
        if end > self.buf.len() {
            return Err(MapError::MalformedContainer(format!(
                "read of {} bytes at offset {} past end of {}-byte buffer",
                len,
                self.pos,
                self.buf.len()
            )));
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }
}
