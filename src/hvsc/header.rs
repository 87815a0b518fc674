// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Tune file header decoding.
//!
//! Every tune file starts with a fixed 124-byte prefix of big-endian fields
//! and fixed-width, zero-terminated text:
//!
//! | offset  | field                              |
//! |---------|------------------------------------|
//! | 0..4    | magic identifier                   |
//! | 4..18   | version, data offset, load/init/play addresses, songs, start song |
//! | 18..22  | speed flags                        |
//! | 22..118 | name, author, released (32 bytes each) |
//! | 118..120| flags                              |
//! | 120..124| start page, page length, 2nd and 3rd chip address nibbles |
//!
//! The magic identifier is taken as-is and never validated.

use std::{fs::File, io::Read, path::Path};

use byteorder::{BigEndian, ByteOrder};

use crate::{
    error::{CatalogError, Result},
    model::SidHeader,
};

pub(crate) const HEADER_LEN: usize = 124;

const TEXT_LEN: usize = 32;
const EXTRA_CHIP_BASE: u16 = 0xD000;

/// Reads and decodes the header of the tune file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, or if it holds
/// fewer than [`HEADER_LEN`] bytes.
pub(crate) fn read_sid_header(path: &Path) -> Result<SidHeader> {
    let file = File::open(path).map_err(|e| CatalogError::io(path, e))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| CatalogError::io(path, e))?;

    let header: &[u8; HEADER_LEN] =
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| CatalogError::ShortHeader {
                path: path.to_path_buf(),
                expected: HEADER_LEN,
                found: bytes.len(),
            })?;

    Ok(decode_header(header))
}

/// Decodes a raw header. Decoding is total, any 124 bytes yield a header.
pub(crate) fn decode_header(bytes: &[u8; HEADER_LEN]) -> SidHeader {
    SidHeader {
        magic_id: latin1(&bytes[0..4]),
        version: BigEndian::read_u16(&bytes[4..6]),
        data_offset: BigEndian::read_u16(&bytes[6..8]),
        load_address: BigEndian::read_u16(&bytes[8..10]),
        init_address: BigEndian::read_u16(&bytes[10..12]),
        play_address: BigEndian::read_u16(&bytes[12..14]),
        songs: BigEndian::read_u16(&bytes[14..16]),
        start_song: BigEndian::read_u16(&bytes[16..18]),
        speed: BigEndian::read_u32(&bytes[18..22]),
        name: text_field(&bytes[22..22 + TEXT_LEN]),
        author: text_field(&bytes[54..54 + TEXT_LEN]),
        released: text_field(&bytes[86..86 + TEXT_LEN]),
        flags: BigEndian::read_u16(&bytes[118..120]),
        start_page: bytes[120],
        page_length: bytes[121],
        sid2_address: extra_chip_address(bytes[122]),
        sid3_address: extra_chip_address(bytes[123]),
    }
}

/// The run of bytes before the first zero, one character per byte.
fn text_field(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    latin1(&field[..end])
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

fn extra_chip_address(nibble: u8) -> Option<u16> {
    (nibble != 0).then(|| u16::from(nibble) * 16 + EXTRA_CHIP_BASE)
}

/// Builds raw header bytes for tests.
#[cfg(test)]
pub(crate) fn test_header_bytes(name: &str, author: &str, released: &str, songs: u16) -> [u8; HEADER_LEN] {
    let mut bytes = [0u8; HEADER_LEN];
    bytes[0..4].copy_from_slice(b"PSID");
    BigEndian::write_u16(&mut bytes[4..6], 2);
    BigEndian::write_u16(&mut bytes[6..8], 124);
    BigEndian::write_u16(&mut bytes[10..12], 0x1000);
    BigEndian::write_u16(&mut bytes[12..14], 0x1003);
    BigEndian::write_u16(&mut bytes[14..16], songs);
    BigEndian::write_u16(&mut bytes[16..18], 1);
    for (offset, text) in [(22, name), (54, author), (86, released)] {
        let text = text.as_bytes();
        let len = text.len().min(TEXT_LEN);
        bytes[offset..offset + len].copy_from_slice(&text[..len]);
    }
    bytes
}
