// ID3v2 tag implementation

use std::borrow::Cow;
use std::io::{self, Read};

use crate::error::{Id3Error, Result};
use crate::id3::frames::{Frame, FrameId};
use crate::utils::io::{decode_synchsafe, encode_synchsafe, read_up_to, SYNCHSAFE_MAX};

/// Size of the tag header and of every frame header
pub const HEADER_SIZE: usize = 10;
pub const FRAME_HEADER_SIZE: usize = 10;

/// Version written for tags that did not come from a file
pub const DEFAULT_VERSION: (u8, u8) = (4, 0);

/// ID3v2 header flags
pub mod header_flags {
    pub const UNSYNCHRONISATION: u8 = 0x80;
    pub const EXTENDED_HEADER: u8 = 0x40;
    pub const EXPERIMENTAL: u8 = 0x20;
    pub const FOOTER: u8 = 0x10;
}

/// ID3v2.4 frame format flag: frame payload is unsynchronised
const FRAME_UNSYNCHRONISATION: u16 = 0x0002;

/// ID3v2 header structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id3v2Header {
    pub version: (u8, u8),
    pub flags: u8,
    /// Bytes following the header, footer excluded
    pub size: u32,
}

/// ID3v2 tag structure
#[derive(Debug)]
pub struct Id3v2Tag {
    pub header: Id3v2Header,
    pub frames: Vec<Frame>,
}

impl Id3v2Header {
    const ID: [u8; 3] = *b"ID3";

    /// Parse the 10-byte header, `None` when the marker is absent or invalid
    pub fn parse(buffer: &[u8]) -> Option<Self> {
        if buffer.len() < HEADER_SIZE || buffer[0..3] != Self::ID {
            return None;
        }
        let version = (buffer[3], buffer[4]);
        if version.0 == 0xFF || version.1 == 0xFF {
            return None;
        }
        let size_bytes = [buffer[6], buffer[7], buffer[8], buffer[9]];
        if size_bytes.iter().any(|&b| b & 0x80 != 0) {
            return None;
        }

        Some(Id3v2Header {
            version,
            flags: buffer[5],
            size: decode_synchsafe(size_bytes),
        })
    }

    /// Read ID3v2 header from reader
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Option<Self>> {
        let mut buffer = [0u8; HEADER_SIZE];
        let read = read_up_to(reader, &mut buffer)?;
        Ok(Self::parse(&buffer[..read]))
    }

    /// Total bytes the tag occupies on disk
    pub fn region_size(&self) -> u64 {
        let footer = if self.version.0 >= 4 && self.flags & header_flags::FOOTER != 0 {
            HEADER_SIZE as u64
        } else {
            0
        };
        HEADER_SIZE as u64 + u64::from(self.size) + footer
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let size = encode_synchsafe(self.size);
        [
            Self::ID[0],
            Self::ID[1],
            Self::ID[2],
            self.version.0,
            self.version.1,
            self.flags,
            size[0],
            size[1],
            size[2],
            size[3],
        ]
    }
}

impl Id3v2Tag {
    /// Read ID3v2 tag from reader
    ///
    /// A body shorter than the declared size is decoded as far as it goes.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Option<Self>> {
        let header = match Id3v2Header::read(reader)? {
            Some(h) => h,
            None => return Ok(None),
        };

        let mut body = vec![0u8; header.size as usize];
        let read = read_up_to(reader, &mut body)?;
        if read < body.len() {
            log::warn!(
                "ID3v2 body truncated: declared {} bytes, found {}",
                header.size,
                read
            );
            body.truncate(read);
        }

        let frames = decode_frames(&header, &body);
        Ok(Some(Id3v2Tag { header, frames }))
    }

    /// Decode a complete region held in memory (header, frames and padding)
    pub fn parse(region: &[u8]) -> Option<Self> {
        let header = Id3v2Header::parse(region)?;
        let end = (HEADER_SIZE + header.size as usize).min(region.len());
        let frames = decode_frames(&header, &region[HEADER_SIZE..end]);
        Some(Id3v2Tag { header, frames })
    }
}

/// Reverse unsynchronisation: every `FF 00` becomes `FF`
fn resynchronise(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut previous = 0u8;
    for &byte in data {
        if !(previous == 0xFF && byte == 0x00) {
            out.push(byte);
        }
        previous = byte;
    }
    out
}

fn read_frame_size(bytes: [u8; 4], major: u8) -> u32 {
    // Some ID3v2.4 writers store plain sizes; the high bit gives them away
    if major >= 4 && bytes.iter().all(|&b| b & 0x80 == 0) {
        decode_synchsafe(bytes)
    } else {
        u32::from_be_bytes(bytes)
    }
}

/// Decode the frames of a tag body.
///
/// Decoding stops at the first padding byte, at a frame header that does not
/// fit, at an invalid identifier or at a frame overrunning the body. Frames
/// decoded before the anomaly are kept.
pub fn decode_frames(header: &Id3v2Header, body: &[u8]) -> Vec<Frame> {
    let major = header.version.0;
    if major == 2 {
        log::warn!("ID3v2.2 tags are not decoded; treating region as empty");
        return Vec::new();
    }
    if !(3..=4).contains(&major) {
        log::warn!("Unsupported ID3v2 version 2.{}", major);
        return Vec::new();
    }

    let data: Cow<[u8]> = if major == 3 && header.flags & header_flags::UNSYNCHRONISATION != 0 {
        Cow::Owned(resynchronise(body))
    } else {
        Cow::Borrowed(body)
    };

    let mut pos = 0usize;
    if header.flags & header_flags::EXTENDED_HEADER != 0 {
        if data.len() < 4 {
            log::warn!("Extended header flag set but body is too short");
            return Vec::new();
        }
        let raw = [data[0], data[1], data[2], data[3]];
        pos = if major == 3 {
            4 + u32::from_be_bytes(raw) as usize
        } else {
            decode_synchsafe(raw) as usize
        };
    }

    let mut frames = Vec::new();
    while pos + FRAME_HEADER_SIZE <= data.len() {
        if data[pos] == 0 {
            break;
        }

        let id = FrameId::from([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        if !id.is_valid() {
            log::warn!("Invalid frame id {:?} at offset {}, stopping", id, pos);
            break;
        }

        let size = read_frame_size(
            [data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]],
            major,
        ) as usize;
        let mut flags = u16::from_be_bytes([data[pos + 8], data[pos + 9]]);

        let start = pos + FRAME_HEADER_SIZE;
        if size > data.len() - start {
            log::warn!(
                "Frame {} declares {} bytes but only {} remain, stopping",
                id,
                size,
                data.len() - start
            );
            break;
        }

        let mut payload = data[start..start + size].to_vec();
        if major == 4 && flags & FRAME_UNSYNCHRONISATION != 0 {
            payload = resynchronise(&payload);
            flags &= !FRAME_UNSYNCHRONISATION;
        }

        log::trace!("Decoded frame {} ({} bytes)", id, payload.len());
        frames.push(Frame::with_flags(id, flags, payload));
        pos = start + size;
    }

    frames
}

/// Serialize frames in list order, sizing each from its current payload.
pub fn encode_frames(frames: &[Frame], major: u8) -> Result<Vec<u8>> {
    let capacity = frames
        .iter()
        .map(|f| FRAME_HEADER_SIZE + f.payload().len())
        .sum();
    let mut out = Vec::with_capacity(capacity);

    for frame in frames {
        let size = frame.payload().len();
        let size_bytes = if major >= 4 {
            if size > SYNCHSAFE_MAX as usize {
                return Err(Id3Error::FrameTooLarge {
                    id: frame.id().to_string(),
                    size,
                });
            }
            encode_synchsafe(size as u32)
        } else {
            u32::try_from(size)
                .map_err(|_| Id3Error::FrameTooLarge {
                    id: frame.id().to_string(),
                    size,
                })?
                .to_be_bytes()
        };

        out.extend_from_slice(frame.id().as_bytes());
        out.extend_from_slice(&size_bytes);
        out.extend_from_slice(&frame.flags().to_be_bytes());
        out.extend_from_slice(frame.payload());
    }

    Ok(out)
}

/// Assemble a full region: header, encoded frames and `padding` zero bytes.
///
/// Header flags the writer does not honour (unsynchronisation, extended
/// header, footer) are cleared.
pub fn build_region(version: (u8, u8), flags: u8, body: &[u8], padding: usize) -> Result<Vec<u8>> {
    let total = body.len() + padding;
    if total > SYNCHSAFE_MAX as usize {
        return Err(Id3Error::TagTooLarge(total));
    }

    let header = Id3v2Header {
        version,
        flags: flags
            & !(header_flags::UNSYNCHRONISATION
                | header_flags::EXTENDED_HEADER
                | header_flags::FOOTER),
        size: total as u32,
    };

    let mut region = Vec::with_capacity(HEADER_SIZE + total);
    region.extend_from_slice(&header.to_bytes());
    region.extend_from_slice(body);
    region.resize(HEADER_SIZE + total, 0);
    Ok(region)
}

/// Serialize frames into a region with `padding` trailing zero bytes
pub fn generate_id3v2_tag(frames: &[Frame], version: (u8, u8), padding: usize) -> Result<Vec<u8>> {
    let body = encode_frames(frames, version.0)?;
    build_region(version, 0, &body, padding)
}
