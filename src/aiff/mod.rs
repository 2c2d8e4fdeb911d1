// AIFF support
//
// AIFF files are a FORM group of length-prefixed chunks. The ID3v2 region
// (header, frames and padding) lives in the payload of an "ID3 " chunk.
//
// Layout:
// - "FORM" (4) + big-endian size (4) + form type "AIFF"/"AIFC" (4)
// - chunks: id (4) + big-endian length (4) + payload, padded to even length

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Id3Error, Result};
use crate::id3::v2::{self, Id3v2Tag, HEADER_SIZE};
use crate::rewrite::{choose_strategy, PaddingPolicy, WriteStrategy};
use crate::utils::io::{copy_range, read_be_u32, read_up_to, replace_file};

pub const FORM_ID: &[u8; 4] = b"FORM";
pub const FORM_TYPE_AIFF: &[u8; 4] = b"AIFF";
pub const FORM_TYPE_AIFC: &[u8; 4] = b"AIFC";
pub const ID3_CHUNK: &[u8; 4] = b"ID3 ";
const ID3_CHUNK_LOWER: &[u8; 4] = b"id3 ";

const FORM_HEADER_SIZE: u64 = 12;
const CHUNK_HEADER_SIZE: u64 = 8;

/// A chunk inside the FORM group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub id: [u8; 4],
    /// Offset of the chunk header in the file
    pub offset: u64,
    /// Payload length, pad byte excluded
    pub size: u32,
}

impl Chunk {
    pub fn data_offset(&self) -> u64 {
        self.offset + CHUNK_HEADER_SIZE
    }

    /// Bytes the chunk occupies including header and pad byte
    pub fn padded_len(&self) -> u64 {
        CHUNK_HEADER_SIZE + u64::from(self.size) + u64::from(self.size & 1)
    }

    pub fn is_id3(&self) -> bool {
        &self.id == ID3_CHUNK || &self.id == ID3_CHUNK_LOWER
    }
}

/// Chunk sequence of an AIFF file
#[derive(Debug, Clone)]
pub struct AiffLayout {
    pub form_type: [u8; 4],
    pub form_size: u32,
    pub chunks: Vec<Chunk>,
    /// Where the chunk walk stopped; bytes from here to `form_end` were not parsed
    pub walk_end: u64,
    pub file_len: u64,
}

impl AiffLayout {
    /// End of the FORM group as declared, capped at end of file
    pub fn form_end(&self) -> u64 {
        (CHUNK_HEADER_SIZE + u64::from(self.form_size)).min(self.file_len)
    }

    pub fn id3_chunk(&self) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.is_id3())
    }

    /// Bytes inside the FORM group left after the last walked chunk
    pub fn unparsed_len(&self) -> u64 {
        self.form_end().saturating_sub(self.walk_end)
    }
}

/// Check for the FORM/AIFF signature
pub fn is_aiff<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    reader.seek(SeekFrom::Start(0))?;
    let mut header = [0u8; FORM_HEADER_SIZE as usize];
    let read = read_up_to(reader, &mut header)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(read == header.len()
        && &header[0..4] == FORM_ID
        && (&header[8..12] == FORM_TYPE_AIFF || &header[8..12] == FORM_TYPE_AIFC))
}

/// Walk the chunk sequence, `None` when the file is not AIFF.
///
/// Walking stops at the end of the FORM group or at a chunk that overruns it;
/// `walk_end` records where.
pub fn read_layout<R: Read + Seek>(reader: &mut R) -> io::Result<Option<AiffLayout>> {
    if !is_aiff(reader)? {
        return Ok(None);
    }

    let file_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(4))?;
    let form_size = read_be_u32(reader)?;
    let mut form_type = [0u8; 4];
    reader.read_exact(&mut form_type)?;

    let mut layout = AiffLayout {
        form_type,
        form_size,
        chunks: Vec::new(),
        walk_end: FORM_HEADER_SIZE,
        file_len,
    };
    let form_end = layout.form_end();

    let mut pos = FORM_HEADER_SIZE;
    while pos + CHUNK_HEADER_SIZE <= form_end {
        reader.seek(SeekFrom::Start(pos))?;
        let mut id = [0u8; 4];
        reader.read_exact(&mut id)?;
        let size = read_be_u32(reader)?;

        let chunk = Chunk {
            id,
            offset: pos,
            size,
        };
        if chunk.data_offset() + u64::from(size) > form_end {
            log::warn!(
                "Chunk {:?} at offset {} overruns the FORM group, stopping",
                String::from_utf8_lossy(&id),
                pos
            );
            break;
        }

        layout.chunks.push(chunk);
        pos += chunk.padded_len();
    }
    layout.walk_end = pos.min(form_end);

    log::debug!(
        "AIFF: {} chunks, ID3 chunk {}",
        layout.chunks.len(),
        if layout.id3_chunk().is_some() { "present" } else { "absent" }
    );
    Ok(Some(layout))
}

/// Decode the ID3v2 region stored in `chunk`.
///
/// The chunk supplies the length; a payload without a valid ID3v2 header
/// decodes to `None`.
pub fn read_tag<R: Read + Seek>(reader: &mut R, chunk: &Chunk) -> io::Result<Option<Id3v2Tag>> {
    reader.seek(SeekFrom::Start(chunk.data_offset()))?;
    let mut data = vec![0u8; chunk.size as usize];
    reader.read_exact(&mut data)?;

    let tag = Id3v2Tag::parse(&data);
    if tag.is_none() {
        log::warn!("ID3 chunk does not start with an ID3v2 header");
    }
    Ok(tag)
}

/// Commit an encoded frame body to the ID3 chunk of `path`.
///
/// Returns the strategy taken and the size of the ID3 chunk payload now on disk.
pub fn save(
    path: &Path,
    body: &[u8],
    version: (u8, u8),
    flags: u8,
    policy: &PaddingPolicy,
) -> Result<(WriteStrategy, u64)> {
    let mut source = File::open(path)?;
    let layout = read_layout(&mut source)?.ok_or(Id3Error::UnsupportedContainer)?;
    let existing = layout.id3_chunk().copied();

    let needed = (HEADER_SIZE + body.len()) as u64;
    let strategy = choose_strategy(
        existing.map(|c| u64::from(c.size)),
        needed,
        !body.is_empty(),
        policy,
    );

    let region_size = match (strategy, existing) {
        (WriteStrategy::InPlace, Some(chunk)) => {
            // Chunk length stays the same, so no other chunk moves
            let padding = (u64::from(chunk.size) - needed) as usize;
            let region = v2::build_region(version, flags, body, padding)?;

            let mut file = OpenOptions::new().read(true).write(true).open(path)?;
            file.seek(SeekFrom::Start(chunk.data_offset()))?;
            file.write_all(&region)?;
            file.sync_all()?;
            u64::from(chunk.size)
        }
        (WriteStrategy::Untouched, _) => 0,
        _ => {
            let region = v2::build_region(version, flags, body, policy.padding())?;
            rebuild(path, &mut source, &layout, &region)?;
            region.len() as u64
        }
    };

    log::debug!(
        "Saved {} ({:?}, ID3 chunk {} bytes)",
        path.display(),
        strategy,
        region_size
    );
    Ok((strategy, region_size))
}

fn write_id3_chunk<W: Write>(writer: &mut W, region: &[u8]) -> io::Result<()> {
    let size = u32::try_from(region.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "ID3 chunk too large"))?;
    writer.write_all(ID3_CHUNK)?;
    writer.write_all(&size.to_be_bytes())?;
    writer.write_all(region)?;
    if region.len() % 2 == 1 {
        writer.write_all(&[0])?;
    }
    Ok(())
}

/// Copy every chunk into a new file, substituting the ID3 chunk, and fix the FORM size.
///
/// Unparsed bytes at the end of the FORM group (a truncated or damaged chunk)
/// follow the ID3 chunk verbatim.
fn rebuild(path: &Path, source: &mut File, layout: &AiffLayout, region: &[u8]) -> Result<()> {
    replace_file(path, |temp| {
        temp.write_all(FORM_ID)?;
        temp.write_all(&[0u8; 4])?;
        temp.write_all(&layout.form_type)?;

        let mut wrote_id3 = false;
        for chunk in &layout.chunks {
            if chunk.is_id3() {
                // Duplicate ID3 chunks are dropped
                if !wrote_id3 {
                    write_id3_chunk(temp, region)?;
                    wrote_id3 = true;
                }
                continue;
            }
            copy_range(
                source,
                temp,
                chunk.offset,
                CHUNK_HEADER_SIZE + u64::from(chunk.size),
            )?;
            if chunk.size % 2 == 1 {
                temp.write_all(&[0])?;
            }
        }
        if !wrote_id3 {
            write_id3_chunk(temp, region)?;
        }
        let unparsed = layout.unparsed_len();
        if unparsed > 0 {
            log::warn!(
                "Copying {} unparsed bytes at the end of the FORM group as-is",
                unparsed
            );
            copy_range(source, temp, layout.walk_end, unparsed)?;
        }

        let form_end = temp.stream_position()?;
        let form_size = u32::try_from(form_end - CHUNK_HEADER_SIZE)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "FORM group too large"))?;
        temp.seek(SeekFrom::Start(4))?;
        temp.write_all(&form_size.to_be_bytes())?;
        temp.seek(SeekFrom::Start(form_end))?;

        // Bytes trailing the FORM group are carried over untouched
        let declared_end = CHUNK_HEADER_SIZE + u64::from(layout.form_size);
        if declared_end < layout.file_len {
            copy_range(source, temp, declared_end, layout.file_len - declared_end)?;
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::frames::{frame_ids, Frame};
    use crate::utils::encoding::TextEncoding;
    use std::fs;
    use std::io::Cursor;

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn aiff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"FORM".to_vec();
        out.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
        out.extend_from_slice(b"AIFF");
        out.extend(body);
        out
    }

    fn comm() -> Vec<u8> {
        chunk(b"COMM", &[0, 2, 0, 0, 0, 4, 0, 16, 0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0])
    }

    fn ssnd() -> Vec<u8> {
        chunk(b"SSND", &[0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7])
    }

    fn body(title: &str) -> Vec<u8> {
        let frames = vec![Frame::text(frame_ids::TITLE, title, TextEncoding::Latin1)];
        v2::encode_frames(&frames, 4).unwrap()
    }

    #[test]
    fn test_detect() {
        assert!(is_aiff(&mut Cursor::new(aiff(&[comm()]))).unwrap());
        assert!(!is_aiff(&mut Cursor::new(b"ID3\x04\0\0\0\0\0\0".to_vec())).unwrap());
        let mut wav = aiff(&[comm()]);
        wav[8..12].copy_from_slice(b"WAVE");
        assert!(!is_aiff(&mut Cursor::new(wav)).unwrap());
    }

    #[test]
    fn test_layout_handles_odd_chunks() {
        let layout = read_layout(&mut Cursor::new(aiff(&[comm(), ssnd()])))
            .unwrap()
            .unwrap();
        assert_eq!(layout.chunks.len(), 2);
        assert_eq!(&layout.chunks[1].id, b"SSND");
        assert_eq!(layout.chunks[1].size, 15);
        assert_eq!(layout.chunks[1].padded_len(), 24);
        assert!(layout.id3_chunk().is_none());
    }

    #[test]
    fn test_layout_stops_at_overrun() {
        let mut data = aiff(&[comm(), ssnd()]);
        // Claim SSND is much larger than the file
        let ssnd_offset = 12 + comm().len();
        data[ssnd_offset + 4..ssnd_offset + 8].copy_from_slice(&1000u32.to_be_bytes());
        let layout = read_layout(&mut Cursor::new(data)).unwrap().unwrap();
        assert_eq!(layout.chunks.len(), 1);
        assert_eq!(layout.walk_end, ssnd_offset as u64);
        assert_eq!(layout.unparsed_len(), ssnd().len() as u64);
    }

    #[test]
    fn test_rebuild_keeps_truncated_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.aiff");
        let mut original = aiff(&[comm(), ssnd()]);
        let ssnd_offset = 12 + comm().len();
        original[ssnd_offset + 4..ssnd_offset + 8].copy_from_slice(&79u32.to_be_bytes());
        fs::write(&path, &original).unwrap();

        let (strategy, _) = save(&path, &body("Cut"), (4, 0), 0, &PaddingPolicy::default()).unwrap();
        assert_eq!(strategy, WriteStrategy::Rebuild);

        let data = fs::read(&path).unwrap();
        assert_eq!(&data[data.len() - ssnd().len()..], &original[ssnd_offset..]);
        let layout = read_layout(&mut Cursor::new(&data)).unwrap().unwrap();
        let ids: Vec<&[u8; 4]> = layout.chunks.iter().map(|c| &c.id).collect();
        assert_eq!(ids, vec![b"COMM", ID3_CHUNK]);
        assert_eq!(layout.form_size as usize, data.len() - 8);
    }

    #[test]
    fn test_rebuild_inserts_chunk_and_fixes_form_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.aiff");
        fs::write(&path, aiff(&[comm(), ssnd()])).unwrap();

        let (strategy, region) = save(&path, &body("Odd"), (4, 0), 0, &PaddingPolicy::default()).unwrap();
        assert_eq!(strategy, WriteStrategy::Rebuild);

        let data = fs::read(&path).unwrap();
        let form_size = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
        assert_eq!(form_size, data.len() - 8);

        let mut cursor = Cursor::new(data);
        let layout = read_layout(&mut cursor).unwrap().unwrap();
        let ids: Vec<&[u8; 4]> = layout.chunks.iter().map(|c| &c.id).collect();
        assert_eq!(ids, vec![b"COMM", b"SSND", ID3_CHUNK]);
        let id3 = *layout.id3_chunk().unwrap();
        assert_eq!(u64::from(id3.size), region);
        let tag = read_tag(&mut cursor, &id3).unwrap().unwrap();
        assert_eq!(tag.frames[0].decode_text(), "Odd");
    }

    #[test]
    fn test_in_place_keeps_other_chunks_still() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.aiff");
        let region = v2::build_region((4, 0), 0, &body("A long original title"), 64).unwrap();
        let original = aiff(&[comm(), chunk(ID3_CHUNK, &region), ssnd()]);
        fs::write(&path, &original).unwrap();

        let (strategy, size) = save(&path, &body("Short"), (4, 0), 0, &PaddingPolicy::default()).unwrap();
        assert_eq!(strategy, WriteStrategy::InPlace);
        assert_eq!(size, region.len() as u64);

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), original.len());
        // SSND is byte-identical and in the same place
        let ssnd = ssnd();
        assert_eq!(&data[data.len() - ssnd.len()..], &ssnd[..]);
        assert_eq!(&data[..12 + comm().len()], &original[..12 + comm().len()]);
    }

    #[test]
    fn test_rebuild_replaces_chunk_in_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.aiff");
        let region = v2::build_region((3, 0), 0, &body("x"), 0).unwrap();
        fs::write(&path, aiff(&[comm(), chunk(ID3_CHUNK, &region), ssnd()])).unwrap();

        let (strategy, _) = save(&path, &body("a title that no longer fits"), (3, 0), 0, &PaddingPolicy::default()).unwrap();
        assert_eq!(strategy, WriteStrategy::Rebuild);

        let data = fs::read(&path).unwrap();
        let layout = read_layout(&mut Cursor::new(&data)).unwrap().unwrap();
        let ids: Vec<&[u8; 4]> = layout.chunks.iter().map(|c| &c.id).collect();
        assert_eq!(ids, vec![b"COMM", ID3_CHUNK, b"SSND"]);
        assert_eq!(layout.form_size as usize, data.len() - 8);
    }

    #[test]
    fn test_untagged_without_frames_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.aiff");
        let original = aiff(&[comm(), ssnd()]);
        fs::write(&path, &original).unwrap();

        let (strategy, size) = save(&path, &[], (4, 0), 0, &PaddingPolicy::default()).unwrap();
        assert_eq!(strategy, WriteStrategy::Untouched);
        assert_eq!(size, 0);
        assert_eq!(fs::read(&path).unwrap(), original);
    }
}
