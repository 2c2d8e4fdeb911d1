// MP3 support
//
// MP3 files keep the ID3v2 region at offset 0 and an optional 128-byte
// ID3v1 trailer at the very end. Everything in between is audio and is
// never modified, only relocated when the region has to grow.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::Result;
use crate::id3::v1::{self, Id3v1Tag};
use crate::id3::v2::{self, Id3v2Tag, HEADER_SIZE};
use crate::rewrite::{choose_strategy, PaddingPolicy, WriteStrategy};
use crate::utils::io::{copy_range, replace_file};

/// Tags found in an MP3 file
#[derive(Debug, Default)]
pub struct Mp3Tags {
    pub id3v2: Option<Id3v2Tag>,
    /// Bytes the ID3v2 region occupies at offset 0
    pub region_size: u64,
    pub id3v1: Option<Id3v1Tag>,
}

/// What to do with the ID3v1 trailer on save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Id3v1Action {
    /// Leave the end of the file as it is
    Keep,
    /// Write `bytes`, overwriting the existing trailer when `replace` is set
    Write {
        bytes: [u8; v1::TAG_SIZE],
        replace: bool,
    },
}

/// Read ID3v2 and ID3v1 tags
pub fn read_tags<R: Read + Seek>(reader: &mut R) -> std::io::Result<Mp3Tags> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    let id3v2 = Id3v2Tag::read(reader)?;
    let declared = id3v2.as_ref().map_or(0, |t| t.header.region_size());
    // A truncated tag only reserves the bytes actually present
    let region_size = declared.min(file_len);
    if region_size < declared {
        log::warn!(
            "ID3v2 region declares {} bytes but the file holds {}",
            declared,
            file_len
        );
    }
    let id3v1 = Id3v1Tag::read(reader, region_size)?;

    log::debug!(
        "MP3: ID3v2 region {} bytes ({} frames), ID3v1 {}",
        region_size,
        id3v2.as_ref().map_or(0, |t| t.frames.len()),
        if id3v1.is_some() { "present" } else { "absent" }
    );

    Ok(Mp3Tags {
        id3v2,
        region_size,
        id3v1,
    })
}

/// Commit an encoded frame body to `path`.
///
/// `existing_region` is the size of the region currently at offset 0
/// (0 when there is none). Returns the strategy taken and the size of the
/// region now on disk.
pub fn save(
    path: &Path,
    body: &[u8],
    version: (u8, u8),
    flags: u8,
    existing_region: u64,
    policy: &PaddingPolicy,
    id3v1: Id3v1Action,
) -> Result<(WriteStrategy, u64)> {
    let needed = (HEADER_SIZE + body.len()) as u64;
    let reserved = (existing_region > 0).then_some(existing_region);
    let strategy = choose_strategy(reserved, needed, !body.is_empty(), policy);

    let region_size = match strategy {
        WriteStrategy::InPlace => {
            let padding = (existing_region - needed) as usize;
            let region = v2::build_region(version, flags, body, padding)?;

            let mut file = OpenOptions::new().read(true).write(true).open(path)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&region)?;
            write_id3v1_in_place(&mut file, id3v1)?;
            file.sync_all()?;
            existing_region
        }
        WriteStrategy::Rebuild => {
            let region = v2::build_region(version, flags, body, policy.padding())?;
            rebuild(path, &region, existing_region, id3v1)?;
            region.len() as u64
        }
        WriteStrategy::Untouched => {
            if id3v1 != Id3v1Action::Keep {
                let mut file = OpenOptions::new().read(true).write(true).open(path)?;
                write_id3v1_in_place(&mut file, id3v1)?;
                file.sync_all()?;
            }
            0
        }
    };

    log::debug!(
        "Saved {} ({:?}, region {} bytes)",
        path.display(),
        strategy,
        region_size
    );
    Ok((strategy, region_size))
}

/// Append or overwrite the trailer; it never changes size
fn write_id3v1_in_place<F: Write + Seek>(file: &mut F, id3v1: Id3v1Action) -> std::io::Result<()> {
    if let Id3v1Action::Write { bytes, replace } = id3v1 {
        if replace {
            file.seek(SeekFrom::End(-(v1::TAG_SIZE as i64)))?;
        } else {
            file.seek(SeekFrom::End(0))?;
        }
        file.write_all(&bytes)?;
    }
    Ok(())
}

/// Write `region` followed by the audio into a new file and swap it in
fn rebuild(path: &Path, region: &[u8], existing_region: u64, id3v1: Id3v1Action) -> Result<()> {
    let mut source = OpenOptions::new().read(true).open(path)?;
    let file_len = source.seek(SeekFrom::End(0))?;

    let audio_end = match id3v1 {
        Id3v1Action::Write { replace: true, .. } => file_len.saturating_sub(v1::TAG_SIZE as u64),
        _ => file_len,
    };
    let audio_start = existing_region.min(audio_end);

    replace_file(path, |temp| {
        temp.write_all(region)?;
        copy_range(&mut source, temp, audio_start, audio_end - audio_start)?;
        if let Id3v1Action::Write { bytes, .. } = id3v1 {
            temp.write_all(&bytes)?;
        }
        Ok(())
    })?;
    Ok(())
}
