// ID3v1 tag implementation

use std::io::{self, Read, Seek, SeekFrom};

use crate::id3::frames::{frame_ids, Comment, Frame};
use crate::id3::genres::{genre_index, genre_name, resolve_genre, UNKNOWN_GENRE};
use crate::utils::encoding::{decode_text, encode_text, TextEncoding};

/// Size of the trailer at the end of the file
pub const TAG_SIZE: usize = 128;

/// ID3v1 tag structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: Option<u8>,
    pub genre: u8,
}

impl Id3v1Tag {
    const TAG_ID: [u8; 3] = *b"TAG";

    /// Read the trailer from the last 128 bytes, if present.
    ///
    /// Files where the trailer would overlap the first `reserved` bytes (the
    /// ID3v2 region) are treated as having none.
    pub fn read<R: Read + Seek>(reader: &mut R, reserved: u64) -> io::Result<Option<Self>> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        if file_size < reserved + TAG_SIZE as u64 {
            return Ok(None);
        }

        reader.seek(SeekFrom::End(-(TAG_SIZE as i64)))?;
        let mut buffer = [0u8; TAG_SIZE];
        reader.read_exact(&mut buffer)?;

        // Check for TAG identifier
        if buffer[0..3] != Self::TAG_ID {
            return Ok(None);
        }

        Ok(Some(Self::parse(&buffer)))
    }

    /// Parse ID3v1 tag from buffer
    pub fn parse(buffer: &[u8; TAG_SIZE]) -> Self {
        let title = Self::parse_string(&buffer[3..33]);
        let artist = Self::parse_string(&buffer[33..63]);
        let album = Self::parse_string(&buffer[63..93]);
        let year = Self::parse_string(&buffer[93..97]);

        // Check for ID3v1.1 track number
        let (comment, track) = if buffer[125] == 0 && buffer[126] != 0 {
            (Self::parse_string(&buffer[97..125]), Some(buffer[126]))
        } else {
            (Self::parse_string(&buffer[97..127]), None)
        };

        Id3v1Tag {
            title,
            artist,
            album,
            year,
            comment,
            track,
            genre: buffer[127],
        }
    }

    /// Parse null-terminated, space-padded string
    fn parse_string(bytes: &[u8]) -> String {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        decode_text(&bytes[..end], TextEncoding::Latin1)
            .trim_end()
            .to_string()
    }

    /// Collect the legacy fields from an ID3v2 frame list
    pub fn from_frames(frames: &[Frame]) -> Self {
        let text = |ids: &[crate::id3::frames::FrameId]| {
            ids.iter()
                .find_map(|id| frames.iter().find(|f| f.id() == *id))
                .map(|f| f.decode_text())
                .unwrap_or_default()
        };

        let track = text(&[frame_ids::TRACK])
            .split('/')
            .next()
            .and_then(|t| t.trim().parse::<u8>().ok())
            .filter(|&t| t != 0);

        let genre = match text(&[frame_ids::GENRE]) {
            g if g.is_empty() => UNKNOWN_GENRE,
            g => genre_index(&resolve_genre(&g)),
        };

        // Prefer the comment without a description
        let comments: Vec<Comment> = frames
            .iter()
            .filter(|f| f.id() == frame_ids::COMMENT)
            .filter_map(|f| Comment::parse(f.payload()))
            .collect();
        let comment = comments
            .iter()
            .find(|c| c.description.is_empty())
            .or_else(|| comments.first())
            .map(|c| c.text.clone())
            .unwrap_or_default();

        Id3v1Tag {
            title: text(&[frame_ids::TITLE]),
            artist: text(&[frame_ids::ARTIST]),
            album: text(&[frame_ids::ALBUM]),
            year: text(&[frame_ids::RECORDING_TIME, frame_ids::YEAR]),
            comment,
            track,
            genre,
        }
    }

    /// Fixed 128-byte ID3v1.1 layout
    pub fn to_bytes(&self) -> [u8; TAG_SIZE] {
        let mut buffer = [0u8; TAG_SIZE];
        buffer[0..3].copy_from_slice(&Self::TAG_ID);
        Self::write_field(&mut buffer[3..33], &self.title);
        Self::write_field(&mut buffer[33..63], &self.artist);
        Self::write_field(&mut buffer[63..93], &self.album);
        Self::write_field(&mut buffer[93..97], &self.year);
        Self::write_field(&mut buffer[97..125], &self.comment);
        buffer[125] = 0;
        buffer[126] = self.track.unwrap_or(0);
        buffer[127] = self.genre;
        buffer
    }

    /// Truncate or space-pad `text` into a fixed-width field
    fn write_field(field: &mut [u8], text: &str) {
        let encoded = encode_text(text, TextEncoding::Latin1);
        let len = encoded.len().min(field.len());
        field[..len].copy_from_slice(&encoded[..len]);
        field[len..].fill(b' ');
    }

    /// True when no legacy field carries a value
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.artist.is_empty()
            && self.album.is_empty()
            && self.year.is_empty()
            && self.comment.is_empty()
            && self.track.is_none()
            && self.genre == UNKNOWN_GENRE
    }

    /// Genre name, `None` for codes outside the table
    pub fn genre_name(&self) -> Option<&'static str> {
        genre_name(i32::from(self.genre)).ok()
    }
}

/// Build the 128-byte legacy trailer from an ID3v2 frame list
pub fn generate_id3v1_tag(frames: &[Frame]) -> [u8; TAG_SIZE] {
    Id3v1Tag::from_frames(frames).to_bytes()
}
