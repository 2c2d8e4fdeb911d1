// Named metadata fields
//
// Maps the field names used by the command line and the JSON metadata
// snapshot (title, artist, bpm, ...) onto the frames that carry them:
// - Plain text frames: TIT2, TPE1, TALB, TBPM, TKEY, TPUB, TPE4, ...
// - Year: TDRC in ID3v2.4 tags, TYER in ID3v2.3 tags
// - Energy level: TXXX with description "EnergyLevel"
// - Comment: COMM with an empty description

use std::fmt;
use std::str::FromStr;

use crate::id3::frames::{frame_ids, FrameId};
use crate::tag::Tag;

/// Standard metadata fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardField {
    Title,
    Artist,
    AlbumArtist,
    Album,
    Composer,
    Year,
    Track,
    Genre,
    Comment,
    Bpm,
    Key,
    EnergyLevel,
    Label,
    Remixer,
}

impl StandardField {
    pub const ALL: [StandardField; 14] = [
        StandardField::Title,
        StandardField::Artist,
        StandardField::AlbumArtist,
        StandardField::Album,
        StandardField::Composer,
        StandardField::Year,
        StandardField::Track,
        StandardField::Genre,
        StandardField::Comment,
        StandardField::Bpm,
        StandardField::Key,
        StandardField::EnergyLevel,
        StandardField::Label,
        StandardField::Remixer,
    ];

    /// Get standard field name (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardField::Title => "title",
            StandardField::Artist => "artist",
            StandardField::AlbumArtist => "album_artist",
            StandardField::Album => "album",
            StandardField::Composer => "composer",
            StandardField::Year => "year",
            StandardField::Track => "track",
            StandardField::Genre => "genre",
            StandardField::Comment => "comment",
            StandardField::Bpm => "bpm",
            StandardField::Key => "key",
            StandardField::EnergyLevel => "energy_level",
            StandardField::Label => "label",
            StandardField::Remixer => "remixer",
        }
    }

    /// Text frame carrying the field; `None` for fields stored in keyed frames
    /// or whose id depends on the tag version
    pub fn frame_id(&self) -> Option<FrameId> {
        match self {
            StandardField::Title => Some(frame_ids::TITLE),
            StandardField::Artist => Some(frame_ids::ARTIST),
            StandardField::AlbumArtist => Some(frame_ids::ALBUM_ARTIST),
            StandardField::Album => Some(frame_ids::ALBUM),
            StandardField::Composer => Some(frame_ids::COMPOSER),
            StandardField::Track => Some(frame_ids::TRACK),
            StandardField::Genre => Some(frame_ids::GENRE),
            StandardField::Bpm => Some(frame_ids::BPM),
            StandardField::Key => Some(frame_ids::KEY),
            StandardField::Label => Some(frame_ids::LABEL),
            StandardField::Remixer => Some(frame_ids::REMIXER),
            StandardField::Year | StandardField::Comment | StandardField::EnergyLevel => None,
        }
    }

    /// Convert a frame id to the field it carries
    pub fn from_frame_id(id: FrameId) -> Option<Self> {
        if id == frame_ids::YEAR || id == frame_ids::RECORDING_TIME {
            return Some(StandardField::Year);
        }
        if id == frame_ids::COMMENT {
            return Some(StandardField::Comment);
        }
        Self::ALL.into_iter().find(|f| f.frame_id() == Some(id))
    }

    /// Read the field from `tag`, empty when absent
    pub fn get(&self, tag: &Tag) -> String {
        match self {
            StandardField::Year => tag.year(),
            StandardField::Genre => tag.genre(),
            StandardField::Comment => tag.comment(""),
            StandardField::EnergyLevel => tag.energy_level(),
            other => other.frame_id().map(|id| tag.text(id)).unwrap_or_default(),
        }
    }

    /// Create or replace the field in `tag`
    pub fn set(&self, tag: &mut Tag, value: &str) {
        match self {
            StandardField::Year => tag.set_year(value),
            StandardField::Comment => tag.set_comment("", value),
            StandardField::EnergyLevel => tag.set_energy_level(value),
            other => {
                if let Some(id) = other.frame_id() {
                    tag.set_text(id, value);
                }
            }
        }
    }

    /// Remove the field from `tag`, returning whether anything was removed
    pub fn remove(&self, tag: &mut Tag) -> bool {
        match self {
            StandardField::Year => {
                let removed = tag.remove_frames(frame_ids::RECORDING_TIME);
                removed + tag.remove_frames(frame_ids::YEAR) > 0
            }
            StandardField::Comment => tag.remove_comment(""),
            StandardField::EnergyLevel => tag.remove_user_text(crate::tag::ENERGY_LEVEL_DESCRIPTION),
            other => other
                .frame_id()
                .is_some_and(|id| tag.remove_frames(id) > 0),
        }
    }
}

impl fmt::Display for StandardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandardField {
    type Err = String;

    /// Parse from string, case-insensitive; `-` and `_` are interchangeable
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('-', "_");
        match name.as_str() {
            "title" => Ok(StandardField::Title),
            "artist" => Ok(StandardField::Artist),
            "album_artist" | "albumartist" => Ok(StandardField::AlbumArtist),
            "album" => Ok(StandardField::Album),
            "composer" => Ok(StandardField::Composer),
            "year" | "date" => Ok(StandardField::Year),
            "track" | "tracknumber" => Ok(StandardField::Track),
            "genre" => Ok(StandardField::Genre),
            "comment" => Ok(StandardField::Comment),
            "bpm" => Ok(StandardField::Bpm),
            "key" => Ok(StandardField::Key),
            "energy_level" | "energy" => Ok(StandardField::EnergyLevel),
            "label" | "publisher" => Ok(StandardField::Label),
            "remixer" => Ok(StandardField::Remixer),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

/// Metadata value converter
pub struct ValueConverter;

impl ValueConverter {
    /// Extract the 4-digit year from timestamps such as "2024-01-15"
    pub fn normalize_year(year: &str) -> String {
        let year_str = year.trim();
        match year_str.get(..4) {
            Some(prefix) if year_str.len() >= 4 => prefix.to_string(),
            _ => year_str.to_string(),
        }
    }

    /// Track position without the total (e.g., "1/10" -> "1")
    pub fn normalize_track(track: &str) -> String {
        track.split('/').next().unwrap_or(track).trim().to_string()
    }
}
