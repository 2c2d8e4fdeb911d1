// Serializable snapshot of the common tag fields
//
// Used for JSON input and output. The cover is carried base64-encoded.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Id3Error, Result};
use crate::field_mapping::StandardField;
use crate::id3::frames::{Picture, PictureType};
use crate::tag::Tag;
use crate::utils::encoding::TextEncoding;

/// Front cover or other attached picture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverArt {
    pub mime_type: String,
    /// `APIC` picture type byte, 3 for the front cover
    #[serde(default = "CoverArt::default_picture_type")]
    pub picture_type: u8,
    #[serde(default)]
    pub description: String,
    #[serde(serialize_with = "encode_base64", deserialize_with = "decode_base64")]
    pub data: Vec<u8>,
}

impl CoverArt {
    fn default_picture_type() -> u8 {
        PictureType::CoverFront.as_u8()
    }

    /// Get file extension
    pub fn extension(&self) -> &'static str {
        self.to_picture(TextEncoding::Latin1).extension()
    }

    pub fn to_picture(&self, encoding: TextEncoding) -> Picture {
        Picture {
            encoding,
            mime_type: self.mime_type.clone(),
            picture_type: PictureType::from_u8(self.picture_type),
            description: self.description.clone(),
            data: self.data.clone(),
        }
    }
}

impl From<Picture> for CoverArt {
    fn from(picture: Picture) -> Self {
        CoverArt {
            mime_type: picture.mime_type,
            picture_type: picture.picture_type.as_u8(),
            description: picture.description,
            data: picture.data,
        }
    }
}

fn encode_base64<S: Serializer>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn decode_base64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded.trim()).map_err(serde::de::Error::custom)
}

/// Metadata fields of one file.
///
/// On input, a missing field is left alone and an empty string removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub composer: Option<String>,
    pub year: Option<String>,
    pub track: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub bpm: Option<String>,
    pub key: Option<String>,
    pub energy_level: Option<String>,
    pub label: Option<String>,
    pub remixer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverArt>,
}

impl Metadata {
    /// Capture the fields and front cover of `tag`
    pub fn from_tag(tag: &Tag) -> Self {
        let mut metadata = Metadata {
            file_type: Some(tag.container().as_str().to_string()),
            version: Some(format!("ID3v2.{}.{}", tag.version().0, tag.version().1)),
            cover: tag.picture(PictureType::CoverFront).map(CoverArt::from),
            ..Default::default()
        };
        for field in StandardField::ALL {
            let value = field.get(tag);
            if !value.is_empty() {
                *metadata.field_mut(field) = Some(value);
            }
        }
        metadata
    }

    /// Parse a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Id3Error::InvalidMetadata(e.to_string()))
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| Id3Error::InvalidMetadata(e.to_string()))
    }

    pub fn field(&self, field: StandardField) -> Option<&String> {
        match field {
            StandardField::Title => self.title.as_ref(),
            StandardField::Artist => self.artist.as_ref(),
            StandardField::AlbumArtist => self.album_artist.as_ref(),
            StandardField::Album => self.album.as_ref(),
            StandardField::Composer => self.composer.as_ref(),
            StandardField::Year => self.year.as_ref(),
            StandardField::Track => self.track.as_ref(),
            StandardField::Genre => self.genre.as_ref(),
            StandardField::Comment => self.comment.as_ref(),
            StandardField::Bpm => self.bpm.as_ref(),
            StandardField::Key => self.key.as_ref(),
            StandardField::EnergyLevel => self.energy_level.as_ref(),
            StandardField::Label => self.label.as_ref(),
            StandardField::Remixer => self.remixer.as_ref(),
        }
    }

    pub fn field_mut(&mut self, field: StandardField) -> &mut Option<String> {
        match field {
            StandardField::Title => &mut self.title,
            StandardField::Artist => &mut self.artist,
            StandardField::AlbumArtist => &mut self.album_artist,
            StandardField::Album => &mut self.album,
            StandardField::Composer => &mut self.composer,
            StandardField::Year => &mut self.year,
            StandardField::Track => &mut self.track,
            StandardField::Genre => &mut self.genre,
            StandardField::Comment => &mut self.comment,
            StandardField::Bpm => &mut self.bpm,
            StandardField::Key => &mut self.key,
            StandardField::EnergyLevel => &mut self.energy_level,
            StandardField::Label => &mut self.label,
            StandardField::Remixer => &mut self.remixer,
        }
    }

    /// Write the present fields into `tag`, returning how many were applied
    pub fn apply(&self, tag: &mut Tag) -> usize {
        let mut applied = 0;
        for field in StandardField::ALL {
            match self.field(field) {
                Some(value) if value.is_empty() => {
                    field.remove(tag);
                    applied += 1;
                }
                Some(value) => {
                    field.set(tag, value);
                    applied += 1;
                }
                None => {}
            }
        }
        if let Some(cover) = &self.cover {
            tag.put_picture(cover.to_picture(tag.default_encoding()));
            applied += 1;
        }
        applied
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.title.as_deref().unwrap_or("Unknown");
        let artist = self.artist.as_deref().unwrap_or("Unknown");
        write!(f, "{} - {}", artist, title)?;
        if let Some(album) = &self.album {
            write!(f, " ({})", album)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_and_apply() {
        let mut source = Tag::new();
        source.set_title("One More Time");
        source.set_artist("Daft Punk");
        source.set_bpm("123");
        source.set_energy_level("8");
        source.set_picture(PictureType::CoverFront, vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg");

        let metadata = Metadata::from_tag(&source);
        assert_eq!(metadata.title.as_deref(), Some("One More Time"));
        assert_eq!(metadata.energy_level.as_deref(), Some("8"));
        assert_eq!(metadata.album, None);
        assert_eq!(metadata.version.as_deref(), Some("ID3v2.4.0"));

        let mut target = Tag::new();
        assert_eq!(metadata.apply(&mut target), 5);
        assert_eq!(target.artist(), "Daft Punk");
        assert_eq!(target.bpm(), "123");
        let cover = target.picture(PictureType::CoverFront).unwrap();
        assert_eq!(cover.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_json_cover_is_base64() {
        let metadata = Metadata {
            title: Some("Digital Love".to_string()),
            cover: Some(CoverArt {
                mime_type: "image/png".to_string(),
                picture_type: 3,
                description: String::new(),
                data: b"png!".to_vec(),
            }),
            ..Default::default()
        };
        let json = metadata.to_json(false).unwrap();
        assert!(json.contains("\"data\":\"cG5nIQ==\""));
        assert_eq!(Metadata::from_json(&json).unwrap(), metadata);
    }

    #[test]
    fn test_empty_value_removes_field() {
        let mut tag = Tag::new();
        tag.set_album("Discovery");
        tag.set_key("Am");

        let metadata = Metadata::from_json(r#"{"album": "", "year": "2001"}"#).unwrap();
        metadata.apply(&mut tag);
        assert_eq!(tag.album(), "");
        assert_eq!(tag.key(), "Am");
        assert_eq!(tag.year(), "2001");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Metadata::from_json("{\"title\": 5}"),
            Err(Id3Error::InvalidMetadata(_))
        ));
        assert!(Metadata::from_json(r#"{"cover": {"mime_type": "image/png", "data": "@@@"}}"#).is_err());
    }

    #[test]
    fn test_display() {
        let metadata = Metadata {
            title: Some("Aerodynamic".to_string()),
            artist: Some("Daft Punk".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata.to_string(), "Daft Punk - Aerodynamic");
    }
}
