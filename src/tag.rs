// Tag model: the ordered frame list bound to a host file

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aiff;
use crate::error::{Id3Error, Result};
use crate::id3::frames::{
    frame_ids, Comment, Frame, FrameId, Picture, PictureType, PrivateData, UserText, DEFAULT_LANGUAGE,
};
use crate::id3::genres::{genre_name, resolve_genre};
use crate::id3::v1::{generate_id3v1_tag, Id3v1Tag, TAG_SIZE};
use crate::id3::v2::{self, generate_id3v2_tag, DEFAULT_VERSION};
use crate::mp3::{self, Id3v1Action};
use crate::rewrite::{PaddingPolicy, SaveOutcome, WriteStrategy};
use crate::utils::encoding::TextEncoding;

/// User text description that carries the energy level
pub const ENERGY_LEVEL_DESCRIPTION: &str = "EnergyLevel";

/// Host container of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Not loaded from a file yet
    #[default]
    Unknown,
    Mp3,
    Aiff,
}

impl ContainerFormat {
    /// Sniff the container from the first bytes; anything that is not AIFF is MP3
    pub fn detect<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        if aiff::is_aiff(reader)? {
            Ok(ContainerFormat::Aiff)
        } else {
            Ok(ContainerFormat::Mp3)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Unknown => "unknown",
            ContainerFormat::Mp3 => "mp3",
            ContainerFormat::Aiff => "aiff",
        }
    }
}

/// ID3 tag of one MP3 or AIFF file.
///
/// Frames keep their on-disk order, which is also the order they are written
/// in. Mutators only touch the in-memory list; `save()` is the only
/// operation that writes to the file.
#[derive(Debug, Clone)]
pub struct Tag {
    path: Option<PathBuf>,
    frames: Vec<Frame>,
    container: ContainerFormat,
    version: (u8, u8),
    flags: u8,
    existing_region_size: u64,
    padding: PaddingPolicy,
    default_encoding: TextEncoding,
    id3v1: Option<Id3v1Tag>,
    write_id3v1: bool,
    modified: bool,
}

impl Default for Tag {
    fn default() -> Self {
        Tag {
            path: None,
            frames: Vec::new(),
            container: ContainerFormat::Unknown,
            version: DEFAULT_VERSION,
            flags: 0,
            existing_region_size: 0,
            padding: PaddingPolicy::default(),
            default_encoding: TextEncoding::default(),
            id3v1: None,
            write_id3v1: false,
            modified: false,
        }
    }
}

impl Tag {
    /// Empty tag not bound to any file
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the tag of `path`; a file without a tag gives an empty one
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut tag = Tag::new();
        tag.load(path)?;
        Ok(tag)
    }

    /// Bind to `path` and replace the frame list with the tag found there
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let container = ContainerFormat::detect(&mut file)?;

        let (tag, region_size, id3v1) = match container {
            ContainerFormat::Aiff => {
                let layout = aiff::read_layout(&mut file)?.ok_or(Id3Error::UnsupportedContainer)?;
                match layout.id3_chunk().copied() {
                    Some(chunk) => (aiff::read_tag(&mut file, &chunk)?, u64::from(chunk.size), None),
                    None => (None, 0, None),
                }
            }
            _ => {
                let tags = mp3::read_tags(&mut file)?;
                (tags.id3v2, tags.region_size, tags.id3v1)
            }
        };

        let (version, flags, frames) = match tag {
            Some(tag) if matches!(tag.header.version.0, 3 | 4) => {
                (tag.header.version, tag.header.flags, tag.frames)
            }
            _ => (DEFAULT_VERSION, 0, Vec::new()),
        };

        log::debug!(
            "Loaded {} ({}, ID3v2.{}, {} frames, region {} bytes)",
            path.display(),
            container.as_str(),
            version.0,
            frames.len(),
            region_size
        );

        self.path = Some(path.to_path_buf());
        self.frames = frames;
        self.container = container;
        self.version = version;
        self.flags = flags;
        self.existing_region_size = region_size;
        self.id3v1 = id3v1;
        self.modified = false;
        Ok(())
    }

    /// Write the frame list back to the bound file.
    ///
    /// The region is overwritten in place when it fits in the space it
    /// already occupies, otherwise the file is rebuilt through a temporary
    /// file. On failure the file is left as it was.
    pub fn save(&mut self) -> Result<SaveOutcome> {
        let path = self.path.clone().ok_or(Id3Error::NotBound)?;
        let body = v2::encode_frames(&self.frames, self.version.0)?;

        let (strategy, region_size, id3v1_written) = match self.container {
            ContainerFormat::Mp3 => {
                let action = self.id3v1_action();
                let (strategy, region_size) = mp3::save(
                    &path,
                    &body,
                    self.version,
                    self.flags,
                    self.existing_region_size,
                    &self.padding,
                    action,
                )?;
                (strategy, region_size, action != Id3v1Action::Keep)
            }
            ContainerFormat::Aiff => {
                let (strategy, region_size) =
                    aiff::save(&path, &body, self.version, self.flags, &self.padding)?;
                (strategy, region_size, false)
            }
            ContainerFormat::Unknown => return Err(Id3Error::UnsupportedContainer),
        };

        if strategy != WriteStrategy::Untouched {
            self.existing_region_size = region_size;
            self.flags &= !(v2::header_flags::UNSYNCHRONISATION
                | v2::header_flags::EXTENDED_HEADER
                | v2::header_flags::FOOTER);
        }
        if id3v1_written {
            self.id3v1 = Some(Id3v1Tag::from_frames(&self.frames));
        }
        self.modified = false;

        Ok(SaveOutcome {
            strategy,
            region_size: self.existing_region_size,
            id3v1_written,
        })
    }

    /// An existing trailer follows modified frames; a missing one is added
    /// once the frames carry legacy fields, or always with `write_id3v1`
    fn id3v1_action(&self) -> Id3v1Action {
        let legacy = Id3v1Tag::from_frames(&self.frames);
        let bytes = legacy.to_bytes();
        match &self.id3v1 {
            Some(existing) if self.modified && existing.to_bytes() != bytes => {
                Id3v1Action::Write { bytes, replace: true }
            }
            Some(_) => Id3v1Action::Keep,
            None if self.write_id3v1 || (self.modified && !legacy.is_empty()) => {
                Id3v1Action::Write { bytes, replace: false }
            }
            None => Id3v1Action::Keep,
        }
    }

    /// Serialize the frame list into a complete ID3v2 region
    pub fn generate_id3v2(&self) -> Result<Vec<u8>> {
        generate_id3v2_tag(&self.frames, self.version, self.padding.padding())
    }

    /// Build the 128-byte ID3v1 trailer from the frame list
    pub fn generate_id3v1(&self) -> [u8; TAG_SIZE] {
        generate_id3v1_tag(&self.frames)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn container(&self) -> ContainerFormat {
        self.container
    }

    /// ID3v2 (major, revision) used when writing
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Bytes the ID3v2 region occupies on disk, 0 when there is none
    pub fn existing_region_size(&self) -> u64 {
        self.existing_region_size
    }

    pub fn padding_policy(&self) -> &PaddingPolicy {
        &self.padding
    }

    pub fn set_padding_policy(&mut self, policy: PaddingPolicy) {
        self.padding = policy;
    }

    pub fn default_encoding(&self) -> TextEncoding {
        self.default_encoding
    }

    /// Encoding used by setters that do not take one
    pub fn set_default_encoding(&mut self, encoding: TextEncoding) {
        self.default_encoding = encoding;
    }

    /// ID3v1 trailer found on load or written by the last save
    pub fn id3v1(&self) -> Option<&Id3v1Tag> {
        self.id3v1.as_ref()
    }

    pub fn write_id3v1(&self) -> bool {
        self.write_id3v1
    }

    /// Append an ID3v1 trailer to MP3 files that have none, even when the
    /// frames carry no legacy field and the tag is unmodified
    pub fn set_write_id3v1(&mut self, enabled: bool) {
        self.write_id3v1 = enabled;
    }

    /// Whether the frame list changed since the last load or save
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    // Frame list

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// First frame with `id`
    pub fn find_frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id() == id)
    }

    pub fn find_frame_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        let frame = self.frames.iter_mut().find(|f| f.id() == id);
        if frame.is_some() {
            self.modified = true;
        }
        frame
    }

    /// Append a frame to the end of the list
    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
        self.modified = true;
    }

    /// Detach the first frame with `id` and hand it back
    pub fn remove_frame(&mut self, id: FrameId) -> Option<Frame> {
        let index = self.frames.iter().position(|f| f.id() == id)?;
        self.modified = true;
        Some(self.frames.remove(index))
    }

    /// Remove and drop the first frame with `id`
    pub fn delete_frame(&mut self, id: FrameId) -> bool {
        self.remove_frame(id).is_some()
    }

    /// Remove every frame with `id`, returning how many were removed
    pub fn remove_frames(&mut self, id: FrameId) -> usize {
        let before = self.frames.len();
        self.frames.retain(|f| f.id() != id);
        let removed = before - self.frames.len();
        if removed > 0 {
            self.modified = true;
        }
        removed
    }

    /// Empty the frame list; the file is untouched until `save()`
    pub fn clear_tags(&mut self) {
        self.frames.clear();
        self.modified = true;
    }

    /// Empty the frame list and forget everything learned from the file.
    ///
    /// The path binding is kept; `load()` must run again before `save()`.
    pub fn clear(&mut self) {
        let path = self.path.take();
        let padding = self.padding;
        let default_encoding = self.default_encoding;
        let write_id3v1 = self.write_id3v1;
        *self = Tag {
            path,
            padding,
            default_encoding,
            write_id3v1,
            ..Tag::default()
        };
    }

    fn position(&self, id: FrameId, matches: impl Fn(&Frame) -> bool) -> Option<usize> {
        self.frames.iter().position(|f| f.id() == id && matches(f))
    }

    fn upsert(&mut self, id: FrameId, index: Option<usize>, payload: Vec<u8>) {
        match index {
            Some(index) => self.frames[index].set_payload(payload),
            None => self.frames.push(Frame::new(id, payload)),
        }
        self.modified = true;
    }

    fn remove_at(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(index) => {
                self.frames.remove(index);
                self.modified = true;
                true
            }
            None => false,
        }
    }

    // Single-value text frames

    /// Text of the first frame with `id`, empty when absent
    pub fn text(&self, id: FrameId) -> String {
        self.find_frame(id).map(Frame::decode_text).unwrap_or_default()
    }

    /// Create or replace a text frame using the default encoding
    pub fn set_text(&mut self, id: FrameId, value: &str) {
        self.set_text_with_encoding(id, value, self.default_encoding);
    }

    pub fn set_text_with_encoding(&mut self, id: FrameId, value: &str, encoding: TextEncoding) {
        match self.frames.iter_mut().find(|f| f.id() == id) {
            Some(frame) => frame.set_text(value, encoding),
            None => self.frames.push(Frame::text(id, value, encoding)),
        }
        self.modified = true;
    }

    pub fn title(&self) -> String {
        self.text(frame_ids::TITLE)
    }

    pub fn set_title(&mut self, value: &str) {
        self.set_text(frame_ids::TITLE, value);
    }

    pub fn artist(&self) -> String {
        self.text(frame_ids::ARTIST)
    }

    pub fn set_artist(&mut self, value: &str) {
        self.set_text(frame_ids::ARTIST, value);
    }

    pub fn album(&self) -> String {
        self.text(frame_ids::ALBUM)
    }

    pub fn set_album(&mut self, value: &str) {
        self.set_text(frame_ids::ALBUM, value);
    }

    /// Frame id carrying the year for this tag version
    fn year_id(&self) -> FrameId {
        if self.version.0 == 3 {
            frame_ids::YEAR
        } else {
            frame_ids::RECORDING_TIME
        }
    }

    /// Year or recording time, falling back to the id of the other version
    pub fn year(&self) -> String {
        let primary = self.year_id();
        let fallback = if primary == frame_ids::YEAR {
            frame_ids::RECORDING_TIME
        } else {
            frame_ids::YEAR
        };
        self.find_frame(primary)
            .or_else(|| self.find_frame(fallback))
            .map(Frame::decode_text)
            .unwrap_or_default()
    }

    pub fn set_year(&mut self, value: &str) {
        let id = self.year_id();
        self.set_text(id, value);
    }

    /// Track as stored, e.g. "3" or "3/12"
    pub fn track(&self) -> String {
        self.text(frame_ids::TRACK)
    }

    pub fn set_track(&mut self, value: &str) {
        self.set_text(frame_ids::TRACK, value);
    }

    pub fn bpm(&self) -> String {
        self.text(frame_ids::BPM)
    }

    pub fn set_bpm(&mut self, value: &str) {
        self.set_text(frame_ids::BPM, value);
    }

    pub fn key(&self) -> String {
        self.text(frame_ids::KEY)
    }

    pub fn set_key(&mut self, value: &str) {
        self.set_text(frame_ids::KEY, value);
    }

    pub fn label(&self) -> String {
        self.text(frame_ids::LABEL)
    }

    pub fn set_label(&mut self, value: &str) {
        self.set_text(frame_ids::LABEL, value);
    }

    pub fn remixer(&self) -> String {
        self.text(frame_ids::REMIXER)
    }

    pub fn set_remixer(&mut self, value: &str) {
        self.set_text(frame_ids::REMIXER, value);
    }

    /// Genre with numeric references such as "(17)" resolved to names
    pub fn genre(&self) -> String {
        let raw = self.text(frame_ids::GENRE);
        if raw.is_empty() {
            raw
        } else {
            resolve_genre(&raw)
        }
    }

    pub fn set_genre(&mut self, value: &str) {
        self.set_text(frame_ids::GENRE, value);
    }

    /// Set the genre from a numeric ID3v1 code
    pub fn set_genre_index(&mut self, index: i32) -> Result<()> {
        let name = genre_name(index)?;
        self.set_genre(name);
        Ok(())
    }

    pub fn energy_level(&self) -> String {
        self.user_text(ENERGY_LEVEL_DESCRIPTION)
    }

    pub fn set_energy_level(&mut self, value: &str) {
        self.set_user_text(ENERGY_LEVEL_DESCRIPTION, value);
    }

    // Comments, keyed by (language, description)

    fn comment_position(&self, language: Option<[u8; 3]>, description: &str) -> Option<usize> {
        self.position(frame_ids::COMMENT, |f| {
            Comment::parse(f.payload()).is_some_and(|c| {
                c.description == description && language.map_or(true, |l| l == c.language)
            })
        })
    }

    /// Text of the first comment with `description`, in any language
    pub fn comment(&self, description: &str) -> String {
        self.comment_position(None, description)
            .and_then(|i| Comment::parse(self.frames[i].payload()))
            .map(|c| c.text)
            .unwrap_or_default()
    }

    pub fn set_comment(&mut self, description: &str, text: &str) {
        self.set_comment_in(DEFAULT_LANGUAGE, description, text);
    }

    pub fn set_comment_in(&mut self, language: [u8; 3], description: &str, text: &str) {
        let comment = Comment {
            encoding: self.default_encoding,
            language,
            description: description.to_string(),
            text: text.to_string(),
        };
        let index = self.comment_position(Some(language), description);
        self.upsert(frame_ids::COMMENT, index, comment.to_payload());
    }

    /// Remove the first comment with `description`; absent is not an error
    pub fn remove_comment(&mut self, description: &str) -> bool {
        let index = self.comment_position(None, description);
        self.remove_at(index)
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.frames
            .iter()
            .filter(|f| f.id() == frame_ids::COMMENT)
            .filter_map(|f| Comment::parse(f.payload()))
            .collect()
    }

    // User-defined text, keyed by description

    fn user_text_position(&self, description: &str) -> Option<usize> {
        self.position(frame_ids::USER_TEXT, |f| {
            UserText::parse(f.payload()).is_some_and(|t| t.description == description)
        })
    }

    pub fn find_user_defined_text(&self, description: &str) -> Option<&Frame> {
        self.user_text_position(description).map(|i| &self.frames[i])
    }

    pub fn user_text(&self, description: &str) -> String {
        self.find_user_defined_text(description)
            .and_then(|f| UserText::parse(f.payload()))
            .map(|t| t.value)
            .unwrap_or_default()
    }

    pub fn set_user_text(&mut self, description: &str, value: &str) {
        let user_text = UserText {
            encoding: self.default_encoding,
            description: description.to_string(),
            value: value.to_string(),
        };
        let index = self.user_text_position(description);
        self.upsert(frame_ids::USER_TEXT, index, user_text.to_payload());
    }

    pub fn remove_user_text(&mut self, description: &str) -> bool {
        let index = self.user_text_position(description);
        self.remove_at(index)
    }

    pub fn user_texts(&self) -> Vec<UserText> {
        self.frames
            .iter()
            .filter(|f| f.id() == frame_ids::USER_TEXT)
            .filter_map(|f| UserText::parse(f.payload()))
            .collect()
    }

    // Pictures, keyed by picture type

    fn picture_position(&self, picture_type: PictureType) -> Option<usize> {
        self.position(frame_ids::PICTURE, |f| {
            Picture::peek_type(f.payload()) == Some(picture_type)
        })
    }

    pub fn picture(&self, picture_type: PictureType) -> Option<Picture> {
        self.picture_position(picture_type)
            .and_then(|i| Picture::parse(self.frames[i].payload()))
    }

    pub fn has_picture(&self, picture_type: PictureType) -> bool {
        self.picture_position(picture_type).is_some()
    }

    /// Create or replace the picture of `picture_type`
    pub fn set_picture(&mut self, picture_type: PictureType, data: Vec<u8>, mime_type: &str) {
        self.put_picture(Picture {
            encoding: self.default_encoding,
            mime_type: mime_type.to_string(),
            picture_type,
            description: String::new(),
            data,
        });
    }

    /// Create or replace the picture of the same type as `picture`
    pub fn put_picture(&mut self, picture: Picture) {
        let index = self.picture_position(picture.picture_type);
        self.upsert(frame_ids::PICTURE, index, picture.to_payload());
    }

    pub fn remove_picture(&mut self, picture_type: PictureType) -> bool {
        let index = self.picture_position(picture_type);
        self.remove_at(index)
    }

    pub fn pictures(&self) -> Vec<Picture> {
        self.frames
            .iter()
            .filter(|f| f.id() == frame_ids::PICTURE)
            .filter_map(|f| Picture::parse(f.payload()))
            .collect()
    }

    // Private data, keyed by owner identifier

    fn private_position(&self, owner: &str) -> Option<usize> {
        self.position(frame_ids::PRIVATE, |f| PrivateData::parse(f.payload()).owner == owner)
    }

    pub fn private_data(&self, owner: &str) -> Option<Vec<u8>> {
        self.private_position(owner)
            .map(|i| PrivateData::parse(self.frames[i].payload()).data)
    }

    pub fn set_private_data(&mut self, owner: &str, data: Vec<u8>) {
        let private = PrivateData {
            owner: owner.to_string(),
            data,
        };
        let index = self.private_position(owner);
        self.upsert(frame_ids::PRIVATE, index, private.to_payload());
    }

    pub fn remove_private_data(&mut self, owner: &str) -> bool {
        let index = self.private_position(owner);
        self.remove_at(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tag() {
        let tag = Tag::new();
        assert_eq!(tag.frame_count(), 0);
        assert_eq!(tag.artist(), "");
        assert_eq!(tag.container(), ContainerFormat::Unknown);
        assert_eq!(tag.default_encoding(), TextEncoding::Utf16);
        assert!(!tag.is_modified());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut tag = Tag::new();
        tag.set_artist("Daft Punk");
        tag.set_title("Da Funk");
        tag.set_artist("Thomas Bangalter");
        assert_eq!(tag.frame_count(), 2);
        assert_eq!(tag.artist(), "Thomas Bangalter");
        // Replacement keeps the original position
        assert_eq!(tag.frames()[0].id(), frame_ids::ARTIST);
        assert!(tag.is_modified());
    }

    #[test]
    fn test_set_text_with_encoding() {
        let mut tag = Tag::new();
        tag.set_text_with_encoding(frame_ids::ALBUM, "Homework", TextEncoding::Utf8);
        assert_eq!(tag.find_frame(frame_ids::ALBUM).unwrap().encoding(), Some(TextEncoding::Utf8));
        tag.set_default_encoding(TextEncoding::Latin1);
        tag.set_album("Discovery");
        assert_eq!(tag.find_frame(frame_ids::ALBUM).unwrap().encoding(), Some(TextEncoding::Latin1));
        assert_eq!(tag.album(), "Discovery");
    }

    #[test]
    fn test_year_follows_version() {
        let mut tag = Tag::new();
        tag.set_year("2001");
        assert!(tag.find_frame(frame_ids::RECORDING_TIME).is_some());
        assert_eq!(tag.year(), "2001");

        let mut v23 = Tag::new();
        v23.version = (3, 0);
        v23.set_year("1997");
        assert!(v23.find_frame(frame_ids::YEAR).is_some());
        // A v2.4 frame is still read from a v2.3 tag
        v23.remove_frame(frame_ids::YEAR);
        v23.add_frame(Frame::text(frame_ids::RECORDING_TIME, "1999", TextEncoding::Latin1));
        assert_eq!(v23.year(), "1999");
    }

    #[test]
    fn test_genre() {
        let mut tag = Tag::new();
        tag.set_genre("(17)");
        assert_eq!(tag.genre(), "Rock");
        tag.set_genre_index(35).unwrap();
        assert_eq!(tag.genre(), "House");
        assert!(matches!(tag.set_genre_index(-1), Err(Id3Error::InvalidGenreIndex(-1))));
        assert_eq!(tag.genre(), "House");
    }

    #[test]
    fn test_user_text_disambiguation() {
        let mut tag = Tag::new();
        tag.set_user_text("CATALOG", "TRAX-01");
        tag.set_energy_level("7");
        tag.set_user_text("CATALOG", "TRAX-02");
        assert_eq!(tag.frame_count(), 2);
        assert_eq!(tag.user_text("CATALOG"), "TRAX-02");
        assert_eq!(tag.energy_level(), "7");
        assert!(tag.find_user_defined_text("EnergyLevel").is_some());
        assert_eq!(tag.user_texts().len(), 2);

        assert!(tag.remove_user_text("CATALOG"));
        assert!(!tag.remove_user_text("CATALOG"));
        assert_eq!(tag.frame_count(), 1);
    }

    #[test]
    fn test_comments_keyed_by_language_and_description() {
        let mut tag = Tag::new();
        tag.set_comment("", "first");
        tag.set_comment_in(*b"fra", "", "premier");
        tag.set_comment("", "replaced");
        assert_eq!(tag.frame_count(), 2);
        assert_eq!(tag.comment(""), "replaced");
        assert_eq!(tag.comments().len(), 2);

        assert!(tag.remove_comment(""));
        assert_eq!(tag.comment(""), "premier");
        assert!(tag.remove_comment(""));
        assert!(!tag.remove_comment(""));
    }

    #[test]
    fn test_picture_lifecycle() {
        let mut tag = Tag::new();
        let image = vec![0x89, b'P', b'N', b'G', 0, 0, 1, 2];
        assert!(!tag.has_picture(PictureType::CoverFront));

        tag.set_picture(PictureType::CoverFront, image.clone(), "image/png");
        tag.set_picture(PictureType::CoverBack, vec![1, 2, 3], "image/jpeg");
        let front = tag.picture(PictureType::CoverFront).unwrap();
        assert_eq!(front.data, image);
        assert_eq!(front.mime_type, "image/png");
        assert!(tag.has_picture(PictureType::CoverFront));

        tag.set_picture(PictureType::CoverFront, vec![9], "image/jpeg");
        assert_eq!(tag.pictures().len(), 2);

        assert!(tag.remove_picture(PictureType::CoverFront));
        assert!(tag.picture(PictureType::CoverFront).is_none());
        assert!(!tag.has_picture(PictureType::CoverFront));
        assert!(!tag.remove_picture(PictureType::CoverFront));
        assert!(tag.has_picture(PictureType::CoverBack));
    }

    #[test]
    fn test_private_data() {
        let mut tag = Tag::new();
        tag.set_private_data("com.example.cue", vec![0, 1, 2]);
        tag.set_private_data("com.example.grid", vec![3]);
        tag.set_private_data("com.example.cue", vec![4, 5]);
        assert_eq!(tag.frame_count(), 2);
        assert_eq!(tag.private_data("com.example.cue"), Some(vec![4, 5]));
        assert!(tag.remove_private_data("com.example.grid"));
        assert_eq!(tag.private_data("com.example.grid"), None);
    }

    #[test]
    fn test_frame_list_operations() {
        let mut tag = Tag::new();
        tag.set_title("a");
        tag.add_frame(Frame::new(FrameId::new(b"XYZW"), vec![1, 2, 3]));
        tag.add_frame(Frame::new(FrameId::new(b"XYZW"), vec![4]));
        tag.set_artist("b");

        let removed = tag.remove_frame(FrameId::new(b"XYZW")).unwrap();
        assert_eq!(removed.payload(), &[1, 2, 3]);
        let ids: Vec<FrameId> = tag.frames().iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![frame_ids::TITLE, FrameId::new(b"XYZW"), frame_ids::ARTIST]);

        assert!(tag.delete_frame(FrameId::new(b"XYZW")));
        assert!(!tag.delete_frame(FrameId::new(b"XYZW")));
        tag.add_frame(Frame::text(frame_ids::TITLE, "c", TextEncoding::Latin1));
        assert_eq!(tag.remove_frames(frame_ids::TITLE), 2);
        assert_eq!(tag.frame_count(), 1);
    }

    #[test]
    fn test_clear_tags_and_clear() {
        let mut tag = Tag::new();
        tag.set_title("x");
        tag.set_write_id3v1(true);
        tag.clear_tags();
        assert_eq!(tag.frame_count(), 0);
        assert!(tag.is_modified());

        tag.set_title("y");
        tag.clear();
        assert_eq!(tag.frame_count(), 0);
        assert!(!tag.is_modified());
        assert_eq!(tag.existing_region_size(), 0);
        assert!(tag.write_id3v1());
    }

    #[test]
    fn test_save_requires_binding() {
        let mut tag = Tag::new();
        tag.set_title("x");
        assert!(matches!(tag.save(), Err(Id3Error::NotBound)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        std::fs::write(&path, [0xFF, 0xFB, 0, 0]).unwrap();
        tag.load(&path).unwrap();
        tag.clear();
        assert!(matches!(tag.save(), Err(Id3Error::UnsupportedContainer)));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let mut tag = Tag::new();
        tag.set_title("Around the World");
        tag.set_picture(PictureType::CoverFront, vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        tag.set_padding_policy(PaddingPolicy::fixed(16));
        let first = tag.generate_id3v2().unwrap();
        assert_eq!(first, tag.generate_id3v2().unwrap());
        assert_eq!(&first[0..3], b"ID3");
        assert_eq!(tag.generate_id3v1(), tag.generate_id3v1());
    }
}
