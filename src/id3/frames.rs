// ID3 frame definitions and payload views

use std::fmt;

use crate::utils::encoding::{
    decode_text, encode_terminated, encode_text, split_terminated, TextEncoding,
};

/// Four character frame identifier such as `TIT2` or `APIC`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId([u8; 4]);

impl FrameId {
    pub const fn new(id: &[u8; 4]) -> Self {
        FrameId(*id)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// Identifiers consist of uppercase letters and digits
    pub fn is_valid(&self) -> bool {
        self.0
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    /// Text information frames (`T???` except `TXXX`)
    pub fn is_text(&self) -> bool {
        self.0[0] == b'T' && *self != frame_ids::USER_TEXT
    }
}

impl From<[u8; 4]> for FrameId {
    fn from(bytes: [u8; 4]) -> Self {
        FrameId(bytes)
    }
}

impl TryFrom<&str> for FrameId {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let bytes: [u8; 4] = value.as_bytes().try_into().map_err(|_| ())?;
        let id = FrameId(bytes);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", self.as_str())
    }
}

/// Common ID3v2.3/2.4 frame identifiers
pub mod frame_ids {
    use super::FrameId;

    pub const TITLE: FrameId = FrameId::new(b"TIT2"); // Title/songname/content description
    pub const ARTIST: FrameId = FrameId::new(b"TPE1"); // Lead performer(s)/Soloist(s)
    pub const ALBUM_ARTIST: FrameId = FrameId::new(b"TPE2");
    pub const REMIXER: FrameId = FrameId::new(b"TPE4"); // Interpreted, remixed, or otherwise modified by
    pub const ALBUM: FrameId = FrameId::new(b"TALB"); // Album/Movie/Show title
    pub const COMPOSER: FrameId = FrameId::new(b"TCOM");
    pub const YEAR: FrameId = FrameId::new(b"TYER"); // ID3v2.3
    pub const RECORDING_TIME: FrameId = FrameId::new(b"TDRC"); // ID3v2.4
    pub const TRACK: FrameId = FrameId::new(b"TRCK"); // Track number/Position in set
    pub const GENRE: FrameId = FrameId::new(b"TCON"); // Content type
    pub const BPM: FrameId = FrameId::new(b"TBPM");
    pub const KEY: FrameId = FrameId::new(b"TKEY"); // Initial key
    pub const LABEL: FrameId = FrameId::new(b"TPUB"); // Publisher
    pub const USER_TEXT: FrameId = FrameId::new(b"TXXX");
    pub const COMMENT: FrameId = FrameId::new(b"COMM");
    pub const PICTURE: FrameId = FrameId::new(b"APIC"); // Attached picture
    pub const PRIVATE: FrameId = FrameId::new(b"PRIV");
}

/// A single ID3v2 frame.
///
/// The payload is kept exactly as read so frames the crate does not
/// interpret survive a save untouched. Sizes are never cached: the encoder
/// always derives them from `payload.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    id: FrameId,
    flags: u16,
    payload: Vec<u8>,
}

impl Frame {
    pub fn new(id: FrameId, payload: Vec<u8>) -> Self {
        Self::with_flags(id, 0, payload)
    }

    pub fn with_flags(id: FrameId, flags: u16, payload: Vec<u8>) -> Self {
        Frame { id, flags, payload }
    }

    /// Build a text information frame
    pub fn text(id: FrameId, text: &str, encoding: TextEncoding) -> Self {
        Frame::new(id, text_payload(text, encoding))
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) {
        self.payload = payload;
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Encoding marker of a text-bearing payload, `None` when empty
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.payload.first().map(|&b| TextEncoding::from_byte(b))
    }

    /// Decode the payload as a text information frame.
    ///
    /// Multiple values separated by NUL terminators are joined with `/`.
    pub fn decode_text(&self) -> String {
        match self.payload.split_first() {
            Some((&marker, data)) => {
                let encoding = TextEncoding::from_byte(marker);
                let mut values = Vec::new();
                let mut rest = data;
                while !rest.is_empty() {
                    let (value, tail) = split_terminated(rest, encoding);
                    values.push(decode_text(value, encoding));
                    rest = tail;
                }
                while values.last().is_some_and(|v| v.is_empty()) {
                    values.pop();
                }
                values.join("/")
            }
            None => String::new(),
        }
    }

    /// Replace the payload with `text`
    pub fn set_text(&mut self, text: &str, encoding: TextEncoding) {
        self.payload = text_payload(text, encoding);
    }
}

fn text_payload(text: &str, encoding: TextEncoding) -> Vec<u8> {
    let mut payload = vec![encoding.as_byte()];
    payload.extend(encode_text(text, encoding));
    payload
}

/// Language written into new comment frames
pub const DEFAULT_LANGUAGE: [u8; 3] = *b"eng";

/// `COMM` payload: encoding, language, description, text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub encoding: TextEncoding,
    pub language: [u8; 3],
    pub description: String,
    pub text: String,
}

impl Comment {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < 4 {
            return None;
        }
        let encoding = TextEncoding::from_byte(payload[0]);
        let language = [payload[1], payload[2], payload[3]];
        let (description, text) = split_terminated(&payload[4..], encoding);
        Some(Comment {
            encoding,
            language,
            description: decode_text(description, encoding),
            text: decode_text(text, encoding),
        })
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = vec![self.encoding.as_byte()];
        payload.extend_from_slice(&self.language);
        payload.extend(encode_terminated(&self.description, self.encoding));
        payload.extend(encode_text(&self.text, self.encoding));
        payload
    }
}

/// `TXXX` payload: encoding, description, value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserText {
    pub encoding: TextEncoding,
    pub description: String,
    pub value: String,
}

impl UserText {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let (&marker, data) = payload.split_first()?;
        let encoding = TextEncoding::from_byte(marker);
        let (description, value) = split_terminated(data, encoding);
        Some(UserText {
            encoding,
            description: decode_text(description, encoding),
            value: decode_text(value, encoding),
        })
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = vec![self.encoding.as_byte()];
        payload.extend(encode_terminated(&self.description, self.encoding));
        payload.extend(encode_text(&self.value, self.encoding));
        payload
    }
}

/// Picture types defined for `APIC` frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    LeafletPage,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    VideoScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogo,
    PublisherLogo,
    Undefined(u8),
}

impl PictureType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => PictureType::Other,
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            other => PictureType::Undefined(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            PictureType::Other => 0,
            PictureType::FileIcon => 1,
            PictureType::OtherFileIcon => 2,
            PictureType::CoverFront => 3,
            PictureType::CoverBack => 4,
            PictureType::LeafletPage => 5,
            PictureType::Media => 6,
            PictureType::LeadArtist => 7,
            PictureType::Artist => 8,
            PictureType::Conductor => 9,
            PictureType::Band => 10,
            PictureType::Composer => 11,
            PictureType::Lyricist => 12,
            PictureType::RecordingLocation => 13,
            PictureType::DuringRecording => 14,
            PictureType::DuringPerformance => 15,
            PictureType::VideoScreenCapture => 16,
            PictureType::BrightColouredFish => 17,
            PictureType::Illustration => 18,
            PictureType::BandLogo => 19,
            PictureType::PublisherLogo => 20,
            PictureType::Undefined(other) => other,
        }
    }
}

/// `APIC` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub encoding: TextEncoding,
    pub mime_type: String,
    pub picture_type: PictureType,
    pub description: String,
    pub data: Vec<u8>,
}

impl Picture {
    /// Picture type byte of an `APIC` payload without decoding the image
    pub fn peek_type(payload: &[u8]) -> Option<PictureType> {
        let (_, rest) = split_terminated(payload.get(1..)?, TextEncoding::Latin1);
        rest.first().map(|&b| PictureType::from_u8(b))
    }

    pub fn parse(payload: &[u8]) -> Option<Self> {
        let (&marker, data) = payload.split_first()?;
        let encoding = TextEncoding::from_byte(marker);
        // MIME type is always Latin-1
        let (mime_type, rest) = split_terminated(data, TextEncoding::Latin1);
        let (&picture_type, rest) = rest.split_first()?;
        let (description, image) = split_terminated(rest, encoding);
        Some(Picture {
            encoding,
            mime_type: decode_text(mime_type, TextEncoding::Latin1),
            picture_type: PictureType::from_u8(picture_type),
            description: decode_text(description, encoding),
            data: image.to_vec(),
        })
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.data.len() + self.mime_type.len() + 8);
        payload.push(self.encoding.as_byte());
        payload.extend(encode_terminated(&self.mime_type, TextEncoding::Latin1));
        payload.push(self.picture_type.as_u8());
        payload.extend(encode_terminated(&self.description, self.encoding));
        payload.extend_from_slice(&self.data);
        payload
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.to_ascii_lowercase().as_str() {
            "image/png" | "png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            _ => "jpg",
        }
    }
}

/// `PRIV` payload: Latin-1 owner identifier followed by opaque bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateData {
    pub owner: String,
    pub data: Vec<u8>,
}

impl PrivateData {
    pub fn parse(payload: &[u8]) -> Self {
        let (owner, data) = split_terminated(payload, TextEncoding::Latin1);
        PrivateData {
            owner: decode_text(owner, TextEncoding::Latin1),
            data: data.to_vec(),
        }
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = encode_terminated(&self.owner, TextEncoding::Latin1);
        payload.extend_from_slice(&self.data);
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id() {
        assert_eq!(frame_ids::TITLE.as_str(), "TIT2");
        assert!(frame_ids::TITLE.is_text());
        assert!(!frame_ids::USER_TEXT.is_text());
        assert!(!frame_ids::PICTURE.is_text());
        assert_eq!(FrameId::try_from("TPE1"), Ok(frame_ids::ARTIST));
        assert!(FrameId::try_from("tpe1").is_err());
        assert!(FrameId::try_from("TPE").is_err());
        assert!(!FrameId::from([b'T', 0, 0, 0]).is_valid());
    }

    #[test]
    fn test_text_frame() {
        let mut frame = Frame::text(frame_ids::TITLE, "Windowlicker", TextEncoding::Latin1);
        assert_eq!(frame.payload()[0], 0);
        assert_eq!(&frame.payload()[1..], b"Windowlicker");
        assert_eq!(frame.decode_text(), "Windowlicker");

        frame.set_text("Xtal", TextEncoding::Utf16);
        assert_eq!(frame.encoding(), Some(TextEncoding::Utf16));
        assert_eq!(frame.decode_text(), "Xtal");
    }

    #[test]
    fn test_multi_value_text_frame() {
        let frame = Frame::new(frame_ids::ARTIST, b"\x03Orbital\0Belinda Carlisle\0".to_vec());
        assert_eq!(frame.decode_text(), "Orbital/Belinda Carlisle");
    }

    #[test]
    fn test_empty_payload_is_legal() {
        let frame = Frame::new(frame_ids::TITLE, Vec::new());
        assert_eq!(frame.encoding(), None);
        assert_eq!(frame.decode_text(), "");
    }

    #[test]
    fn test_comment_payload() {
        for encoding in [TextEncoding::Latin1, TextEncoding::Utf16, TextEncoding::Utf16BE] {
            let comment = Comment {
                encoding,
                language: DEFAULT_LANGUAGE,
                description: "Mood".to_string(),
                text: "Late night".to_string(),
            };
            assert_eq!(Comment::parse(&comment.to_payload()), Some(comment));
        }
        assert_eq!(Comment::parse(b"\0en"), None);
    }

    #[test]
    fn test_user_text_payload() {
        let user_text = UserText {
            encoding: TextEncoding::Utf8,
            description: "EnergyLevel".to_string(),
            value: "7".to_string(),
        };
        let payload = user_text.to_payload();
        assert_eq!(payload, b"\x03EnergyLevel\x007".to_vec());
        assert_eq!(UserText::parse(&payload), Some(user_text));
        assert_eq!(UserText::parse(&[]), None);
    }

    #[test]
    fn test_picture_payload() {
        let picture = Picture {
            encoding: TextEncoding::Utf16,
            mime_type: "image/png".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: vec![0x89, b'P', b'N', b'G', 0, 0, 1],
        };
        let payload = picture.to_payload();
        assert_eq!(Picture::peek_type(&payload), Some(PictureType::CoverFront));
        assert_eq!(Picture::parse(&payload), Some(picture.clone()));
        assert_eq!(picture.extension(), "png");
    }

    #[test]
    fn test_picture_type_values() {
        for value in 0..=255u8 {
            assert_eq!(PictureType::from_u8(value).as_u8(), value);
        }
        assert_eq!(PictureType::from_u8(3), PictureType::CoverFront);
    }

    #[test]
    fn test_private_payload() {
        let private = PrivateData {
            owner: "com.example.cues".to_string(),
            data: vec![0, 1, 2, 0],
        };
        assert_eq!(PrivateData::parse(&private.to_payload()), private);
    }
}
