// ID3 metadata handling module
pub mod frames;
pub mod genres;
pub mod v1;
pub mod v2;

pub use frames::{frame_ids, Comment, Frame, FrameId, Picture, PictureType, PrivateData, UserText};
pub use v1::{generate_id3v1_tag, Id3v1Tag};
pub use v2::{generate_id3v2_tag, Id3v2Header, Id3v2Tag};
