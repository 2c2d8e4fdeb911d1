//! id3forge - ID3v1/ID3v2 metadata engine for MP3 and AIFF files
//!
//! A [`Tag`] is loaded from a file, edited through its accessors and written
//! back with [`Tag::save`]. Saving overwrites the existing ID3v2 region in
//! place when the new tag fits in it, and otherwise rebuilds the file in a
//! temporary file that is renamed over the original.
//!
//! ```no_run
//! use id3forge::{PictureType, Tag};
//!
//! # fn main() -> id3forge::Result<()> {
//! let mut tag = Tag::open("track.mp3")?;
//! tag.set_artist("Daft Punk");
//! tag.set_bpm("123");
//! tag.set_picture(PictureType::CoverFront, std::fs::read("cover.jpg")?, "image/jpeg");
//! let outcome = tag.save()?;
//! println!("{:?}", outcome.strategy);
//! # Ok(())
//! # }
//! ```

pub mod aiff;
pub mod error;
pub mod field_mapping;
pub mod id3;
pub mod metadata;
pub mod mp3;
pub mod rewrite;
pub mod tag;
pub mod utils;

pub use error::{Id3Error, Result};
pub use field_mapping::StandardField;
pub use id3::genres::{genre_index, genre_name};
pub use id3::{frame_ids, Comment, Frame, FrameId, Id3v1Tag, Picture, PictureType, PrivateData, UserText};
pub use metadata::{CoverArt, Metadata};
pub use rewrite::{PaddingPolicy, SaveOutcome, WriteStrategy};
pub use tag::{ContainerFormat, Tag};
pub use utils::encoding::TextEncoding;
