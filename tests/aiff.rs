mod common;

use std::fs;
use std::io::Cursor;

use common::*;
use id3forge::aiff::{read_layout, ID3_CHUNK};
use id3forge::id3::v2::generate_id3v2_tag;
use id3forge::{frame_ids, ContainerFormat, Frame, PictureType, Tag, TextEncoding, WriteStrategy};

/// Sum of all chunk lengths (headers and pad bytes included) plus the form type
fn chunk_total(data: &[u8]) -> usize {
    let layout = read_layout(&mut Cursor::new(data)).unwrap().unwrap();
    4 + layout
        .chunks
        .iter()
        .map(|c| c.padded_len() as usize)
        .sum::<usize>()
}

#[test]
fn test_detects_aiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plain.aiff", &aiff_file());

    let tag = Tag::open(&path).unwrap();
    assert_eq!(tag.container(), ContainerFormat::Aiff);
    assert_eq!(tag.frame_count(), 0);
    assert_eq!(tag.existing_region_size(), 0);
}

#[test]
fn test_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let original = aiff_file();
    let path = write_file(dir.path(), "track.aiff", &original);
    let cover = jpeg(1999);

    let mut tag = Tag::open(&path).unwrap();
    tag.set_artist("Röyksopp");
    tag.set_title("Eple");
    tag.set_genre("Electronic");
    tag.set_year("2001");
    tag.set_track("3");
    tag.set_bpm("106");
    tag.set_key("F#m");
    tag.set_energy_level("5");
    tag.set_picture(PictureType::CoverFront, cover.clone(), "image/jpeg");
    let outcome = tag.save().unwrap();
    assert_eq!(outcome.strategy, WriteStrategy::Rebuild);

    let data = fs::read(&path).unwrap();
    assert_eq!(form_size(&data), data.len() - 8);
    assert_eq!(form_size(&data), chunk_total(&data));

    // Original chunks are copied unchanged ahead of the new ID3 chunk
    assert_eq!(&data[12..original.len()], &original[12..]);

    let reloaded = Tag::open(&path).unwrap();
    assert_eq!(reloaded.artist(), "Röyksopp");
    assert_eq!(reloaded.title(), "Eple");
    assert_eq!(reloaded.genre(), "Electronic");
    assert_eq!(reloaded.year(), "2001");
    assert_eq!(reloaded.track(), "3");
    assert_eq!(reloaded.bpm(), "106");
    assert_eq!(reloaded.key(), "F#m");
    assert_eq!(reloaded.energy_level(), "5");
    assert_eq!(reloaded.picture(PictureType::CoverFront).unwrap().data, cover);
    assert_eq!(reloaded.existing_region_size(), outcome.region_size);
}

#[test]
fn test_resave_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    for with_picture in [false, true] {
        let path = write_file(dir.path(), "idem.aiff", &aiff_file());
        let mut tag = Tag::open(&path).unwrap();
        tag.set_title("Poor Leno");
        if with_picture {
            tag.set_picture(PictureType::CoverFront, jpeg(333), "image/jpeg");
        }
        tag.save().unwrap();
        let before = fs::read(&path).unwrap();

        let mut reloaded = Tag::open(&path).unwrap();
        assert_eq!(reloaded.save().unwrap().strategy, WriteStrategy::InPlace);
        assert_eq!(fs::read(&path).unwrap(), before, "picture: {}", with_picture);
    }
}

#[test]
fn test_in_place_keeps_following_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let frames = vec![Frame::text(frame_ids::TITLE, "Remind Me (Someone Else's Radio)", TextEncoding::Utf16)];
    let region = generate_id3v2_tag(&frames, (4, 0), 128).unwrap();
    let original = form(&[comm_chunk(), chunk(ID3_CHUNK, &region), ssnd_chunk(33)]);
    let path = write_file(dir.path(), "middle.aiff", &original);

    let mut tag = Tag::open(&path).unwrap();
    assert_eq!(tag.existing_region_size(), region.len() as u64);
    tag.set_title("Sparks");
    let outcome = tag.save().unwrap();
    assert_eq!(outcome.strategy, WriteStrategy::InPlace);

    let data = fs::read(&path).unwrap();
    assert_eq!(data.len(), original.len());
    let ssnd = ssnd_chunk(33);
    assert_eq!(&data[data.len() - ssnd.len()..], &ssnd[..]);
    assert_eq!(Tag::open(&path).unwrap().title(), "Sparks");
}

#[test]
fn test_growing_tag_rebuilds_form() {
    let dir = tempfile::tempdir().unwrap();
    let frames = vec![Frame::text(frame_ids::TITLE, "x", TextEncoding::Latin1)];
    let region = generate_id3v2_tag(&frames, (3, 0), 0).unwrap();
    let original = form(&[comm_chunk(), chunk(b"id3 ", &region), ssnd_chunk(40)]);
    let path = write_file(dir.path(), "grow.aiff", &original);

    let mut tag = Tag::open(&path).unwrap();
    assert_eq!(tag.title(), "x");
    assert_eq!(tag.version(), (3, 0));
    tag.set_picture(PictureType::CoverFront, jpeg(4000), "image/jpeg");
    assert_eq!(tag.save().unwrap().strategy, WriteStrategy::Rebuild);

    let data = fs::read(&path).unwrap();
    assert_eq!(form_size(&data), data.len() - 8);
    assert_eq!(form_size(&data), chunk_total(&data));
    let ssnd = ssnd_chunk(40);
    assert_eq!(&data[data.len() - ssnd.len()..], &ssnd[..]);

    let layout = read_layout(&mut Cursor::new(&data)).unwrap().unwrap();
    assert_eq!(layout.chunks.iter().filter(|c| c.is_id3()).count(), 1);
    let reloaded = Tag::open(&path).unwrap();
    assert!(reloaded.has_picture(PictureType::CoverFront));
    assert_eq!(reloaded.title(), "x");
}

#[test]
fn test_aiff_never_gets_id3v1() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "v1.aiff", &aiff_file());

    let mut tag = Tag::open(&path).unwrap();
    tag.set_write_id3v1(true);
    tag.set_artist("Kavinsky");
    assert!(!tag.save().unwrap().id3v1_written);

    let data = fs::read(&path).unwrap();
    assert_eq!(form_size(&data), data.len() - 8);
}

#[test]
fn test_truncated_sound_chunk_survives_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let mut original = aiff_file();
    // SSND claims 64 more bytes than the file holds
    let ssnd_offset = 12 + comm_chunk().len();
    let declared = u32::from_be_bytes(original[ssnd_offset + 4..ssnd_offset + 8].try_into().unwrap());
    original[ssnd_offset + 4..ssnd_offset + 8].copy_from_slice(&(declared + 64).to_be_bytes());
    let path = write_file(dir.path(), "truncated.aiff", &original);

    let mut tag = Tag::open(&path).unwrap();
    tag.set_title("x");
    assert_eq!(tag.save().unwrap().strategy, WriteStrategy::Rebuild);

    let data = fs::read(&path).unwrap();
    let ssnd = &original[ssnd_offset..];
    assert_eq!(&data[data.len() - ssnd.len()..], ssnd);
    assert_eq!(form_size(&data), data.len() - 8);
    assert_eq!(Tag::open(&path).unwrap().title(), "x");
}
