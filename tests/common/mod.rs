// Synthetic MP3 and AIFF files for the integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Fake MPEG audio: a frame sync followed by a deterministic byte pattern
pub fn mp3_audio(len: usize) -> Vec<u8> {
    let mut audio: Vec<u8> = (0..len).map(|i| (i * 7 % 251) as u8).collect();
    audio[0] = 0xFF;
    audio[1] = 0xFB;
    audio
}

pub fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

pub fn form(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = b"FORM".to_vec();
    out.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
    out.extend_from_slice(b"AIFF");
    out.extend(body);
    out
}

pub fn comm_chunk() -> Vec<u8> {
    // 2 channels, 4 frames, 16 bit, 44100 Hz
    chunk(
        b"COMM",
        &[0, 2, 0, 0, 0, 4, 0, 16, 0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0],
    )
}

pub fn ssnd_chunk(samples: usize) -> Vec<u8> {
    let mut payload = vec![0u8; 8];
    payload.extend((0..samples).map(|i| (i * 13 % 256) as u8));
    chunk(b"SSND", &payload)
}

/// AIFF file without an ID3 chunk; the sound chunk has an odd length
pub fn aiff_file() -> Vec<u8> {
    form(&[comm_chunk(), ssnd_chunk(17)])
}

/// Something that looks enough like a JPEG
pub fn jpeg(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..len).map(|i| (i % 256) as u8));
    data
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

/// Bytes between the ID3v2 region at the start of an MP3 file and its ID3v1 trailer
pub fn after_region(data: &[u8], region: u64) -> &[u8] {
    let end = if has_id3v1(data) { data.len() - 128 } else { data.len() };
    &data[region as usize..end]
}

pub fn has_id3v1(data: &[u8]) -> bool {
    data.len() >= 128 && &data[data.len() - 128..data.len() - 125] == b"TAG"
}

pub fn form_size(data: &[u8]) -> usize {
    u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize
}
