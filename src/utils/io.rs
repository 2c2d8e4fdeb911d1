// I/O utilities for reading and rewriting audio files

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Largest value a 4-byte synchsafe integer can hold
pub const SYNCHSAFE_MAX: u32 = 0x0FFF_FFFF;

/// Read big-endian 32-bit integer
pub fn read_be_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_be_bytes(buffer))
}

/// Decode synchsafe 32-bit integer (7 bits per byte, MSB ignored)
pub fn decode_synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Encode synchsafe 32-bit integer; callers check the value against `SYNCHSAFE_MAX`
pub fn encode_synchsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// Read up to `buffer.len()` bytes, stopping early only at end of file.
pub fn read_up_to<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Copy `len` bytes starting at `offset` in `reader` to `writer`.
pub fn copy_range<R: Read + Seek, W: Write>(
    reader: &mut R,
    writer: &mut W,
    offset: u64,
    len: u64,
) -> io::Result<()> {
    reader.seek(SeekFrom::Start(offset))?;
    let copied = io::copy(&mut reader.by_ref().take(len), writer)?;
    if copied != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes at offset {}, copied {}", len, offset, copied),
        ));
    }
    Ok(())
}

/// Replace `path` with the output of `write`, atomically.
///
/// `write` receives a temporary file created next to `path`. The temporary
/// file is renamed over `path` only if `write` succeeds; on every other exit
/// path it is removed and `path` is left untouched.
pub fn replace_file<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(dir)?;
    write(temp.as_file_mut())?;
    temp.as_file_mut().flush()?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;

    temp.persist(path).map_err(|e| e.error)?;
    log::debug!("Replaced {} via temporary file", path.display());
    Ok(())
}
