// Shared helpers for text transcoding and file I/O

pub mod encoding;
pub mod io;
