// Write strategy selection shared by the MP3 and AIFF writers

use serde::{Deserialize, Serialize};

/// Trailing zero padding requested for generated regions.
///
/// All knobs default to zero / unbounded, which writes regions without
/// padding and accepts any leftover space on in-place writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingPolicy {
    /// Zero bytes appended after the frames of a freshly generated region
    pub padding_size: u32,
    /// Minimum free space a rewritten region must keep
    pub padding_space: u32,
    /// Upper bound on padding, `None` for unbounded
    pub max_padding_space: Option<u32>,
}

impl PaddingPolicy {
    /// Exact padding for every generated region
    pub fn fixed(size: u32) -> Self {
        PaddingPolicy {
            padding_size: size,
            ..Default::default()
        }
    }

    /// Keep at least `min` and at most `max` bytes of free space
    pub fn space(min: u32, max: u32) -> Self {
        PaddingPolicy {
            padding_size: 0,
            padding_space: min,
            max_padding_space: Some(max),
        }
    }

    fn clamp(&self, value: u32) -> u32 {
        match self.max_padding_space {
            Some(max) => value.min(max),
            None => value,
        }
    }

    /// Padding appended when a region is generated from scratch
    pub fn padding(&self) -> usize {
        self.clamp(self.padding_size.max(self.padding_space)) as usize
    }

    /// Whether an in-place write leaving `free` unused bytes is acceptable
    pub fn accepts_leftover(&self, free: u64) -> bool {
        let min = u64::from(self.clamp(self.padding_space));
        let within_max = self
            .max_padding_space
            .map_or(true, |max| free <= u64::from(max));
        free >= min && within_max
    }
}

/// How `save()` committed the ID3v2 region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WriteStrategy {
    /// Region overwritten inside its previously reserved space
    InPlace,
    /// Whole file rebuilt into a temporary file and renamed over the original
    Rebuild,
    /// No region existed and there was nothing to write
    Untouched,
}

/// Result of a successful `save()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub strategy: WriteStrategy,
    /// Size of the ID3v2 region now on disk, 0 when none
    pub region_size: u64,
    /// Whether the 128-byte ID3v1 trailer was (re)written
    pub id3v1_written: bool,
}

/// Pick a strategy for a region of `needed` bytes (header and frames, no padding).
///
/// `reserved` is the space the current region occupies, `None` when the file
/// has no region yet.
pub fn choose_strategy(
    reserved: Option<u64>,
    needed: u64,
    has_frames: bool,
    policy: &PaddingPolicy,
) -> WriteStrategy {
    let strategy = match reserved {
        None if !has_frames && policy.padding() == 0 => WriteStrategy::Untouched,
        None => WriteStrategy::Rebuild,
        Some(reserved) if needed <= reserved && policy.accepts_leftover(reserved - needed) => {
            WriteStrategy::InPlace
        }
        Some(_) => WriteStrategy::Rebuild,
    };
    log::debug!(
        "Region needs {} bytes, reserved {:?}: {:?}",
        needed,
        reserved,
        strategy
    );
    strategy
}
