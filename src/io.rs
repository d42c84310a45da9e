//! Input acquisition. Codecs consume whole buffers, so large files are
//! memory-mapped above a size threshold instead of being copied through a
//! read loop.
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Threshold in bytes above which we attempt to use mmap for reading.
/// Callers can override via API; this is a reasonable default.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

/// Decide whether to use mmap based on file size and threshold.
pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

/// An input buffer that is either memory-mapped or owned. Both deref to
/// `&[u8]` so codecs never see the difference.
pub enum InputBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for InputBytes {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            InputBytes::Mapped(m) => m,
            InputBytes::Owned(v) => v,
        }
    }
}

/// Read a file, memory-mapping it when it crosses the threshold.
pub fn read_bytes_auto<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<InputBytes> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.is_file() && should_use_mmap(meta.len(), threshold_bytes) {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mmap =
            unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.display()))?;
        Ok(InputBytes::Mapped(mmap))
    } else {
        let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(InputBytes::Owned(data))
    }
}
