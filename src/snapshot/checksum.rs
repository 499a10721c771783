//! CRC32 checksums for snapshot files
//!
//! Formatted as `crc32:xxxxxxxx`, lowercase, zero-padded.

use crc32fast::Hasher;

pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parse a formatted checksum, `None` when the format is wrong
pub fn parse_checksum(formatted: &str) -> Option<u32> {
    let hex = formatted.strip_prefix("crc32:")?;
    if hex.len() != 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Checksum of `data` in its formatted form
pub fn checksum_of(data: &[u8]) -> String {
    format_checksum(compute_checksum(data))
}
