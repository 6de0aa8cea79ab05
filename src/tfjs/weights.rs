//! Binary weight shards: little-endian float32 values, concatenated in
//! manifest order and split into files of at most [`SHARD_SIZE_BYTES`].

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// The TensorFlow.js converter's default shard size (4 MiB).
pub const SHARD_SIZE_BYTES: usize = 4 * 1024 * 1024;

pub fn encode_f32_le(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|&v| (v as f32).to_le_bytes()).collect()
}

/// Fails if `bytes` is not a whole number of float32 values.
pub fn decode_f32_le(bytes: &[u8]) -> Result<Vec<f64>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::SizeMismatch { expected: bytes.len() / 4 * 4 + 4, actual: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
        .collect())
}

/// `group1-shard1of3.bin`, `group1-shard2of3.bin`, ...
pub fn shard_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("group1-shard{i}of{count}.bin")).collect()
}

/// Writes `bytes` into `dir` as shards of at most `max_shard_bytes` and
/// returns the file names in order. Always writes at least one shard.
pub fn write_shards(dir: &Path, bytes: &[u8], max_shard_bytes: usize) -> Result<Vec<String>> {
    let max = max_shard_bytes.max(1);
    let chunks: Vec<&[u8]> = if bytes.is_empty() { vec![bytes] } else { bytes.chunks(max).collect() };
    let names = shard_names(chunks.len());

    for (name, chunk) in names.iter().zip(&chunks) {
        let path = dir.join(name);
        fs::write(&path, chunk).map_err(|e| Error::io(&path, e))?;
        log::debug!("wrote {} ({} bytes)", path.display(), chunk.len());
    }
    Ok(names)
}

/// Deletes `group1-shard*.bin` files in `dir` that are not in `keep`, so a
/// re-export with fewer shards leaves no orphans behind.
pub fn remove_stale_shards(dir: &Path, keep: &[String]) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with("group1-shard") && name.ends_with(".bin") && !keep.iter().any(|k| k == name) {
            let path = entry.path();
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            log::debug!("removed stale shard {}", path.display());
        }
    }
    Ok(())
}

/// Reads and concatenates the listed shards from `dir`.
pub fn read_shards(dir: &Path, paths: &[String]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for name in paths {
        let path = dir.join(name);
        let mut chunk = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        bytes.append(&mut chunk);
    }
    Ok(bytes)
}
