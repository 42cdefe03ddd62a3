//! Content digests used to decide whether a target is already up to date.
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::Path;

use crate::operations::FileSystemOps;

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

/// Digest of the file or directory tree at `path`.
///
/// A file digests to [`digest_bytes`] of its contents, so in-memory content
/// and an identical file on disk compare equal. A directory digests its sorted
/// relative paths together with each file's digest, so two trees compare equal
/// iff they hold the same files with the same bytes.
///
/// # Errors
///
/// Returns an error if any file or directory under `path` cannot be read.
pub fn digest_path(fs: &dyn FileSystemOps, path: &Path) -> Result<String> {
    if !fs.is_dir(path) {
        return Ok(digest_bytes(&fs.read(path)?));
    }
    let mut entries = Vec::new();
    collect_entries(fs, path, path, &mut entries)?;
    entries.sort();
    let mut hasher = Sha256::new();
    hasher.update(b"dir\n");
    for entry in &entries {
        hasher.update(entry.as_bytes());
        hasher.update(b"\n");
    }
    Ok(to_hex(&hasher.finalize()))
}

fn collect_entries(
    fs: &dyn FileSystemOps,
    root: &Path,
    dir: &Path,
    out: &mut Vec<String>,
) -> Result<()> {
    for child in fs.read_dir(dir)? {
        let rel = child
            .strip_prefix(root)
            .unwrap_or(&child)
            .to_string_lossy()
            .into_owned();
        if fs.is_dir(&child) {
            out.push(format!("{rel}/"));
            collect_entries(fs, root, &child, out)?;
        } else {
            out.push(format!("{rel}\0{}", digest_bytes(&fs.read(&child)?)));
        }
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // write! to a String is infallible.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}
