//! Content hashing for output filenames.
//!
//! Hashes depend on artifact bytes alone, never on timestamps or build
//! order, so rebuilding unchanged sources reproduces identical names.

/// Full lowercase hex digest of the content. Filename patterns
/// truncate it to the length their hash token asks for.
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
