// ============================================================================
// framescan-core/src/dedup.rs
// ============================================================================
//
// CONTENT DEDUPLICATION: Exact-Content Filtering of Extracted Frames
//
// Static scenes produce long runs of byte-identical frames. This module
// fingerprints each frame with SHA-256 and keeps only the first occurrence of
// every fingerprint, so the analysis capability is asked about each distinct
// image once.
//
// KEY COMPONENTS:
// - Fingerprint: SHA-256 digest of a frame's full content
// - fingerprint_file / fingerprint_reader: streaming digest computation
// - dedupe: first-occurrence filter that deletes duplicate frame files
//
// DELETION:
// Duplicates are deleted here, as soon as they are recognised. The surviving
// frames stay on disk until the orchestrator removes the whole transient
// storage directory during cleanup.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::frames::Frame;

// ---- External crate imports ----
use log::{debug, info, warn};
use sha2::{Digest, Sha256};

// ---- Standard library imports ----
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Size of the read buffer used while hashing frame content.
pub const FINGERPRINT_CHUNK_SIZE: usize = 4096;

// ============================================================================
// FINGERPRINT
// ============================================================================

/// Content-addressed identity of a frame: the SHA-256 of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Computes the fingerprint of everything `reader` yields, in fixed-size
/// chunks so the content never has to fit in memory at once.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<Fingerprint> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; FINGERPRINT_CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(Fingerprint(hasher.finalize().into()))
}

/// Computes the fingerprint of the file at `path`.
///
/// Any failure to open or read the file is reported as
/// `CoreError::FrameRead` naming the file.
pub fn fingerprint_file(path: &Path) -> CoreResult<Fingerprint> {
    let read_error = |source| CoreError::FrameRead {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    fingerprint_reader(file).map_err(read_error)
}

// ============================================================================
// DEDUPLICATION
// ============================================================================

/// Filters `frames` down to the first occurrence of each distinct content.
///
/// Frames are visited in the order given (ordinal order as produced by
/// discovery) and the survivors keep that relative order. Every later frame
/// whose fingerprint was already seen is dropped and its file is deleted
/// immediately, so callers must not expect duplicate content to exist
/// afterwards.
///
/// If a frame cannot be read the call fails with `CoreError::FrameRead`.
/// Deletions that already happened are not rolled back.
pub fn dedupe(frames: Vec<Frame>) -> CoreResult<Vec<Frame>> {
    let total = frames.len();
    let mut seen: HashSet<Fingerprint> = HashSet::with_capacity(total);
    let mut unique = Vec::with_capacity(total);

    for frame in frames {
        let fingerprint = fingerprint_file(&frame.path)?;
        debug!("{} {}", frame.path.display(), fingerprint);

        if seen.insert(fingerprint) {
            unique.push(frame);
            continue;
        }

        match std::fs::remove_file(&frame.path) {
            Ok(()) => debug!("Duplicate frame {} removed.", frame.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            // The bulk cleanup still removes it with the rest of the storage.
            Err(e) => warn!(
                "Failed to remove duplicate frame {}: {}",
                frame.path.display(),
                e
            ),
        }
    }

    info!(
        "Deduplicated {} frames: {} unique, {} duplicates removed",
        total,
        unique.len(),
        total - unique.len()
    );
    Ok(unique)
}
