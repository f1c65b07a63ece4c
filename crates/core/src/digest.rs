use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use datasetkit_config::Settings;
use datasetkit_utils::ProgressSink;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::Result;

/// Streams files through SHA-256 in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct DigestComputer {
    chunk_size: usize,
    worker_threads: usize,
}

impl DigestComputer {
    #[must_use]
    pub fn new(chunk_size: usize, worker_threads: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            worker_threads: worker_threads.max(1),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.hash_chunk_size, settings.worker_threads)
    }

    /// Hex digest of the file's content, or `None` if it cannot be read.
    #[must_use]
    pub fn digest_file(&self, path: &Path) -> Option<String> {
        match self.try_digest(path) {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!("Failed to hash file {:?}: {}", path, e);
                None
            }
        }
    }

    fn try_digest(&self, path: &Path) -> io::Result<String> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(self.chunk_size, file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0; self.chunk_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Hashes every path on a dedicated pool, returning digests in input order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the worker pool cannot be created; per-file
    /// failures become `None` entries.
    pub fn digest_all(&self, paths: &[PathBuf], progress: &ProgressSink) -> Result<Vec<Option<String>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads)
            .thread_name(|i| format!("digest-{i}"))
            .build()?;

        let total = paths.len();
        let done = AtomicUsize::new(0);
        debug!("Hashing {} files on {} threads", total, self.worker_threads);

        let digests = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let digest = self.digest_file(path);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                    progress.step(finished, total, format!("hashing: {name}"));
                    digest
                })
                .collect()
        });

        Ok(digests)
    }
}
