//! In-memory mock filesystem for testing samplers without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux or
//! without a thermal zone.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem for testing.
///
/// Static files always return the same content. Sequenced files return
/// their queued contents one read at a time and keep returning the last one
/// once the queue is drained, which is how the CPU sampler's two reads see
/// advancing counters.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories, for `exists` on parent paths.
    directories: HashSet<PathBuf>,
    /// Queued contents for files whose content changes between reads.
    /// Shared between clones so every handle advances the same queue.
    sequences: Arc<Mutex<HashMap<PathBuf, VecDeque<String>>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds a file whose content changes on every read.
    ///
    /// The first read returns `contents[0]`, the second `contents[1]`, and so
    /// on; the last entry is returned for every read after that.
    pub fn add_file_sequence<I, S>(&mut self, path: impl AsRef<Path>, contents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.as_ref().to_path_buf();
        let queue: VecDeque<String> = contents.into_iter().map(Into::into).collect();
        if let Some(last) = queue.back() {
            self.add_file(&path, last.clone());
        }
        if let Ok(mut sequences) = self.sequences.lock() {
            sequences.insert(path, queue);
        }
    }

    /// Removes a file, simulating an interface that is not present.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.remove(path);
        if let Ok(mut sequences) = self.sequences.lock() {
            sequences.remove(path);
        }
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn next_in_sequence(&self, path: &Path) -> Option<String> {
        let mut sequences = self.sequences.lock().ok()?;
        let queue = sequences.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if let Some(content) = self.next_in_sequence(path) {
            return Ok(content);
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }
}
