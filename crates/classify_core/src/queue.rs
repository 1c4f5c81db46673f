use crate::model::SelectedFile;
use std::collections::VecDeque;

/// Upload queue of the drop surface. Holds at most one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileQueue {
    files: VecDeque<SelectedFile>,
}

impl FileQueue {
    pub const MAX_FILES: usize = 1;

    /// Queue `file`, evicting the oldest entries of the current queue so that only
    /// the newest file remains. Returns the evicted file, if any.
    pub fn add(&mut self, file: SelectedFile) -> Option<SelectedFile> {
        self.files.push_back(file);
        let mut evicted = None;
        while self.files.len() > Self::MAX_FILES {
            evicted = self.files.pop_front();
        }
        evicted
    }

    /// Drop the queued file, if any.
    pub fn clear(&mut self) -> Option<SelectedFile> {
        self.files.pop_front()
    }

    pub fn current(&self) -> Option<&SelectedFile> {
        self.files.front()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
