use crate::config::normalize_extension;
use std::collections::HashSet;
use std::path::Path;

/// Kind of a scanned file, decided from its extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Image,
    NonImage,
}

/// Extension-based file classifier. Content is never inspected here; decoding
/// problems surface later in the analyzer.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    extensions: HashSet<String>,
}

impl FileClassifier {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    pub fn classify(&self, path: &Path) -> ImageKind {
        let ext = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!(".{}", ext.to_lowercase()),
            None => return ImageKind::NonImage,
        };
        if self.extensions.contains(&ext) {
            ImageKind::Image
        } else {
            ImageKind::NonImage
        }
    }
}
