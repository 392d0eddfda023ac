use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An archived entity document read from disk before indexing.
#[derive(Debug, Clone)]
pub struct StoredPayload {
    pub id: String,
    pub path: PathBuf,
    pub xml: String,
}

#[derive(Default)]
pub struct PayloadLoader {
    extension: Option<String>,
}

impl PayloadLoader {
    pub fn new() -> Self { Self::default() }

    /// Accept files with `ext` instead of `xml`.
    pub fn with_extension(ext: &str) -> Self { Self { extension: Some(ext.trim_start_matches('.').to_string()) } }

    pub fn load_directory(&self, dir: &Path) -> Result<Vec<StoredPayload>> {
        self.load_directory_limited(dir, usize::MAX)
    }

    pub fn load_directory_limited(&self, dir: &Path, limit: usize) -> Result<Vec<StoredPayload>> {
        let mut files = self.list_payload_files(dir);
        if files.is_empty() {
            info!(dir = %dir.display(), "no payload files found");
            return Ok(vec![]);
        }
        if files.len() > limit {
            files.truncate(limit);
            info!(limit, "limited payload files");
        }
        let mut payloads = Vec::with_capacity(files.len());
        for (index, path) in files.iter().enumerate() {
            debug!(file = %path.display(), "reading payload {}/{}", index + 1, files.len());
            let xml = match fs::read_to_string(path) {
                Ok(xml) => xml,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable payload");
                    continue;
                }
            };
            payloads.push(StoredPayload { id: Self::id_from_path(path), path: path.clone(), xml });
        }
        info!(count = payloads.len(), dir = %dir.display(), "loaded payloads");
        Ok(payloads)
    }

    fn id_from_path(path: &Path) -> String {
        path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
    }

    fn list_payload_files(&self, root: &Path) -> Vec<PathBuf> {
        let wanted = self.extension.as_deref().unwrap_or("xml");
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(wanted))
            .collect();
        files.sort();
        files
    }
}
