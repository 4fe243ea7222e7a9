use std::fs;
use std::path::{Path, PathBuf};

use crate::collaborators::FileManager;
use crate::error::{AssistantError, Result};

const MAX_SEARCH_RESULTS: usize = 25;
const MAX_SEARCH_DEPTH: usize = 6;

/// File operations rooted at a base directory. Relative arguments are
/// resolved against the base; absolute paths are used as given.
pub struct LocalFileManager {
    base: PathBuf,
}

impl LocalFileManager {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Base defaults to the user's home directory, falling back to the
    /// current directory when HOME is unset.
    pub fn from_home() -> Self {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base)
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base.join(candidate)
        }
    }
}

impl FileManager for LocalFileManager {
    fn list_directory(&self, path: Option<&str>) -> Result<String> {
        let dir = match path {
            Some(p) => self.resolve(p),
            None => self.base.clone(),
        };
        if !dir.exists() {
            return Err(AssistantError::not_found(
                "Directory",
                dir.display().to_string(),
            ));
        }

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let marker = if entry.path().is_dir() { "/" } else { "" };
            names.push(format!("{}{}", entry.file_name().to_string_lossy(), marker));
        }
        names.sort();

        if names.is_empty() {
            Ok(format!("{} is empty", dir.display()))
        } else {
            Ok(format!(
                "Contents of {}:\n{}",
                dir.display(),
                names.join("\n")
            ))
        }
    }

    fn create_file(&self, name: &str) -> Result<String> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "")?;
        Ok(format!("File created: {}", path.display()))
    }

    fn create_folder(&self, name: &str) -> Result<String> {
        let path = self.resolve(name);
        fs::create_dir_all(&path)?;
        Ok(format!("Folder created: {}", path.display()))
    }

    fn delete_path(&self, name: &str) -> Result<String> {
        let path = self.resolve(name);
        if !path.exists() {
            return Err(AssistantError::not_found(
                "Path",
                path.display().to_string(),
            ));
        }
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
            Ok(format!("Directory deleted: {}", path.display()))
        } else {
            fs::remove_file(&path)?;
            Ok(format!("File deleted: {}", path.display()))
        }
    }

    fn move_path(&self, from: &str, to: &str) -> Result<String> {
        let source = self.resolve(from);
        let dest = self.resolve(to);
        if !source.exists() {
            return Err(AssistantError::not_found(
                "Path",
                source.display().to_string(),
            ));
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&source, &dest)?;
        Ok(format!("Moved {} to {}", source.display(), dest.display()))
    }

    fn search_files(&self, pattern: &str) -> Result<String> {
        let needle = pattern.to_lowercase();
        let mut matches = Vec::new();
        search_dir(&self.base, &needle, 0, &mut matches);

        if matches.is_empty() {
            Ok(format!("No files matching '{}' were found", pattern))
        } else {
            Ok(format!(
                "Found {} matching '{}':\n{}",
                if matches.len() == 1 {
                    "1 file".to_string()
                } else {
                    format!("{} files", matches.len())
                },
                pattern,
                matches.join("\n")
            ))
        }
    }
}

fn search_dir(dir: &Path, needle: &str, depth: usize, matches: &mut Vec<String>) {
    if depth > MAX_SEARCH_DEPTH || matches.len() >= MAX_SEARCH_RESULTS {
        return;
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return, // unreadable directories are skipped
    };
    for entry in entries.flatten() {
        if matches.len() >= MAX_SEARCH_RESULTS {
            return;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.contains(needle) {
            matches.push(path.display().to_string());
        }
        if path.is_dir() && !name.starts_with('.') {
            search_dir(&path, needle, depth + 1, matches);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_base(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "artifix-files-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn create_list_and_delete() {
        let base = temp_base("crud");
        let fm = LocalFileManager::new(&base);

        fm.create_file("notes.txt").unwrap();
        fm.create_folder("projects").unwrap();

        let listing = fm.list_directory(None).unwrap();
        assert!(listing.contains("notes.txt"));
        assert!(listing.contains("projects/"));

        fm.delete_path("notes.txt").unwrap();
        let listing = fm.list_directory(None).unwrap();
        assert!(!listing.contains("notes.txt"));

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn delete_missing_path_is_not_found() {
        let base = temp_base("missing");
        let fm = LocalFileManager::new(&base);
        let err = fm.delete_path("nope.txt").unwrap_err();
        assert!(matches!(err, AssistantError::NotFound { .. }));
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn search_is_recursive_and_case_insensitive() {
        let base = temp_base("search");
        let fm = LocalFileManager::new(&base);
        fm.create_folder("inner").unwrap();
        fm.create_file("inner/Report-Final.md").unwrap();

        let result = fm.search_files("report").unwrap();
        assert!(result.contains("Report-Final.md"));

        let result = fm.search_files("zzz-absent").unwrap();
        assert!(result.contains("No files matching"));

        let _ = fs::remove_dir_all(&base);
    }
}
