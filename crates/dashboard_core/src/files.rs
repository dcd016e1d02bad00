//! Confined directory listing and file serving.
//!
//! # Responsibility
//! - List one directory below a fixed root, optionally filtered by extension.
//! - Read one allow-listed file below the same root.
//!
//! # Invariants
//! - Requests are normalized lexically before touching the filesystem; any
//!   absolute path or `..` that climbs above the root is forbidden.
//! - The canonical target must stay under the canonical root, so symlinks
//!   cannot escape it either.
//! - Paths handed back to callers are root-relative and `/`-separated.

use log::{debug, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Extensions `serve_content` will read, with their content types.
const SERVABLE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain; charset=utf-8"),
];

pub type FilesResult<T> = Result<T, FilesError>;

#[derive(Debug)]
pub enum FilesError {
    /// The request resolves outside the root.
    Forbidden(String),
    NotFound(String),
    UnsupportedType(String),
    /// The configured root is missing or not a directory.
    InvalidRoot { path: String, source: Option<io::Error> },
    Io { path: String, source: io::Error },
}

impl Display for FilesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(path) => write!(f, "access outside the files root: `{path}`"),
            Self::NotFound(path) => write!(f, "not found: `{path}`"),
            Self::UnsupportedType(path) => write!(f, "unsupported file type: `{path}`"),
            Self::InvalidRoot { path, source } => match source {
                Some(err) => write!(f, "invalid files root `{path}`: {err}"),
                None => write!(f, "invalid files root `{path}`: not a directory"),
            },
            Self::Io { path, source } => write!(f, "failed to read `{path}`: {source}"),
        }
    }
}

impl Error for FilesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRoot {
                source: Some(err), ..
            } => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    /// Lowercased extension without the dot; empty when there is none.
    pub extension: String,
    pub size: u64,
    /// Last modification time in epoch milliseconds.
    pub modified: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    /// Root-relative path of the listed directory; empty for the root itself.
    pub current_directory: String,
    pub directories: Vec<DirectoryEntry>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Read-only view of one directory tree.
#[derive(Debug, Clone)]
pub struct FileBrowser {
    root: PathBuf,
}

impl FileBrowser {
    /// Binds the browser to `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> FilesResult<Self> {
        let root = root.as_ref();
        let invalid = |source: Option<io::Error>| FilesError::InvalidRoot {
            path: root.display().to_string(),
            source,
        };
        let root = root.canonicalize().map_err(|err| invalid(Some(err)))?;
        if !root.is_dir() {
            return Err(invalid(None));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the directories and files directly inside `subdirectory`.
    ///
    /// `extension_filter` is a comma separated list such as `"jpg,png"`; it
    /// applies to files only and ignores case and a leading dot.
    pub fn list(
        &self,
        subdirectory: Option<&str>,
        extension_filter: Option<&str>,
    ) -> FilesResult<DirectoryListing> {
        let requested = subdirectory.unwrap_or_default();
        let (target, relative) = self.resolve(requested)?;
        if !target.is_dir() {
            return Err(FilesError::NotFound(requested.to_string()));
        }
        let allowed = parse_extension_filter(extension_filter);

        let entries = fs::read_dir(&target).map_err(|source| FilesError::Io {
            path: relative.clone(),
            source,
        })?;

        let mut directories = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(
                        "event=files_list module=files status=skipped dir={} error={}",
                        relative, err
                    );
                    continue;
                }
            };
            let Ok(name) = entry.file_name().into_string() else {
                warn!(
                    "event=files_list module=files status=skipped dir={} reason=non_utf8_name",
                    relative
                );
                continue;
            };
            let metadata = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(
                        "event=files_list module=files status=skipped dir={} name={} error={}",
                        relative, name, err
                    );
                    continue;
                }
            };

            let path = join_relative(&relative, &name);
            if metadata.is_dir() {
                directories.push(DirectoryEntry { name, path });
            } else if metadata.is_file() {
                let extension = extension_of(&name);
                if allowed
                    .as_ref()
                    .is_some_and(|allowed| !allowed.contains(&extension))
                {
                    continue;
                }
                files.push(FileEntry {
                    modified: modified_ms(&metadata),
                    size: metadata.len(),
                    name,
                    path,
                    extension,
                });
            }
        }

        directories.sort_by(|a, b| compare_names(&a.name, &b.name));
        files.sort_by(|a, b| compare_names(&a.name, &b.name));

        debug!(
            "event=files_list module=files status=ok dir={} directories={} files={}",
            relative,
            directories.len(),
            files.len()
        );
        Ok(DirectoryListing {
            current_directory: relative,
            directories,
            files,
        })
    }

    /// Reads one file whose extension is in the servable allow-list.
    ///
    /// The type is checked on the requested name before the filesystem is
    /// touched, then again on the canonical target.
    pub fn serve_content(&self, path: &str) -> FilesResult<FileContent> {
        let relative = self.normalize(path)?;
        servable_type(&relative).ok_or_else(|| FilesError::UnsupportedType(relative.clone()))?;

        let target = self.locate(path, &relative)?;
        if !target.is_file() {
            return Err(FilesError::NotFound(path.to_string()));
        }
        let target_name = target
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let content_type = servable_type(target_name)
            .ok_or_else(|| FilesError::UnsupportedType(relative.clone()))?;

        let bytes = fs::read(&target).map_err(|source| FilesError::Io {
            path: relative.clone(),
            source,
        })?;
        let name = relative
            .rsplit('/')
            .next()
            .unwrap_or(relative.as_str())
            .to_string();

        debug!(
            "event=files_serve module=files status=ok path={} bytes={}",
            relative,
            bytes.len()
        );
        Ok(FileContent {
            name,
            content_type,
            bytes,
        })
    }

    /// Maps a request onto a canonical path under the root.
    ///
    /// Returns the canonical target and its normalized root-relative form.
    fn resolve(&self, requested: &str) -> FilesResult<(PathBuf, String)> {
        let relative = self.normalize(requested)?;
        let canonical = self.locate(requested, &relative)?;
        Ok((canonical, relative))
    }

    /// Lexically folds `.` and `..`; rejects absolute paths and climbs past the root.
    fn normalize(&self, requested: &str) -> FilesResult<String> {
        let mut parts: Vec<&str> = Vec::new();
        for component in Path::new(requested.trim()).components() {
            match component {
                Component::Normal(part) => {
                    parts.push(part.to_str().ok_or_else(|| forbidden(requested))?)
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    parts.pop().ok_or_else(|| forbidden(requested))?;
                }
                Component::RootDir | Component::Prefix(_) => return Err(forbidden(requested)),
            }
        }
        Ok(parts.join("/"))
    }

    fn locate(&self, requested: &str, relative: &str) -> FilesResult<PathBuf> {
        let joined = relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part));
        let canonical = joined.canonicalize().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FilesError::NotFound(requested.to_string())
            } else {
                FilesError::Io {
                    path: relative.to_string(),
                    source,
                }
            }
        })?;
        if !canonical.starts_with(&self.root) {
            return Err(forbidden(requested));
        }
        Ok(canonical)
    }
}

fn forbidden(requested: &str) -> FilesError {
    warn!(
        "event=files_access module=files status=forbidden request={:?}",
        requested
    );
    FilesError::Forbidden(requested.to_string())
}

fn servable_type(name: &str) -> Option<&'static str> {
    let extension = extension_of(name);
    SERVABLE_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == extension)
        .map(|(_, content_type)| *content_type)
}

fn parse_extension_filter(filter: Option<&str>) -> Option<Vec<String>> {
    let allowed = filter?
        .split(',')
        .map(|part| part.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    (!allowed.is_empty()).then_some(allowed)
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

fn compare_names(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn modified_ms(metadata: &Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{FileBrowser, FilesError};
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("photos/2024")).unwrap();
        fs::create_dir_all(root.join("Docs")).unwrap();
        fs::write(root.join("photos/b.PNG"), b"png").unwrap();
        fs::write(root.join("photos/a.jpg"), b"jpg").unwrap();
        fs::write(root.join("photos/notes.txt"), b"hello").unwrap();
        fs::write(root.join("photos/raw.cr2"), b"raw").unwrap();
        fs::write(root.join("readme.txt"), b"top level").unwrap();
        dir
    }

    #[test]
    fn root_listing_sorts_case_insensitively() {
        let dir = sample_tree();
        let browser = FileBrowser::new(dir.path()).unwrap();

        let listing = browser.list(None, None).unwrap();
        assert_eq!(listing.current_directory, "");
        let names = listing
            .directories
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Docs", "photos"]);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].path, "readme.txt");
        assert_eq!(listing.files[0].size, 9);
        assert!(listing.files[0].modified > 0);
    }

    #[test]
    fn extension_filter_ignores_case_and_dots() {
        let dir = sample_tree();
        let browser = FileBrowser::new(dir.path()).unwrap();

        let listing = browser.list(Some("photos"), Some("jpg, .PNG")).unwrap();
        let paths = listing
            .files
            .iter()
            .map(|f| f.path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(paths, ["photos/a.jpg", "photos/b.PNG"]);
        assert_eq!(listing.files[1].extension, "png");
        assert_eq!(listing.directories[0].path, "photos/2024");
    }

    #[test]
    fn traversal_outside_root_is_forbidden() {
        let dir = sample_tree();
        let browser = FileBrowser::new(dir.path().join("photos")).unwrap();

        for request in ["../../etc", "..", "/etc", "2024/../../readme.txt"] {
            assert!(
                matches!(browser.list(Some(request), None), Err(FilesError::Forbidden(_))),
                "{request} should be forbidden"
            );
        }
        assert!(matches!(
            browser.serve_content("../readme.txt"),
            Err(FilesError::Forbidden(_))
        ));
        // Climbing and coming back stays inside the root.
        assert!(browser.list(Some("2024/../2024"), None).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_root_is_forbidden() {
        let outside = tempfile::tempdir().unwrap();
        let dir = sample_tree();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        let browser = FileBrowser::new(dir.path()).unwrap();

        assert!(matches!(
            browser.list(Some("escape"), None),
            Err(FilesError::Forbidden(_))
        ));
    }

    #[test]
    fn missing_or_non_directory_targets_are_not_found() {
        let dir = sample_tree();
        let browser = FileBrowser::new(dir.path()).unwrap();

        assert!(matches!(
            browser.list(Some("nope"), None),
            Err(FilesError::NotFound(_))
        ));
        assert!(matches!(
            browser.list(Some("readme.txt"), None),
            Err(FilesError::NotFound(_))
        ));
    }

    #[test]
    fn serve_content_honours_allow_list() {
        let dir = sample_tree();
        let browser = FileBrowser::new(dir.path()).unwrap();

        let content = browser.serve_content("photos/notes.txt").unwrap();
        assert_eq!(content.name, "notes.txt");
        assert_eq!(content.content_type, "text/plain; charset=utf-8");
        assert_eq!(content.bytes, b"hello");

        let image = browser.serve_content("photos/b.PNG").unwrap();
        assert_eq!(image.content_type, "image/png");

        assert!(matches!(
            browser.serve_content("photos/raw.cr2"),
            Err(FilesError::UnsupportedType(_))
        ));
        assert!(matches!(
            browser.serve_content("photos"),
            Err(FilesError::UnsupportedType(_))
        ));
        fs::create_dir_all(dir.path().join("photos/album.txt")).unwrap();
        assert!(matches!(
            browser.serve_content("photos/album.txt"),
            Err(FilesError::NotFound(_))
        ));
    }

    #[test]
    fn disallowed_type_is_rejected_before_lookup() {
        let dir = sample_tree();
        let browser = FileBrowser::new(dir.path()).unwrap();

        assert!(matches!(
            browser.serve_content("missing.exe"),
            Err(FilesError::UnsupportedType(_))
        ));
        assert!(matches!(
            browser.serve_content("photos/missing.txt"),
            Err(FilesError::NotFound(_))
        ));
        assert!(matches!(
            browser.serve_content("../outside.exe"),
            Err(FilesError::Forbidden(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn content_type_follows_the_link_target() {
        let dir = sample_tree();
        fs::write(dir.path().join("secrets.conf"), b"token=1").unwrap();
        std::os::unix::fs::symlink(dir.path().join("secrets.conf"), dir.path().join("x.png"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("readme.txt"), dir.path().join("latest.txt"))
            .unwrap();
        let browser = FileBrowser::new(dir.path()).unwrap();

        assert!(matches!(
            browser.serve_content("x.png"),
            Err(FilesError::UnsupportedType(_))
        ));
        let linked = browser.serve_content("latest.txt").unwrap();
        assert_eq!(linked.name, "latest.txt");
        assert_eq!(linked.bytes, b"top level");
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FileBrowser::new(dir.path().join("absent")),
            Err(FilesError::InvalidRoot { .. })
        ));
    }
}
