//! Filesystem-backed suggestions for path-valued arguments (§4.7).

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::completer::Completer;
use crate::completion::Completion;
use crate::data::Data;
use crate::error::CommandError;

/// One directory entry as reported by a [`DirLister`].
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// Indirection over directory reads, so tests (and [`crate::host::HostServices`])
/// can supply a fake filesystem instead of touching disk.
pub trait DirLister {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, CommandError>;
}

/// The real filesystem.
pub struct RealDirLister;

impl DirLister for RealDirLister {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, CommandError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntryInfo { name, is_dir });
        }
        Ok(entries)
    }
}

/// A [`Completer<String>`] offering filesystem paths, resolved against
/// `base_dir` unless the token being typed is itself absolute.
pub struct FileCompleter {
    lister: Rc<dyn DirLister>,
    base_dir: PathBuf,
    pattern: Option<regex::Regex>,
    ignore_files: bool,
    ignore_directories: bool,
    distinct_key: Option<String>,
    file_types: Vec<String>,
}

pub struct FileCompleterBuilder {
    lister: Rc<dyn DirLister>,
    base_dir: PathBuf,
    pattern: Option<regex::Regex>,
    ignore_files: bool,
    ignore_directories: bool,
    distinct_key: Option<String>,
    file_types: Vec<String>,
}

/// Start building a [`FileCompleter`] rooted at `base_dir`, reading the real
/// filesystem unless [`FileCompleterBuilder::lister`] overrides it.
pub fn file_completer(base_dir: impl Into<PathBuf>) -> FileCompleterBuilder {
    FileCompleterBuilder {
        lister: Rc::new(RealDirLister),
        base_dir: base_dir.into(),
        pattern: None,
        ignore_files: false,
        ignore_directories: false,
        distinct_key: None,
        file_types: Vec::new(),
    }
}

impl FileCompleterBuilder {
    pub fn lister(mut self, lister: Rc<dyn DirLister>) -> Self {
        self.lister = lister;
        self
    }

    pub fn pattern(mut self, pattern: regex::Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn ignore_files(mut self, value: bool) -> Self {
        self.ignore_files = value;
        self
    }

    pub fn ignore_directories(mut self, value: bool) -> Self {
        self.ignore_directories = value;
        self
    }

    /// Exclude entries matching a value already parsed into the `Vec<String>`
    /// stored in `Data` under `key` (§4.7 "Distinct").
    pub fn distinct(mut self, key: impl Into<String>) -> Self {
        self.distinct_key = Some(key.into());
        self
    }

    /// Restrict file suggestions to entries whose extension is in `extensions`
    /// (§4.7 "FileTypes"). Directories are never filtered by this allow-list.
    /// Leading dots are accepted and ignored (`"rs"` and `".rs"` match the same
    /// entries).
    pub fn file_types(mut self, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.file_types = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn build(self) -> FileCompleter {
        FileCompleter {
            lister: self.lister,
            base_dir: self.base_dir,
            pattern: self.pattern,
            ignore_files: self.ignore_files,
            ignore_directories: self.ignore_directories,
            distinct_key: self.distinct_key,
            file_types: self.file_types,
        }
    }
}

/// Split `value` into its displayed directory prefix (kept exactly as typed,
/// trailing slash included) and base name.
fn split_value(value: &str) -> (String, String) {
    match value.rfind('/') {
        Some(idx) => (value[..=idx].to_string(), value[idx + 1..].to_string()),
        None => (String::new(), value.to_string()),
    }
}

fn resolve_dir(display_dir: &str, base_dir: &Path) -> PathBuf {
    if display_dir.is_empty() {
        base_dir.to_path_buf()
    } else if Path::new(display_dir).is_absolute() {
        PathBuf::from(display_dir)
    } else {
        base_dir.join(display_dir)
    }
}

fn matches_file_types(entry: &DirEntryInfo, file_types: &[String]) -> bool {
    if file_types.is_empty() || entry.is_dir {
        return true;
    }
    Path::new(&entry.name)
        .extension()
        .is_some_and(|ext| file_types.iter().any(|allowed| allowed == &ext.to_string_lossy()))
}

fn common_prefix<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = names.collect();
    names.sort_unstable();
    let (first, last) = match (names.first(), names.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return String::new(),
    };
    let prefix_len = first
        .chars()
        .zip(last.chars())
        .take_while(|(a, b)| a == b)
        .count();
    first.chars().take(prefix_len).collect()
}

impl Completer<String> for FileCompleter {
    fn complete(&self, value: &String, data: &Data) -> Result<Completion, CommandError> {
        let (display_dir, base) = split_value(value);
        let dir = resolve_dir(&display_dir, &self.base_dir);

        let mut candidates: Vec<DirEntryInfo> = self
            .lister
            .list(&dir)?
            .into_iter()
            .filter(|e| !(self.ignore_files && !e.is_dir))
            .filter(|e| !(self.ignore_directories && e.is_dir))
            .filter(|e| self.pattern.as_ref().is_none_or(|re| re.is_match(&e.name)))
            .filter(|e| matches_file_types(e, &self.file_types))
            .collect();

        if let Some(key) = &self.distinct_key {
            if let Some(parsed) = data.get::<Vec<String>>(key) {
                candidates.retain(|e| {
                    let full = join_display(&display_dir, &e.name);
                    let absolute = dir.join(&e.name);
                    !parsed.iter().any(|p| *p == full || Path::new(p) == absolute)
                });
            }
        }

        let matching: Vec<&DirEntryInfo> = candidates.iter().filter(|e| e.name.starts_with(&base)).collect();

        if let [only] = matching.as_slice() {
            let full = join_display(&display_dir, &only.name);
            let mut suggestions = vec![full.clone()];
            if only.is_dir {
                suggestions.push(format!("{full}/_"));
            }
            return Ok(Completion::new(suggestions).ignore_filter(true));
        }

        if matching.len() > 1 {
            let common = common_prefix(matching.iter().map(|e| e.name.as_str()));
            if common.len() > base.len() {
                let full = join_display(&display_dir, &common);
                return Ok(Completion::new(vec![full.clone(), format!("{full}_")]).ignore_filter(true));
            }
        }

        let names: Vec<String> = candidates
            .into_iter()
            .map(|e| if e.is_dir { format!("{}/", e.name) } else { e.name })
            .collect();
        Ok(Completion::new(names).dont_complete(true))
    }
}

fn join_display(display_dir: &str, name: &str) -> String {
    format!("{display_dir}{name}")
}
