//! Archive path allocation.
//!
//! Every artifact gets a path of the form
//! `<namespace>/[<subdir>/]<stem><ext>`, where the namespace is the sanitized
//! conversation name. A [`PathRegistry`] remembers every path handed out
//! during one export so later artifacts with the same title get a numeric
//! suffix instead of overwriting earlier entries.

use std::collections::HashSet;

use crate::artifacts::DEFAULT_TITLE;

/// Set of archive paths already allocated during one export job.
#[derive(Debug, Default)]
pub struct PathRegistry {
    paths: HashSet<String>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Allocate a unique archive path for an artifact.
    ///
    /// The result depends only on the arguments and the paths allocated so
    /// far. It is recorded before returning and never handed out again.
    pub fn allocate(&mut self, title: &str, language: &str, namespace: &str) -> String {
        let (subdir, stem) = split_title(&sanitize_title(title));
        let ext = extension_for(language);

        // Keep an extension the title already carries in front of any suffix
        let stem = match stem.len().checked_sub(ext.len()) {
            Some(cut) if cut > 0 && stem[cut..].eq_ignore_ascii_case(ext) => &stem[..cut],
            _ => stem.as_str(),
        };

        let mut base = String::from(namespace);
        base.push('/');
        if let Some(dir) = subdir {
            base.push_str(&dir);
            base.push('/');
        }
        base.push_str(stem);

        let mut candidate = format!("{base}{ext}");
        let mut counter = 1usize;
        while self.paths.contains(&candidate) {
            candidate = format!("{base}_{counter}{ext}");
            counter += 1;
        }

        self.paths.insert(candidate.clone());
        candidate
    }
}

/// Replace everything outside `[A-Za-z0-9_.\-/]` with `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '.' | '-' | '/' => c,
            _ => '_',
        })
        .collect()
}

/// Sanitize a conversation display name for use as the top-level folder.
///
/// Same character policy as titles, except `/` is replaced too. A missing or
/// blank name becomes `Untitled`.
pub fn namespace_for(display_name: Option<&str>) -> String {
    let name = display_name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '.' | '-' => c,
            _ => '_',
        })
        .collect();

    // "." and ".." would not make a usable folder
    if sanitized.chars().all(|c| c == '.') {
        DEFAULT_TITLE.to_string()
    } else {
        sanitized
    }
}

/// Split a sanitized title into an optional sub-directory and a file stem.
/// Empty, `.` and `..` directory segments are dropped.
fn split_title(sanitized: &str) -> (Option<String>, String) {
    let mut segments: Vec<&str> = sanitized.split('/').collect();
    let stem = segments.pop().unwrap_or_default();
    let stem = if stem.is_empty() || stem == "." || stem == ".." {
        DEFAULT_TITLE.to_string()
    } else {
        stem.to_string()
    };

    let dirs: Vec<&str> = segments
        .into_iter()
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if dirs.is_empty() {
        (None, stem)
    } else {
        (Some(dirs.join("/")), stem)
    }
}

/// Map a declared language (case-insensitive) to a file extension.
pub fn extension_for(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "javascript" | "js" => ".js",
        "typescript" | "ts" => ".ts",
        "jsx" | "react" => ".jsx",
        "tsx" => ".tsx",
        "python" | "py" => ".py",
        "html" => ".html",
        "css" => ".css",
        "scss" => ".scss",
        "json" => ".json",
        "markdown" | "md" => ".md",
        "yaml" | "yml" => ".yaml",
        "xml" => ".xml",
        "svg" => ".svg",
        "sql" => ".sql",
        "shell" | "bash" | "sh" | "zsh" => ".sh",
        "powershell" => ".ps1",
        "rust" | "rs" => ".rs",
        "go" | "golang" => ".go",
        "java" => ".java",
        "kotlin" => ".kt",
        "swift" => ".swift",
        "c" => ".c",
        "cpp" | "c++" => ".cpp",
        "csharp" | "c#" | "cs" => ".cs",
        "ruby" | "rb" => ".rb",
        "php" => ".php",
        "lua" => ".lua",
        "r" => ".r",
        "dart" => ".dart",
        "scala" => ".scala",
        "haskell" => ".hs",
        "toml" => ".toml",
        "dockerfile" => ".dockerfile",
        "mermaid" => ".mmd",
        "latex" | "tex" => ".tex",
        _ => ".txt",
    }
}
