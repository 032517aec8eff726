//! File Selector
//!
//! Narrows a repository's files to the ones worth showing an analyst:
//! source, config and doc files, well-known manifests, and anything under a
//! conventional source directory. Retained content is truncated to a
//! per-file character budget.
//!
//! The aggregate token ceiling is a separate step (`apply_token_ceiling`)
//! applied by the extractor after selection.

use tracing::debug;

use crate::ai::tokenizer::{estimate_files_tokens, truncate_content};
use crate::types::{RepoFile, path_extension};

/// Source, config and documentation extensions
const RELEVANT_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".jsx", ".tsx", ".py", ".java", ".cpp", ".c", ".go", ".rs", ".php", ".rb", ".cs",
    ".swift", ".kt", ".scala", ".clj", ".hs", ".ml", ".json", ".yaml", ".yml", ".toml", ".ini",
    ".cfg", ".conf", ".md", ".txt", ".rst", ".adoc",
];

/// Project manifests and top-level docs, matched on the base file name
const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "pom.xml",
    "build.gradle",
    "Cargo.toml",
    "go.mod",
    "composer.json",
    "Gemfile",
    "pubspec.yaml",
    "package.yaml",
    "README.md",
    "README.txt",
    "CHANGELOG.md",
    "LICENSE",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    ".env.example",
    "config.json",
];

/// Conventional source directory segments
const SOURCE_DIRS: &[&str] = &["src/", "app/", "lib/", "main/"];

/// Filters and truncates files for analysis
#[derive(Debug, Clone, Copy)]
pub struct FileSelector {
    max_file_chars: usize,
}

impl FileSelector {
    pub fn new(max_file_chars: usize) -> Self {
        Self { max_file_chars }
    }

    /// True if the path passes any of the relevance rules
    pub fn is_relevant(path: &str) -> bool {
        let extension_match = path_extension(path)
            .map(|ext| RELEVANT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if extension_match {
            return true;
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        MANIFEST_FILES.contains(&file_name) || SOURCE_DIRS.iter().any(|dir| path.contains(dir))
    }

    /// Keep relevant files, in input order, with content truncated
    pub fn select(&self, files: Vec<RepoFile>) -> Vec<RepoFile> {
        let total = files.len();
        let selected: Vec<RepoFile> = files
            .into_iter()
            .filter(|file| Self::is_relevant(&file.path))
            .map(|file| RepoFile {
                content: truncate_content(&file.content, self.max_file_chars),
                path: file.path,
            })
            .collect();

        debug!("Selected {} of {} files", selected.len(), total);
        selected
    }
}

/// Keep only the first `file_cap` files when the summed estimate exceeds `ceiling`.
///
/// A total exactly at the ceiling is kept whole.
pub fn apply_token_ceiling(files: Vec<RepoFile>, ceiling: usize, file_cap: usize) -> Vec<RepoFile> {
    let total_tokens = estimate_files_tokens(&files);
    if total_tokens <= ceiling {
        debug!("Selected files use {} tokens (ceiling {})", total_tokens, ceiling);
        return files;
    }

    debug!(
        "Selected files use {} tokens, over ceiling {}; keeping first {}",
        total_tokens, ceiling, file_cap
    );
    files.into_iter().take(file_cap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::budget::{
        EXTRACTION_FILE_CAP, EXTRACTION_TOKEN_CEILING, MAX_FILE_CHARS, TRUNCATION_MARKER,
    };
    use proptest::prelude::*;

    fn file(path: &str, content: &str) -> RepoFile {
        RepoFile::new(path, content)
    }

    #[test]
    fn test_relevance_rules() {
        assert!(FileSelector::is_relevant("main.rs"));
        assert!(FileSelector::is_relevant("docs/Guide.MD"));
        assert!(FileSelector::is_relevant("Dockerfile"));
        assert!(FileSelector::is_relevant("deploy/Makefile"));
        assert!(FileSelector::is_relevant("src/assets/logo.png"));
        assert!(FileSelector::is_relevant("web/app/index.html"));

        assert!(!FileSelector::is_relevant("assets/logo.png"));
        assert!(!FileSelector::is_relevant("index.html"));
        assert!(!FileSelector::is_relevant(".gitignore"));
    }

    #[test]
    fn test_select_preserves_order_and_truncates() {
        let long = "x".repeat(MAX_FILE_CHARS + 5);
        let files = vec![
            file("b.py", "print()"),
            file("image.bmp", "binary"),
            file("a.rs", &long),
        ];

        let selected = FileSelector::new(MAX_FILE_CHARS).select(files);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].path, "b.py");
        assert_eq!(selected[0].content, "print()");
        assert_eq!(selected[1].path, "a.rs");
        assert!(selected[1].content.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            selected[1].content.chars().count(),
            MAX_FILE_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_ceiling_boundary() {
        // 12 files of 2000 chars = 500 tokens each = 6000 total
        let at_ceiling: Vec<RepoFile> = (0..12)
            .map(|i| file(&format!("f{i}.rs"), &"a".repeat(2000)))
            .collect();
        let kept = apply_token_ceiling(at_ceiling.clone(), EXTRACTION_TOKEN_CEILING, EXTRACTION_FILE_CAP);
        assert_eq!(kept.len(), 12);

        // one extra character adds one token
        let mut over = at_ceiling;
        over.push(file("extra.rs", "a"));
        let kept = apply_token_ceiling(over, EXTRACTION_TOKEN_CEILING, EXTRACTION_FILE_CAP);
        assert_eq!(kept.len(), 10);
        let names: Vec<&str> = kept.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(names[0], "f0.rs");
        assert_eq!(names[9], "f9.rs");
    }

    #[test]
    fn test_truncated_files_over_ceiling() {
        // 15 oversized files truncate to 2000 chars plus marker, well over 6000 tokens
        let files: Vec<RepoFile> = (0..15)
            .map(|i| file(&format!("src/m{i}.ts"), &"z".repeat(5000)))
            .collect();
        let selected = FileSelector::new(MAX_FILE_CHARS).select(files);
        let kept = apply_token_ceiling(selected, EXTRACTION_TOKEN_CEILING, EXTRACTION_FILE_CAP);
        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0].path, "src/m0.ts");
        assert_eq!(kept[9].path, "src/m9.ts");
    }

    proptest! {
        #[test]
        fn prop_ceiling_is_order_preserving_prefix(
            sizes in proptest::collection::vec(0usize..3000, 0..30),
        ) {
            let files: Vec<RepoFile> = sizes
                .iter()
                .enumerate()
                .map(|(i, n)| file(&format!("f{i}.rs"), &"q".repeat(*n)))
                .collect();
            let total = estimate_files_tokens(&files);
            let kept = apply_token_ceiling(files.clone(), EXTRACTION_TOKEN_CEILING, EXTRACTION_FILE_CAP);

            if total <= EXTRACTION_TOKEN_CEILING {
                prop_assert_eq!(kept.len(), files.len());
            } else {
                prop_assert_eq!(kept.len(), files.len().min(EXTRACTION_FILE_CAP));
            }
            prop_assert_eq!(&kept[..], &files[..kept.len()]);
        }
    }
}
