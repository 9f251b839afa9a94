//! Supported languages.
//!
//! A closed enum rather than trait-object dispatch: the language set is fixed
//! at configuration time (SPEC_FULL.md §9, option (a)).

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use tree_sitter::Language as TsLanguage;

/// A language the core can parse and extract entities from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    Javascript,
    Java,
    Python,
    Go,
    Markdown,
}

impl Language {
    /// Tag used for `.scm` file names, the `language` node column, and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Python => "python",
            Language::Go => "go",
            Language::Markdown => "markdown",
        }
    }

    pub fn tree_sitter_language(&self) -> TsLanguage {
        match self {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Javascript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Markdown => tree_sitter_md::LANGUAGE.into(),
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        extension_map().get(ext.to_lowercase().as_str()).copied()
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn all() -> &'static [Language] {
        &[
            Language::TypeScript,
            Language::Javascript,
            Language::Java,
            Language::Python,
            Language::Go,
            Language::Markdown,
        ]
    }

    pub fn all_extensions() -> &'static [&'static str] {
        &[
            "ts", "tsx", "js", "jsx", "mjs", "cjs", "java", "py", "go", "md", "markdown",
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static EXTENSION_MAP: OnceLock<HashMap<&'static str, Language>> = OnceLock::new();

fn extension_map() -> &'static HashMap<&'static str, Language> {
    EXTENSION_MAP.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert("ts", Language::TypeScript);
        map.insert("tsx", Language::TypeScript);
        map.insert("js", Language::Javascript);
        map.insert("jsx", Language::Javascript);
        map.insert("mjs", Language::Javascript);
        map.insert("cjs", Language::Javascript);
        map.insert("java", Language::Java);
        map.insert("py", Language::Python);
        map.insert("go", Language::Go);
        map.insert("md", Language::Markdown);
        map.insert("markdown", Language::Markdown);
        map
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_extension_recognizes_all_supported_languages() {
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("TSX"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("js"), Some(Language::Javascript));
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("go"), Some(Language::Go));
        assert_eq!(Language::from_extension("md"), Some(Language::Markdown));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(
            Language::from_path(Path::new("src/index.ts")),
            Some(Language::TypeScript)
        );
        assert_eq!(Language::from_path(Path::new("README")), None);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Language::Go.to_string(), "go");
    }
}
