//! Language detection.
use std::path::Path;

/// File extensions and the language each one implies.
const EXTENSIONS: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "javascript"),
    ("ts", "javascript"),
    ("jsx", "javascript"),
    ("tsx", "javascript"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("java", "java"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("rs", "rust"),
    ("go", "go"),
    ("json", "json"),
    ("xml", "xml"),
    ("md", "markdown"),
    ("txt", "text"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hxx", "cpp"),
    ("php", "php"),
    ("phtml", "php"),
    ("rb", "ruby"),
    ("swift", "swift"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("toml", "toml"),
    ("yml", "yaml"),
    ("yaml", "yaml"),
];

/// Returns the language implied by `ext`, ignoring case.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// Returns the language implied by the extension of `path`.
pub fn from_path<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(from_extension("rs"), Some("rust"));
        assert_eq!(from_extension("YAML"), Some("yaml"));
        assert_eq!(from_path("a/b/Main.Kt"), Some("kotlin"));
        assert_eq!(from_path("data.json"), Some("json"));
    }

    #[test]
    fn unknown_extensions() {
        assert_eq!(from_extension("zzz"), None);
        assert_eq!(from_path("Makefile"), None);
        assert_eq!(from_path(".bashrc"), None);
    }
}
