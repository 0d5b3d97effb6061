// Language detection from file extension

use std::path::Path;

/// Language used when the extension is unknown
pub const FALLBACK_LANGUAGE: &str = "text";

const EXTENSIONS: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("rs", "rust"),
    ("java", "java"),
    ("rb", "ruby"),
    ("php", "php"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("hpp", "cpp"),
];

/// Map a path to a language name by extension alone
pub fn detect_language(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FALLBACK_LANGUAGE;
    };
    let ext = ext.to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| *language)
        .unwrap_or(FALLBACK_LANGUAGE)
}
