//! Display encoding for library paths and relative path resolution.
//!
//! acme treats spaces and most punctuation as word breaks, so a click on
//! `Pink Floyd (1973)` would only deliver one word. Paths are therefore shown
//! with look-alike glyphs that acme treats as part of a word, and mapped back
//! when clicked text is interpreted as a path.

/// Structural character and the glyph shown in its place.
const GLYPHS: [(char, char); 19] = [
    ('(', '〔'),
    (')', '〕'),
    ('&', '⊕'),
    ('?', '¿'),
    ('\'', '´'),
    ('[', '【'),
    (']', '】'),
    (':', '᛬'),
    ('<', '〈'),
    ('>', '〉'),
    ('+', '±'),
    ('.', '。'),
    ('-', '‒'),
    (',', '、'),
    (' ', '⋯'),
    ('!', '¡'),
    ('#', '﹟'),
    ('{', '﹛'),
    ('}', '﹜'),
];

/// Replace structural characters with their display glyphs.
pub fn encode(path: &str) -> String {
    path.chars()
        .map(|ch| {
            GLYPHS
                .iter()
                .find(|(plain, _)| *plain == ch)
                .map_or(ch, |(_, glyph)| *glyph)
        })
        .collect()
}

/// Inverse of [`encode`].
pub fn decode(text: &str) -> String {
    text.chars()
        .map(|ch| {
            GLYPHS
                .iter()
                .find(|(_, glyph)| *glyph == ch)
                .map_or(ch, |(plain, _)| *plain)
        })
        .collect()
}

/// True for characters [`encode`] never lets through.
pub fn is_structural(ch: char) -> bool {
    GLYPHS.iter().any(|(plain, _)| *plain == ch)
}

fn trim_separators(path: &str) -> &str {
    path.trim_matches(|c| c == ' ' || c == '/')
}

/// Resolve `rel` against the browse directory `current`.
///
/// `..` never climbs above a top-level directory: with no parent segment left
/// the current path is kept.
pub fn resolve(current: &str, rel: &str) -> String {
    if rel.is_empty() || rel == "." {
        return current.to_string();
    }

    let base = current.trim_end_matches(|c| c == ' ' || c == '/');
    if rel == ".." {
        return match base.rfind('/') {
            Some(idx) if idx > 0 => base[..idx].to_string(),
            _ => current.to_string(),
        };
    }

    if rel.starts_with('/') {
        return rel.to_string();
    }
    format!("{base}/{}", trim_separators(rel))
}

/// Directory holding a queued song, as an absolute browse path.
pub fn parent_dir(file_uri: &str) -> String {
    match trim_separators(file_uri).rsplit_once('/') {
        Some((dir, _)) => format!("/{dir}"),
        None => "/".to_string(),
    }
}

/// Last segment of a database path, as listed in the browse window.
pub fn base_name(uri: &str) -> &str {
    let trimmed = uri.trim_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Absolute browse path to the root-relative URI MPD expects.
pub fn service_uri(path: &str) -> &str {
    trim_separators(path)
}
