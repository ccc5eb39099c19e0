/// Title shown for a track: its name without the trailing file extension.
///
/// Names without an extension (or dotfiles such as `.intro`) are returned as-is.
pub fn display_title(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
        _ => name,
    }
}
