//! Utility functions shared across modules.

/// Sanitize a string for use as a filename by replacing invalid characters.
///
/// This function replaces the following characters with underscores:
/// `/`, `\`, `:`, `*`, `?`, `"`, `<`, `>`, `|`
///
/// It also trims leading and trailing whitespace.
///
/// # Examples
///
/// ```
/// use osu_export_core::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("normal_name"), "normal_name");
/// assert_eq!(sanitize_filename("path/with/slashes"), "path_with_slashes");
/// assert_eq!(sanitize_filename("  spaced  "), "spaced");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Last component of a set-relative filename, accepting either separator.
///
/// ```
/// use osu_export_core::utils::base_filename;
///
/// assert_eq!(base_filename("sb/layer/bg.png"), "bg.png");
/// assert_eq!(base_filename("sb\\bg.png"), "bg.png");
/// ```
pub fn base_filename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Lowercased extension of a filename, without the dot
pub fn extension_of(name: &str) -> Option<String> {
    let base = base_filename(name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("good - name"), "good - name");
        assert_eq!(sanitize_filename("Artist\\Song"), "Artist_Song");
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("file*name?"), "file_name_");
        assert_eq!(sanitize_filename("file<>|name"), "file___name");
        assert_eq!(sanitize_filename("\"quoted\""), "_quoted_");
        assert_eq!(sanitize_filename("trailing  "), "trailing");
    }

    #[test]
    fn test_base_filename() {
        assert_eq!(base_filename("audio.mp3"), "audio.mp3");
        assert_eq!(base_filename("a/b\\c.ogg"), "c.ogg");
        assert_eq!(base_filename("dir/"), "");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("audio.MP3").as_deref(), Some("mp3"));
        assert_eq!(extension_of("dir.v2/audio.ogg").as_deref(), Some("ogg"));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("dir.v2/noext"), None);
    }
}
