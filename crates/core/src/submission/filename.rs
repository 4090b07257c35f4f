use unicode_normalization::UnicodeNormalization;

const MAX_BASE_LEN: usize = 100;

/// Append the original file's extension (after its last `.`) to a custom name.
///
/// The extension is kept verbatim. Without a `.` in the original name the
/// custom name is returned unchanged.
pub fn build_filename_with_extension(custom_name: &str, original_name: &str) -> String {
    match original_name.rfind('.') {
        Some(idx) => format!("{}{}", custom_name.trim(), &original_name[idx..]),
        None => custom_name.to_string(),
    }
}

/// Make a filename safe for the signing service.
///
/// Diacritics are stripped, every character outside `[A-Za-z0-9_-]` in the
/// base name becomes `_`, and the base is cut to 100 characters before the
/// extension is re-appended.
pub fn normalize_filename(name: &str) -> String {
    let (base, extension) = match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    };

    let base: String = base
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_BASE_LEN)
        .collect();

    format!("{}{}", base, extension)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
