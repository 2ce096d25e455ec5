/// Turn a title into a URL slug: lowercase ASCII alphanumerics joined by
/// single hyphens. ASCII punctuation and whitespace become separators;
/// non-ASCII characters are dropped without separating. Falls back to
/// `"project"` when nothing survives.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if c.is_ascii() && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "project".to_string()
    } else {
        slug
    }
}

/// Candidate slugs for disambiguation: the base, then `base-1`, `base-2`, …
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((1u32..).map(move |n| format!("{base}-{n}")))
}
