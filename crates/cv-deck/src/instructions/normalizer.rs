pub(crate) fn normalize_key(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Directive spellings collapse onto one form: `Bullet List`, `bullet_list`
/// and `bullet-list` all become `bullet-list`.
pub(crate) fn normalize_directive(value: &str) -> String {
    normalize_key(value).replace([' ', '_'], "-")
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_key(value)
}
