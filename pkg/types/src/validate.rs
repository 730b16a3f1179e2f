use anyhow::{Result, bail};

/// Longest name a DNS-1123 label may carry.
pub const DNS1123_LABEL_MAX_LEN: usize = 63;

/// Check `value` against the DNS-1123 label rules, naming it `what` in errors.
/// Lowercase `[a-z0-9-]`, at most 63 chars, alphanumeric at both ends.
pub fn validate_dns1123_label(what: &str, value: &str) -> Result<()> {
    let Some(first) = value.chars().next() else {
        bail!("{} must not be empty", what);
    };
    if value.len() > DNS1123_LABEL_MAX_LEN {
        bail!(
            "{} '{}' is {} characters, at most {} allowed",
            what,
            value,
            value.len(),
            DNS1123_LABEL_MAX_LEN
        );
    }
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if let Some(bad) = value.chars().find(|&c| !alnum(c) && c != '-') {
        bail!("{} '{}' contains '{}', only [a-z0-9-] allowed", what, value, bad);
    }
    if !alnum(first) || !value.ends_with(alnum) {
        bail!("{} '{}' must begin and end with a letter or digit", what, value);
    }
    Ok(())
}

/// Namespaces are DNS-1123 labels.
pub fn validate_namespace_name(name: &str) -> Result<()> {
    validate_dns1123_label("namespace", name)
}
