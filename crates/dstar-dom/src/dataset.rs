//! `data-*` attribute name to dataset key conversion.

const DATA_PREFIX: &str = "data-";

/// Convert a `data-*` attribute name to its dataset key.
///
/// Strips the `data-` prefix and turns every `-` followed by an ASCII
/// lowercase letter into the upper-cased letter. Any other character,
/// including a `-` not followed by a lowercase letter, is kept verbatim.
///
/// Returns `None` for attributes outside the `data-` namespace and for names
/// with an ASCII upper-case letter after `data-`, which never appear in an
/// HTML element's dataset.
///
/// # Example
///
/// ```
/// use dstar_dom::dataset_key;
///
/// assert_eq!(dataset_key("data-on-click.once").as_deref(), Some("onClick.once"));
/// assert_eq!(dataset_key("class"), None);
/// ```
#[must_use]
pub fn dataset_key(attr_name: &str) -> Option<String> {
    let rest = attr_name.strip_prefix(DATA_PREFIX)?;
    if rest.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }

    let mut key = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-'
            && let Some(&next) = chars.peek()
            && next.is_ascii_lowercase()
        {
            key.push(next.to_ascii_uppercase());
            chars.next();
        } else {
            key.push(c);
        }
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_key() {
        assert_eq!(dataset_key("data-foo").as_deref(), Some("foo"));
    }

    #[test]
    fn test_camelizes_dashes() {
        assert_eq!(dataset_key("data-foo-bar-baz").as_deref(), Some("fooBarBaz"));
    }

    #[test]
    fn test_keeps_dash_before_non_lowercase() {
        assert_eq!(dataset_key("data-foo-1").as_deref(), Some("foo-1"));
        assert_eq!(dataset_key("data-foo-").as_deref(), Some("foo-"));
    }

    #[test]
    fn test_keeps_modifier_segments() {
        assert_eq!(
            dataset_key("data-on-key-down.key:enter:space").as_deref(),
            Some("onKeyDown.key:enter:space")
        );
    }

    #[test]
    fn test_upper_case_names_have_no_key() {
        assert_eq!(dataset_key("data-fooBar"), None);
        assert_eq!(dataset_key("data-Foo-a"), None);
        assert_eq!(dataset_key("data-on-click.Once"), None);
    }

    #[test]
    fn test_non_data_attribute() {
        assert_eq!(dataset_key("id"), None);
        assert_eq!(dataset_key("database"), None);
    }
}
