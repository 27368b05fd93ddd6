//! Header name rendering.

/// Canonical MIME form of a header name: the first letter and every letter
/// following a hyphen upper-cased, the rest lower-cased.
///
/// Names containing a byte that is not an HTTP token character (space
/// included) are returned unchanged.
pub fn canonical_header_key(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalises_names() {
        assert_eq!(canonical_header_key("x-trace"), "X-Trace");
        assert_eq!(canonical_header_key("CONTENT-TYPE"), "Content-Type");
        assert_eq!(canonical_header_key("etag"), "Etag");
        assert_eq!(canonical_header_key("x--double"), "X--Double");
    }

    #[test]
    fn token_punctuation_only_splits_on_hyphen() {
        assert_eq!(canonical_header_key("x_trace"), "X_trace");
        assert_eq!(canonical_header_key("X_TRACE-id"), "X_trace-Id");
        assert_eq!(canonical_header_key("x.trace"), "X.trace");
    }

    #[test]
    fn leaves_non_token_names_alone() {
        assert_eq!(canonical_header_key("x trace"), "x trace");
        assert_eq!(canonical_header_key("x:trace"), "x:trace");
        assert_eq!(canonical_header_key("x-tr\u{e9}ce"), "x-tr\u{e9}ce");
    }
}
