//! Ordered multi-valued key/value pairs decoded from `application/x-www-form-urlencoded` text.
//!
//! Both the URL query string and url-encoded form bodies share this representation.

use tracing::debug;

/// Decoded `key=value` pairs, kept in the order they appeared on the wire.
///
/// A key may appear more than once; [`Values::get`] returns the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values {
    pairs: Vec<(String, String)>,
}

impl Values {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decodes url-encoded text such as `a=1&b=&c=x%20y`.
    ///
    /// Malformed input decodes to an empty set rather than an error.
    pub fn parse(input: &str) -> Self {
        if input.is_empty() {
            return Self::empty();
        }

        match serde_urlencoded::from_str::<Vec<(String, String)>>(input) {
            Ok(pairs) => Self { pairs },
            Err(e) => {
                debug!(cause = %e, input, "failed to decode url-encoded values");
                Self::empty()
            }
        }
    }

    /// Decodes url-encoded bytes, see [`Values::parse`].
    pub fn parse_bytes(input: &[u8]) -> Self {
        match std::str::from_utf8(input) {
            Ok(s) => Self::parse(s),
            Err(e) => {
                debug!(cause = %e, "url-encoded values are not utf8");
                Self::empty()
            }
        }
    }

    /// Returns the first value for `key`, `None` if the key is absent.
    ///
    /// A key supplied with no value (`?x=`) is present and yields `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Returns every value for `key` in wire order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Values {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { pairs: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::Values;

    #[test]
    fn test_parse_simple() {
        let values = Values::parse("a=1&b=2");
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("a"), Some("1"));
        assert_eq!(values.get("b"), Some("2"));
        assert_eq!(values.get("c"), None);
    }

    #[test]
    fn test_first_value_wins() {
        let values = Values::parse("a=1&a=2&a=3");
        assert_eq!(values.get("a"), Some("1"));
        assert_eq!(values.get_all("a").collect::<Vec<_>>(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_present_but_empty() {
        let values = Values::parse("x=&y");
        assert!(values.contains_key("x"));
        assert_eq!(values.get("x"), Some(""));
        assert_eq!(values.get("y"), Some(""));
    }

    #[test]
    fn test_percent_and_plus_decoding() {
        let values = Values::parse("name=hello+world&city=New%20York");
        assert_eq!(values.get("name"), Some("hello world"));
        assert_eq!(values.get("city"), Some("New York"));
    }

    #[test]
    fn test_empty_input() {
        assert!(Values::parse("").is_empty());
        assert!(Values::parse_bytes(b"").is_empty());
    }

    #[test]
    fn test_non_utf8_bytes() {
        assert!(Values::parse_bytes(&[0xff, 0xfe, b'=', b'1']).is_empty());
    }
}
