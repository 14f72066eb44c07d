//! A single key and the value fetched for it

use std::borrow::Cow;

/// One enumerated key and the value its GET returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueEntry {
    /// Key name, decoded as UTF-8
    pub key: String,
    /// Raw value, `None` if the key was gone by the time it was read
    pub value: Option<Vec<u8>>,
}

impl KeyValueEntry {
    /// Create an entry with a present value
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Create an entry for a key that vanished before its GET
    pub fn missing(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Check if the value was absent at fetch time
    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    /// Value as cell text. Missing values render empty; invalid UTF-8 is replaced.
    pub fn value_text(&self) -> Cow<'_, str> {
        match self.value {
            Some(ref bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_text() {
        assert_eq!(KeyValueEntry::new("a", "1").value_text(), "1");
        assert_eq!(KeyValueEntry::missing("a").value_text(), "");
        assert_eq!(
            KeyValueEntry::new("a", vec![b'o', 0xff, b'k']).value_text(),
            "o\u{fffd}k"
        );
    }

    #[test]
    fn test_missing() {
        assert!(KeyValueEntry::missing("gone").is_missing());
        assert!(!KeyValueEntry::new("here", "").is_missing());
    }
}
