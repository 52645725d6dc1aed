use crate::{Error, Item, Result};
use serde_json::Value;

///
/// Cursor
///
/// Continuation token for a paginated query. Wraps the store's last
/// evaluated key; callers pass it back unchanged and must not inspect it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cursor(Item);

impl Cursor {
    pub(crate) fn from_key(key: Item) -> Option<Self> {
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    pub(crate) fn key(&self) -> &Item {
        &self.0
    }

    /// Key attribute carried by the cursor.
    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn encode(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn decode(token: &str) -> Result<Self> {
        let Ok(Value::Object(key)) = serde_json::from_str::<Value>(token) else {
            return Err(Error::InvalidCursor);
        };
        if !key.values().all(Value::is_string) {
            return Err(Error::InvalidCursor);
        }

        Self::from_key(key).ok_or(Error::InvalidCursor)
    }
}

///
/// Page
///

#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the last page has been returned.
    pub cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn try_map<U, F>(self, f: F) -> Result<Page<U>>
    where
        F: FnMut(T) -> Result<U>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_>>()?,
            cursor: self.cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> Item {
        let Value::Object(map) = json!({ "pk": "EV#1", "sk": "abc" }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn token_survives_round_trip() {
        let cursor = Cursor::from_key(key()).unwrap();
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
        assert_eq!(decoded.attribute("sk"), Some("abc"));
    }

    #[test]
    fn empty_key_is_end_of_results() {
        assert!(Cursor::from_key(Item::new()).is_none());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for token in ["", "nope", "[]", "{}", r#"{"pk": 3}"#] {
            assert!(
                matches!(Cursor::decode(token), Err(Error::InvalidCursor)),
                "{token}"
            );
        }
    }
}
