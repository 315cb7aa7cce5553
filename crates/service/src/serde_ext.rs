//! Serde helpers for partial-update payloads.

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "crate::serde_ext::nullable")]` on an
/// `Option<Option<T>>`: absent leaves the field untouched (`None`), `null` clears it
/// (`Some(None)`), and a value sets it (`Some(Some(v))`).
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::nullable")]
        owner: Option<Option<Uuid>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.owner, None);
        let cleared: Patch = serde_json::from_str(r#"{"owner":null}"#).unwrap();
        assert_eq!(cleared.owner, Some(None));
        let id = Uuid::new_v4();
        let set: Patch = serde_json::from_str(&format!(r#"{{"owner":"{id}"}}"#)).unwrap();
        assert_eq!(set.owner, Some(Some(id)));
        assert!(serde_json::from_str::<Patch>(r#"{"owner":"not-a-uuid"}"#).is_err());
    }
}
