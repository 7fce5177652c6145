use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single field of a partial update.
///
/// JSON has three states for an optional key and updates must keep them apart:
/// a missing key leaves the stored value alone, `null` clears it, and a value
/// replaces it. Declare fields as `#[serde(default)] field: Patch<T>` so a
/// missing key deserializes to [`Patch::Absent`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// `None` when absent, `Some(None)` for explicit null.
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    /// The value when one was given; explicit null and absence both collapse to `None`.
    pub fn into_value(self) -> Option<T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Write the patch into a nullable slot, leaving it untouched when absent.
    pub fn apply_to(self, slot: &mut Option<T>) {
        if let Some(next) = self.into_update() {
            *slot = next;
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(default)]
        summary: Patch<String>,
    }

    #[test]
    fn missing_null_and_value_are_distinct() {
        let missing: Update = serde_json::from_value(json!({})).unwrap();
        let null: Update = serde_json::from_value(json!({ "summary": null })).unwrap();
        let value: Update = serde_json::from_value(json!({ "summary": "short" })).unwrap();

        assert_eq!(missing.summary, Patch::Absent);
        assert_eq!(null.summary, Patch::Null);
        assert_eq!(value.summary, Patch::Value("short".to_string()));
    }

    #[test]
    fn apply_to_respects_absence() {
        let mut slot = Some("kept".to_string());
        Patch::<String>::Absent.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("kept"));

        Patch::<String>::Null.apply_to(&mut slot);
        assert_eq!(slot, None);

        Patch::Value("new".to_string()).apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));
    }
}
