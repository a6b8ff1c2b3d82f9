use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One CSV row as an ordered field name -> value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.insert(name, value);
        }
        record
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replaces an existing value in place, or appends a new field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Records in input order. A record's index is its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    #[serde(skip)]
    pub schema: Vec<String>,
    #[serde(rename = "rows")]
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(schema: Vec<String>, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.schema.iter().any(|field| field == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::from_pairs([("id", "1"), ("title", "Hello"), ("desc", "")]);
        record.insert("title", "Halo");
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["id", "title", "desc"]);
        assert_eq!(record.get("title"), Some("Halo"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_serializes_in_field_order() {
        let set = RecordSet::new(
            vec!["zeta".into(), "alpha".into()],
            vec![Record::from_pairs([("zeta", "z"), ("alpha", "ä")])],
        );
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"rows":[{"zeta":"z","alpha":"ä"}]}"#);
    }
}
