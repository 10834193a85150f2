//! Schema-less resource records addressed by field path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Result of looking up a string field by path.
///
/// Absence is kept apart from an empty value so callers decide whether a
/// missing field is acceptable. A non-string value at the path reads as
/// [`Field::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    Present(&'a str),
    PresentEmpty,
    Absent,
}

impl<'a> Field<'a> {
    /// Collapse to a string, treating absence as empty.
    pub fn or_empty(self) -> &'a str {
        match self {
            Field::Present(s) => s,
            Field::PresentEmpty | Field::Absent => "",
        }
    }

    pub fn as_option(self) -> Option<&'a str> {
        match self {
            Field::Present(s) => Some(s),
            Field::PresentEmpty => Some(""),
            Field::Absent => None,
        }
    }
}

/// One cluster resource as an untyped JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ResourceRecord(Json);

impl ResourceRecord {
    pub fn new(raw: Json) -> Self {
        Self(raw)
    }

    pub fn as_json(&self) -> &Json {
        &self.0
    }

    pub fn into_json(self) -> Json {
        self.0
    }

    /// Look up a string field, e.g. `field(&["spec", "network", "name"])`.
    pub fn field(&self, path: &[&str]) -> Field<'_> {
        let mut cur = &self.0;
        for seg in path {
            match cur.get(seg) {
                Some(v) => cur = v,
                None => return Field::Absent,
            }
        }
        match cur.as_str() {
            Some("") => Field::PresentEmpty,
            Some(s) => Field::Present(s),
            None => Field::Absent,
        }
    }

    /// Store-assigned `metadata.name`.
    pub fn name(&self) -> Field<'_> {
        self.field(&["metadata", "name"])
    }

    pub fn region(&self) -> Field<'_> {
        self.field(&["spec", "region"])
    }

    /// Set a string at `path`, creating intermediate objects and replacing
    /// any non-object found along the way.
    pub fn set(&mut self, path: &[&str], value: impl Into<String>) {
        let Some((last, parents)) = path.split_last() else { return };
        let mut cur = &mut self.0;
        for seg in parents {
            if !cur.is_object() {
                *cur = Json::Object(Map::new());
            }
            cur = &mut cur[*seg];
        }
        if !cur.is_object() {
            *cur = Json::Object(Map::new());
        }
        cur[*last] = Json::String(value.into());
    }

    /// `namespace/name` rendering for logs.
    pub fn key(&self) -> String {
        let name = self.name().or_empty();
        match self.field(&["metadata", "namespace"]).as_option() {
            Some(ns) if !ns.is_empty() => format!("{}/{}", ns, name),
            _ => name.to_string(),
        }
    }
}

impl From<Json> for ResourceRecord {
    fn from(v: Json) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_distinguishes_absent_from_empty() {
        let r = ResourceRecord::new(json!({
            "metadata": { "name": "c1", "generateName": "" },
            "spec": { "region": "x", "network": { "name": "net1" }, "project": 7 }
        }));
        assert_eq!(r.name(), Field::Present("c1"));
        assert_eq!(r.field(&["metadata", "generateName"]), Field::PresentEmpty);
        assert_eq!(r.field(&["spec", "network", "name"]), Field::Present("net1"));
        assert_eq!(r.field(&["spec", "missing"]), Field::Absent);
        assert_eq!(r.field(&["spec", "region", "deeper"]), Field::Absent);
        // wrong type
        assert_eq!(r.field(&["spec", "project"]), Field::Absent);
    }

    #[test]
    fn or_empty_collapses() {
        assert_eq!(Field::Absent.or_empty(), "");
        assert_eq!(Field::PresentEmpty.or_empty(), "");
        assert_eq!(Field::Present("a").or_empty(), "a");
        assert_eq!(Field::Absent.as_option(), None);
        assert_eq!(Field::PresentEmpty.as_option(), Some(""));
    }

    #[test]
    fn set_builds_nested_objects() {
        let mut r = ResourceRecord::default();
        r.set(&["spec", "network", "name"], "net1");
        r.set(&["spec", "region"], "y");
        r.set(&["kind"], "GCPCluster");
        assert_eq!(
            r.as_json(),
            &json!({ "kind": "GCPCluster", "spec": { "network": { "name": "net1" }, "region": "y" } })
        );
    }

    #[test]
    fn key_includes_namespace_when_present() {
        let r = ResourceRecord::new(json!({ "metadata": { "name": "a", "namespace": "default" } }));
        assert_eq!(r.key(), "default/a");
        let r = ResourceRecord::new(json!({ "metadata": { "name": "a" } }));
        assert_eq!(r.key(), "a");
    }
}
