//! Opaque structured fields and their canonical form
//!
//! Sensors, sinks and variables are free-form JSON documents. The declared
//! and observed state keep them in their encoded form ([`RawDocument`]);
//! comparison happens on the decoded [`Document`] tree.
//!
//! Every number decodes to a single `f64` kind, so `1`, `1.0` and `1e0`
//! compare equal. The service is free to re-render numeric literals, and a
//! round trip through it must not look like drift.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Largest integer an `f64` holds exactly (2^53)
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Decoded, comparison-ready form of a structured field
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<Document>),
    /// Keys are unique and kept sorted, so key order never affects equality
    Mapping(BTreeMap<String, Document>),
}

impl Document {
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key when this is a mapping
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "a boolean",
            Document::Number(_) => "a number",
            Document::String(_) => "a string",
            Document::Sequence(_) => "an array",
            Document::Mapping(_) => "an object",
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(n) => {
                if !n.is_finite() {
                    return Err(ser::Error::custom(format!("non-finite number {n}")));
                }
                // Integral values go out as integers, the way they were most likely written
                if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Document::String(s) => serializer.serialize_str(s),
            Document::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Document::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Document, D::Error> {
        Document::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Document, E> {
        Ok(Document::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Document, E> {
        Ok(Document::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Document, E> {
        Ok(Document::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Document, E> {
        Ok(Document::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Document, E> {
        Ok(Document::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Document, E> {
        Ok(Document::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Document, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Document::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Document, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, Document>()? {
            entries.insert(key, value);
        }
        Ok(Document::Mapping(entries))
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

/// A structured field in its encoded (JSON text) form
///
/// An absent document is distinct from an empty one: `RawDocument::absent()`
/// decodes to `None`, `RawDocument::new("{}")` decodes to an empty mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDocument(Option<String>);

impl RawDocument {
    /// A field with no content
    pub fn absent() -> Self {
        Self(None)
    }

    /// Wrap encoded JSON text. Blank text counts as absent.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(raw))
        }
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl Serialize for RawDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.0 {
            None => serializer.serialize_none(),
            Some(raw) => {
                let raw = RawValue::from_string(raw.clone()).map_err(ser::Error::custom)?;
                raw.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for RawDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<Box<RawValue>>::deserialize(deserializer)?;
        Ok(Self(raw.map(|raw| raw.get().to_string())))
    }
}

/// Decode a structured field. No content yields `Ok(None)`.
pub fn decode(raw: &RawDocument, field: &str) -> Result<Option<Document>> {
    match raw.as_str() {
        None => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| Error::decode(field, e)),
    }
}

/// Decode a structured field that must be a JSON object when present
pub fn decode_object(raw: &RawDocument, field: &str) -> Result<Option<Document>> {
    match decode(raw, field)? {
        Some(doc @ Document::Mapping(_)) => Ok(Some(doc)),
        Some(other) => Err(Error::decode(
            field,
            format!("expected an object, found {}", other.kind()),
        )),
        None => Ok(None),
    }
}

/// Decode an ordered sequence of object documents, keeping the order
pub fn decode_objects(raws: &[RawDocument], field: &str) -> Result<Vec<Document>> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            let element = format!("{field}[{index}]");
            decode_object(raw, &element)?.ok_or_else(|| Error::decode(&element, "document is empty"))
        })
        .collect()
}

/// Encode a canonical document back to its opaque form
pub fn encode(doc: &Document, field: &str) -> Result<RawDocument> {
    serde_json::to_string(doc)
        .map(RawDocument::new)
        .map_err(|e| Error::encode(field, e))
}

/// Encode an optional document; `None` stays absent
pub fn encode_optional(doc: Option<&Document>, field: &str) -> Result<RawDocument> {
    doc.map_or_else(|| Ok(RawDocument::absent()), |doc| encode(doc, field))
}

/// Encode an ordered sequence of documents
pub fn encode_all(docs: &[Document], field: &str) -> Result<Vec<RawDocument>> {
    docs.iter()
        .enumerate()
        .map(|(index, doc)| encode(doc, &format!("{field}[{index}]")))
        .collect()
}
