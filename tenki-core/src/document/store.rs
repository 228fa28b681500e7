//! Filtered parsing under a fixed capacity ceiling
//!
//! The filter is walked while the input is deserialized, so content the
//! filter drops is skipped without ever being materialized. Retained
//! content is charged against the capacity by its compact serialized size.

use std::cell::Cell;
use std::fmt;
use std::io::{BufReader, Read};

use log::debug;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use super::filter::FilterSpec;
use super::path::{self, FieldValue, MissingField};

/// Read chunk size used for streams of unknown length
pub const CHUNK_SIZE: usize = 512;

/// Errors from a bounded parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Syntax error, truncated input or trailing garbage
    #[error("malformed document: {0}")]
    Malformed(String),
    /// Retained content would not fit
    #[error("filtered document exceeds capacity of {capacity} bytes")]
    CapacityExceeded { capacity: usize },
}

/// A parsed, filtered document
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedDocument {
    root: Value,
    used: usize,
    capacity: usize,
}

impl BoundedDocument {
    /// Root value (`null` when the filter dropped the root)
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Bytes of capacity consumed by retained content
    pub fn used(&self) -> usize {
        self.used
    }

    /// Capacity ceiling the document was parsed under
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if nothing survived the filter
    pub fn is_null(&self) -> bool {
        self.root.is_null()
    }

    /// Walk a schema path such as `[0].timeSeries[0].areas[0].area.name`
    pub fn extract(&self, path: &str) -> Result<FieldValue<'_>, MissingField> {
        path::extract(&self.root, path)
    }

    /// Take the root value
    pub fn into_value(self) -> Value {
        self.root
    }
}

/// Parser holding the capacity ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedDocumentStore {
    capacity: usize,
}

impl BoundedDocumentStore {
    /// Create a store with a fixed capacity in bytes
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Capacity ceiling in bytes
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Parse a stream of unknown length
    ///
    /// The stream is read in [`CHUNK_SIZE`] chunks.
    pub fn parse<R: Read>(&self, reader: R, filter: &FilterSpec) -> Result<BoundedDocument, ParseError> {
        let reader = BufReader::with_capacity(CHUNK_SIZE, reader);
        let mut de = serde_json::Deserializer::from_reader(reader);
        self.parse_with(&mut de, filter)
    }

    /// Parse a buffer of known length
    pub fn parse_slice(&self, bytes: &[u8], filter: &FilterSpec) -> Result<BoundedDocument, ParseError> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        self.parse_with(&mut de, filter)
    }

    fn parse_with<'de, R>(
        &self,
        de: &mut serde_json::Deserializer<R>,
        filter: &FilterSpec,
    ) -> Result<BoundedDocument, ParseError>
    where
        R: serde_json::de::Read<'de>,
    {
        let budget = Budget::new(self.capacity);
        let seed = FilteredSeed {
            filter,
            budget: &budget,
        };

        let parsed = seed
            .deserialize(&mut *de)
            .and_then(|root| de.end().map(|()| root))
            .and_then(|root| match root {
                Some(value) => Ok(value),
                None => budget.charge::<serde_json::Error>(NULL_LEN).map(|()| Value::Null),
            });

        match parsed {
            Ok(root) => {
                debug!("parsed document: {} of {} bytes", budget.used(), self.capacity);
                Ok(BoundedDocument {
                    root,
                    used: budget.used(),
                    capacity: self.capacity,
                })
            }
            Err(_) if budget.exceeded() => Err(ParseError::CapacityExceeded {
                capacity: self.capacity,
            }),
            Err(e) => Err(ParseError::Malformed(e.to_string())),
        }
    }
}

const NULL_LEN: usize = 4;

/// Running total of retained bytes
struct Budget {
    capacity: usize,
    used: Cell<usize>,
    exceeded: Cell<bool>,
}

impl Budget {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: Cell::new(0),
            exceeded: Cell::new(false),
        }
    }

    fn used(&self) -> usize {
        self.used.get()
    }

    fn exceeded(&self) -> bool {
        self.exceeded.get()
    }

    fn charge<E: de::Error>(&self, bytes: usize) -> Result<(), E> {
        let next = self.used.get().saturating_add(bytes);
        if next > self.capacity {
            self.exceeded.set(true);
            return Err(E::custom(format_args!(
                "retained content exceeds {} bytes",
                self.capacity
            )));
        }
        self.used.set(next);
        Ok(())
    }
}

/// Compact serialized length of a string, quotes included
fn string_len(s: &str) -> usize {
    2 + s
        .chars()
        .map(|c| match c {
            '"' | '\\' | '\u{08}' | '\u{0c}' | '\n' | '\r' | '\t' => 2,
            c if (c as u32) < 0x20 => 6,
            c => c.len_utf8(),
        })
        .sum::<usize>()
}

fn number_len(n: &Number) -> usize {
    n.to_string().len()
}

/// Seed deserializing one value under one filter node
///
/// Yields `None` when the filter drops the value.
struct FilteredSeed<'f, 'b> {
    filter: &'f FilterSpec,
    budget: &'b Budget,
}

impl<'f, 'b> FilteredSeed<'f, 'b> {
    fn child(&self, filter: &'f FilterSpec) -> Self {
        Self {
            filter,
            budget: self.budget,
        }
    }

    fn scalar<E: de::Error>(self, value: Value, len: usize) -> Result<Option<Value>, E> {
        if !self.filter.keeps_scalars() {
            return Ok(None);
        }
        self.budget.charge(len)?;
        Ok(Some(value))
    }

    fn number<E: de::Error>(self, n: Number) -> Result<Option<Value>, E> {
        let len = number_len(&n);
        self.scalar(Value::Number(n), len)
    }

    fn collect_object<'de, A>(&self, filter: &'f FilterSpec, map: &mut A) -> Result<Option<Value>, A::Error>
    where
        A: MapAccess<'de>,
    {
        if !matches!(filter, FilterSpec::Keep | FilterSpec::Object(_)) {
            drain_map(map)?;
            return Ok(None);
        }

        self.budget.charge(2)?;
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            let field = filter.field(&key);
            if field.is_drop() {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            // Keys are charged once their value is known to survive
            if let Some(value) = map.next_value_seed(self.child(field))? {
                let separator = usize::from(!object.is_empty());
                self.budget.charge(string_len(&key) + 1 + separator)?;
                object.insert(key, value);
            }
        }
        Ok(Some(Value::Object(object)))
    }
}

fn drain_map<'de, A: MapAccess<'de>>(map: &mut A) -> Result<(), A::Error> {
    while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
    Ok(())
}

fn drain_seq<'de, A: SeqAccess<'de>>(seq: &mut A) -> Result<(), A::Error> {
    while seq.next_element::<IgnoredAny>()?.is_some() {}
    Ok(())
}

impl<'de> DeserializeSeed<'de> for FilteredSeed<'_, '_> {
    type Value = Option<Value>;

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        if self.filter.is_drop() {
            IgnoredAny::deserialize(deserializer)?;
            return Ok(None);
        }
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for FilteredSeed<'_, '_> {
    type Value = Option<Value>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        let len = if v { 4 } else { 5 };
        self.scalar(Value::Bool(v), len)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.number(Number::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.number(Number::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        match Number::from_f64(v) {
            Some(n) => self.number(n),
            None => self.scalar(Value::Null, NULL_LEN),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if !self.filter.keeps_scalars() {
            return Ok(None);
        }
        self.budget.charge(string_len(v))?;
        Ok(Some(Value::String(v.to_owned())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        if !self.filter.keeps_scalars() {
            return Ok(None);
        }
        self.budget.charge(string_len(&v))?;
        Ok(Some(Value::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        self.scalar(Value::Null, NULL_LEN)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        self.scalar(Value::Null, NULL_LEN)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        if !matches!(self.filter, FilterSpec::Keep | FilterSpec::Array(_)) {
            drain_seq(&mut seq)?;
            return Ok(None);
        }

        self.budget.charge(2)?;
        let element = self.filter.element();
        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(self.child(element))? {
            if let Some(value) = item {
                if !items.is_empty() {
                    self.budget.charge(1)?;
                }
                items.push(value);
            }
        }
        Ok(Some(Value::Array(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        match self.filter {
            FilterSpec::Keep | FilterSpec::Object(_) => self.collect_object(self.filter, &mut map),
            // A bare report where a list of reports was expected
            FilterSpec::Array(inner) => {
                self.budget.charge(2)?;
                Ok(self
                    .collect_object(inner, &mut map)?
                    .map(|object| Value::Array(vec![object])))
            }
            FilterSpec::Drop => {
                drain_map(&mut map)?;
                Ok(None)
            }
        }
    }
}
