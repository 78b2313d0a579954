//! Projection of flattened string pairs into typed values.
//!
//! Binding assembles discovered leaves into a [`Node`] tree and then walks
//! it with a hand-written [`serde::Deserializer`]. All leaf values are
//! strings, so scalar targets parse on the fly; a failed parse surfaces as
//! [`ConfigError::Conversion`] carrying the canonical key, the target type
//! name, and the offending value.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::value::StrDeserializer;
use serde::de::{self, IntoDeserializer, Visitor};

use crate::error::ConfigError;
use crate::key::combine;

/// One node of the assembled value tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    /// A scalar, or a key recorded without a value.
    Leaf(Option<String>),
    /// A section of named children.
    Tree(BTreeMap<String, Node>),
}

impl Node {
    pub(crate) fn tree() -> Self {
        Self::Tree(BTreeMap::new())
    }

    /// Inserts a leaf at the path given by `segments`.
    ///
    /// Descending through an existing scalar replaces it with a section;
    /// callers insert keys in sorted order, so a scalar sharing a path with
    /// deeper keys always arrives first and loses to them.
    pub(crate) fn insert(&mut self, segments: &[&str], value: Option<String>) {
        match segments.split_first() {
            None => *self = Self::Leaf(value),
            Some((first, rest)) => {
                if matches!(self, Self::Leaf(_)) {
                    *self = Self::tree();
                }
                if let Self::Tree(children) = self {
                    children
                        .entry((*first).to_owned())
                        .or_insert_with(Self::tree)
                        .insert(rest, value);
                }
            }
        }
    }
}

/// Deserializer positioned at one node, carrying its canonical key for
/// error context.
pub(crate) struct NodeDeserializer<'a> {
    node: &'a Node,
    key: String,
}

impl<'a> NodeDeserializer<'a> {
    pub(crate) fn new(node: &'a Node, key: String) -> Self {
        Self { node, key }
    }

    fn scalar(&self) -> Result<&'a str, ConfigError> {
        match self.node {
            Node::Leaf(Some(value)) => Ok(value),
            Node::Leaf(None) => Err(ConfigError::Bind(format!(
                "key '{}' has no value",
                self.key
            ))),
            Node::Tree(_) => Err(ConfigError::Bind(format!(
                "expected a value at '{}', found a section",
                self.key
            ))),
        }
    }

    fn children(&self) -> Result<&'a BTreeMap<String, Node>, ConfigError> {
        match self.node {
            Node::Tree(children) => Ok(children),
            Node::Leaf(_) => Err(ConfigError::Bind(format!(
                "expected a section at '{}'",
                self.key
            ))),
        }
    }

    fn parsed<T: FromStr>(&self, expected: &'static str) -> Result<T, ConfigError> {
        let raw = self.scalar()?;
        raw.parse().map_err(|_| ConfigError::Conversion {
            key: self.key.clone(),
            expected,
            value: raw.to_owned(),
        })
    }
}

macro_rules! deserialize_parsed {
    ($method:ident, $ty:ty, $visit:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            let value: $ty = self.parsed(stringify!($ty))?;
            visitor.$visit(value)
        }
    };
}

impl<'de> de::Deserializer<'de> for NodeDeserializer<'_> {
    type Error = ConfigError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Leaf(Some(value)) => visitor.visit_str(value),
            Node::Leaf(None) => visitor.visit_unit(),
            Node::Tree(_) => self.deserialize_map(visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let raw = self.scalar()?;
        if raw.eq_ignore_ascii_case("true") {
            visitor.visit_bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            visitor.visit_bool(false)
        } else {
            Err(ConfigError::Conversion {
                key: self.key,
                expected: "bool",
                value: raw.to_owned(),
            })
        }
    }

    deserialize_parsed!(deserialize_i8, i8, visit_i8);
    deserialize_parsed!(deserialize_i16, i16, visit_i16);
    deserialize_parsed!(deserialize_i32, i32, visit_i32);
    deserialize_parsed!(deserialize_i64, i64, visit_i64);
    deserialize_parsed!(deserialize_u8, u8, visit_u8);
    deserialize_parsed!(deserialize_u16, u16, visit_u16);
    deserialize_parsed!(deserialize_u32, u32, visit_u32);
    deserialize_parsed!(deserialize_u64, u64, visit_u64);
    deserialize_parsed!(deserialize_f32, f32, visit_f32);
    deserialize_parsed!(deserialize_f64, f64, visit_f64);

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let raw = self.scalar()?;
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(ConfigError::Conversion {
                key: self.key,
                expected: "char",
                value: raw.to_owned(),
            }),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_str(self.scalar()?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_bytes(self.scalar()?.as_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Leaf(None) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let children = self.children()?;
        let mut indexed = Vec::with_capacity(children.len());
        for (segment, child) in children {
            let index: usize = segment.parse().map_err(|_| {
                ConfigError::Bind(format!(
                    "sequence at '{}' has non-numeric index '{segment}'",
                    self.key
                ))
            })?;
            indexed.push((index, child));
        }
        indexed.sort_by_key(|(index, _)| *index);
        visitor.visit_seq(SeqNodes {
            items: indexed.into_iter(),
            parent: self.key,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let children = self.children()?;
        visitor.visit_map(MapNodes {
            iter: children.iter(),
            parent: self.key,
            pending: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let raw = self.scalar()?;
        visitor.visit_enum(raw.into_deserializer())
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct SeqNodes<'a> {
    items: std::vec::IntoIter<(usize, &'a Node)>,
    parent: String,
}

impl<'de> de::SeqAccess<'de> for SeqNodes<'_> {
    type Error = ConfigError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.items.next() {
            None => Ok(None),
            Some((index, node)) => {
                let key = combine(&self.parent, &index.to_string());
                seed.deserialize(NodeDeserializer::new(node, key)).map(Some)
            }
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct MapNodes<'a> {
    iter: std::collections::btree_map::Iter<'a, String, Node>,
    parent: String,
    pending: Option<(&'a String, &'a Node)>,
}

impl<'de> de::MapAccess<'de> for MapNodes<'_> {
    type Error = ConfigError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            None => Ok(None),
            Some((segment, node)) => {
                self.pending = Some((segment, node));
                let key: StrDeserializer<'_, ConfigError> = segment.as_str().into_deserializer();
                seed.deserialize(key).map(Some)
            }
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some((segment, node)) => {
                let key = combine(&self.parent, segment);
                seed.deserialize(NodeDeserializer::new(node, key))
            }
            None => Err(ConfigError::Bind(
                "map value requested before its key".to_owned(),
            )),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
