// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Logic handling the intermediate representation of Avro values.

use crate::schema::{EnumSchema, FixedSchema, Schema};
use serde_bytes::{ByteBuf, Bytes};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};
use strum_macros::{Display, EnumDiscriminants};

/// Represents any valid Avro value.
///
/// Complex values carry the schema they were built for, so a value can always
/// report its own [`schema`](AvroValue::schema) and be encoded without one.
/// Values built through [`ToAvro`] are provisional: their collections carry
/// [`Schema::Unknown`] until they are [normalized](crate::normalize).
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(Display, Hash, Ord, PartialOrd))]
pub enum AvroValue {
    /// A `null` Avro value.
    Null,
    /// A `boolean` Avro value.
    Boolean(bool),
    /// A `int` Avro value.
    Int(i32),
    /// A `long` Avro value.
    Long(i64),
    /// A `float` Avro value.
    Float(f32),
    /// A `double` Avro value.
    Double(f64),
    /// A `bytes` Avro value.
    Bytes(Vec<u8>),
    /// A `string` Avro value.
    String(String),
    /// An `array` Avro value and the schema of its items.
    Array(Schema, Vec<AvroValue>),
    /// A `map` Avro value and the schema of its values.
    Map(Schema, HashMap<String, AvroValue>),
    /// A `union` Avro value.
    ///
    /// Holds the options of the union, the index of the chosen option and the
    /// value itself.
    Union(Vec<Schema>, usize, Box<AvroValue>),
    /// A `record` Avro value.
    ///
    /// Fields are kept in the order of the record schema.
    Record(Schema, Vec<(String, AvroValue)>),
    /// An `enum` Avro value.
    ///
    /// Holds the enum schema, the index of the symbol and the symbol itself.
    Enum(Schema, usize, String),
    /// A `fixed` Avro value.
    Fixed(Schema, Vec<u8>),
}

impl AvroValue {
    /// The schema this value conforms to.
    pub fn schema(&self) -> Schema {
        match self {
            AvroValue::Null => Schema::Null,
            AvroValue::Boolean(_) => Schema::Boolean,
            AvroValue::Int(_) => Schema::Int,
            AvroValue::Long(_) => Schema::Long,
            AvroValue::Float(_) => Schema::Float,
            AvroValue::Double(_) => Schema::Double,
            AvroValue::Bytes(_) => Schema::Bytes,
            AvroValue::String(_) => Schema::String,
            AvroValue::Array(items, _) => Schema::array(items.clone()),
            AvroValue::Map(types, _) => Schema::map(types.clone()),
            AvroValue::Union(options, _, _) => Schema::union(options.clone()),
            AvroValue::Record(schema, _)
            | AvroValue::Enum(schema, _, _)
            | AvroValue::Fixed(schema, _) => schema.clone(),
        }
    }

    /// The name the schema of this value is known by inside a union.
    ///
    /// Same as `self.schema().type_name()` without building the schema.
    pub(crate) fn type_name(&self) -> &str {
        match self {
            AvroValue::Null => "null",
            AvroValue::Boolean(_) => "boolean",
            AvroValue::Int(_) => "int",
            AvroValue::Long(_) => "long",
            AvroValue::Float(_) => "float",
            AvroValue::Double(_) => "double",
            AvroValue::Bytes(_) => "bytes",
            AvroValue::String(_) => "string",
            AvroValue::Array(..) => "array",
            AvroValue::Map(..) => "map",
            AvroValue::Union(..) => "union",
            AvroValue::Record(schema, _)
            | AvroValue::Enum(schema, _, _)
            | AvroValue::Fixed(schema, _) => schema.type_name(),
        }
    }

    /// Returns the value as an `int` if it can be normalized to one.
    pub fn as_int(&self) -> Option<i32> {
        match crate::normalize(self, &Schema::Int) {
            Ok(AvroValue::Int(i)) => Some(i),
            _ => None,
        }
    }

    /// Returns the value as a `long` if it can be normalized to one.
    pub fn as_long(&self) -> Option<i64> {
        match crate::normalize(self, &Schema::Long) {
            Ok(AvroValue::Long(i)) => Some(i),
            _ => None,
        }
    }

    /// Returns the value as a `float` if it can be normalized to one.
    pub fn as_float(&self) -> Option<f32> {
        match crate::normalize(self, &Schema::Float) {
            Ok(AvroValue::Float(x)) => Some(x),
            _ => None,
        }
    }

    /// Returns the value as a `double` if it can be normalized to one.
    pub fn as_double(&self) -> Option<f64> {
        match crate::normalize(self, &Schema::Double) {
            Ok(AvroValue::Double(x)) => Some(x),
            _ => None,
        }
    }

    /// Returns the value as a `boolean` if it can be normalized to one.
    pub fn as_boolean(&self) -> Option<bool> {
        match crate::normalize(self, &Schema::Boolean) {
            Ok(AvroValue::Boolean(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a `string` if it can be normalized to one.
    ///
    /// Enum symbols and UTF-8 bytes qualify.
    pub fn as_string(&self) -> Option<String> {
        match crate::normalize(self, &Schema::String) {
            Ok(AvroValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `bytes` if it can be normalized to them.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match crate::normalize(self, &Schema::Bytes) {
            Ok(AvroValue::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    /// The entries of a map or the fields of a record, looking through unions.
    pub fn as_map(&self) -> Option<HashMap<&str, &AvroValue>> {
        match self {
            AvroValue::Map(_, entries) => Some(
                entries
                    .iter()
                    .map(|(key, value)| (key.as_str(), value))
                    .collect(),
            ),
            AvroValue::Record(_, fields) => Some(
                fields
                    .iter()
                    .map(|(name, value)| (name.as_str(), value))
                    .collect(),
            ),
            AvroValue::Union(_, _, inner) => inner.as_map(),
            _ => None,
        }
    }

    /// The items of an array, looking through unions.
    pub fn as_array(&self) -> Option<&[AvroValue]> {
        match self {
            AvroValue::Array(_, items) => Some(items),
            AvroValue::Union(_, _, inner) => inner.as_array(),
            _ => None,
        }
    }

    /// The value of the record field `name`, if this is a record.
    pub fn field(&self, name: &str) -> Option<&AvroValue> {
        match self {
            AvroValue::Record(_, fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

fn write_separated<T>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    mut write: impl FnMut(&mut fmt::Formatter<'_>, T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write(f, item)?;
    }
    Ok(())
}

impl fmt::Display for AvroValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvroValue::Null => f.write_str("null"),
            AvroValue::Boolean(b) => write!(f, "{b}"),
            AvroValue::Int(i) => write!(f, "{i}"),
            AvroValue::Long(i) => write!(f, "{i}L"),
            AvroValue::Float(x) => write!(f, "{x:?}f"),
            AvroValue::Double(x) => write!(f, "{x:?}d"),
            AvroValue::Bytes(bytes) => write!(f, "{bytes:?}"),
            AvroValue::String(s) => write!(f, "\"{s}\""),
            AvroValue::Array(_, items) => {
                f.write_str("[")?;
                write_separated(f, items, |f, item| write!(f, "{item}"))?;
                f.write_str("]")
            }
            AvroValue::Map(_, entries) => {
                let sorted: BTreeMap<_, _> = entries.iter().collect();
                f.write_str("{")?;
                write_separated(f, sorted, |f, (key, value)| write!(f, "{key}: {value}"))?;
                f.write_str("}")
            }
            AvroValue::Union(options, index, inner) => {
                f.write_str("union([")?;
                write_separated(f, options, |f, option| f.write_str(option.type_name()))?;
                write!(f, "][{index}]: {inner})")
            }
            AvroValue::Record(schema, fields) => {
                write!(f, "record<{}>({{", schema.type_name())?;
                write_separated(f, fields, |f, (name, value)| write!(f, "{name}: {value}"))?;
                f.write_str("})")
            }
            AvroValue::Enum(Schema::Enum(EnumSchema { name, symbols, .. }), index, symbol) => {
                write!(f, "enum<{name}>([{}][{index}]: {symbol})", symbols.join(", "))
            }
            AvroValue::Fixed(Schema::Fixed(FixedSchema { name, .. }), bytes) => {
                write!(f, "fixed<{name}>({bytes:?})")
            }
            AvroValue::Enum(schema, index, symbol) => {
                write!(f, "enum<{}>([{index}]: {symbol})", schema.type_name())
            }
            AvroValue::Fixed(schema, bytes) => {
                write!(f, "fixed<{}>({bytes:?})", schema.type_name())
            }
        }
    }
}

/// Anything that can produce a provisional [`AvroValue`].
///
/// Implementations only wrap the data. All schema-aware conversion happens in
/// [`normalize`](crate::normalize).
pub trait ToAvro {
    fn to_avro(&self) -> AvroValue;
}

macro_rules! to_avro {
    ($type:ty, $variant_constructor:expr) => {
        impl From<$type> for AvroValue {
            fn from(value: $type) -> Self {
                $variant_constructor(value)
            }
        }

        impl ToAvro for $type {
            fn to_avro(&self) -> AvroValue {
                AvroValue::from(self.clone())
            }
        }
    };
}

to_avro!(bool, AvroValue::Boolean);
to_avro!(i32, AvroValue::Int);
to_avro!(i64, AvroValue::Long);
to_avro!(f32, AvroValue::Float);
to_avro!(f64, AvroValue::Double);
to_avro!(String, AvroValue::String);
to_avro!(ByteBuf, |bytes: ByteBuf| AvroValue::Bytes(bytes.into_vec()));
to_avro!((), |_| AvroValue::Null);
to_avro!(isize, |i: isize| AvroValue::Long(i as i64));

impl From<&str> for AvroValue {
    fn from(value: &str) -> Self {
        AvroValue::String(value.to_owned())
    }
}

impl ToAvro for str {
    fn to_avro(&self) -> AvroValue {
        AvroValue::from(self)
    }
}

impl ToAvro for Bytes {
    fn to_avro(&self) -> AvroValue {
        AvroValue::Bytes(self.to_vec())
    }
}

impl ToAvro for AvroValue {
    fn to_avro(&self) -> AvroValue {
        self.clone()
    }
}

impl<T: ToAvro + ?Sized> ToAvro for &T {
    fn to_avro(&self) -> AvroValue {
        (**self).to_avro()
    }
}

impl<T: ToAvro + ?Sized> ToAvro for Box<T> {
    fn to_avro(&self) -> AvroValue {
        (**self).to_avro()
    }
}

impl<T: ToAvro> ToAvro for Option<T> {
    fn to_avro(&self) -> AvroValue {
        match self {
            Some(value) => value.to_avro(),
            None => AvroValue::Null,
        }
    }
}

impl<T: ToAvro> ToAvro for Vec<T> {
    fn to_avro(&self) -> AvroValue {
        AvroValue::Array(Schema::Unknown, self.iter().map(ToAvro::to_avro).collect())
    }
}

impl<T: ToAvro, S: std::hash::BuildHasher> ToAvro for HashMap<String, T, S> {
    fn to_avro(&self) -> AvroValue {
        AvroValue::Map(
            Schema::Unknown,
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_avro()))
                .collect(),
        )
    }
}

impl<T: ToAvro> ToAvro for BTreeMap<String, T> {
    fn to_avro(&self) -> AvroValue {
        AvroValue::Map(
            Schema::Unknown,
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_avro()))
                .collect(),
        )
    }
}

impl ToAvro for serde_json::Value {
    /// Integers that fit in an `i64` become `long`, other numbers `double`.
    fn to_avro(&self) -> AvroValue {
        use serde_json::Value;
        match self {
            Value::Null => AvroValue::Null,
            Value::Bool(b) => AvroValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AvroValue::Long(i),
                None => AvroValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => AvroValue::String(s.clone()),
            Value::Array(items) => {
                AvroValue::Array(Schema::Unknown, items.iter().map(ToAvro::to_avro).collect())
            }
            Value::Object(entries) => AvroValue::Map(
                Schema::Unknown,
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_avro()))
                    .collect(),
            ),
        }
    }
}
