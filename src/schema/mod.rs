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

//! Logic for parsing and interacting with schemas in Avro format.

mod formatter;
mod name;
mod parser;
mod path;
mod record;
mod resolve;
mod union;
mod validate;

pub use crate::schema::{
    formatter::Formatter,
    name::{Name, Names, NamesRef, Namespace, NamespaceRef},
    parser::Parser,
    path::SchemaPath,
    record::{RecordField, RecordFieldBuilder, RecordSchema, RecordSchemaBuilder},
    resolve::ResolvedSchema,
    union::UnionSchema,
};
use crate::{error::SchemaError, schema_equality};
use digest::Digest;
use serde::{
    Serialize, Serializer,
    ser::{Error as _, SerializeMap, SerializeSeq},
};
use std::{
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
};
use strum_macros::{Display, EnumDiscriminants};

/// Represents documentation for complex Avro schemas.
pub type Documentation = Option<String>;

/// Represents an Avro schema fingerprint.
///
/// The digest is computed over [`Schema::canonical_form`].
pub struct SchemaFingerprint {
    pub bytes: Vec<u8>,
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.bytes
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<String>>()
                .join("")
        )
    }
}

/// Represents any valid Avro schema
/// More information about Avro schemas can be found in the
/// [Avro Specification](https://avro.apache.org/docs/++version++/specification/#schema-declaration)
#[derive(Clone, Debug, EnumDiscriminants)]
#[strum_discriminants(name(SchemaKind), derive(Display, Hash, Ord, PartialOrd))]
pub enum Schema {
    /// A `null` Avro schema.
    Null,
    /// A `boolean` Avro schema.
    Boolean,
    /// An `int` Avro schema.
    Int,
    /// A `long` Avro schema.
    Long,
    /// A `float` Avro schema.
    Float,
    /// A `double` Avro schema.
    Double,
    /// A `bytes` Avro schema.
    ///
    /// `Bytes` represents a sequence of 8-bit unsigned bytes.
    Bytes,
    /// A `string` Avro schema.
    ///
    /// `String` represents a unicode character sequence.
    String,
    /// An `array` Avro schema.
    ///
    /// All items will have the same schema.
    Array(ArraySchema),
    /// A `map` Avro schema.
    ///
    /// Keys are always a `Schema::String` and all values will have the same schema.
    Map(MapSchema),
    /// A `union` Avro schema.
    Union(UnionSchema),
    /// A `record` Avro schema.
    Record(RecordSchema),
    /// An `enum` Avro schema.
    Enum(EnumSchema),
    /// A `fixed` Avro schema.
    Fixed(FixedSchema),
    /// A reference to a named type defined elsewhere in the document.
    ///
    /// The parser emits it for every use of a name after its definition,
    /// including uses inside the definition itself.
    Ref { name: Name },
    /// Placeholder for a type that could not be determined.
    ///
    /// Never valid in a finished schema.
    Unknown,
}

#[derive(Clone, Debug)]
pub struct MapSchema {
    pub types: Box<Schema>,
}

#[derive(Clone, Debug)]
pub struct ArraySchema {
    pub items: Box<Schema>,
}

/// A description of an Enum schema.
#[derive(bon::Builder, Debug, Clone)]
pub struct EnumSchema {
    /// The name of the schema
    #[builder(into)]
    pub name: Name,
    /// The documentation of the schema
    #[builder(default)]
    pub doc: Documentation,
    /// The set of symbols of the schema
    pub symbols: Vec<String>,
}

/// A description of a Fixed schema.
#[derive(bon::Builder, Debug, Clone)]
pub struct FixedSchema {
    /// The name of the schema
    #[builder(into)]
    pub name: Name,
    /// The documentation of the schema
    #[builder(default)]
    pub doc: Documentation,
    /// The size of the fixed schema
    pub size: usize,
}

impl PartialEq for Schema {
    /// Assess equality of two `Schema`s with the configured
    /// [`SchemataEq`](schema_equality::SchemataEq) comparator.
    ///
    /// Named types seen before in the same comparison are compared by name only.
    fn eq(&self, other: &Self) -> bool {
        schema_equality::compare_schemata(self, other)
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        schema_equality::hash_schema(self, state)
    }
}

impl Schema {
    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(input: &str) -> Result<Schema, SchemaError> {
        let mut parser = Parser::default();
        parser.parse_str(input)
    }

    /// Create a `Schema` from an already parsed JSON document.
    pub fn parse(value: &serde_json::Value) -> Result<Schema, SchemaError> {
        let mut parser = Parser::default();
        parser.parse(value)
    }

    /// Returns an `array` schema of `items`.
    pub fn array(items: Schema) -> Self {
        Schema::Array(ArraySchema {
            items: Box::new(items),
        })
    }

    /// Returns a `map` schema with values of `types`.
    pub fn map(types: Schema) -> Self {
        Schema::Map(MapSchema {
            types: Box::new(types),
        })
    }

    /// Returns a `union` schema of `options`.
    pub fn union(options: Vec<Schema>) -> Self {
        Schema::Union(UnionSchema::new(options))
    }

    /// The name used to tell union options apart: the primitive name, the
    /// fullname of a named type, or `array`, `map`, `union` and `unknown`.
    pub fn type_name(&self) -> &str {
        match self {
            Schema::Null => "null",
            Schema::Boolean => "boolean",
            Schema::Int => "int",
            Schema::Long => "long",
            Schema::Float => "float",
            Schema::Double => "double",
            Schema::Bytes => "bytes",
            Schema::String => "string",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
            Schema::Union(_) => "union",
            Schema::Record(RecordSchema { name, .. })
            | Schema::Enum(EnumSchema { name, .. })
            | Schema::Fixed(FixedSchema { name, .. })
            | Schema::Ref { name } => name.fullname(),
            Schema::Unknown => "unknown",
        }
    }

    /// Returns whether the schema represents a named type according to the avro specification
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            Schema::Ref { .. } | Schema::Record(_) | Schema::Enum(_) | Schema::Fixed(_)
        )
    }

    /// Returns the name of the schema if it has one.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Ref { name, .. }
            | Schema::Record(RecordSchema { name, .. })
            | Schema::Enum(EnumSchema { name, .. })
            | Schema::Fixed(FixedSchema { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Returns the namespace of the schema if it has one.
    pub fn namespace(&self) -> NamespaceRef<'_> {
        self.name().and_then(|n| n.namespace())
    }

    /// Returns the doc of the schema if it has one.
    pub fn doc(&self) -> Option<&String> {
        match self {
            Schema::Record(RecordSchema { doc, .. })
            | Schema::Enum(EnumSchema { doc, .. })
            | Schema::Fixed(FixedSchema { doc, .. }) => doc.as_ref(),
            _ => None,
        }
    }

    /// Render the schema as compact JSON, printing every named type once.
    ///
    /// Fullnames are inserted into `existing_types` as they are printed; a name
    /// that is already present is written as a bare reference. Passing the same
    /// set to several calls lets related documents share one set of definitions.
    /// Field defaults are rendered with the JSON codec.
    pub fn canonical_string(
        &self,
        existing_types: &mut HashSet<String>,
    ) -> Result<String, SchemaError> {
        let mut formatter = Formatter::canonical(std::mem::take(existing_types));
        let canonical = formatter.json_string(self);
        *existing_types = formatter.into_existing_types();
        canonical
    }

    /// The canonical string of this schema on its own.
    pub fn canonical_form(&self) -> Result<String, SchemaError> {
        self.canonical_string(&mut HashSet::new())
    }

    /// Generate [fingerprint] of Schema's canonical form.
    ///
    /// [fingerprint]:
    /// https://avro.apache.org/docs/current/specification/#schema-fingerprints
    pub fn fingerprint<D: Digest>(&self) -> Result<SchemaFingerprint, SchemaError> {
        let mut d = D::new();
        d.update(self.canonical_form()?);
        Ok(SchemaFingerprint {
            bytes: d.finalize().to_vec(),
        })
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Array(ArraySchema { items }) => write!(f, "array<{items}>"),
            Schema::Map(MapSchema { types }) => write!(f, "map<{types}>"),
            Schema::Fixed(FixedSchema { name, size, .. }) => write!(f, "{name}<fixed>({size})"),
            Schema::Enum(EnumSchema { name, symbols, .. }) => {
                write!(f, "{name}<enum>([{}])", symbols.join(", "))
            }
            Schema::Record(RecordSchema { name, fields, .. }) => {
                write!(f, "{name}<record>([")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.schema)?;
                    if let Some(default) = &field.default {
                        write!(f, " (default: {default})")?;
                    }
                }
                f.write_str("])")
            }
            Schema::Union(union) => {
                f.write_str("[")?;
                for (i, option) in union.variants().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{option}")?;
                }
                f.write_str("]")
            }
            _ => f.write_str(self.type_name()),
        }
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self {
            Schema::Ref { name } => serializer.serialize_str(name.fullname()),
            Schema::Null => serializer.serialize_str("null"),
            Schema::Boolean => serializer.serialize_str("boolean"),
            Schema::Int => serializer.serialize_str("int"),
            Schema::Long => serializer.serialize_str("long"),
            Schema::Float => serializer.serialize_str("float"),
            Schema::Double => serializer.serialize_str("double"),
            Schema::Bytes => serializer.serialize_str("bytes"),
            Schema::String => serializer.serialize_str("string"),
            Schema::Array(ArraySchema { items }) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
                map.end()
            }
            Schema::Map(MapSchema { types }) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "map")?;
                map.serialize_entry("values", types)?;
                map.end()
            }
            Schema::Union(inner) => {
                let variants = inner.variants();
                let mut seq = serializer.serialize_seq(Some(variants.len()))?;
                for v in variants {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Schema::Record(RecordSchema {
                name, doc, fields, ..
            }) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "record")?;
                if let Some(n) = name.namespace() {
                    map.serialize_entry("namespace", n)?;
                }
                map.serialize_entry("name", name.name())?;
                if let Some(docstr) = doc {
                    map.serialize_entry("doc", docstr)?;
                }
                map.serialize_entry("fields", fields)?;
                map.end()
            }
            Schema::Enum(EnumSchema { name, doc, symbols }) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "enum")?;
                if let Some(n) = name.namespace() {
                    map.serialize_entry("namespace", n)?;
                }
                map.serialize_entry("name", name.name())?;
                if let Some(docstr) = doc {
                    map.serialize_entry("doc", docstr)?;
                }
                map.serialize_entry("symbols", symbols)?;
                map.end()
            }
            Schema::Fixed(FixedSchema { name, doc, size }) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "fixed")?;
                if let Some(n) = name.namespace() {
                    map.serialize_entry("namespace", n)?;
                }
                map.serialize_entry("name", name.name())?;
                if let Some(docstr) = doc {
                    map.serialize_entry("doc", docstr)?;
                }
                map.serialize_entry("size", size)?;
                map.end()
            }
            Schema::Unknown => Err(S::Error::custom(
                "The `unknown` placeholder cannot be serialized",
            )),
        }
    }
}
