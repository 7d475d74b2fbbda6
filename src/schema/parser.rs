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

use crate::error::SchemaError;
use crate::schema::{
    ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, Names, NamespaceRef, RecordField,
    RecordSchema, Schema, SchemaPath, UnionSchema,
};
use crate::util::MapHelper;
use log::{debug, error, warn};
use serde_json::{Map, Value};

/// Turns JSON schema documents into [`Schema`]s.
///
/// The parser keeps the table of named types it has seen. A later use of a name,
/// including a use inside the type's own definition, becomes a [`Schema::Ref`].
/// Feeding several documents through one parser lets them refer to each other's
/// types.
#[derive(Default)]
pub struct Parser {
    /// Used to resolve cyclic references, i.e. when a
    /// field's type is a reference to its record's type
    resolving_schemas: Names,
    /// Every named type defined so far
    parsed_schemas: Names,
}

impl Parser {
    /// Create a parser that already knows the named types in `names`.
    pub fn with_names(names: Names) -> Self {
        Self {
            resolving_schemas: Names::default(),
            parsed_schemas: names,
        }
    }

    /// The named types defined so far.
    pub fn names(&self) -> &Names {
        &self.parsed_schemas
    }

    pub fn into_names(self) -> Names {
        self.parsed_schemas
    }

    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(&mut self, input: &str) -> Result<Schema, SchemaError> {
        let value = serde_json::from_str(input).map_err(SchemaError::ParseSchemaJson)?;
        self.parse(&value)
    }

    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro schema.
    pub fn parse(&mut self, value: &Value) -> Result<Schema, SchemaError> {
        match value {
            Value::String(_) | Value::Object(_) | Value::Array(_) => {
                self.parse_with(value, None, &SchemaPath::default())
            }
            _ => Err(SchemaError::NotAnObject),
        }
    }

    pub(crate) fn parse_with(
        &mut self,
        value: &Value,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        match *value {
            Value::String(ref t) => self.parse_known_schema(t.as_str(), enclosing_namespace, path),
            Value::Object(ref data) => self.parse_complex(data, enclosing_namespace, path),
            Value::Array(ref data) => self.parse_union(data, enclosing_namespace, path),
            _ => Err(SchemaError::TypeMismatch(path.clone())),
        }
    }

    /// Parse a string as a primitive type or reference to `parsed_schemas`.
    fn parse_known_schema(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        match name {
            "null" => Ok(Schema::Null),
            "boolean" => Ok(Schema::Boolean),
            "int" => Ok(Schema::Int),
            "long" => Ok(Schema::Long),
            "double" => Ok(Schema::Double),
            "float" => Ok(Schema::Float),
            "bytes" => Ok(Schema::Bytes),
            "string" => Ok(Schema::String),
            _ => self.fetch_schema_ref(name, enclosing_namespace, path),
        }
    }

    /// Given a name, returns a reference to a named type that is either
    /// fully parsed or currently being parsed.
    fn fetch_schema_ref(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let fully_qualified_name = Name::new_with_enclosing_namespace(name, enclosing_namespace);

        if self.parsed_schemas.contains_key(&fully_qualified_name) {
            return Ok(Schema::Ref {
                name: fully_qualified_name,
            });
        }
        if let Some(resolving_schema) = self.resolving_schemas.get(&fully_qualified_name) {
            return Ok(resolving_schema.clone());
        }

        Err(SchemaError::UnknownType {
            name: fully_qualified_name.fullname().to_string(),
            path: path.clone(),
        })
    }

    /// Parse a `serde_json::Value` representing a complex Avro type into a `Schema`.
    ///
    /// Avro supports "recursive" definition of types.
    /// e.g: `{"type": {"type": "string"}}`
    fn parse_complex(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let namespace = complex.string("namespace");
        let namespace = namespace.as_deref().or(enclosing_namespace);
        match complex.get("type") {
            Some(Value::String(t)) => match t.as_str() {
                "record" => self.parse_record(complex, enclosing_namespace, path),
                "enum" => self.parse_enum(complex, enclosing_namespace, path),
                "array" => self.parse_array(complex, namespace, path),
                "map" => self.parse_map(complex, namespace, path),
                "fixed" => self.parse_fixed(complex, enclosing_namespace, path),
                other => self.parse_known_schema(other, namespace, path),
            },
            Some(Value::Object(data)) => self.parse_complex(data, namespace, path),
            Some(Value::Array(variants)) => self.parse_union(variants, namespace, path),
            Some(_) => Err(SchemaError::TypeMismatch(path.clone())),
            None => Err(SchemaError::MissingField {
                field: "type",
                path: path.clone(),
            }),
        }
    }

    fn register_resolving_schema(&mut self, name: &Name) {
        debug!("Registering named type: {name:?}");
        self.resolving_schemas
            .insert(name.clone(), Schema::Ref { name: name.clone() });
    }

    fn register_parsed_schema(&mut self, fully_qualified_name: &Name, schema: &Schema) {
        if self.parsed_schemas.contains_key(fully_qualified_name) {
            debug!("Redefining named type: {fully_qualified_name:?}");
        }
        self.parsed_schemas
            .insert(fully_qualified_name.clone(), schema.clone());
        self.resolving_schemas.remove(fully_qualified_name);
    }

    /// Parse a `serde_json::Value` representing an Avro record type into a `Schema`.
    fn parse_record(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace, path)?;
        let path = path.nested_in(fully_qualified_name.fullname());

        self.register_resolving_schema(&fully_qualified_name);

        debug!("Going to parse record schema: {:?}", &fully_qualified_name);

        let fields = match complex.get("fields") {
            Some(Value::Array(fields)) => fields,
            Some(_) => return Err(SchemaError::TypeMismatch(path)),
            None => {
                return Err(SchemaError::MissingField {
                    field: "fields",
                    path,
                });
            }
        };

        let fields = fields
            .iter()
            .map(|field| match field.as_object() {
                Some(field) => RecordField::parse(field, self, &fully_qualified_name, &path),
                None => Err(SchemaError::TypeMismatch(path.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let schema = Schema::Record(
            RecordSchema::builder()
                .name(fully_qualified_name.clone())
                .doc(complex.doc())
                .fields(fields)
                .build(),
        );

        self.register_parsed_schema(&fully_qualified_name, &schema);
        Ok(schema)
    }

    /// Parse a `serde_json::Value` representing a Avro enum type into a `Schema`.
    fn parse_enum(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace, path)?;
        let path = path.nested_in(fully_qualified_name.fullname());

        self.register_resolving_schema(&fully_qualified_name);

        let symbols: Vec<String> = match complex.get("symbols") {
            Some(Value::Array(symbols)) => symbols
                .iter()
                .map(|symbol| symbol.as_str().map(|s| s.to_string()))
                .collect::<Option<_>>()
                .ok_or_else(|| SchemaError::TypeMismatch(path.clone()))?,
            Some(_) => return Err(SchemaError::TypeMismatch(path)),
            None => {
                return Err(SchemaError::MissingField {
                    field: "symbols",
                    path,
                });
            }
        };

        let schema = Schema::Enum(EnumSchema {
            name: fully_qualified_name.clone(),
            doc: complex.doc(),
            symbols,
        });

        self.register_parsed_schema(&fully_qualified_name, &schema);

        Ok(schema)
    }

    /// Parse a `serde_json::Value` representing a Avro array type into a `Schema`.
    fn parse_array(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let path = path.nested_in("array");
        let items = match complex.get("items") {
            Some(items) => self.parse_with(items, enclosing_namespace, &path)?,
            None => {
                return Err(SchemaError::MissingField {
                    field: "items",
                    path,
                });
            }
        };
        Ok(Schema::Array(ArraySchema {
            items: Box::new(items),
        }))
    }

    /// Parse a `serde_json::Value` representing a Avro map type into a `Schema`.
    fn parse_map(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let path = path.nested_in("map");
        let types = match complex.get("values") {
            Some(types) => self.parse_with(types, enclosing_namespace, &path)?,
            None => {
                return Err(SchemaError::MissingField {
                    field: "values",
                    path,
                });
            }
        };
        Ok(Schema::Map(MapSchema {
            types: Box::new(types),
        }))
    }

    /// Parse a `serde_json::Value` representing a Avro union type into a `Schema`.
    ///
    /// Options keep their declaration order. Nested unions are rejected.
    fn parse_union(
        &mut self,
        items: &[Value],
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let mut option_path = path.nested_in("union[0]");
        let mut schemas = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            option_path.replace_last(format!("union[{i}]"));
            let schema = match item {
                Value::String(_) | Value::Object(_) => {
                    self.parse_with(item, enclosing_namespace, &option_path)?
                }
                _ => return Err(SchemaError::TypeMismatch(option_path)),
            };
            schemas.push(schema);
        }

        if schemas.is_empty() {
            error!("Union schema without members at {path}! It will not pass validation.");
        } else if schemas.len() == 1 {
            warn!("Union schema with just one member at {path}! Consider dropping the union!");
        }
        Ok(Schema::Union(UnionSchema::new(schemas)))
    }

    /// Parse a `serde_json::Value` representing a Avro fixed type into a `Schema`.
    fn parse_fixed(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Schema, SchemaError> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace, path)?;
        let path = path.nested_in(fully_qualified_name.fullname());

        let size = match complex.get("size") {
            Some(size) => size
                .as_u64()
                .ok_or_else(|| SchemaError::TypeMismatch(path.clone()))?,
            None => {
                return Err(SchemaError::MissingField {
                    field: "size",
                    path,
                });
            }
        };

        let schema = Schema::Fixed(FixedSchema {
            name: fully_qualified_name.clone(),
            doc: complex.doc(),
            size: size as usize,
        });

        self.register_parsed_schema(&fully_qualified_name, &schema);

        Ok(schema)
    }
}
