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

use crate::{
    encode::json::write_json_string,
    error::SchemaError,
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, RecordSchema, Schema, SchemaPath,
    },
};
use std::collections::HashSet;

/// Writes schemas as compact JSON documents.
///
/// A named type is defined the first time it is written and referred to by name
/// afterwards, also across calls. Names are written relative to the namespace of
/// the enclosing record, unless the formatter writes canonical strings.
#[derive(Debug, Default)]
pub struct Formatter {
    existing_types: HashSet<String>,
    fullnames: bool,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A formatter that treats the types in `existing_types` (by fullname) as
    /// already written elsewhere.
    pub fn with_existing_types(existing_types: HashSet<String>) -> Self {
        Self {
            existing_types,
            fullnames: false,
        }
    }

    /// A formatter for [`Schema::canonical_string`]: every name is written as a
    /// fullname and definitions carry no `namespace` key.
    pub(crate) fn canonical(existing_types: HashSet<String>) -> Self {
        Self {
            existing_types,
            fullnames: true,
        }
    }

    pub(crate) fn into_existing_types(self) -> HashSet<String> {
        self.existing_types
    }

    /// Fullnames of the types written so far.
    pub fn existing_types(&self) -> &HashSet<String> {
        &self.existing_types
    }

    /// Format `schema` as a valid JSON schema document.
    pub fn json_string(&mut self, schema: &Schema) -> Result<String, SchemaError> {
        let mut out = String::new();
        self.write(&mut out, schema, None, &SchemaPath::default())?;
        Ok(out)
    }

    fn write(
        &mut self,
        out: &mut String,
        schema: &Schema,
        namespace: Option<&str>,
        path: &SchemaPath,
    ) -> Result<(), SchemaError> {
        match schema {
            Schema::Array(ArraySchema { items }) => {
                out.push_str(r#"{"type":"array","items":"#);
                self.write(out, items, namespace, &path.nested_in("array"))?;
                out.push('}');
            }
            Schema::Map(MapSchema { types }) => {
                out.push_str(r#"{"type":"map","values":"#);
                self.write(out, types, namespace, &path.nested_in("map"))?;
                out.push('}');
            }
            Schema::Union(union) => {
                out.push('[');
                for (i, option) in union.variants().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write(out, option, namespace, &path.nested_in(format!("union[{i}]")))?;
                }
                out.push(']');
            }
            Schema::Enum(EnumSchema { name, symbols, .. })
                if self.existing_types.insert(name.fullname().to_string()) =>
            {
                out.push('{');
                self.write_name(out, name, namespace);
                out.push_str(r#","type":"enum","symbols":["#);
                for (i, symbol) in symbols.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_json_string(out, symbol);
                }
                out.push_str("]}");
            }
            Schema::Fixed(FixedSchema { name, size, .. })
                if self.existing_types.insert(name.fullname().to_string()) =>
            {
                out.push('{');
                self.write_name(out, name, namespace);
                out.push_str(&format!(r#","type":"fixed","size":{size}}}"#));
            }
            Schema::Record(RecordSchema { name, fields, .. })
                if self.existing_types.insert(name.fullname().to_string()) =>
            {
                let path = path.nested_in(name.fullname());
                out.push('{');
                self.write_name(out, name, namespace);
                out.push_str(r#","type":"record","fields":["#);
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let field_path = path.nested_in(field.name.as_str());
                    out.push_str(r#"{"name":"#);
                    write_json_string(out, &field.name);
                    out.push_str(r#","type":"#);
                    self.write(out, &field.schema, name.namespace(), &field_path)?;
                    if let Some(default) = &field.default {
                        let json = crate::encode_json(default).map_err(|source| {
                            SchemaError::InvalidDefault {
                                field: field.name.clone(),
                                path: field_path.clone(),
                                source,
                            }
                        })?;
                        out.push_str(r#","default":"#);
                        out.push_str(&String::from_utf8_lossy(&json));
                    }
                    out.push('}');
                }
                out.push_str("]}");
            }
            Schema::Record(RecordSchema { name, .. })
            | Schema::Enum(EnumSchema { name, .. })
            | Schema::Fixed(FixedSchema { name, .. })
            | Schema::Ref { name } => write_json_string(out, &self.reference(name, namespace)),
            Schema::Unknown => {
                return Err(SchemaError::UnknownType {
                    name: schema.type_name().to_string(),
                    path: path.clone(),
                });
            }
            _ => write_json_string(out, schema.type_name()),
        }
        Ok(())
    }

    /// `"namespace":..,"name":..` of a definition. The namespace is left out when
    /// the enclosing one already implies it.
    fn write_name(&self, out: &mut String, name: &Name, namespace: Option<&str>) {
        if self.fullnames {
            out.push_str(r#""name":"#);
            write_json_string(out, name.fullname());
            return;
        }
        if name.namespace() != namespace {
            out.push_str(r#""namespace":"#);
            write_json_string(out, name.namespace().unwrap_or_default());
            out.push(',');
        }
        out.push_str(r#""name":"#);
        write_json_string(out, name.name());
    }

    /// The name that refers to `name` from inside `namespace`.
    fn reference(&self, name: &Name, namespace: Option<&str>) -> String {
        match (name.namespace(), namespace) {
            _ if self.fullnames => name.fullname().to_string(),
            (None, Some(_)) => format!(".{}", name.name()),
            _ => name.readable_name(namespace).to_string(),
        }
    }
}
