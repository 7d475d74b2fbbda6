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
    decode::json::decode_default,
    error::SchemaError,
    schema::{Documentation, Name, Parser, Schema, SchemaPath},
    types::AvroValue,
    util::MapHelper,
};
use log::debug;
use serde::{
    Serialize, Serializer,
    ser::{Error as _, SerializeMap},
};
use serde_json::{Map, Value};

/// Represents a `field` in a `record` Avro schema.
#[derive(bon::Builder, Clone, Debug, PartialEq)]
pub struct RecordField {
    /// Name of the field.
    #[builder(into)]
    pub name: String,
    /// Documentation of the field.
    #[builder(default)]
    pub doc: Documentation,
    /// Default value of the field, already normalized against `schema`.
    ///
    /// Used when a record is normalized from a map that lacks this field.
    pub default: Option<AvroValue>,
    /// Schema of the field.
    pub schema: Schema,
}

impl RecordField {
    /// Parse a JSON field definition of the record `enclosing_record`.
    ///
    /// A default that cannot be decoded against the field's own schema is
    /// dropped and the field ends up without a default.
    pub(crate) fn parse(
        field: &Map<String, Value>,
        parser: &mut Parser,
        enclosing_record: &Name,
        path: &SchemaPath,
    ) -> Result<Self, SchemaError> {
        let name = field.name().ok_or_else(|| SchemaError::MissingField {
            field: "name",
            path: path.clone(),
        })?;
        let path = path.nested_in(name.as_str());

        let field_type = field.get("type").ok_or_else(|| SchemaError::MissingField {
            field: "type",
            path: path.clone(),
        })?;
        let schema = parser.parse_with(field_type, enclosing_record.namespace(), &path)?;

        let default = field.get("default").and_then(|value| {
            match decode_default(value, &schema, parser.names()) {
                Ok(default) => Some(default),
                Err(err) => {
                    debug!(
                        "Ignoring default {value} of field `{name}` in `{}`: {err}",
                        enclosing_record.fullname()
                    );
                    None
                }
            }
        });

        Ok(RecordField {
            name,
            doc: field.doc(),
            default,
            schema,
        })
    }
}

impl Serialize for RecordField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.schema)?;

        if let Some(doc) = &self.doc {
            map.serialize_entry("doc", doc)?;
        }

        if let Some(default) = &self.default {
            let bytes = crate::encode_json(default).map_err(S::Error::custom)?;
            let value: Value = serde_json::from_slice(&bytes).map_err(S::Error::custom)?;
            map.serialize_entry("default", &value)?;
        }

        map.end()
    }
}
