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
    error::DecodeError,
    normalize::Normalizer,
    schema::{ArraySchema, MapSchema, Names, Schema, SchemaKind, UnionSchema},
    types::AvroValue,
};
use serde_json::Value;
use std::collections::HashMap;

pub(super) fn decode(
    bytes: &[u8],
    schema: &Schema,
    known_schemata: &Names,
) -> Result<AvroValue, DecodeError> {
    let json: Value = serde_json::from_slice(bytes).map_err(DecodeError::Json)?;
    let normalizer = Normalizer::with_known_schemata(schema, known_schemata);
    decode_value(&json, schema, &normalizer)
}

/// Read the default of a record field from its JSON form.
///
/// `names` holds the named types parsed so far. Strings given for `bytes` or
/// `fixed` fields use one character per byte.
pub(crate) fn decode_default(
    json: &Value,
    schema: &Schema,
    names: &Names,
) -> Result<AvroValue, DecodeError> {
    let normalizer = Normalizer::with_known_schemata(schema, names);
    decode_value(json, schema, &normalizer)
}

/// Every level is normalized against its own schema before the enclosing level
/// sees it, so unions get to pick options for values that are already typed.
fn decode_value<'s>(
    json: &Value,
    schema: &'s Schema,
    normalizer: &Normalizer<'s>,
) -> Result<AvroValue, DecodeError> {
    let resolved = normalizer
        .resolve(schema)
        .ok_or_else(|| DecodeError::UnresolvedName(schema.type_name().to_string()))?;
    let provisional = provisional_value(json, resolved, normalizer)?;
    Ok(normalizer.normalize_as(provisional, resolved)?)
}

fn provisional_value<'s>(
    json: &Value,
    schema: &'s Schema,
    normalizer: &Normalizer<'s>,
) -> Result<AvroValue, DecodeError> {
    let unexpected = |found| DecodeError::UnexpectedJson {
        found,
        schema: SchemaKind::from(schema),
    };

    match json {
        Value::Null => Ok(AvroValue::Null),
        Value::Bool(b) => Ok(AvroValue::Boolean(*b)),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => AvroValue::Long(i),
            None => AvroValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Value::String(s) => Ok(match schema {
            Schema::Bytes | Schema::Fixed(_) => {
                AvroValue::Bytes(s.chars().map(|c| (c as u32 & 0xff) as u8).collect())
            }
            _ => AvroValue::String(s.clone()),
        }),
        Value::Array(items) => {
            let Schema::Array(ArraySchema { items: item_schema }) = schema else {
                return Err(unexpected("array"));
            };
            let items = items
                .iter()
                .map(|item| decode_value(item, item_schema, normalizer))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(AvroValue::Array(Schema::Unknown, items))
        }
        Value::Object(object) => match schema {
            Schema::Map(MapSchema { types }) => {
                let entries = object
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), decode_value(value, types, normalizer)?)))
                    .collect::<Result<HashMap<_, _>, DecodeError>>()?;
                Ok(AvroValue::Map(Schema::Unknown, entries))
            }
            Schema::Union(UnionSchema { schemas, .. }) => {
                let mut entries = object.iter();
                let selected = match (entries.next(), entries.next()) {
                    (Some((key, value)), None) => schemas
                        .iter()
                        .position(|option| option.type_name() == key)
                        .map(|index| (index, value)),
                    _ => None,
                };
                let Some((index, value)) = selected else {
                    return Err(DecodeError::UnionKeyMismatch(object.keys().cloned().collect()));
                };
                let inner = decode_value(value, &schemas[index], normalizer)?;
                Ok(AvroValue::Union(schemas.clone(), index, Box::new(inner)))
            }
            Schema::Record(record) => {
                let entries = object
                    .iter()
                    .filter_map(|(key, value)| {
                        record.field(key).map(|field| {
                            Ok((key.clone(), decode_value(value, &field.schema, normalizer)?))
                        })
                    })
                    .collect::<Result<HashMap<_, _>, DecodeError>>()?;
                Ok(AvroValue::Map(Schema::Unknown, entries))
            }
            _ => Err(unexpected("object")),
        },
    }
}
