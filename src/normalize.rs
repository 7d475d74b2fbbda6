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

//! Conversion of arbitrary values into values that conform to a schema.
//!
//! [`Normalizer`] is the single place deciding whether a value can be assigned
//! to a schema. It widens and narrows numbers, swaps strings with bytes, enums
//! or fixed values, fills record defaults and picks union options. The result
//! always carries the target schema.

use crate::{
    error::ConversionError,
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, Names, RecordSchema, ResolvedSchema,
        Schema, UnionSchema,
    },
    types::{AvroValue, ToAvro, ValueKind},
};
use log::debug;
use std::collections::HashMap;

/// Normalizes values against one schema.
///
/// Building a `Normalizer` collects the named types of the schema once, so it
/// pays off when many values are normalized against the same schema.
#[derive(Debug)]
pub struct Normalizer<'s> {
    resolved: ResolvedSchema<'s>,
}

impl<'s> Normalizer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            resolved: ResolvedSchema::from(schema),
        }
    }

    /// Creates a `Normalizer` for a schema that refers to named types defined
    /// in other documents.
    pub fn with_known_schemata(schema: &'s Schema, known_schemata: &'s Names) -> Self {
        Self {
            resolved: ResolvedSchema::new_with_known_schemata(schema, known_schemata),
        }
    }

    /// The schema values are normalized against.
    pub fn schema(&self) -> &'s Schema {
        self.resolved.get_root()
    }

    /// Converts `value` into a value of the schema.
    pub fn normalize(&self, value: impl ToAvro) -> Result<AvroValue, ConversionError> {
        self.normalize_as(value.to_avro(), self.resolved.get_root())
    }

    /// Follows `schema` to its definition if it is a reference.
    pub(crate) fn resolve(&self, schema: &'s Schema) -> Option<&'s Schema> {
        self.resolved.resolve(schema)
    }

    pub(crate) fn normalize_as(
        &self,
        value: AvroValue,
        schema: &'s Schema,
    ) -> Result<AvroValue, ConversionError> {
        let schema = self
            .resolve(schema)
            .ok_or_else(|| ConversionError::UnresolvedName(schema.type_name().to_string()))?;

        match (value, schema) {
            (value @ AvroValue::Null, Schema::Null)
            | (value @ AvroValue::Boolean(_), Schema::Boolean)
            | (value @ AvroValue::Int(_), Schema::Int)
            | (value @ AvroValue::Long(_), Schema::Long)
            | (value @ AvroValue::Bytes(_), Schema::Bytes)
            | (value @ AvroValue::String(_), Schema::String) => Ok(value),

            (AvroValue::Int(i), Schema::Long) => Ok(AvroValue::Long(i.into())),
            (AvroValue::Int(i), Schema::Float) => Ok(AvroValue::Float(i as f32)),
            (AvroValue::Int(i), Schema::Double) => Ok(AvroValue::Double(i.into())),
            (AvroValue::Long(i), Schema::Int) => Ok(AvroValue::Int(i as i32)),
            (AvroValue::Long(i), Schema::Float) => Ok(AvroValue::Float(i as f32)),
            (AvroValue::Long(i), Schema::Double) => Ok(AvroValue::Double(i as f64)),
            (AvroValue::Float(x), Schema::Float) => {
                finite(x.into()).map(|_| AvroValue::Float(x))
            }
            (AvroValue::Float(x), Schema::Double) => finite(x.into()).map(AvroValue::Double),
            (AvroValue::Float(x), Schema::Int) => Ok(AvroValue::Int(x as i32)),
            (AvroValue::Float(x), Schema::Long) => Ok(AvroValue::Long(x as i64)),
            (AvroValue::Double(x), Schema::Double) => finite(x).map(AvroValue::Double),
            (AvroValue::Double(x), Schema::Float) => {
                // finite doubles beyond the range of f32 narrow to infinity
                let narrowed = x as f32;
                if narrowed.is_finite() {
                    Ok(AvroValue::Float(narrowed))
                } else {
                    Err(ConversionError::InvalidDouble(x))
                }
            }
            (AvroValue::Double(x), Schema::Int) => Ok(AvroValue::Int(x as i32)),
            (AvroValue::Double(x), Schema::Long) => Ok(AvroValue::Long(x as i64)),

            (AvroValue::String(s), Schema::Bytes) => Ok(AvroValue::Bytes(s.into_bytes())),
            (AvroValue::Bytes(bytes) | AvroValue::Fixed(_, bytes), Schema::String) => {
                String::from_utf8(bytes)
                    .map(AvroValue::String)
                    .map_err(ConversionError::ConversionFailed)
            }

            (AvroValue::Fixed(_, bytes), Schema::Bytes) => Ok(AvroValue::Bytes(bytes)),
            (
                AvroValue::Fixed(_, bytes) | AvroValue::Bytes(bytes),
                Schema::Fixed(FixedSchema { size, .. }),
            ) => fixed(schema, *size, bytes),
            (AvroValue::String(s), Schema::Fixed(FixedSchema { size, .. })) => {
                fixed(schema, *size, s.into_bytes())
            }

            (AvroValue::Array(_, items), Schema::Array(ArraySchema { items: item_schema })) => {
                let items = items
                    .into_iter()
                    .map(|item| self.normalize_as(item, item_schema))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AvroValue::Array(Schema::clone(item_schema), items))
            }

            (AvroValue::Map(_, entries), Schema::Map(MapSchema { types })) => Ok(AvroValue::Map(
                Schema::clone(types),
                self.normalize_entries(entries, types)?,
            )),
            (AvroValue::Record(_, fields), Schema::Map(MapSchema { types })) => Ok(
                AvroValue::Map(Schema::clone(types), self.normalize_entries(fields, types)?),
            ),

            (AvroValue::Enum(_, index, symbol), Schema::Enum(EnumSchema { symbols, .. })) => {
                let index = if symbols.get(index) == Some(&symbol) {
                    index
                } else {
                    position_of(symbols, &symbol)?
                };
                Ok(AvroValue::Enum(schema.clone(), index, symbol))
            }
            (AvroValue::String(symbol), Schema::Enum(EnumSchema { symbols, .. })) => {
                let index = position_of(symbols, &symbol)?;
                Ok(AvroValue::Enum(schema.clone(), index, symbol))
            }
            (AvroValue::Enum(_, _, symbol), Schema::String) => Ok(AvroValue::String(symbol)),

            (AvroValue::Record(_, fields), Schema::Record(record)) => {
                self.normalize_record(fields, record, schema)
            }
            (AvroValue::Map(_, entries), Schema::Record(record)) => {
                self.normalize_record(entries, record, schema)
            }

            (AvroValue::Union(_, index, inner), Schema::Union(union)) => {
                match union.variants().get(index) {
                    Some(option) if inner.type_name() == option.type_name() => {
                        let inner = self.normalize_as(*inner, option)?;
                        Ok(AvroValue::Union(
                            union.variants().to_vec(),
                            index,
                            Box::new(inner),
                        ))
                    }
                    // the option changed shape, resolve the inner value from scratch
                    _ => self.normalize_as(*inner, schema),
                }
            }
            (AvroValue::Union(_, _, inner), _) => self.normalize_as(*inner, schema),
            (AvroValue::Map(types, entries), Schema::Union(union)) => {
                self.normalize_map_to_union(types, entries, union)
            }
            (value, Schema::Union(union)) => self.normalize_to_union(value, union),

            (value, schema) => Err(ConversionError::Mismatch {
                value: ValueKind::from(&value),
                schema: schema.type_name().to_string(),
            }),
        }
    }

    fn normalize_entries(
        &self,
        entries: impl IntoIterator<Item = (String, AvroValue)>,
        types: &'s Schema,
    ) -> Result<HashMap<String, AvroValue>, ConversionError> {
        entries
            .into_iter()
            .map(|(key, value)| Ok((key, self.normalize_as(value, types)?)))
            .collect()
    }

    /// Keys unknown to the record are dropped, missing ones take the field default.
    /// A repeated key keeps its last value.
    fn normalize_record(
        &self,
        entries: impl IntoIterator<Item = (String, AvroValue)>,
        record: &'s RecordSchema,
        schema: &'s Schema,
    ) -> Result<AvroValue, ConversionError> {
        let mut slots: Vec<Option<AvroValue>> = vec![None; record.fields.len()];
        for (key, value) in entries {
            if let Some(&position) = record.lookup.get(&key) {
                slots[position] = Some(value);
            }
        }
        let fields = record
            .fields
            .iter()
            .zip(slots)
            .map(|(field, slot)| {
                let value = match slot {
                    Some(value) => value,
                    None => field
                        .default
                        .clone()
                        .ok_or_else(|| ConversionError::FieldNotFound(field.name.clone()))?,
                };
                Ok((field.name.clone(), self.normalize_as(value, &field.schema)?))
            })
            .collect::<Result<Vec<_>, ConversionError>>()?;
        Ok(AvroValue::Record(schema.clone(), fields))
    }

    /// A map with a single key naming an option selects that option, otherwise
    /// the whole map becomes the `map` option.
    fn normalize_map_to_union(
        &self,
        types: Schema,
        mut entries: HashMap<String, AvroValue>,
        union: &'s UnionSchema,
    ) -> Result<AvroValue, ConversionError> {
        let selected = match entries.keys().next() {
            Some(key) if entries.len() == 1 => union
                .find_by_type_name(key)
                .map(|(index, option)| (index, option, key.clone())),
            _ => None,
        };
        if let Some((index, option, key)) = selected
            && let Some(inner) = entries.remove(&key)
        {
            return self.select(union, index, option, inner);
        }

        match union.find_by_type_name("map") {
            Some((index, option)) => {
                self.select(union, index, option, AvroValue::Map(types, entries))
            }
            None => Err(ConversionError::Mismatch {
                value: ValueKind::Map,
                schema: union.type_names().join(", "),
            }),
        }
    }

    /// Picks the option with the same type name, or else the first option the
    /// value converts to.
    fn normalize_to_union(
        &self,
        value: AvroValue,
        union: &'s UnionSchema,
    ) -> Result<AvroValue, ConversionError> {
        if let Some((index, option)) = union.find_by_type_name(value.type_name()) {
            return self.select(union, index, option, value);
        }

        for (index, option) in union.variants().iter().enumerate() {
            if let Ok(inner) = self.normalize_as(value.clone(), option) {
                debug!(
                    "No union option is named `{}`, converted to option {index} (`{}`)",
                    value.type_name(),
                    option.type_name()
                );
                return Ok(AvroValue::Union(
                    union.variants().to_vec(),
                    index,
                    Box::new(inner),
                ));
            }
        }

        Err(ConversionError::SchemaMismatch {
            value: ValueKind::from(&value),
            options: union.type_names(),
        })
    }

    fn select(
        &self,
        union: &'s UnionSchema,
        index: usize,
        option: &'s Schema,
        value: AvroValue,
    ) -> Result<AvroValue, ConversionError> {
        let inner = self.normalize_as(value, option)?;
        Ok(AvroValue::Union(
            union.variants().to_vec(),
            index,
            Box::new(inner),
        ))
    }
}

fn finite(x: f64) -> Result<f64, ConversionError> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(ConversionError::InvalidDouble(x))
    }
}

fn fixed(schema: &Schema, size: usize, bytes: Vec<u8>) -> Result<AvroValue, ConversionError> {
    if bytes.len() == size {
        Ok(AvroValue::Fixed(schema.clone(), bytes))
    } else {
        Err(ConversionError::InvalidFixedCount {
            expected: size,
            actual: bytes.len(),
        })
    }
}

fn position_of(symbols: &[String], symbol: &str) -> Result<usize, ConversionError> {
    symbols
        .iter()
        .position(|s| s == symbol)
        .ok_or_else(|| ConversionError::EnumSymbolNotFound {
            symbol: symbol.to_string(),
            symbols: symbols.to_vec(),
        })
}
