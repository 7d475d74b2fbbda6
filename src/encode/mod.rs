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

//! Writing [`AvroValue`]s in the binary and JSON encodings.
//!
//! [`encode_value`] walks a value and reports every part of it to an
//! [`Encoder`]. The two encodings only differ in how they write those parts.

mod binary;
pub(crate) mod json;

pub use binary::BinaryEncoder;
pub use json::JsonEncoder;

use crate::{
    AvroResult,
    error::EncodeError,
    normalize::Normalizer,
    schema::{Schema, SchemaKind},
    types::{AvroValue, ToAvro},
};

/// The wire formats a value can be written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// The Avro binary encoding.
    #[default]
    Binary,
    /// A compact JSON rendering that differs from the Avro JSON encoding.
    Json,
}

/// Receives the parts of a value in the order [`encode_value`] visits them.
pub trait Encoder {
    fn encode_null(&mut self);

    fn encode_boolean(&mut self, value: bool);

    fn encode_int(&mut self, value: i32);

    fn encode_long(&mut self, value: i64);

    fn encode_float(&mut self, value: f32);

    fn encode_double(&mut self, value: f64);

    fn encode_string(&mut self, value: &str);

    fn encode_bytes(&mut self, value: &[u8]);

    fn encode_fixed(&mut self, value: &[u8]);

    fn encode_enum(&mut self, index: usize, symbol: &str);

    /// Called before the items of an array holding `len` items.
    fn encode_array_start(&mut self, len: usize);

    fn encode_array_end(&mut self);

    /// Called before the entries of a map holding `len` entries.
    fn encode_map_start(&mut self, len: usize);

    fn encode_map_key(&mut self, key: &str);

    fn encode_map_end(&mut self);

    fn encode_record_start(&mut self);

    fn encode_field_name(&mut self, name: &str);

    fn encode_record_end(&mut self);

    /// Called before the value of the union option `index`, named `type_name`.
    fn encode_union_start(&mut self, index: usize, type_name: &str);

    /// Called instead of the start/value/end sequence when the option holds `null`.
    fn encode_union_null(&mut self, index: usize);

    fn encode_union_end(&mut self);

    /// Called between two items, entries or fields.
    fn encode_separator(&mut self);

    /// Consumes the encoder and returns what it wrote.
    fn into_bytes(self) -> Vec<u8>;
}

/// Walk `value` and feed it into `encoder`.
///
/// Records are written in the order of their schema and map entries ordered by
/// key. A value that is not consistent with itself (a union index out of range,
/// a record without a record schema or missing one of its fields) fails before
/// anything is written for it.
pub fn encode_value<E: Encoder>(value: &AvroValue, encoder: &mut E) -> Result<(), EncodeError> {
    match value {
        AvroValue::Null => encoder.encode_null(),
        AvroValue::Boolean(b) => encoder.encode_boolean(*b),
        AvroValue::Int(i) => encoder.encode_int(*i),
        AvroValue::Long(i) => encoder.encode_long(*i),
        AvroValue::Float(x) => encoder.encode_float(*x),
        AvroValue::Double(x) => encoder.encode_double(*x),
        AvroValue::Bytes(bytes) => encoder.encode_bytes(bytes),
        AvroValue::String(s) => encoder.encode_string(s),
        AvroValue::Fixed(_, bytes) => encoder.encode_fixed(bytes),
        AvroValue::Enum(_, index, symbol) => encoder.encode_enum(*index, symbol),
        AvroValue::Array(_, items) => {
            encoder.encode_array_start(items.len());
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    encoder.encode_separator();
                }
                encode_value(item, encoder)?;
            }
            encoder.encode_array_end();
        }
        AvroValue::Map(_, entries) => {
            let mut entries: Vec<_> = entries.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            encoder.encode_map_start(entries.len());
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    encoder.encode_separator();
                }
                encoder.encode_map_key(key);
                encode_value(value, encoder)?;
            }
            encoder.encode_map_end();
        }
        AvroValue::Record(schema, fields) => {
            let Schema::Record(record) = schema else {
                return Err(EncodeError::RecordSchemaMismatch(SchemaKind::from(schema)));
            };
            let mut slots: Vec<Option<&(String, AvroValue)>> = vec![None; record.fields.len()];
            for entry in fields {
                if let Some(&position) = record.lookup.get(&entry.0) {
                    slots[position].get_or_insert(entry);
                }
            }
            let values = record
                .fields
                .iter()
                .zip(slots)
                .map(|(field, slot)| {
                    slot.ok_or_else(|| EncodeError::MissingField(field.name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            encoder.encode_record_start();
            for (i, (name, value)) in values.into_iter().enumerate() {
                if i > 0 {
                    encoder.encode_separator();
                }
                encoder.encode_field_name(name);
                encode_value(value, encoder)?;
            }
            encoder.encode_record_end();
        }
        AvroValue::Union(options, index, inner) => {
            let option = options
                .get(*index)
                .ok_or(EncodeError::UnionIndexOutOfRange {
                    index: *index,
                    num_variants: options.len(),
                })?;
            if let AvroValue::Null = **inner {
                encoder.encode_union_null(*index);
            } else {
                encoder.encode_union_start(*index, option.type_name());
                encode_value(inner, encoder)?;
                encoder.encode_union_end();
            }
        }
    }
    Ok(())
}

/// Write `value` in the given encoding.
pub fn encode(value: &AvroValue, encoding: Encoding) -> Result<Vec<u8>, EncodeError> {
    match encoding {
        Encoding::Binary => {
            let mut encoder = BinaryEncoder::default();
            encode_value(value, &mut encoder)?;
            Ok(encoder.into_bytes())
        }
        Encoding::Json => {
            let mut encoder = JsonEncoder::default();
            encode_value(value, &mut encoder)?;
            Ok(encoder.into_bytes())
        }
    }
}

/// Normalize `value` against `schema`, then write it in the given encoding.
pub fn encode_as(value: impl ToAvro, schema: &Schema, encoding: Encoding) -> AvroResult<Vec<u8>> {
    let value = Normalizer::new(schema).normalize(value)?;
    Ok(encode(&value, encoding)?)
}
