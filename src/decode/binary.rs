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
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, Names, RecordSchema, ResolvedSchema,
        Schema, SchemaKind, UnionSchema,
    },
    types::AvroValue,
    util::{safe_len, zag_i32, zag_i64},
};
use std::collections::HashMap;

pub(super) fn decode(
    bytes: &[u8],
    schema: &Schema,
    known_schemata: &Names,
) -> Result<AvroValue, DecodeError> {
    let resolved = ResolvedSchema::new_with_known_schemata(schema, known_schemata);
    let mut reader = BinaryReader {
        input: bytes,
        resolved: &resolved,
        allocated: 0,
    };
    reader.decode(schema)
}

/// A cursor over the input that never reads past its end.
struct BinaryReader<'a, 's> {
    input: &'a [u8],
    resolved: &'a ResolvedSchema<'s>,
    /// Bytes claimed so far by array items and map entries, across all blocks.
    allocated: usize,
}

impl<'a, 's> BinaryReader<'a, 's> {
    fn decode(&mut self, schema: &'s Schema) -> Result<AvroValue, DecodeError> {
        let schema = self
            .resolved
            .resolve(schema)
            .ok_or_else(|| DecodeError::UnresolvedName(schema.type_name().to_string()))?;
        let mismatch = || DecodeError::SchemaMismatch(SchemaKind::from(schema));

        let value = match schema {
            Schema::Null => AvroValue::Null,
            Schema::Boolean => {
                let (&byte, rest) = self.input.split_first().ok_or_else(mismatch)?;
                self.input = rest;
                AvroValue::Boolean(byte != 0)
            }
            Schema::Int => AvroValue::Int(self.read_int()?.ok_or_else(mismatch)?),
            Schema::Long => AvroValue::Long(self.read_long()?.ok_or_else(mismatch)?),
            Schema::Float => {
                let bytes = self.read_array::<4>().ok_or_else(mismatch)?;
                AvroValue::Float(f32::from_le_bytes(bytes))
            }
            Schema::Double => {
                let bytes = self.read_array::<8>().ok_or_else(mismatch)?;
                AvroValue::Double(f64::from_le_bytes(bytes))
            }
            Schema::Bytes => AvroValue::Bytes(self.read_bytes()?.ok_or_else(mismatch)?.to_vec()),
            Schema::String => AvroValue::String(self.read_string()?.ok_or_else(mismatch)?),
            Schema::Fixed(FixedSchema { size, .. }) => {
                let bytes = self.read_slice(*size).ok_or(DecodeError::FixedSizeMismatch {
                    expected: *size,
                    remaining: self.input.len(),
                })?;
                AvroValue::Fixed(schema.clone(), bytes.to_vec())
            }
            Schema::Enum(EnumSchema { symbols, .. }) => {
                let index = self.read_int()?.ok_or_else(mismatch)?;
                let symbol = usize::try_from(index)
                    .ok()
                    .and_then(|i| symbols.get(i).map(|symbol| (i, symbol)));
                match symbol {
                    Some((i, symbol)) => AvroValue::Enum(schema.clone(), i, symbol.clone()),
                    None => {
                        return Err(DecodeError::EnumMismatch {
                            index: index.into(),
                            nsymbols: symbols.len(),
                        });
                    }
                }
            }
            Schema::Union(UnionSchema { schemas, .. }) => {
                let index = self.read_long()?.ok_or_else(mismatch)?;
                let option = usize::try_from(index)
                    .ok()
                    .and_then(|i| schemas.get(i).map(|option| (i, option)));
                let Some((i, option)) = option else {
                    return Err(DecodeError::UnionSizeMismatch {
                        index,
                        num_variants: schemas.len(),
                    });
                };
                AvroValue::Union(schemas.clone(), i, Box::new(self.decode(option)?))
            }
            Schema::Array(ArraySchema { items }) => {
                let mut values = Vec::new();
                loop {
                    match self.read_block_count(schema)? {
                        None => return Err(DecodeError::ArraySizeMismatch),
                        Some(0) => break,
                        Some(count) => {
                            self.claim::<AvroValue>(count)?;
                            values.reserve(count.min(self.input.len()));
                            for _ in 0..count {
                                values.push(self.decode(items)?);
                            }
                        }
                    }
                }
                AvroValue::Array(Schema::clone(items), values)
            }
            Schema::Map(MapSchema { types }) => {
                let mut entries = HashMap::new();
                loop {
                    match self.read_block_count(schema)? {
                        None => return Err(DecodeError::MapSizeMismatch),
                        Some(0) => break,
                        Some(count) => {
                            self.claim::<(String, AvroValue)>(count)?;
                            entries.reserve(count.min(self.input.len()));
                            for _ in 0..count {
                                let key =
                                    self.read_string()?.ok_or(DecodeError::MapKeyTypeMismatch)?;
                                let value = self.decode(types)?;
                                entries.insert(key, value);
                            }
                        }
                    }
                }
                AvroValue::Map(Schema::clone(types), entries)
            }
            Schema::Record(RecordSchema { fields, .. }) => {
                let values = fields
                    .iter()
                    .map(|field| Ok((field.name.clone(), self.decode(&field.schema)?)))
                    .collect::<Result<Vec<_>, DecodeError>>()?;
                AvroValue::Record(schema.clone(), values)
            }
            Schema::Ref { .. } | Schema::Unknown => return Err(mismatch()),
        };
        Ok(value)
    }

    fn read_slice(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.input.len() {
            return None;
        }
        let (head, rest) = self.input.split_at(len);
        self.input = rest;
        Some(head)
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.read_slice(N).and_then(|bytes| bytes.try_into().ok())
    }

    fn read_long(&mut self) -> Result<Option<i64>, DecodeError> {
        Ok(zag_i64(self.input)?.map(|(n, consumed)| {
            self.input = &self.input[consumed..];
            n
        }))
    }

    fn read_int(&mut self) -> Result<Option<i32>, DecodeError> {
        Ok(zag_i32(self.input)?.map(|(n, consumed)| {
            self.input = &self.input[consumed..];
            n
        }))
    }

    /// A length prefixed byte sequence; `Ok(None)` if the input ends first.
    fn read_bytes(&mut self) -> Result<Option<&'a [u8]>, DecodeError> {
        let Some(len) = self.read_long()? else {
            return Ok(None);
        };
        let len = usize::try_from(len).map_err(|_| DecodeError::NegativeLength(len))?;
        let len = safe_len(len)?;
        Ok(self.read_slice(len))
    }

    fn read_string(&mut self) -> Result<Option<String>, DecodeError> {
        match self.read_bytes()? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(DecodeError::ConvertToUtf8),
            None => Ok(None),
        }
    }

    /// The number of items in the next block; `Ok(None)` if the input ends first.
    ///
    /// A negative count is followed by the size of the block in bytes, which is
    /// read and ignored.
    fn read_block_count(&mut self, schema: &Schema) -> Result<Option<usize>, DecodeError> {
        let Some(count) = self.read_long()? else {
            return Ok(None);
        };
        if count < 0 {
            self.read_long()?
                .ok_or_else(|| DecodeError::SchemaMismatch(SchemaKind::from(schema)))?;
        }
        Ok(Some(
            usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX),
        ))
    }

    /// Accounts for `count` more items of type `T` against the allocation limit.
    ///
    /// Items such as `null` take no input, so the input length alone does not
    /// bound what a block count makes the decoder allocate.
    fn claim<T>(&mut self, count: usize) -> Result<(), DecodeError> {
        let bytes = count.saturating_mul(std::mem::size_of::<T>());
        self.allocated = safe_len(self.allocated.saturating_add(bytes))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    type TestResult = anyhow::Result<()>;

    fn decode_str(bytes: &[u8], schema: &str) -> anyhow::Result<AvroValue> {
        let schema = Schema::parse_str(schema)?;
        Ok(decode(bytes, &schema, &Names::new())?)
    }

    #[test]
    fn array_of_longs() -> TestResult {
        let value = decode_str(&hex!("04 06 36 00"), r#"{"type": "array", "items": "long"}"#)?;
        assert_eq!(
            value,
            AvroValue::Array(Schema::Long, vec![AvroValue::Long(3), AvroValue::Long(27)])
        );
        Ok(())
    }

    #[test]
    fn negative_block_counts_carry_a_byte_size() -> TestResult {
        // -2 items, 2 bytes, then the terminator
        let value = decode_str(&hex!("03 04 06 36 00"), r#"{"type": "array", "items": "long"}"#)?;
        assert_eq!(value.as_array().map(<[AvroValue]>::len), Some(2));
        Ok(())
    }

    #[test]
    fn several_blocks() -> TestResult {
        let value = decode_str(
            &hex!("02 02 61 02 02 02 62 04 00"),
            r#"{"type": "map", "values": "int"}"#,
        )?;
        assert_eq!(
            value,
            AvroValue::Map(
                Schema::Int,
                HashMap::from([
                    ("a".to_string(), AvroValue::Int(1)),
                    ("b".to_string(), AvroValue::Int(2)),
                ])
            )
        );
        Ok(())
    }

    #[test]
    fn huge_block_count_of_empty_items() -> TestResult {
        // several hundred million nulls announced in six bytes
        let result = decode_str(
            &hex!("80 a8 d6 b9 02 00"),
            r#"{"type": "array", "items": "null"}"#,
        )
        .map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(
            result,
            Err(Ok(DecodeError::MemoryAllocation { .. }))
        ));

        let result = decode_str(
            &hex!("80 a8 d6 b9 02 00 00"),
            r#"{"type": "map", "values": "null"}"#,
        )
        .map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(
            result,
            Err(Ok(DecodeError::MemoryAllocation { .. }))
        ));
        Ok(())
    }

    #[test]
    fn allocation_is_counted_across_blocks() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "null"}"#)?;
        let names = Names::new();
        let resolved = ResolvedSchema::new_with_known_schemata(&schema, &names);
        let limit = crate::util::max_allocation_bytes(crate::util::DEFAULT_MAX_ALLOCATION_BYTES);
        let mut reader = BinaryReader {
            input: &hex!("02 00"),
            resolved: &resolved,
            allocated: limit - 1,
        };
        assert!(matches!(
            reader.decode(&schema),
            Err(DecodeError::MemoryAllocation { .. })
        ));

        let mut reader = BinaryReader {
            input: &hex!("04 02 00"),
            resolved: &resolved,
            allocated: 0,
        };
        assert_eq!(reader.decode(&schema)?.as_array().map(<[AvroValue]>::len), Some(3));
        assert_eq!(reader.allocated, 3 * std::mem::size_of::<AvroValue>());
        Ok(())
    }

    #[test]
    fn missing_terminator() {
        assert!(matches!(
            decode_str(&hex!("04 06 36"), r#"{"type": "array", "items": "long"}"#)
                .map_err(|e| e.downcast::<DecodeError>()),
            Err(Ok(DecodeError::ArraySizeMismatch))
        ));
        assert!(matches!(
            decode_str(&hex!("02 02 61 02"), r#"{"type": "map", "values": "int"}"#)
                .map_err(|e| e.downcast::<DecodeError>()),
            Err(Ok(DecodeError::MapSizeMismatch))
        ));
    }

    #[test]
    fn enum_index() -> TestResult {
        let schema = r#"{"type": "enum", "name": "Channel", "symbols":
            ["A", "B", "C", "D", "E", "F", "G", "H", "I", "NoChannel"]}"#;
        let value = decode_str(&hex!("12"), schema)?;
        assert!(matches!(value, AvroValue::Enum(_, 9, ref symbol) if symbol == "NoChannel"));

        let out_of_range = decode_str(&hex!("14"), schema).map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(
            out_of_range,
            Err(Ok(DecodeError::EnumMismatch {
                index: 10,
                nsymbols: 10
            }))
        ));
        Ok(())
    }

    #[test]
    fn union_index() -> TestResult {
        let value = decode_str(&hex!("02 02 61"), r#"["null", "string"]"#)?;
        assert_eq!(
            value,
            AvroValue::Union(
                vec![Schema::Null, Schema::String],
                1,
                Box::new(AvroValue::String("a".into()))
            )
        );
        let negative = decode_str(&hex!("01"), r#"["null", "string"]"#)
            .map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(
            negative,
            Err(Ok(DecodeError::UnionSizeMismatch {
                index: -1,
                num_variants: 2
            }))
        ));
        Ok(())
    }

    #[test]
    fn empty_bytes_and_strings() -> TestResult {
        assert_eq!(decode_str(&hex!("00"), r#""bytes""#)?, AvroValue::Bytes(vec![]));
        assert_eq!(decode_str(&hex!("00"), r#""string""#)?, AvroValue::String(String::new()));
        Ok(())
    }

    #[test]
    fn truncated_input_is_rejected() {
        let cases = [
            (&[][..], r#""boolean""#),
            (&hex!("80")[..], r#""int""#),
            (&hex!("00 00 80")[..], r#""float""#),
            (&hex!("00 00 00 00 00 00 f0")[..], r#""double""#),
            (&hex!("06 61 62")[..], r#""string""#),
        ];
        for (bytes, schema) in cases {
            let result = decode_str(bytes, schema).map_err(|e| e.downcast::<DecodeError>());
            assert!(
                matches!(result, Err(Ok(DecodeError::SchemaMismatch(_)))),
                "{schema}: {result:?}"
            );
        }

        let fixed = decode_str(&hex!("01 02"), r#"{"type": "fixed", "name": "F", "size": 4}"#)
            .map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(
            fixed,
            Err(Ok(DecodeError::FixedSizeMismatch {
                expected: 4,
                remaining: 2
            }))
        ));
    }

    #[test]
    fn invalid_utf8() {
        let result =
            decode_str(&hex!("02 ff"), r#""string""#).map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(result, Err(Ok(DecodeError::ConvertToUtf8(_)))));
    }

    #[test]
    fn negative_length() {
        let result =
            decode_str(&hex!("01"), r#""bytes""#).map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(result, Err(Ok(DecodeError::NegativeLength(-1)))));
    }

    #[test]
    fn any_non_zero_byte_is_true() -> TestResult {
        assert_eq!(decode_str(&hex!("02"), r#""boolean""#)?, AvroValue::Boolean(true));
        assert_eq!(decode_str(&hex!("00"), r#""boolean""#)?, AvroValue::Boolean(false));
        Ok(())
    }

    #[test]
    fn int_overflowing_32_bits() {
        let result = decode_str(&hex!("80 80 80 80 10"), r#""int""#)
            .map_err(|e| e.downcast::<DecodeError>());
        assert!(matches!(result, Err(Ok(DecodeError::ZagI32(..)))));
    }

    #[test]
    fn recursive_record() -> TestResult {
        let schema = r#"{"type": "record", "name": "Node", "fields": [
            {"name": "value", "type": "int"},
            {"name": "next", "type": ["null", "Node"]}
        ]}"#;
        let value = decode_str(&hex!("02 02 04 00"), schema)?;
        assert_eq!(value.field("value"), Some(&AvroValue::Int(1)));
        let Some(AvroValue::Union(_, 1, next)) = value.field("next") else {
            panic!("Expected a second node in {value}");
        };
        assert_eq!(next.field("value"), Some(&AvroValue::Int(2)));
        assert!(matches!(next.field("next"), Some(AvroValue::Union(_, 0, _))));
        Ok(())
    }
}
