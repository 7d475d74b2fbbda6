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
    encode::Encoder,
    util::{zig_i32, zig_i64},
};

/// Writes values in the Avro binary encoding.
///
/// Arrays and maps are written as a single block followed by the empty
/// terminating block.
#[derive(Debug, Default)]
pub struct BinaryEncoder {
    buffer: Vec<u8>,
}

impl BinaryEncoder {
    fn encode_len(&mut self, len: usize) {
        zig_i64(len as i64, &mut self.buffer);
    }
}

impl Encoder for BinaryEncoder {
    fn encode_null(&mut self) {}

    fn encode_boolean(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    fn encode_int(&mut self, value: i32) {
        zig_i32(value, &mut self.buffer);
    }

    fn encode_long(&mut self, value: i64) {
        zig_i64(value, &mut self.buffer);
    }

    fn encode_float(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    fn encode_double(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    fn encode_string(&mut self, value: &str) {
        self.encode_bytes(value.as_bytes());
    }

    fn encode_bytes(&mut self, value: &[u8]) {
        self.encode_len(value.len());
        self.buffer.extend_from_slice(value);
    }

    fn encode_fixed(&mut self, value: &[u8]) {
        self.buffer.extend_from_slice(value);
    }

    fn encode_enum(&mut self, index: usize, _symbol: &str) {
        self.encode_len(index);
    }

    fn encode_array_start(&mut self, len: usize) {
        if len > 0 {
            self.encode_len(len);
        }
    }

    fn encode_array_end(&mut self) {
        self.buffer.push(0);
    }

    fn encode_map_start(&mut self, len: usize) {
        if len > 0 {
            self.encode_len(len);
        }
    }

    fn encode_map_key(&mut self, key: &str) {
        self.encode_string(key);
    }

    fn encode_map_end(&mut self) {
        self.buffer.push(0);
    }

    fn encode_record_start(&mut self) {}

    fn encode_field_name(&mut self, _name: &str) {}

    fn encode_record_end(&mut self) {}

    fn encode_union_start(&mut self, index: usize, _type_name: &str) {
        self.encode_len(index);
    }

    fn encode_union_null(&mut self, index: usize) {
        self.encode_len(index);
    }

    fn encode_union_end(&mut self) {}

    fn encode_separator(&mut self) {}

    fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        encode::{Encoding, encode},
        schema::Schema,
        types::AvroValue,
    };
    use hex_literal::hex;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashMap;

    type TestResult = anyhow::Result<()>;

    #[rstest]
    #[case(AvroValue::Null, &[])]
    #[case(AvroValue::Boolean(true), &hex!("01"))]
    #[case(AvroValue::Boolean(false), &hex!("00"))]
    #[case(AvroValue::Int(3), &hex!("06"))]
    #[case(AvroValue::Int(-1), &hex!("01"))]
    #[case(AvroValue::Long(64), &hex!("80 01"))]
    #[case(AvroValue::Float(1.5), &hex!("00 00 c0 3f"))]
    #[case(AvroValue::Double(-2.0), &hex!("00 00 00 00 00 00 00 c0"))]
    #[case(AvroValue::String("foo".into()), &hex!("06 66 6f 6f"))]
    #[case(AvroValue::Bytes(vec![]), &hex!("00"))]
    #[case(AvroValue::Bytes(vec![0xff, 0x00]), &hex!("04 ff 00"))]
    fn primitives(#[case] value: AvroValue, #[case] expected: &[u8]) -> TestResult {
        assert_eq!(encode(&value, Encoding::Binary)?, expected);
        Ok(())
    }

    #[test]
    fn arrays_are_written_as_one_block() -> TestResult {
        let value = AvroValue::Array(Schema::Long, vec![AvroValue::Long(3), AvroValue::Long(27)]);
        assert_eq!(encode(&value, Encoding::Binary)?, hex!("04 06 36 00"));

        let empty = AvroValue::Array(Schema::Long, vec![]);
        assert_eq!(encode(&empty, Encoding::Binary)?, hex!("00"));
        Ok(())
    }

    #[test]
    fn maps_write_keys_before_values() -> TestResult {
        let value = AvroValue::Map(
            Schema::Int,
            HashMap::from([("a".to_string(), AvroValue::Int(1))]),
        );
        assert_eq!(encode(&value, Encoding::Binary)?, hex!("02 02 61 02 00"));
        Ok(())
    }

    #[test]
    fn unions_write_the_index_first() -> TestResult {
        let options = vec![Schema::Null, Schema::String];
        let null = AvroValue::Union(options.clone(), 0, Box::new(AvroValue::Null));
        assert_eq!(encode(&null, Encoding::Binary)?, hex!("00"));

        let string = AvroValue::Union(options, 1, Box::new(AvroValue::String("a".into())));
        assert_eq!(encode(&string, Encoding::Binary)?, hex!("02 02 61"));
        Ok(())
    }

    #[test]
    fn enums_and_fixed() -> TestResult {
        let suit = Schema::parse_str(
            r#"{"type": "enum", "name": "Suit", "symbols": ["A", "B", "C"]}"#,
        )?;
        let value = AvroValue::Enum(suit, 2, "C".into());
        assert_eq!(encode(&value, Encoding::Binary)?, hex!("04"));

        let hash = Schema::parse_str(r#"{"type": "fixed", "name": "H", "size": 3}"#)?;
        let value = AvroValue::Fixed(hash, vec![1, 2, 3]);
        assert_eq!(encode(&value, Encoding::Binary)?, hex!("01 02 03"));
        Ok(())
    }
}
