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

use crate::encode::Encoder;
use std::fmt::Write as _;

/// Writes values as compact JSON.
///
/// This is not the Avro JSON encoding: unions holding `null` are written as
/// `null` and bytes are written as strings with one character per byte.
#[derive(Debug, Default)]
pub struct JsonEncoder {
    out: String,
}

/// Quote `s` as a JSON string.
///
/// Only `"`, `\` and control characters are escaped.
pub(crate) fn write_json_string(out: &mut String, s: &str) {
    write_escaped(out, s.chars());
}

/// Quote `bytes` as a JSON string holding the character U+00XX for every byte XX.
pub(crate) fn write_json_bytes(out: &mut String, bytes: &[u8]) {
    write_escaped(out, bytes.iter().map(|&b| char::from(b)));
}

fn write_escaped(out: &mut String, chars: impl Iterator<Item = char>) {
    out.push('"');
    for c in chars {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_float(out: &mut String, x: impl std::fmt::Debug, finite: bool) {
    if finite {
        let _ = write!(out, "{x:?}");
    } else {
        out.push_str("null");
    }
}

impl Encoder for JsonEncoder {
    fn encode_null(&mut self) {
        self.out.push_str("null");
    }

    fn encode_boolean(&mut self, value: bool) {
        self.out.push_str(if value { "true" } else { "false" });
    }

    fn encode_int(&mut self, value: i32) {
        let _ = write!(self.out, "{value}");
    }

    fn encode_long(&mut self, value: i64) {
        let _ = write!(self.out, "{value}");
    }

    fn encode_float(&mut self, value: f32) {
        write_float(&mut self.out, value, value.is_finite());
    }

    fn encode_double(&mut self, value: f64) {
        write_float(&mut self.out, value, value.is_finite());
    }

    fn encode_string(&mut self, value: &str) {
        write_json_string(&mut self.out, value);
    }

    fn encode_bytes(&mut self, value: &[u8]) {
        write_json_bytes(&mut self.out, value);
    }

    fn encode_fixed(&mut self, value: &[u8]) {
        write_json_bytes(&mut self.out, value);
    }

    fn encode_enum(&mut self, _index: usize, symbol: &str) {
        write_json_string(&mut self.out, symbol);
    }

    fn encode_array_start(&mut self, _len: usize) {
        self.out.push('[');
    }

    fn encode_array_end(&mut self) {
        self.out.push(']');
    }

    fn encode_map_start(&mut self, _len: usize) {
        self.out.push('{');
    }

    fn encode_map_key(&mut self, key: &str) {
        write_json_string(&mut self.out, key);
        self.out.push(':');
    }

    fn encode_map_end(&mut self) {
        self.out.push('}');
    }

    fn encode_record_start(&mut self) {
        self.out.push('{');
    }

    fn encode_field_name(&mut self, name: &str) {
        self.encode_map_key(name);
    }

    fn encode_record_end(&mut self) {
        self.out.push('}');
    }

    fn encode_union_start(&mut self, _index: usize, type_name: &str) {
        self.out.push('{');
        self.encode_map_key(type_name);
    }

    fn encode_union_null(&mut self, _index: usize) {
        self.encode_null();
    }

    fn encode_union_end(&mut self) {
        self.out.push('}');
    }

    fn encode_separator(&mut self) {
        self.out.push(',');
    }

    fn into_bytes(self) -> Vec<u8> {
        self.out.into_bytes()
    }
}
