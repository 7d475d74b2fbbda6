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

use crate::error::DecodeError;
use serde_json::{Map, Value};
use std::sync::{
    Once,
    atomic::{AtomicUsize, Ordering},
};

/// Maximum number of bytes that can be allocated when decoding
/// Avro-encoded values. This is a protection against ill-formed
/// data, whose length field might be interpreted as enormous.
/// See max_allocation_bytes to change this limit.
pub const DEFAULT_MAX_ALLOCATION_BYTES: usize = 512 * 1024 * 1024;
static MAX_ALLOCATION_BYTES: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_ALLOCATION_BYTES);
static MAX_ALLOCATION_BYTES_ONCE: Once = Once::new();

/// Set a new maximum number of bytes that can be allocated when decoding data.
/// Once called, the limit cannot be changed.
///
/// **NOTE** This function must be called before decoding **any** data. The
/// library leverages [`std::sync::Once`](https://doc.rust-lang.org/std/sync/struct.Once.html)
/// to set the limit either when calling this method, or when decoding for
/// the first time.
pub fn max_allocation_bytes(num_bytes: usize) -> usize {
    MAX_ALLOCATION_BYTES_ONCE.call_once(|| {
        MAX_ALLOCATION_BYTES.store(num_bytes, Ordering::Release);
    });
    MAX_ALLOCATION_BYTES.load(Ordering::Acquire)
}

pub(crate) fn safe_len(len: usize) -> Result<usize, DecodeError> {
    let max_bytes = max_allocation_bytes(DEFAULT_MAX_ALLOCATION_BYTES);

    if len <= max_bytes {
        Ok(len)
    } else {
        Err(DecodeError::MemoryAllocation {
            desired: len,
            maximum: max_bytes,
        })
    }
}

pub(crate) trait MapHelper {
    fn string(&self, key: &str) -> Option<String>;

    fn name(&self) -> Option<String> {
        self.string("name")
    }

    fn doc(&self) -> Option<String> {
        self.string("doc")
    }
}

impl MapHelper for Map<String, Value> {
    fn string(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
    }
}

pub fn zig_i32(n: i32, buffer: &mut Vec<u8>) -> usize {
    zig_i64(n as i64, buffer)
}

pub fn zig_i64(n: i64, buffer: &mut Vec<u8>) -> usize {
    encode_variable(((n << 1) ^ (n >> 63)) as u64, buffer)
}

/// Reads a zig-zag encoded long from the start of `bytes`.
///
/// Returns the value and the number of bytes it occupied, or `Ok(None)` if
/// `bytes` ends before the varint is complete.
pub fn zag_i64(bytes: &[u8]) -> Result<Option<(i64, usize)>, DecodeError> {
    Ok(decode_variable(bytes)?.map(|(z, consumed)| {
        let n = if z & 0x1 == 0 {
            (z >> 1) as i64
        } else {
            !(z >> 1) as i64
        };
        (n, consumed)
    }))
}

/// Like [`zag_i64`] but fails with [`DecodeError::ZagI32`] if the value does
/// not fit in 32 bits.
pub fn zag_i32(bytes: &[u8]) -> Result<Option<(i32, usize)>, DecodeError> {
    match zag_i64(bytes)? {
        Some((n, consumed)) => {
            let n = i32::try_from(n).map_err(|e| DecodeError::ZagI32(e, n))?;
            Ok(Some((n, consumed)))
        }
        None => Ok(None),
    }
}

fn encode_variable(mut z: u64, buffer: &mut Vec<u8>) -> usize {
    let mut written = 0;
    loop {
        written += 1;
        if z <= 0x7F {
            buffer.push((z & 0x7F) as u8);
            break;
        } else {
            buffer.push((0x80 | (z & 0x7F)) as u8);
            z >>= 7;
        }
    }
    written
}

fn decode_variable(bytes: &[u8]) -> Result<Option<(u64, usize)>, DecodeError> {
    let mut i = 0u64;
    for (j, byte) in bytes.iter().enumerate() {
        if j > 9 {
            // if j * 7 > 64
            return Err(DecodeError::IntegerOverflow);
        }
        i |= (u64::from(byte & 0x7F)) << (j * 7);
        if (byte >> 7) == 0 {
            return Ok(Some((i, j + 1)));
        }
    }
    Ok(None)
}
