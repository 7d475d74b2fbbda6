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

use std::fmt;

/// Location inside a schema, used to localize parse, validation and
/// formatting failures.
///
/// Each segment is an enclosing type (`record`, a type name, `array`,
/// `map`, `union[1]`) or a field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaPath {
    nesting: Vec<String>,
}

impl SchemaPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new path with `segment` appended.
    pub fn nested_in(&self, segment: impl Into<String>) -> Self {
        let mut nesting = self.nesting.clone();
        nesting.push(segment.into());
        Self { nesting }
    }

    /// Replaces the innermost segment, e.g. once the name of the type being
    /// parsed becomes known.
    pub(crate) fn replace_last(&mut self, segment: impl Into<String>) {
        match self.nesting.last_mut() {
            Some(last) => *last = segment.into(),
            None => self.nesting.push(segment.into()),
        }
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nesting.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.nesting.join(" > "))
        }
    }
}
