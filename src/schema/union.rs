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

use crate::schema::Schema;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A description of a Union schema
#[derive(Debug, Clone)]
pub struct UnionSchema {
    /// The schemas that make up this union
    pub(crate) schemas: Vec<Schema>,
    // Type name to the position of its first occurrence. Duplicates are kept in
    // `schemas` and reported by validation.
    variant_index: BTreeMap<String, usize>,
}

impl UnionSchema {
    /// Creates a new UnionSchema from a vector of schemas.
    ///
    /// The options are not checked here, see [`Schema::validate`].
    pub fn new(schemas: Vec<Schema>) -> Self {
        let mut variant_index = BTreeMap::new();
        for (i, schema) in schemas.iter().enumerate() {
            variant_index
                .entry(schema.type_name().to_string())
                .or_insert(i);
        }
        UnionSchema {
            schemas,
            variant_index,
        }
    }

    /// Returns a slice to all variants of this schema.
    pub fn variants(&self) -> &[Schema] {
        &self.schemas
    }

    /// The position and schema of the first option with the given type name.
    pub fn find_by_type_name(&self, type_name: &str) -> Option<(usize, &Schema)> {
        self.variant_index
            .get(type_name)
            .map(|&i| (i, &self.schemas[i]))
    }

    /// The type names of all options, in declaration order.
    pub fn type_names(&self) -> Vec<String> {
        self.schemas
            .iter()
            .map(|schema| schema.type_name().to_string())
            .collect()
    }
}

// No need to compare variant_index, it is derivative of schemas.
impl PartialEq for UnionSchema {
    fn eq(&self, other: &UnionSchema) -> bool {
        self.schemas.eq(&other.schemas)
    }
}
