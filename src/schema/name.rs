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
    error::SchemaError,
    schema::{Schema, SchemaPath},
    util::MapHelper,
};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

/// Represents names for `record`, `enum` and `fixed` Avro schemas.
///
/// Each of these `Schema`s have a `fullname` composed of two parts:
///   * a name
///   * a namespace
///
/// Names are not checked on construction, [`Schema::validate`] does that.
///
/// More information about schema names can be found in the
/// [Avro specification](https://avro.apache.org/docs/++version++/specification/#names)
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name {
    /// The full name
    namespace_and_name: String,
    /// Start byte of the name part
    ///
    /// If this is zero, then there is no namespace.
    index_of_name: usize,
}

/// Represents Schema lookup within a schema env
pub type Names = HashMap<Name, Schema>;
/// Represents Schema lookup within a schema
pub type NamesRef<'a> = HashMap<Name, &'a Schema>;
/// Represents the namespace for Named Schema
pub type Namespace = Option<String>;
/// Represents the namespace for Named Schema
pub type NamespaceRef<'a> = Option<&'a str>;

impl Name {
    /// Create a new `Name`.
    /// Parses the optional `namespace` from the `name` string.
    pub fn new(name: impl Into<String>) -> Self {
        Self::new_with_enclosing_namespace(name, None)
    }

    /// Create a new `Name` using the namespace from `enclosing_namespace` if
    /// `name` has none of its own.
    pub fn new_with_enclosing_namespace(
        name: impl Into<String>,
        enclosing_namespace: NamespaceRef,
    ) -> Self {
        let name = name.into();
        match name.rfind('.') {
            // A leading dot means the null namespace
            Some(0) => Self {
                namespace_and_name: name[1..].to_string(),
                index_of_name: 0,
            },
            Some(dot) => Self {
                index_of_name: dot + 1,
                namespace_and_name: name,
            },
            None => match enclosing_namespace {
                Some(namespace) if !namespace.is_empty() => Self {
                    namespace_and_name: format!("{namespace}.{name}"),
                    index_of_name: namespace.len() + 1,
                },
                _ => Self {
                    namespace_and_name: name,
                    index_of_name: 0,
                },
            },
        }
    }

    /// Parse the `name` and `namespace` keys of a JSON schema object.
    ///
    /// A `namespace` key on the object takes precedence over `enclosing_namespace`.
    pub(crate) fn parse(
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
        path: &SchemaPath,
    ) -> Result<Self, SchemaError> {
        let name_field = complex.name().ok_or_else(|| SchemaError::MissingField {
            field: "name",
            path: path.clone(),
        })?;
        let namespace = complex.string("namespace");
        Ok(Self::new_with_enclosing_namespace(
            name_field,
            namespace.as_deref().or(enclosing_namespace),
        ))
    }

    pub fn name(&self) -> &str {
        &self.namespace_and_name[self.index_of_name..]
    }

    pub fn namespace(&self) -> NamespaceRef<'_> {
        if self.index_of_name == 0 {
            None
        } else {
            Some(&self.namespace_and_name[..(self.index_of_name - 1)])
        }
    }

    /// Return the `fullname` of this `Name`
    ///
    /// More information about fullnames can be found in the
    /// [Avro specification](https://avro.apache.org/docs/++version++/specification/#names)
    pub fn fullname(&self) -> &str {
        &self.namespace_and_name
    }

    /// The shortest name that identifies this type from inside `namespace`.
    pub fn readable_name(&self, namespace: NamespaceRef) -> &str {
        if self.namespace() == namespace {
            self.name()
        } else {
            self.fullname()
        }
    }

    /// Construct the fully qualified name
    ///
    /// ```
    /// # use avro_normalize::schema::Name;
    /// assert_eq!(
    ///     Name::new("some_name").fully_qualified_name(Some("some_namespace")).into_owned(),
    ///     Name::new("some_namespace.some_name")
    /// );
    /// assert_eq!(
    ///     Name::new("some_namespace.some_name").fully_qualified_name(Some("other_namespace")).into_owned(),
    ///     Name::new("some_namespace.some_name")
    /// );
    /// ```
    pub fn fully_qualified_name(&self, enclosing_namespace: NamespaceRef) -> Cow<'_, Name> {
        if self.index_of_name == 0
            && let Some(namespace) = enclosing_namespace
            && !namespace.is_empty()
        {
            Cow::Owned(Self {
                namespace_and_name: format!("{namespace}.{}", self.namespace_and_name),
                index_of_name: namespace.len() + 1,
            })
        } else {
            Cow::Borrowed(self)
        }
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Debug for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Name");
        debug.field("name", &self.name());
        if self.index_of_name != 0 {
            debug.field("namespace", &self.namespace());
            debug.finish()
        } else {
            debug.finish_non_exhaustive()
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.namespace_and_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn namespace_is_split_from_the_last_dot() {
        let name = Name::new("com.example.Foo");
        assert_eq!(name.name(), "Foo");
        assert_eq!(name.namespace(), Some("com.example"));
        assert_eq!(name.fullname(), "com.example.Foo");
    }

    #[test]
    fn enclosing_namespace_applies_to_simple_names_only() {
        let simple = Name::new_with_enclosing_namespace("Foo", Some("a.b"));
        assert_eq!(simple.fullname(), "a.b.Foo");

        let dotted = Name::new_with_enclosing_namespace("x.Foo", Some("a.b"));
        assert_eq!(dotted.fullname(), "x.Foo");

        let empty = Name::new_with_enclosing_namespace("Foo", Some(""));
        assert_eq!(empty.namespace(), None);
    }

    #[test]
    fn leading_dot_means_null_namespace() {
        let name = Name::new_with_enclosing_namespace(".Foo", Some("a.b"));
        assert_eq!(name.fullname(), "Foo");
        assert_eq!(name.namespace(), None);
    }

    #[test]
    fn parse_prefers_own_namespace() -> TestResult {
        let complex = json!({"name": "Foo", "namespace": "own"});
        let complex = complex.as_object().unwrap();
        let name = Name::parse(complex, Some("outer"), &SchemaPath::new())?;
        assert_eq!(name.fullname(), "own.Foo");
        Ok(())
    }

    #[test]
    fn parse_requires_a_name() {
        let complex = json!({"type": "record"});
        let err = Name::parse(complex.as_object().unwrap(), None, &SchemaPath::new());
        assert!(matches!(
            err,
            Err(SchemaError::MissingField { field: "name", .. })
        ));
    }

    #[test]
    fn readable_name_drops_the_current_namespace() {
        let name = Name::new("a.b.Foo");
        assert_eq!(name.readable_name(Some("a.b")), "Foo");
        assert_eq!(name.readable_name(Some("c")), "a.b.Foo");
        assert_eq!(name.readable_name(None), "a.b.Foo");
    }
}
