// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreObjectType {
    Table,
    View,
    /// A keyless source defined by a raw SQL query. Can be read, never written.
    SqlQuery,
}

/// Identifies a store object an entity type can be mapped onto.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreObjectIdentifier {
    pub object_type: StoreObjectType,
    pub name: String,
    pub schema: Option<String>,
}

impl StoreObjectIdentifier {
    pub fn table(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            object_type: StoreObjectType::Table,
            name: name.into(),
            schema,
        }
    }

    pub fn view(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            object_type: StoreObjectType::View,
            name: name.into(),
            schema,
        }
    }

    pub fn sql_query(name: impl Into<String>) -> Self {
        Self {
            object_type: StoreObjectType::SqlQuery,
            name: name.into(),
            schema: None,
        }
    }

    /// Whether rows of this object can be targeted by DELETE or UPDATE.
    pub fn is_writable(&self) -> bool {
        self.object_type != StoreObjectType::SqlQuery
    }

    /// A key unique across all store object types; used to look tables up by identifier.
    pub(crate) fn key(&self) -> String {
        let kind = match self.object_type {
            StoreObjectType::Table => "table",
            StoreObjectType::View => "view",
            StoreObjectType::SqlQuery => "query",
        };
        format!("{kind}:{self}")
    }
}

impl Display for StoreObjectIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn keys_distinguish_object_types() {
        let table = StoreObjectIdentifier::table("Animals", None);
        let view = StoreObjectIdentifier::view("Animals", None);
        assert_ne!(table.key(), view.key());

        let qualified = StoreObjectIdentifier::table("Animals", Some("zoo".to_string()));
        assert_eq!(qualified.to_string(), "zoo.Animals");
        assert!(!StoreObjectIdentifier::sql_query("Animal").is_writable());
    }
}
