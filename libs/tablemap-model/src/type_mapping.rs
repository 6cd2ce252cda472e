// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::{ValueConversion, ValueType};

/// The database flavor a model is built for. Decides the physical column types.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseProvider {
    Postgres,
    SqlServer,
    Sqlite,
}

/// Association between a value type and the physical type used to store it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeMapping {
    /// The store type as it would appear in DDL, e.g. `nvarchar(max)` or `jsonb`.
    pub store_type: String,
    /// The value type this mapping was resolved for.
    pub value_type: ValueType,
}

/// Resolves type mappings for a provider.
///
/// Implementations must hand out the same `Arc` for the same request, so that callers can
/// rely on pointer equality to detect that nothing changed.
pub trait TypeMappingSource: Send + Sync {
    fn find_mapping(&self, value_type: &ValueType) -> Option<Arc<TypeMapping>>;

    /// The mapping for a value stored after `conversion` has been applied.
    fn find_converted_mapping(
        &self,
        value_type: &ValueType,
        conversion: Option<ValueConversion>,
    ) -> Option<Arc<TypeMapping>> {
        match (value_type, conversion) {
            (ValueType::Enum(_), Some(ValueConversion::EnumToString)) => {
                self.find_mapping(&ValueType::String)
            }
            _ => self.find_mapping(value_type),
        }
    }
}

/// The built-in type mapping source. All mappings are created up front, so lookups are cheap and
/// stable.
pub struct RelationalTypeMappingSource {
    int: Arc<TypeMapping>,
    bool: Arc<TypeMapping>,
    string: Arc<TypeMapping>,
    json: Arc<TypeMapping>,
}

impl RelationalTypeMappingSource {
    pub fn new(provider: DatabaseProvider) -> Self {
        let (int, bool, string, json) = match provider {
            DatabaseProvider::Postgres => ("integer", "boolean", "text", "jsonb"),
            DatabaseProvider::SqlServer => ("int", "bit", "nvarchar(max)", "nvarchar(max)"),
            DatabaseProvider::Sqlite => ("INTEGER", "INTEGER", "TEXT", "TEXT"),
        };

        let mapping = |store_type: &str, value_type: ValueType| {
            Arc::new(TypeMapping {
                store_type: store_type.to_string(),
                value_type,
            })
        };

        Self {
            int: mapping(int, ValueType::Int),
            bool: mapping(bool, ValueType::Bool),
            string: mapping(string, ValueType::String),
            json: mapping(json, ValueType::JsonElement),
        }
    }
}

impl TypeMappingSource for RelationalTypeMappingSource {
    fn find_mapping(&self, value_type: &ValueType) -> Option<Arc<TypeMapping>> {
        let mapping = match value_type {
            ValueType::Int => &self.int,
            ValueType::Bool => &self.bool,
            ValueType::String => &self.string,
            // Enums are stored by ordinal unless converted
            ValueType::Enum(_) => &self.int,
            ValueType::JsonElement => &self.json,
        };
        Some(mapping.clone())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::value::EnumDefinition;

    use super::*;

    #[test]
    fn json_mapping_per_provider() {
        let expected = [
            (DatabaseProvider::Postgres, "jsonb"),
            (DatabaseProvider::SqlServer, "nvarchar(max)"),
            (DatabaseProvider::Sqlite, "TEXT"),
        ];

        for (provider, store_type) in expected {
            let source = RelationalTypeMappingSource::new(provider);
            let mapping = source.find_mapping(&ValueType::JsonElement).unwrap();
            assert_eq!(mapping.store_type, store_type);
            assert_eq!(mapping.value_type, ValueType::JsonElement);
        }
    }

    #[test]
    fn lookups_are_pointer_stable() {
        let source = RelationalTypeMappingSource::new(DatabaseProvider::SqlServer);
        let first = source.find_mapping(&ValueType::JsonElement).unwrap();
        let second = source.find_mapping(&ValueType::JsonElement).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn converted_enum_maps_to_string() {
        let source = RelationalTypeMappingSource::new(DatabaseProvider::Postgres);
        let island = ValueType::Enum(EnumDefinition::new("Island", &["North", "South"]));

        let numeric = source.find_converted_mapping(&island, None).unwrap();
        assert_eq!(numeric.store_type, "integer");

        let string = source
            .find_converted_mapping(&island, Some(ValueConversion::EnumToString))
            .unwrap();
        assert_eq!(string.store_type, "text");
    }
}
