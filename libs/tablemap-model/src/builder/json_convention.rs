// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use tracing::debug;

use crate::{
    entity_type::{AnnotationName, EntityTypeId},
    error::ModelBuildingError,
    model::Model,
    type_mapping::TypeMappingSource,
    value::{ConfigurationSource, ValueConversion, ValueType},
};

use super::convention::{EntityTypeAnnotationChangedConvention, ModelFinalizingConvention};

/// Configures entity types mapped into a JSON column.
///
/// Attaches the provider's JSON element type mapping while a JSON column name is set, and makes
/// enum properties declared on JSON-mapped types store their values by name.
pub struct JsonMappingConvention {
    type_mapping_source: Arc<dyn TypeMappingSource>,
}

impl JsonMappingConvention {
    pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>) -> Self {
        Self {
            type_mapping_source,
        }
    }
}

impl EntityTypeAnnotationChangedConvention for JsonMappingConvention {
    fn process_entity_type_annotation_changed(
        &self,
        model: &mut Model,
        entity_type: EntityTypeId,
        name: AnnotationName,
        new_value: Option<&str>,
        _old_value: Option<&str>,
    ) {
        if name != AnnotationName::JsonColumnName {
            return;
        }

        let entity_type = &mut model.entity_types[entity_type];
        entity_type.json_column_type_mapping = match new_value {
            Some(column_name) if !column_name.is_empty() => self
                .type_mapping_source
                .find_mapping(&ValueType::JsonElement),
            _ => None,
        };
    }
}

impl ModelFinalizingConvention for JsonMappingConvention {
    fn process_model_finalizing(&self, model: &mut Model) -> Result<(), ModelBuildingError> {
        let enum_properties: Vec<_> = model
            .entity_types
            .iter()
            .filter(|(_, entity_type)| entity_type.is_mapped_to_json())
            .flat_map(|(_, entity_type)| entity_type.declared_properties.iter().copied())
            .filter(|property| model.properties[*property].value_type.is_enum())
            .collect();

        for property_id in enum_properties {
            let property = &mut model.properties[property_id];
            if property.set_conversion(
                Some(ValueConversion::EnumToString),
                ConfigurationSource::Convention,
            ) {
                debug!("Storing JSON enum property '{}' by name", property.name);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_log::test;

    use crate::{
        builder::{ModelBuilder, convention::ModelFinalizingConvention},
        error::ModelBuildingError,
        foreign_key::ForeignKeySpec,
        model::Model,
        type_mapping::DatabaseProvider,
        value::{ConfigurationSource, EnumDefinition, ValueConversion, ValueType},
    };

    fn address_kind() -> ValueType {
        ValueType::Enum(EnumDefinition::new("AddressKind", &["Home", "Work"]))
    }

    fn customer_with_address(
        builder: &mut ModelBuilder,
    ) -> (crate::EntityTypeId, crate::EntityTypeId) {
        let customer = builder.add_entity_type("Customer").unwrap();
        builder.add_property(customer, "Id", ValueType::Int).unwrap();
        builder.set_primary_key(customer, &["Id"]).unwrap();

        let address = builder.add_entity_type("Address").unwrap();
        builder.add_property(address, "CustomerId", ValueType::Int).unwrap();
        builder.add_property(address, "Kind", address_kind()).unwrap();
        builder.set_primary_key(address, &["CustomerId"]).unwrap();
        builder
            .add_foreign_key(
                ForeignKeySpec::new(address, customer, &["CustomerId"])
                    .ownership()
                    .required_dependent(),
            )
            .unwrap();

        (customer, address)
    }

    #[test]
    fn json_type_mapping_follows_column_name() {
        let mut builder = ModelBuilder::new(DatabaseProvider::SqlServer);
        let (_, address) = customer_with_address(&mut builder);

        builder.to_json(address, "Address");
        let first = builder.model().entity_type(address).json_column_type_mapping.clone().unwrap();
        assert_eq!(first.store_type, "nvarchar(max)");

        builder.to_json(address, "Address");
        let second = builder.model().entity_type(address).json_column_type_mapping.clone().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        builder.set_annotation(address, crate::AnnotationName::JsonColumnName, None);
        assert!(builder.model().entity_type(address).json_column_type_mapping.is_none());

        builder.to_json(address, "");
        assert!(builder.model().entity_type(address).json_column_type_mapping.is_none());

        builder.to_json(address, "HomeAddress");
        let third = builder.model().entity_type(address).json_column_type_mapping.clone().unwrap();
        assert!(Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn json_enums_are_stored_by_name() {
        let mut builder = ModelBuilder::new(DatabaseProvider::Postgres);
        let (customer, address) = customer_with_address(&mut builder);
        let status = builder.add_property(customer, "Status", address_kind()).unwrap();
        builder.to_json(address, "Address");

        let model = builder.finalize().unwrap();
        let kind = model.find_property(address, "Kind").unwrap();
        assert_eq!(model.property(kind).conversion(), Some(ValueConversion::EnumToString));
        assert_eq!(
            model.property(kind).conversion_source(),
            Some(ConfigurationSource::Convention)
        );

        // Not JSON-mapped
        assert_eq!(model.property(status).conversion(), None);
    }

    #[test]
    fn explicit_conversion_wins() {
        let mut builder = ModelBuilder::new(DatabaseProvider::Postgres);
        let (_, address) = customer_with_address(&mut builder);
        builder.to_json(address, "Address");
        let kind = builder.find_property(address, "Kind").unwrap();
        builder.set_conversion(kind, Some(ValueConversion::EnumToNumber));

        let model = builder.finalize().unwrap();
        assert_eq!(model.property(kind).conversion(), Some(ValueConversion::EnumToNumber));
    }

    struct NumericEnums;

    impl ModelFinalizingConvention for NumericEnums {
        fn process_model_finalizing(&self, model: &mut Model) -> Result<(), ModelBuildingError> {
            for (_, property) in model.properties.iter_mut() {
                if property.value_type.is_enum() {
                    property.set_conversion(
                        Some(ValueConversion::EnumToNumber),
                        ConfigurationSource::Convention,
                    );
                }
            }
            Ok(())
        }
    }

    #[test]
    fn later_finalizing_conventions_win() {
        let mut builder = ModelBuilder::new(DatabaseProvider::Postgres);
        let (_, address) = customer_with_address(&mut builder);
        builder.to_json(address, "Address");
        builder
            .conventions_mut()
            .model_finalizing
            .push(Arc::new(NumericEnums));

        let model = builder.finalize().unwrap();
        let kind = model.find_property(address, "Kind").unwrap();
        assert_eq!(model.property(kind).conversion(), Some(ValueConversion::EnumToNumber));
    }
}
