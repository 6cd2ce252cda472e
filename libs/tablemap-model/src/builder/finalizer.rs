// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolution of the relational mapping of a declared model.
//!
//! Runs in dependency order: hierarchies, principal keys, store objects, tables and columns,
//! row-internal foreign keys, principal closures and finally mapping shapes. Each step only
//! reads what the previous steps resolved.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::{
    entity_type::{AnnotationName, Discriminator, EntityTypeId},
    error::ModelBuildingError,
    model::Model,
    shape::{DiscriminatorScope, MappingShape, UnmappedReason},
    store_object::StoreObjectIdentifier,
    table::{ColumnMapping, MAX_ENTITY_TYPES_SHARING_TABLE, Table},
    type_mapping::TypeMappingSource,
    value::ValueType,
};

#[instrument(name = "ModelBuilder::finalize", skip_all)]
pub(super) fn finalize(
    mut model: Model,
    type_mapping_source: &dyn TypeMappingSource,
) -> Result<Model, ModelBuildingError> {
    resolve_hierarchies(&mut model);
    resolve_principal_keys(&mut model);
    validate_discriminators(&model)?;
    resolve_store_objects(&mut model)?;
    build_tables(&mut model, type_mapping_source)?;
    check_table_sharing_limit(&model)?;
    resolve_row_internal_foreign_keys(&mut model)?;
    resolve_principal_closures(&mut model)?;
    resolve_shapes(&mut model);

    debug!(
        "Finalized model with {} entity types mapped onto {} tables",
        model.entity_types.len(),
        model.tables.len()
    );

    Ok(model)
}

fn resolve_hierarchies(model: &mut Model) {
    let ids = model.entity_types.ids();

    for id in &ids {
        if let Some(base_type) = model.entity_types[*id].base_type {
            model.entity_types[base_type].derived_types.push(*id);
        }
    }

    for id in ids {
        let mut chain = model.base_types(id);
        chain.reverse();
        chain.push(id);

        let properties: Vec<_> = chain
            .iter()
            .flat_map(|t| model.entity_types[*t].declared_properties.iter().copied())
            .collect();
        model.entity_types[id].properties = properties;
    }
}

fn resolve_principal_keys(model: &mut Model) {
    let resolved: Vec<_> = model
        .foreign_keys
        .iter()
        .map(|(id, fk)| {
            let is_primary = model.primary_key(fk.principal) == Some(fk.principal_key.as_slice());
            (id, is_primary)
        })
        .collect();

    for (id, is_primary) in resolved {
        model.foreign_keys[id].principal_key_is_primary = is_primary;
    }
}

fn validate_discriminators(model: &Model) -> Result<(), ModelBuildingError> {
    for (root, entity_type) in model.entity_types.iter() {
        if entity_type.base_type.is_some() || entity_type.is_mapped_to_json() {
            continue;
        }

        let Some(discriminator) = &entity_type.discriminator else {
            if !entity_type.derived_types.is_empty() {
                return Err(ModelBuildingError::InvalidDiscriminator {
                    entity_type: entity_type.name.clone(),
                    message: "a hierarchy mapped onto a single table needs a discriminator"
                        .to_string(),
                });
            }
            continue;
        };

        if model.properties[discriminator.property].declaring_entity_type != root {
            return Err(ModelBuildingError::InvalidDiscriminator {
                entity_type: entity_type.name.clone(),
                message: "the discriminator property must be declared on the root".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for concrete in model.concrete_derived_types_inclusive(root) {
            let value = model.entity_types[concrete].discriminator_value();
            if !seen.insert(value) {
                return Err(ModelBuildingError::InvalidDiscriminator {
                    entity_type: model.entity_types[concrete].name.clone(),
                    message: format!("discriminator value '{value}' is used more than once"),
                });
            }
        }
    }

    Ok(())
}

fn resolve_store_objects(model: &mut Model) -> Result<(), ModelBuildingError> {
    let resolved = model
        .entity_types
        .ids()
        .into_iter()
        .map(|id| Ok((id, resolve_store_object(model, id, 0)?)))
        .collect::<Result<Vec<_>, ModelBuildingError>>()?;

    for (id, store_object) in resolved {
        model.entity_types[id].store_object = store_object;
    }
    Ok(())
}

/// Derived types live in their root's table and owned types in their owner's, unless they are
/// mapped somewhere explicitly. JSON-mapped types have no store object of their own.
fn resolve_store_object(
    model: &Model,
    entity_type: EntityTypeId,
    depth: usize,
) -> Result<Option<StoreObjectIdentifier>, ModelBuildingError> {
    let current = &model.entity_types[entity_type];
    if depth > model.entity_types.len() {
        return Err(ModelBuildingError::Generic(format!(
            "Ownership cycle involving '{}'",
            current.name
        )));
    }

    if current.is_mapped_to_json() {
        return Ok(None);
    }
    if current.base_type.is_some() {
        return resolve_store_object(model, model.root_type(entity_type), depth + 1);
    }

    let schema = current
        .annotation(AnnotationName::Schema)
        .map(|schema| schema.to_string());

    if current.annotation(AnnotationName::SqlQuery).is_some() {
        return Ok(Some(StoreObjectIdentifier::sql_query(&current.name)));
    }
    if let Some(view) = current.annotation(AnnotationName::ViewName) {
        return Ok(Some(StoreObjectIdentifier::view(view, schema)));
    }
    if let Some(table) = current.annotation(AnnotationName::TableName) {
        return Ok(Some(StoreObjectIdentifier::table(table, schema)));
    }
    if let Some(ownership) = model.ownership(entity_type) {
        return resolve_store_object(model, ownership.principal, depth + 1);
    }

    Ok(Some(StoreObjectIdentifier::table(&current.name, schema)))
}

struct PlannedColumn {
    store_object: StoreObjectIdentifier,
    name: String,
    store_type: String,
    nullable: bool,
    mapping: ColumnMapping,
}

fn build_tables(
    model: &mut Model,
    type_mapping_source: &dyn TypeMappingSource,
) -> Result<(), ModelBuildingError> {
    let mut plans = vec![];
    for id in model.entity_types.ids() {
        let store_objects = entity_store_objects(model, id);
        let columns = plan_columns(model, id, &store_objects, type_mapping_source)?;
        plans.push((id, store_objects, columns));
    }

    for (id, store_objects, columns) in plans {
        let mut table_ids = vec![];
        for store_object in store_objects {
            let table_id = match model.table_id(&store_object) {
                Some(table_id) => table_id,
                None => {
                    let key = store_object.key();
                    model
                        .tables
                        .try_add(&key, Table::new(store_object))
                        .ok_or_else(|| {
                            ModelBuildingError::Generic(format!("Duplicate table '{key}'"))
                        })?
                }
            };
            model.tables[table_id].add_entity_type(id);
            table_ids.push(table_id);
        }

        for column in columns {
            let table_id = match model.table_id(&column.store_object) {
                Some(table_id) => table_id,
                None => {
                    let key = column.store_object.key();
                    model
                        .tables
                        .try_add(&key, Table::new(column.store_object.clone()))
                        .ok_or_else(|| {
                            ModelBuildingError::Generic(format!("Duplicate table '{key}'"))
                        })?
                }
            };
            model.tables[table_id].map_column(
                &column.name,
                &column.store_type,
                column.nullable,
                column.mapping,
            );
        }

        model.entity_types[id].tables = table_ids;
    }

    Ok(())
}

/// The writable store objects of an entity type: its primary one first, then fragments.
fn entity_store_objects(model: &Model, entity_type: EntityTypeId) -> Vec<StoreObjectIdentifier> {
    let mut store_objects: Vec<StoreObjectIdentifier> = vec![];

    let primary = model.entity_types[entity_type]
        .store_object
        .iter()
        .filter(|store_object| store_object.is_writable())
        .cloned();
    let fragments = model
        .mapping_fragments(entity_type)
        .into_iter()
        .map(|fragment| fragment.store_object.clone());

    for store_object in primary.chain(fragments) {
        if !store_objects.contains(&store_object) {
            store_objects.push(store_object);
        }
    }
    store_objects
}

fn plan_columns(
    model: &Model,
    entity_type: EntityTypeId,
    store_objects: &[StoreObjectIdentifier],
    type_mapping_source: &dyn TypeMappingSource,
) -> Result<Vec<PlannedColumn>, ModelBuildingError> {
    let current = &model.entity_types[entity_type];

    if current.is_mapped_to_json() {
        return plan_json_column(model, entity_type, type_mapping_source);
    }

    let Some(primary) = store_objects.first() else {
        return Ok(vec![]);
    };
    let fragments = model.mapping_fragments(entity_type);

    let optional_dependent = current
        .declared_foreign_keys
        .iter()
        .map(|id| &model.foreign_keys[*id])
        .any(|fk| !fk.is_required_dependent && model.is_row_internal(fk, primary));

    let mut columns = vec![];
    for property_id in &current.declared_properties {
        let property = &model.properties[*property_id];
        let store_type = type_mapping_source
            .find_converted_mapping(&property.value_type, property.conversion())
            .ok_or_else(|| {
                ModelBuildingError::Generic(format!(
                    "No type mapping for property '{}' of '{}'",
                    property.name, current.name
                ))
            })?
            .store_type
            .clone();

        let is_key = model.is_primary_key_property(entity_type, *property_id);
        let nullable = !is_key
            && (property.nullable || current.base_type.is_some() || optional_dependent);

        let targets: Vec<&StoreObjectIdentifier> = if is_key {
            store_objects.iter().collect()
        } else {
            let fragment = fragments
                .iter()
                .find(|fragment| fragment.properties.contains(property_id));
            vec![fragment.map_or(primary, |fragment| &fragment.store_object)]
        };

        for store_object in targets {
            columns.push(PlannedColumn {
                store_object: store_object.clone(),
                name: property.column_name().to_string(),
                store_type: store_type.clone(),
                nullable,
                mapping: ColumnMapping {
                    entity_type,
                    property: Some(*property_id),
                },
            });
        }
    }

    // Keys declared on the root also identify rows of the fragment tables of derived types
    if current.base_type.is_some() {
        for key_property in model.primary_key(entity_type).unwrap_or_default() {
            let property = &model.properties[*key_property];
            let Some(mapping) = type_mapping_source
                .find_converted_mapping(&property.value_type, property.conversion())
            else {
                continue;
            };
            for store_object in &store_objects[1..] {
                columns.push(PlannedColumn {
                    store_object: store_object.clone(),
                    name: property.column_name().to_string(),
                    store_type: mapping.store_type.clone(),
                    nullable: false,
                    mapping: ColumnMapping {
                        entity_type,
                        property: Some(*key_property),
                    },
                });
            }
        }
    }

    Ok(columns)
}

/// A JSON-mapped type contributes one column to its owner's table.
fn plan_json_column(
    model: &Model,
    entity_type: EntityTypeId,
    type_mapping_source: &dyn TypeMappingSource,
) -> Result<Vec<PlannedColumn>, ModelBuildingError> {
    let current = &model.entity_types[entity_type];
    let Some(ownership) = model.ownership(entity_type) else {
        return Err(ModelBuildingError::Generic(format!(
            "JSON-mapped entity type '{}' must be owned by another entity type",
            current.name
        )));
    };

    // Nested JSON types are serialized into their owner's document
    let Some(owner_store_object) = model.entity_types[ownership.principal]
        .store_object
        .clone()
        .filter(|store_object| store_object.is_writable())
    else {
        return Ok(vec![]);
    };

    let mapping = match &current.json_column_type_mapping {
        Some(mapping) => Some(mapping.clone()),
        None => type_mapping_source.find_mapping(&ValueType::JsonElement),
    };
    let store_type = mapping
        .map(|mapping| mapping.store_type.clone())
        .ok_or_else(|| {
            ModelBuildingError::Generic(format!(
                "No JSON type mapping for '{}'",
                current.name
            ))
        })?;

    Ok(vec![PlannedColumn {
        store_object: owner_store_object,
        name: current.json_column_name().unwrap_or_default().to_string(),
        store_type,
        nullable: !ownership.is_required_dependent,
        mapping: ColumnMapping {
            entity_type,
            property: None,
        },
    }])
}

fn check_table_sharing_limit(model: &Model) -> Result<(), ModelBuildingError> {
    for (_, table) in model.tables.iter() {
        let count = table.entity_type_mappings.len();
        if count > MAX_ENTITY_TYPES_SHARING_TABLE {
            return Err(ModelBuildingError::TooManySharingEntityTypes {
                table: table.store_object.to_string(),
                count,
                limit: MAX_ENTITY_TYPES_SHARING_TABLE,
            });
        }
    }
    Ok(())
}

fn resolve_row_internal_foreign_keys(model: &mut Model) -> Result<(), ModelBuildingError> {
    for (_, fk) in model.foreign_keys.iter() {
        let dependent = &model.entity_types[fk.dependent];
        if !dependent.is_keyless()
            || !fk.principal_key_is_primary
            || dependent.is_mapped_to_json()
            || model.is_assignable_from(fk.principal, fk.dependent)
        {
            continue;
        }

        if let Some(store_object) = &dependent.store_object {
            if store_object.is_writable() && model.is_mapped_to(fk.principal, store_object) {
                return Err(ModelBuildingError::KeylessRowSharingDependent {
                    entity_type: dependent.name.clone(),
                    principal: model.entity_types[fk.principal].name.clone(),
                    table: store_object.to_string(),
                });
            }
        }
    }

    for table_id in model.tables.ids() {
        let store_object = &model.tables[table_id].store_object;
        let row_internal: Vec<_> = model
            .foreign_keys
            .iter()
            .filter(|(_, fk)| model.is_row_internal(fk, store_object))
            .map(|(id, _)| id)
            .collect();
        model.tables[table_id].row_internal_foreign_keys = row_internal;
    }

    Ok(())
}

fn resolve_principal_closures(model: &mut Model) -> Result<(), ModelBuildingError> {
    for table_id in model.tables.ids() {
        let closures = {
            let table = &model.tables[table_id];
            let mut closures = IndexMap::new();
            for entity_type in &table.entity_type_mappings {
                closures.insert(
                    *entity_type,
                    model.compute_principal_closure(table, *entity_type)?,
                );
            }
            closures
        };
        model.tables[table_id].principal_closures = closures;
    }
    Ok(())
}

fn resolve_shapes(model: &mut Model) {
    for id in model.entity_types.ids() {
        let shape = resolve_shape(model, id);
        model.entity_types[id].shape = shape;
    }
}

fn resolve_shape(model: &Model, entity_type: EntityTypeId) -> MappingShape {
    let current = &model.entity_types[entity_type];

    if current.is_mapped_to_json() {
        if let Some(ownership) = model.ownership(entity_type) {
            return MappingShape::JsonMapped {
                owner: ownership.principal,
            };
        }
    }

    match &current.store_object {
        Some(store_object) if !store_object.is_writable() => {
            return MappingShape::Unmapped {
                reason: UnmappedReason::QuerySource,
            };
        }
        _ => {}
    }

    let Some(table) = current.primary_table() else {
        return MappingShape::Unmapped {
            reason: UnmappedReason::NoStoreObject,
        };
    };

    let mut shape = match model.discriminator(entity_type) {
        Some(discriminator) => MappingShape::DiscriminatedHierarchy {
            table,
            discriminator: discriminator.property,
            scope: discriminator_scope(model, entity_type, discriminator),
        },
        None => MappingShape::SingleTable { table },
    };

    // Rows can be shared in the primary table and in fragment tables alike
    for table in &current.tables {
        let principals: Vec<_> = model
            .principal_closure(*table, entity_type)
            .map(|closure| closure.iter().copied().collect())
            .unwrap_or_default();
        if principals.is_empty() {
            continue;
        }

        let optional_dependent = model
            .row_internal_foreign_keys(*table, entity_type)
            .into_iter()
            .any(|fk| !model.foreign_keys[fk].is_required_dependent);

        shape = MappingShape::RowSharing {
            base: Box::new(shape),
            table: *table,
            principals,
            optional_dependent,
        };
    }

    for fragment in model.mapping_fragments(entity_type) {
        let Some(fragment_table) = model.table_id(&fragment.store_object) else {
            continue;
        };
        shape = MappingShape::FilteredFragment {
            base: Box::new(shape),
            fragment_table,
            condition: fragment.condition.clone(),
        };
    }

    shape
}

fn discriminator_scope(
    model: &Model,
    entity_type: EntityTypeId,
    discriminator: &Discriminator,
) -> DiscriminatorScope {
    let values: Vec<String> = model
        .concrete_derived_types_inclusive(entity_type)
        .into_iter()
        .map(|id| model.entity_types[id].discriminator_value().to_string())
        .collect();

    if values.is_empty() {
        DiscriminatorScope::Unsatisfiable
    } else if model.root_type(entity_type) == entity_type && discriminator.mapping_complete {
        DiscriminatorScope::Unrestricted
    } else {
        DiscriminatorScope::Values(values)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::{
        builder::ModelBuilder,
        foreign_key::ForeignKeySpec,
        testing::{AnimalsOptions, animals_model, customers_model, entity, vehicles_model},
        type_mapping::DatabaseProvider,
    };

    use super::*;

    #[test]
    fn discriminator_scopes() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());
        let scope = |name: &str| match model.mapping_shape(entity(&model, name)) {
            MappingShape::DiscriminatedHierarchy { scope, .. } => scope.clone(),
            other => panic!("unexpected shape {other:?}"),
        };

        assert_eq!(scope("Animal"), DiscriminatorScope::Unrestricted);
        assert_eq!(
            scope("Bird"),
            DiscriminatorScope::Values(vec!["Kiwi".to_string(), "Eagle".to_string()])
        );
        assert_eq!(scope("Kiwi"), DiscriminatorScope::Values(vec!["Kiwi".to_string()]));
        assert_eq!(scope("Penguin"), DiscriminatorScope::Unsatisfiable);
    }

    #[test]
    fn hierarchy_without_concrete_types_is_unsatisfiable() {
        let mut builder = ModelBuilder::new(DatabaseProvider::Postgres);
        let shape = builder.add_entity_type("Shape").unwrap();
        builder.set_abstract(shape, true);
        builder.add_property(shape, "Id", ValueType::Int).unwrap();
        builder.set_primary_key(shape, &["Id"]).unwrap();
        builder.to_table(shape, "Shapes");
        builder.has_discriminator(shape, "Kind").unwrap();

        let polygon = builder.add_entity_type("Polygon").unwrap();
        builder.set_base_type(polygon, shape).unwrap();
        builder.set_abstract(polygon, true);

        let model = builder.finalize().unwrap();
        for id in [shape, polygon] {
            assert!(matches!(
                model.mapping_shape(id),
                MappingShape::DiscriminatedHierarchy {
                    scope: DiscriminatorScope::Unsatisfiable,
                    ..
                }
            ));
        }
    }

    #[test]
    fn incomplete_discriminator_mapping_restricts_the_root() {
        let model = animals_model(
            DatabaseProvider::SqlServer,
            AnimalsOptions {
                discriminator_complete: false,
                ..Default::default()
            },
        );
        let animal = entity(&model, "Animal");
        assert!(matches!(
            model.mapping_shape(animal),
            MappingShape::DiscriminatedHierarchy { scope: DiscriminatorScope::Values(values), .. }
                if values == &vec!["Kiwi".to_string(), "Eagle".to_string()]
        ));
    }

    #[test]
    fn hierarchy_shares_the_root_table() {
        let model = animals_model(DatabaseProvider::Sqlite, AnimalsOptions::default());
        let animal = entity(&model, "Animal");
        let kiwi = entity(&model, "Kiwi");
        let table = model.entity_type(animal).primary_table().unwrap();

        assert_eq!(model.entity_type(kiwi).primary_table(), Some(table));
        assert_eq!(model.table(table).name(), "Animals");

        let found_on = model.table(table).column("FoundOn").unwrap();
        assert_eq!(found_on.store_type, "INTEGER");
        assert!(found_on.nullable);
        assert!(!model.table(table).column("Name").unwrap().nullable);
    }

    #[test]
    fn query_source_and_json_shapes() {
        let animals = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());
        assert_eq!(
            animals.mapping_shape(entity(&animals, "EagleQuery")),
            &MappingShape::Unmapped {
                reason: UnmappedReason::QuerySource
            }
        );

        let customers = customers_model(DatabaseProvider::Postgres);
        let customer = entity(&customers, "Customer");
        let address = entity(&customers, "Address");
        assert_eq!(
            customers.mapping_shape(address),
            &MappingShape::JsonMapped { owner: customer }
        );

        let table = customers.entity_type(customer).primary_table().unwrap();
        let column = customers.table(table).column("Address").unwrap();
        assert_eq!(column.store_type, "jsonb");
        assert_eq!(
            column.mappings,
            vec![ColumnMapping {
                entity_type: address,
                property: None
            }]
        );
        assert!(customers.table(table).column("Street").is_none());
    }

    #[test]
    fn json_enum_columns_are_not_created() {
        let customers = customers_model(DatabaseProvider::SqlServer);
        let address = entity(&customers, "Address");
        assert!(customers.entity_type(address).tables.is_empty());
    }

    #[test]
    fn row_sharing_and_fragment_shapes() {
        let model = vehicles_model(DatabaseProvider::SqlServer);
        let vehicle = entity(&model, "Vehicle");
        let engine = entity(&model, "Engine");
        let operator = entity(&model, "Operator");
        let table = model.entity_type(vehicle).primary_table().unwrap();

        assert_eq!(model.mapping_shape(vehicle), &MappingShape::SingleTable { table });
        assert_eq!(
            model.mapping_shape(engine),
            &MappingShape::RowSharing {
                base: Box::new(MappingShape::SingleTable { table }),
                table,
                principals: vec![vehicle],
                optional_dependent: true,
            }
        );
        assert!(matches!(
            model.mapping_shape(operator),
            MappingShape::RowSharing { optional_dependent: false, .. }
        ));

        let customers = customers_model(DatabaseProvider::Postgres);
        let customer = entity(&customers, "Customer");
        let tables = &customers.entity_type(customer).tables;
        assert!(matches!(
            customers.mapping_shape(customer),
            MappingShape::FilteredFragment { fragment_table, condition, .. }
                if *fragment_table == tables[1] && condition.len() == 1
        ));
    }

    #[test]
    fn optional_dependent_columns_are_nullable() {
        let model = vehicles_model(DatabaseProvider::SqlServer);
        let table = model
            .entity_type(entity(&model, "Vehicle"))
            .primary_table()
            .unwrap();

        assert!(model.table(table).column("FuelType").unwrap().nullable);
        assert!(!model.table(table).column("OperatorName").unwrap().nullable);
        assert!(!model.table(table).column("Id").unwrap().nullable);
    }

    #[test]
    fn hierarchy_without_discriminator_is_rejected() {
        let mut builder = ModelBuilder::new(DatabaseProvider::Sqlite);
        let animal = builder.add_entity_type("Animal").unwrap();
        let bird = builder.add_entity_type("Bird").unwrap();
        builder.set_base_type(bird, animal).unwrap();

        assert!(matches!(
            builder.finalize(),
            Err(ModelBuildingError::InvalidDiscriminator { .. })
        ));
    }

    #[test]
    fn duplicate_discriminator_values_are_rejected() {
        let mut builder = ModelBuilder::new(DatabaseProvider::Sqlite);
        let animal = builder.add_entity_type("Animal").unwrap();
        builder.has_discriminator(animal, "Discriminator").unwrap();
        let bird = builder.add_entity_type("Bird").unwrap();
        builder.set_base_type(bird, animal).unwrap();
        builder.set_discriminator_value(bird, "Animal");

        assert!(matches!(
            builder.finalize(),
            Err(ModelBuildingError::InvalidDiscriminator { .. })
        ));
    }

    #[test]
    fn keyless_row_sharing_dependent_is_rejected() {
        let mut builder = ModelBuilder::new(DatabaseProvider::SqlServer);
        let vehicle = builder.add_entity_type("Vehicle").unwrap();
        builder.add_property(vehicle, "Id", ValueType::Int).unwrap();
        builder.set_primary_key(vehicle, &["Id"]).unwrap();
        builder.to_table(vehicle, "Vehicles");

        let badge = builder.add_entity_type("Badge").unwrap();
        builder.add_property(badge, "VehicleId", ValueType::Int).unwrap();
        builder.to_table(badge, "Vehicles");
        builder
            .add_foreign_key(ForeignKeySpec::new(badge, vehicle, &["VehicleId"]))
            .unwrap();

        assert!(matches!(
            builder.finalize(),
            Err(ModelBuildingError::KeylessRowSharingDependent { ref entity_type, .. })
                if entity_type == "Badge"
        ));
    }

    #[test]
    fn too_many_entity_types_in_one_table() {
        let mut builder = ModelBuilder::new(DatabaseProvider::SqlServer);
        for i in 0..=MAX_ENTITY_TYPES_SHARING_TABLE {
            let id = builder.add_entity_type(&format!("Part{i}")).unwrap();
            builder.add_property(id, "Id", ValueType::Int).unwrap();
            builder.set_primary_key(id, &["Id"]).unwrap();
            builder.to_table(id, "Parts");
        }

        assert_eq!(
            builder.finalize().unwrap_err(),
            ModelBuildingError::TooManySharingEntityTypes {
                table: "Parts".to_string(),
                count: MAX_ENTITY_TYPES_SHARING_TABLE + 1,
                limit: MAX_ENTITY_TYPES_SHARING_TABLE,
            }
        );
    }
}
