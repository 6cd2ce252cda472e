// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{entity_type::EntityTypeId, model::Model, property::PropertyId, table::TableId};

impl Model {
    /// Non-key properties of `entity_type` whose columns in `table` belong to it.
    ///
    /// A column mapped from several properties belongs to the most dependent entity type of a
    /// row-sharing chain: if any of its other sources is a row-sharing principal of
    /// `entity_type`, the property is left to that principal. Properties mapped onto another
    /// table through a fragment are skipped.
    pub fn owned_non_key_properties(
        &self,
        entity_type: EntityTypeId,
        table: TableId,
    ) -> Vec<PropertyId> {
        let table_ref = &self.tables[table];
        let principals = self.principal_closure(table, entity_type);

        let is_principal_mapping = |mapped_entity_type: EntityTypeId| {
            principals.is_some_and(|principals| {
                principals
                    .iter()
                    .any(|principal| self.is_assignable_from(mapped_entity_type, *principal))
            })
        };

        self.entity_types[entity_type]
            .properties
            .iter()
            .copied()
            .filter(|property| !self.is_primary_key_property(entity_type, *property))
            .filter(|property| match table_ref.column_for(*property) {
                None => false,
                Some(column) => {
                    !(column.is_shared()
                        && column
                            .mappings
                            .iter()
                            .any(|mapping| is_principal_mapping(mapping.entity_type)))
                }
            })
            .collect()
    }

    /// Column names of [`Model::owned_non_key_properties`].
    pub fn owned_non_key_columns(&self, entity_type: EntityTypeId, table: TableId) -> Vec<&str> {
        let table_ref = &self.tables[table];
        self.owned_non_key_properties(entity_type, table)
            .into_iter()
            .filter_map(|property| table_ref.column_for(property))
            .map(|column| column.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::{
        testing::{animals_model, customers_model, entity, vehicles_model},
        type_mapping::DatabaseProvider,
    };

    #[test]
    fn row_sharing_pair_partitions_shared_columns() {
        let model = vehicles_model(DatabaseProvider::SqlServer);
        let vehicle = entity(&model, "Vehicle");
        let engine = entity(&model, "Engine");
        let table = model.entity_type(vehicle).primary_table().unwrap();

        let vehicle_columns = model.owned_non_key_columns(vehicle, table);
        let engine_columns = model.owned_non_key_columns(engine, table);

        assert_eq!(vehicle_columns, vec!["Name", "Description"]);
        assert_eq!(engine_columns, vec!["FuelType", "Capacity"]);
        assert!(vehicle_columns.iter().all(|c| !engine_columns.contains(c)));
    }

    #[test]
    fn transitive_principal_columns_are_excluded() {
        let model = vehicles_model(DatabaseProvider::SqlServer);
        let vehicle = entity(&model, "Vehicle");
        let fuel_tank = entity(&model, "FuelTank");
        let table = model.entity_type(vehicle).primary_table().unwrap();

        // FuelTank.Description shares the column with Vehicle.Description through Engine
        assert_eq!(model.owned_non_key_columns(fuel_tank, table), vec!["Volume"]);
    }

    #[test]
    fn hierarchy_siblings_keep_their_columns() {
        let model = animals_model(DatabaseProvider::SqlServer, Default::default());
        let kiwi = entity(&model, "Kiwi");
        let table = model.entity_type(kiwi).primary_table().unwrap();

        assert_eq!(
            model.owned_non_key_columns(kiwi, table),
            vec!["Name", "CountryId", "Discriminator", "IsFlightless", "EagleId", "FoundOn"]
        );
    }

    #[test]
    fn fragment_properties_live_on_their_own_table() {
        let model = customers_model(DatabaseProvider::Postgres);
        let customer = entity(&model, "Customer");
        let tables = &model.entity_type(customer).tables;
        assert_eq!(tables.len(), 2);

        assert_eq!(model.owned_non_key_columns(customer, tables[0]), vec!["Name"]);
        assert_eq!(
            model.owned_non_key_columns(customer, tables[1]),
            vec!["Phone", "DetailsKind"]
        );
    }
}
