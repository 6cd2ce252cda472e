// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{
    arena::{MappedArena, SerializableSlab},
    entity_type::{Discriminator, EntityType, EntityTypeId},
    error::ModelBuildingError,
    foreign_key::{ForeignKey, ForeignKeyId},
    fragment::{MappingFragment, PropertyFilter},
    property::{Property, PropertyId},
    shape::MappingShape,
    store_object::StoreObjectIdentifier,
    table::{Table, TableId},
    type_mapping::DatabaseProvider,
};

/// The entity model together with its relational mapping.
///
/// While owned by a [`crate::ModelBuilder`] only the declared parts are populated. After
/// [`crate::ModelBuilder::finalize`] the model also holds the resolved tables, row-sharing
/// closures and mapping shapes, and is never mutated again.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Model {
    pub provider: DatabaseProvider,
    pub entity_types: MappedArena<EntityType>,
    pub properties: SerializableSlab<Property>,
    pub foreign_keys: SerializableSlab<ForeignKey>,
    pub tables: MappedArena<Table>,
}

impl Model {
    pub(crate) fn new(provider: DatabaseProvider) -> Self {
        Self {
            provider,
            entity_types: MappedArena::default(),
            properties: SerializableSlab::new(),
            foreign_keys: SerializableSlab::new(),
            tables: MappedArena::default(),
        }
    }

    pub fn entity_type(&self, id: EntityTypeId) -> &EntityType {
        &self.entity_types[id]
    }

    /// Like [`Model::entity_type`], but for ids that may come from another model.
    pub fn try_entity_type(&self, id: EntityTypeId) -> Result<&EntityType, ModelBuildingError> {
        self.entity_types
            .get(id)
            .ok_or_else(|| ModelBuildingError::UnknownEntityType(format!("{id:?}")))
    }

    pub fn entity_type_id(&self, name: &str) -> Option<EntityTypeId> {
        self.entity_types.get_id(name)
    }

    pub fn property(&self, id: PropertyId) -> &Property {
        &self.properties[id]
    }

    pub fn foreign_key(&self, id: ForeignKeyId) -> &ForeignKey {
        &self.foreign_keys[id]
    }

    /// Whether every dependent row references a principal, i.e. no foreign key property is
    /// nullable.
    pub fn is_required_foreign_key(&self, id: ForeignKeyId) -> bool {
        self.foreign_keys[id]
            .properties
            .iter()
            .all(|property| !self.properties[*property].nullable)
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id]
    }

    pub fn table_id(&self, store_object: &StoreObjectIdentifier) -> Option<TableId> {
        self.tables.get_id(&store_object.key())
    }

    pub fn mapping_shape(&self, entity_type: EntityTypeId) -> &MappingShape {
        &self.entity_types[entity_type].shape
    }

    /// The base types of `entity_type`, nearest first.
    pub fn base_types(&self, entity_type: EntityTypeId) -> Vec<EntityTypeId> {
        let mut base_types = vec![];
        let mut current = self.entity_types[entity_type].base_type;
        while let Some(base_type) = current {
            // Guard against cycles introduced by direct manipulation of the arena
            if base_type == entity_type || base_types.contains(&base_type) {
                break;
            }
            base_types.push(base_type);
            current = self.entity_types[base_type].base_type;
        }
        base_types
    }

    pub fn root_type(&self, entity_type: EntityTypeId) -> EntityTypeId {
        self.base_types(entity_type)
            .last()
            .copied()
            .unwrap_or(entity_type)
    }

    /// Whether a value of `candidate` is also a `target`, i.e. `target` is `candidate` or one of
    /// its base types.
    pub fn is_assignable_from(&self, target: EntityTypeId, candidate: EntityTypeId) -> bool {
        target == candidate || self.base_types(candidate).contains(&target)
    }

    /// `entity_type` and all its derived types, depth first. Requires a finalized model.
    pub fn derived_types_inclusive(&self, entity_type: EntityTypeId) -> Vec<EntityTypeId> {
        let mut result = vec![];
        let mut stack = vec![entity_type];
        while let Some(current) = stack.pop() {
            if result.contains(&current) {
                continue;
            }
            result.push(current);
            stack.extend(self.entity_types[current].derived_types.iter().rev().copied());
        }
        result
    }

    pub fn concrete_derived_types_inclusive(&self, entity_type: EntityTypeId) -> Vec<EntityTypeId> {
        self.derived_types_inclusive(entity_type)
            .into_iter()
            .filter(|id| !self.entity_types[*id].is_abstract)
            .collect()
    }

    /// Find a declared or inherited property by name.
    pub fn find_property(&self, entity_type: EntityTypeId, name: &str) -> Option<PropertyId> {
        std::iter::once(entity_type)
            .chain(self.base_types(entity_type))
            .flat_map(|id| self.entity_types[id].declared_properties.iter().copied())
            .find(|property| self.properties[*property].name == name)
    }

    pub fn primary_key(&self, entity_type: EntityTypeId) -> Option<&[PropertyId]> {
        self.entity_types[self.root_type(entity_type)]
            .primary_key
            .as_deref()
    }

    pub fn is_primary_key_property(&self, entity_type: EntityTypeId, property: PropertyId) -> bool {
        self.primary_key(entity_type)
            .is_some_and(|key| key.contains(&property))
    }

    pub fn discriminator(&self, entity_type: EntityTypeId) -> Option<&Discriminator> {
        self.entity_types[self.root_type(entity_type)]
            .discriminator
            .as_ref()
    }

    /// The global query filter, declared on the hierarchy root.
    pub fn query_filter(&self, entity_type: EntityTypeId) -> Option<&[PropertyFilter]> {
        self.entity_types[self.root_type(entity_type)]
            .query_filter
            .as_deref()
    }

    /// Fragments declared on `entity_type` or inherited from its base types.
    pub fn mapping_fragments(&self, entity_type: EntityTypeId) -> Vec<&MappingFragment> {
        std::iter::once(entity_type)
            .chain(self.base_types(entity_type))
            .flat_map(|id| self.entity_types[id].mapping_fragments.iter())
            .collect()
    }

    /// Whether `entity_type` is mapped onto `store_object` by its primary mapping or a fragment.
    pub fn is_mapped_to(
        &self,
        entity_type: EntityTypeId,
        store_object: &StoreObjectIdentifier,
    ) -> bool {
        self.entity_types[entity_type].store_object.as_ref() == Some(store_object)
            || self
                .mapping_fragments(entity_type)
                .iter()
                .any(|fragment| &fragment.store_object == store_object)
    }

    /// The foreign key through which a JSON-mapped or owned type is owned.
    pub fn ownership(&self, entity_type: EntityTypeId) -> Option<&ForeignKey> {
        self.entity_types[entity_type]
            .declared_foreign_keys
            .iter()
            .map(|id| &self.foreign_keys[*id])
            .find(|fk| fk.is_ownership)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::{
        builder::ModelBuilder,
        testing::{animals_model, entity},
        value::ValueType,
    };

    use super::*;

    #[test]
    fn hierarchy_navigation() {
        let model = animals_model(DatabaseProvider::SqlServer, Default::default());
        let animal = entity(&model, "Animal");
        let bird = entity(&model, "Bird");
        let kiwi = entity(&model, "Kiwi");
        let eagle = entity(&model, "Eagle");

        assert_eq!(model.base_types(kiwi), vec![bird, animal]);
        assert_eq!(model.root_type(kiwi), animal);
        assert!(model.is_assignable_from(animal, kiwi));
        assert!(!model.is_assignable_from(kiwi, animal));
        assert_eq!(model.concrete_derived_types_inclusive(animal), vec![kiwi, eagle]);
        assert_eq!(model.concrete_derived_types_inclusive(kiwi), vec![kiwi]);
    }

    #[test]
    fn entity_types_of_other_models_are_unknown() {
        let model = animals_model(DatabaseProvider::SqlServer, Default::default());
        let kiwi = entity(&model, "Kiwi");
        assert_eq!(model.try_entity_type(kiwi).unwrap().name, "Kiwi");

        let mut builder = ModelBuilder::new(DatabaseProvider::SqlServer);
        let country = builder.add_entity_type("Country").unwrap();
        builder.add_property(country, "Id", ValueType::Int).unwrap();
        builder.set_primary_key(country, &["Id"]).unwrap();
        builder.to_table(country, "Countries");
        let small = builder.finalize().unwrap();

        assert!(matches!(
            small.try_entity_type(kiwi),
            Err(ModelBuildingError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn inherited_properties_and_key() {
        let model = animals_model(DatabaseProvider::SqlServer, Default::default());
        let animal = entity(&model, "Animal");
        let kiwi = entity(&model, "Kiwi");

        let name = model.find_property(kiwi, "Name").unwrap();
        assert_eq!(model.property(name).declaring_entity_type, animal);
        assert_eq!(model.primary_key(kiwi), model.primary_key(animal));

        let kiwi_properties: Vec<_> = model
            .entity_type(kiwi)
            .properties
            .iter()
            .map(|p| model.property(*p).name.as_str())
            .collect();
        assert_eq!(
            kiwi_properties,
            vec!["Id", "Name", "CountryId", "Discriminator", "IsFlightless", "EagleId", "FoundOn"]
        );
    }
}
