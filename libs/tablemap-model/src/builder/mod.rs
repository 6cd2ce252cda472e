// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Declarative construction of a [`Model`].
//!
//! The builder owns the model while it is mutable and reports annotation changes to the
//! registered conventions. [`ModelBuilder::finalize`] runs the finalizing conventions, resolves
//! the relational mapping and hands out the immutable model.

pub mod convention;
mod finalizer;
pub mod json_convention;

use std::sync::Arc;

use crate::{
    entity_type::{AnnotationName, Discriminator, EntityType, EntityTypeId},
    error::ModelBuildingError,
    foreign_key::{ForeignKey, ForeignKeyId, ForeignKeySpec},
    fragment::{MappingFragment, PropertyFilter},
    model::Model,
    property::{Property, PropertyId},
    store_object::StoreObjectIdentifier,
    type_mapping::{DatabaseProvider, RelationalTypeMappingSource, TypeMappingSource},
    value::{ConfigurationSource, ValueConversion, ValueType},
};

use convention::ConventionSet;

pub struct ModelBuilder {
    model: Model,
    conventions: ConventionSet,
    type_mapping_source: Arc<dyn TypeMappingSource>,
}

impl ModelBuilder {
    /// A builder with the provider's built-in type mappings and the relational conventions.
    pub fn new(provider: DatabaseProvider) -> Self {
        Self::with_type_mapping_source(
            provider,
            Arc::new(RelationalTypeMappingSource::new(provider)),
        )
    }

    pub fn with_type_mapping_source(
        provider: DatabaseProvider,
        type_mapping_source: Arc<dyn TypeMappingSource>,
    ) -> Self {
        Self {
            model: Model::new(provider),
            conventions: ConventionSet::relational(type_mapping_source.clone()),
            type_mapping_source,
        }
    }

    /// The model as declared so far. Nothing is resolved until [`Self::finalize`].
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn conventions_mut(&mut self) -> &mut ConventionSet {
        &mut self.conventions
    }

    pub fn add_entity_type(&mut self, name: &str) -> Result<EntityTypeId, ModelBuildingError> {
        self.model
            .entity_types
            .try_add(name, EntityType::new(name))
            .ok_or_else(|| ModelBuildingError::DuplicateEntityType(name.to_string()))
    }

    pub fn set_base_type(
        &mut self,
        entity_type: EntityTypeId,
        base_type: EntityTypeId,
    ) -> Result<(), ModelBuildingError> {
        if self.model.is_assignable_from(entity_type, base_type) {
            return Err(ModelBuildingError::InheritanceCycle {
                entity_type: self.entity_type_name(entity_type),
                base_type: self.entity_type_name(base_type),
            });
        }

        self.model.entity_types[entity_type].base_type = Some(base_type);
        Ok(())
    }

    pub fn set_abstract(&mut self, entity_type: EntityTypeId, is_abstract: bool) {
        self.model.entity_types[entity_type].is_abstract = is_abstract;
    }

    pub fn add_property(
        &mut self,
        entity_type: EntityTypeId,
        name: &str,
        value_type: ValueType,
    ) -> Result<PropertyId, ModelBuildingError> {
        if self.model.find_property(entity_type, name).is_some() {
            return Err(ModelBuildingError::DuplicateProperty {
                entity_type: self.entity_type_name(entity_type),
                property: name.to_string(),
            });
        }

        let id = self
            .model
            .properties
            .insert(Property::new(name, entity_type, value_type));
        self.model.entity_types[entity_type]
            .declared_properties
            .push(id);
        Ok(id)
    }

    pub fn find_property(&self, entity_type: EntityTypeId, name: &str) -> Option<PropertyId> {
        self.model.find_property(entity_type, name)
    }

    pub fn set_nullable(&mut self, property: PropertyId, nullable: bool) {
        self.model.properties[property].nullable = nullable;
    }

    pub fn set_column_name(&mut self, property: PropertyId, column_name: &str) {
        self.model.properties[property].column_name = Some(column_name.to_string());
    }

    /// Explicitly configure how values of `property` are converted. Conventions never override
    /// this.
    pub fn set_conversion(&mut self, property: PropertyId, conversion: Option<ValueConversion>) {
        self.model.properties[property].set_conversion(conversion, ConfigurationSource::Explicit);
    }

    /// Declare the primary key of a hierarchy root.
    pub fn set_primary_key(
        &mut self,
        entity_type: EntityTypeId,
        properties: &[&str],
    ) -> Result<(), ModelBuildingError> {
        if self.model.entity_types[entity_type].base_type.is_some() {
            return Err(ModelBuildingError::Generic(format!(
                "The primary key of '{}' must be declared on its hierarchy root",
                self.entity_type_name(entity_type)
            )));
        }

        let key = self.resolve_properties(entity_type, properties)?;
        self.model.entity_types[entity_type].primary_key = Some(key);
        Ok(())
    }

    pub fn add_foreign_key(
        &mut self,
        spec: ForeignKeySpec,
    ) -> Result<ForeignKeyId, ModelBuildingError> {
        let invalid = |builder: &Self, message: String| ModelBuildingError::InvalidForeignKey {
            dependent: builder.entity_type_name(spec.dependent),
            principal: builder.entity_type_name(spec.principal),
            message,
        };

        let properties = self.resolve_properties(spec.dependent, spec.properties)?;
        let principal_key = match spec.principal_key {
            Some(names) => self.resolve_properties(spec.principal, names)?,
            None => self
                .model
                .primary_key(spec.principal)
                .map(|key| key.to_vec())
                .ok_or_else(|| invalid(self, "the principal has no primary key".to_string()))?,
        };

        if properties.is_empty() || properties.len() != principal_key.len() {
            return Err(invalid(
                self,
                format!(
                    "{} dependent properties do not match {} principal key properties",
                    properties.len(),
                    principal_key.len()
                ),
            ));
        }

        let id = self.model.foreign_keys.insert(ForeignKey {
            dependent: spec.dependent,
            principal: spec.principal,
            properties,
            principal_key,
            principal_key_is_primary: false,
            is_required_dependent: spec.is_required_dependent,
            is_ownership: spec.is_ownership,
        });

        self.model.entity_types[spec.dependent]
            .declared_foreign_keys
            .push(id);
        self.model.entity_types[spec.principal]
            .referencing_foreign_keys
            .push(id);
        Ok(id)
    }

    /// Set or remove an annotation, notifying the annotation-changed conventions if the value
    /// changed.
    pub fn set_annotation(
        &mut self,
        entity_type: EntityTypeId,
        name: AnnotationName,
        value: Option<&str>,
    ) {
        let annotations = &mut self.model.entity_types[entity_type].annotations;
        let old_value = match value {
            Some(value) => annotations.insert(name, value.to_string()),
            None => annotations.shift_remove(&name),
        };

        if old_value.as_deref() == value {
            return;
        }

        for convention in &self.conventions.entity_type_annotation_changed {
            convention.process_entity_type_annotation_changed(
                &mut self.model,
                entity_type,
                name,
                value,
                old_value.as_deref(),
            );
        }
    }

    pub fn to_table(&mut self, entity_type: EntityTypeId, name: &str) {
        self.set_annotation(entity_type, AnnotationName::TableName, Some(name));
    }

    pub fn to_view(&mut self, entity_type: EntityTypeId, name: &str) {
        self.set_annotation(entity_type, AnnotationName::ViewName, Some(name));
    }

    pub fn to_sql_query(&mut self, entity_type: EntityTypeId, sql: &str) {
        self.set_annotation(entity_type, AnnotationName::SqlQuery, Some(sql));
    }

    pub fn to_json(&mut self, entity_type: EntityTypeId, column_name: &str) {
        self.set_annotation(entity_type, AnnotationName::JsonColumnName, Some(column_name));
    }

    pub fn set_schema(&mut self, entity_type: EntityTypeId, schema: &str) {
        self.set_annotation(entity_type, AnnotationName::Schema, Some(schema));
    }

    /// Use the string property `property_name` of a hierarchy root as its discriminator, adding
    /// the property if it does not exist yet.
    pub fn has_discriminator(
        &mut self,
        root: EntityTypeId,
        property_name: &str,
    ) -> Result<PropertyId, ModelBuildingError> {
        self.ensure_root(root, "a discriminator")?;

        let property = match self.model.find_property(root, property_name) {
            Some(property) => property,
            None => self.add_property(root, property_name, ValueType::String)?,
        };

        if self.model.properties[property].value_type != ValueType::String {
            return Err(ModelBuildingError::InvalidDiscriminator {
                entity_type: self.entity_type_name(root),
                message: format!("discriminator property '{property_name}' must be a string"),
            });
        }

        self.model.entity_types[root].discriminator = Some(Discriminator {
            property,
            mapping_complete: true,
        });
        Ok(property)
    }

    pub fn set_discriminator_value(&mut self, entity_type: EntityTypeId, value: &str) {
        self.set_annotation(entity_type, AnnotationName::DiscriminatorValue, Some(value));
    }

    pub fn set_discriminator_mapping_complete(
        &mut self,
        root: EntityTypeId,
        complete: bool,
    ) -> Result<(), ModelBuildingError> {
        let name = self.entity_type_name(root);
        match self.model.entity_types[root].discriminator.as_mut() {
            Some(discriminator) => {
                discriminator.mapping_complete = complete;
                Ok(())
            }
            None => Err(ModelBuildingError::InvalidDiscriminator {
                entity_type: name,
                message: "no discriminator is configured".to_string(),
            }),
        }
    }

    /// Move `properties` onto `store_object`, for the rows matching `condition`.
    pub fn add_mapping_fragment(
        &mut self,
        entity_type: EntityTypeId,
        store_object: StoreObjectIdentifier,
        properties: &[&str],
        condition: Vec<PropertyFilter>,
    ) -> Result<(), ModelBuildingError> {
        let properties = self.resolve_properties(entity_type, properties)?;
        self.model.entity_types[entity_type]
            .mapping_fragments
            .push(MappingFragment {
                store_object,
                properties,
                condition,
            });
        Ok(())
    }

    /// A filter applied to every query against the hierarchy rooted at `root`.
    pub fn set_query_filter(
        &mut self,
        root: EntityTypeId,
        filter: Vec<PropertyFilter>,
    ) -> Result<(), ModelBuildingError> {
        self.ensure_root(root, "a query filter")?;
        self.model.entity_types[root].query_filter = (!filter.is_empty()).then_some(filter);
        Ok(())
    }

    /// Run the finalizing conventions and resolve the relational mapping.
    pub fn finalize(mut self) -> Result<Model, ModelBuildingError> {
        for convention in &self.conventions.model_finalizing {
            convention.process_model_finalizing(&mut self.model)?;
        }

        finalizer::finalize(self.model, self.type_mapping_source.as_ref())
    }

    fn ensure_root(&self, entity_type: EntityTypeId, what: &str) -> Result<(), ModelBuildingError> {
        if self.model.entity_types[entity_type].base_type.is_some() {
            return Err(ModelBuildingError::Generic(format!(
                "Only a hierarchy root can declare {what}, but '{}' has a base type",
                self.entity_type_name(entity_type)
            )));
        }
        Ok(())
    }

    fn resolve_properties(
        &self,
        entity_type: EntityTypeId,
        names: &[&str],
    ) -> Result<Vec<PropertyId>, ModelBuildingError> {
        names
            .iter()
            .map(|name| {
                self.model.find_property(entity_type, name).ok_or_else(|| {
                    ModelBuildingError::Generic(format!(
                        "Property '{name}' not found on '{}'",
                        self.entity_type_name(entity_type)
                    ))
                })
            })
            .collect()
    }

    fn entity_type_name(&self, entity_type: EntityTypeId) -> String {
        self.model.entity_types[entity_type].name.clone()
    }
}
