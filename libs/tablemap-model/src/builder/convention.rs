// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use crate::{
    entity_type::{AnnotationName, EntityTypeId},
    error::ModelBuildingError,
    model::Model,
    type_mapping::TypeMappingSource,
};

use super::json_convention::JsonMappingConvention;

/// Notified whenever an annotation of an entity type changes value while the model is being
/// built.
pub trait EntityTypeAnnotationChangedConvention: Send + Sync {
    fn process_entity_type_annotation_changed(
        &self,
        model: &mut Model,
        entity_type: EntityTypeId,
        name: AnnotationName,
        new_value: Option<&str>,
        old_value: Option<&str>,
    );
}

/// Runs once, before the model is finalized. Conventions run in registration order, so a
/// convention registered later sees (and may override) the effects of earlier ones.
pub trait ModelFinalizingConvention: Send + Sync {
    fn process_model_finalizing(&self, model: &mut Model) -> Result<(), ModelBuildingError>;
}

/// The conventions consulted by a [`super::ModelBuilder`].
pub struct ConventionSet {
    pub entity_type_annotation_changed: Vec<Arc<dyn EntityTypeAnnotationChangedConvention>>,
    pub model_finalizing: Vec<Arc<dyn ModelFinalizingConvention>>,
}

impl ConventionSet {
    /// The built-in relational conventions.
    pub fn relational(type_mapping_source: Arc<dyn TypeMappingSource>) -> Self {
        let json_convention = Arc::new(JsonMappingConvention::new(type_mapping_source));

        let annotation_changed: Arc<dyn EntityTypeAnnotationChangedConvention> =
            json_convention.clone();
        let finalizing: Arc<dyn ModelFinalizingConvention> = json_convention;

        Self {
            entity_type_annotation_changed: vec![annotation_changed],
            model_finalizing: vec![finalizing],
        }
    }

    pub fn empty() -> Self {
        Self {
            entity_type_annotation_changed: vec![],
            model_finalizing: vec![],
        }
    }
}
