// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
use tablemap_model::TableId;
use tracing::instrument;

use crate::{
    asql::update::AbstractBulkUpdate, sql::statement::BulkOperation,
    translation_error::TranslationError,
};

use super::{
    bulk_transformer::BulkTransformer, strategy::bulk_strategy::BulkRequest,
    transformer::UpdateTransformer,
};

impl UpdateTransformer for BulkTransformer<'_> {
    /// Update the single table holding every assigned column. Only columns owned by the entity
    /// type in that table may be assigned.
    #[instrument(name = "UpdateTransformer::to_bulk_operation", skip(self))]
    fn to_bulk_operation(
        &self,
        abstract_update: &AbstractBulkUpdate,
    ) -> Result<BulkOperation, TranslationError> {
        let model = self.model();
        let entity_type = abstract_update.entity_type;

        if let Err(reason) = self.mapped_table(entity_type) {
            return Ok(self.no_op(entity_type, reason));
        }

        let entity = model.entity_type(entity_type);
        let mut target: Option<TableId> = None;

        for assignment in &abstract_update.assignments {
            let property = model.property(assignment.property);
            let table = entity
                .tables
                .iter()
                .copied()
                .find(|table| model.table(*table).column_for(assignment.property).is_some())
                .ok_or_else(|| TranslationError::UnmappedProperty {
                    property: format!("{}.{}", entity.name, property.name),
                    table: entity
                        .tables
                        .first()
                        .map(|table| model.table(*table).store_object.to_string())
                        .unwrap_or_default(),
                })?;

            match target {
                Some(first) if first != table => {
                    return Err(TranslationError::AssignmentsSpanTables {
                        entity_type: entity.name.clone(),
                        first: model.table(first).store_object.to_string(),
                        second: model.table(table).store_object.to_string(),
                    });
                }
                _ => target = Some(table),
            }

            if !model
                .owned_non_key_properties(entity_type, table)
                .contains(&assignment.property)
            {
                return Err(TranslationError::ColumnNotOwned {
                    entity_type: entity.name.clone(),
                    property: property.name.clone(),
                    table: model.table(table).store_object.to_string(),
                });
            }
        }

        let Some(table) = target else {
            return Err(TranslationError::EmptyAssignments(entity.name.clone()));
        };

        self.run(BulkRequest {
            entity_type,
            table,
            predicate: self.scoped_predicate(entity_type, table, &abstract_update.predicate),
            assignments: Some(&abstract_update.assignments),
        })
    }
}
