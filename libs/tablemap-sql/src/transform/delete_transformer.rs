// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
use tracing::instrument;

use crate::{
    asql::delete::AbstractBulkDelete, sql::statement::BulkOperation,
    translation_error::TranslationError,
};

use super::{
    bulk_transformer::BulkTransformer, strategy::bulk_strategy::BulkRequest,
    transformer::DeleteTransformer,
};

impl DeleteTransformer for BulkTransformer<'_> {
    /// Delete from the primary table of the entity type. Rows shared with other entity types
    /// (or split across tables) would leave the other entity types' data behind, so such
    /// deletes are rejected.
    #[instrument(name = "DeleteTransformer::to_bulk_operation", skip(self))]
    fn to_bulk_operation(
        &self,
        abstract_delete: &AbstractBulkDelete,
    ) -> Result<BulkOperation, TranslationError> {
        let model = self.model();
        let entity_type = abstract_delete.entity_type;

        let table = match self.mapped_table(entity_type) {
            Ok(table) => table,
            Err(reason) => return Ok(self.no_op(entity_type, reason)),
        };

        let entity = model.entity_type(entity_type);
        if let Some(shared) = entity
            .tables
            .iter()
            .find(|table| model.shares_rows(**table, entity_type))
            .or(entity.shape.is_split().then_some(&table))
        {
            return Err(TranslationError::SharedRowDelete {
                entity_type: entity.name.clone(),
                table: model.table(*shared).store_object.to_string(),
            });
        }

        self.run(BulkRequest {
            entity_type,
            table,
            predicate: self.scoped_predicate(entity_type, table, &abstract_delete.predicate),
            assignments: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use tablemap_model::{
        DatabaseProvider,
        testing::{customers_model, entity, vehicles_model},
    };
    use test_log::test;

    use super::*;
    use crate::{
        asql::predicate::AbstractPredicate,
        transform::test_util::{delete, translate},
    };

    #[test]
    fn row_sharing_types_cannot_be_deleted() {
        let model = vehicles_model(DatabaseProvider::SqlServer);

        for name in ["Vehicle", "Engine", "FuelTank"] {
            assert_eq!(
                translate(&model, delete(entity(&model, name), AbstractPredicate::True)),
                Err(TranslationError::SharedRowDelete {
                    entity_type: name.to_string(),
                    table: "Vehicles".to_string(),
                })
            );
        }
    }

    #[test]
    fn split_types_cannot_be_deleted() {
        let model = customers_model(DatabaseProvider::Postgres);

        assert_eq!(
            translate(
                &model,
                delete(entity(&model, "Customer"), AbstractPredicate::True)
            ),
            Err(TranslationError::SharedRowDelete {
                entity_type: "Customer".to_string(),
                table: "Customers".to_string(),
            })
        );
    }
}
