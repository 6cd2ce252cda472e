// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
#![cfg(test)]

use tablemap_model::{EntityTypeId, ForeignKeyId, Model, PropertyId, testing::entity};

use crate::{
    asql::{
        abstract_operation::AbstractBulkOperation,
        delete::AbstractBulkDelete,
        operand::Operand,
        predicate::AbstractPredicate,
        update::{AbstractBulkUpdate, Assignment},
    },
    config::TranslatorConfig,
    sql::{dialect::Dialect, statement::BulkOperation},
    translation_error::TranslationError,
};

use super::bulk_transformer::BulkTransformer;

macro_rules! assert_params {
    ($actual_params:expr) => {
        assert!($actual_params.is_empty(), "Extra actual parameters");
    };
    ($actual_params:expr, $expected_param:expr $(, $rest:expr)*) => {
        match $actual_params.split_first() {
            Some((actual_head, actual_tail)) => {
                assert_eq!(
                    actual_head,
                    &tablemap_model::LiteralValue::from($expected_param),
                    "Parameter mismatch"
                );
                assert_params!(actual_tail $(, $rest)*);
            }
            None => panic!("Missing actual parameters"),
        }
    };
}

macro_rules! assert_statement {
    ($actual:expr, $expected_sql:expr $(, $param:expr)*) => {
        match $actual {
            $crate::sql::statement::BulkOperation::Statement(statement) => {
                assert_eq!(statement.sql, $expected_sql);
                assert_params!(statement.params $(, $param)*);
            }
            other => panic!("Expected a statement, got {other:?}"),
        }
    };
}

/// Translate with the dialect of the model's provider.
pub fn translate(
    model: &Model,
    operation: AbstractBulkOperation,
) -> Result<BulkOperation, TranslationError> {
    BulkTransformer::for_model(model).translate(&operation)
}

pub fn translate_with(
    model: &Model,
    dialect: Dialect,
    operation: AbstractBulkOperation,
) -> Result<BulkOperation, TranslationError> {
    BulkTransformer::new(model, TranslatorConfig::new(dialect)).translate(&operation)
}

pub fn delete(entity_type: EntityTypeId, predicate: AbstractPredicate) -> AbstractBulkOperation {
    AbstractBulkOperation::Delete(AbstractBulkDelete {
        entity_type,
        predicate,
    })
}

pub fn update(
    entity_type: EntityTypeId,
    predicate: AbstractPredicate,
    assignments: Vec<(PropertyId, Operand)>,
) -> AbstractBulkOperation {
    AbstractBulkOperation::Update(AbstractBulkUpdate {
        entity_type,
        predicate,
        assignments: assignments
            .into_iter()
            .map(|(property, value)| Assignment::new(property, value))
            .collect(),
    })
}

/// The single foreign key declared on `dependent`.
pub fn foreign_key(model: &Model, dependent: &str) -> ForeignKeyId {
    let declared = &model.entity_type(entity(model, dependent)).declared_foreign_keys;
    assert_eq!(declared.len(), 1, "expected a single foreign key on '{dependent}'");
    declared[0]
}
