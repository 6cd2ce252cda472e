// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
use tablemap_model::{EntityTypeId, Model, TableId};

use crate::{
    asql::{operand::Operand, predicate::AbstractPredicate, update::Assignment},
    sql::{
        delete::Delete,
        dialect::Dialect,
        predicate::{ConcretePredicate, Predicate},
        statement::{BulkOperation, NoOpReason, SqlStatement},
        table::TableReference,
        update::Update,
    },
    transform::{
        bulk_transformer::BulkTransformer,
        predicate_transformer::{NavigationMode, PredicateTransformer},
    },
    translation_error::TranslationError,
};

/// A bulk delete or update resolved to its target table.
#[derive(Debug)]
pub(crate) struct BulkRequest<'r> {
    pub entity_type: EntityTypeId,
    pub table: TableId,
    /// The caller's predicate conjoined with the scope and query filter of the entity type.
    pub predicate: AbstractPredicate,
    /// `None` for a delete.
    pub assignments: Option<&'r [Assignment]>,
}

impl BulkRequest<'_> {
    pub(crate) fn has_navigations(&self) -> bool {
        self.predicate.any_operand(&Operand::is_navigation)
    }

    /// Whether inner-joining the principals of all navigations keeps exactly the rows the
    /// predicate selects. A joined navigation must be reached through `AND`s only, and through
    /// required foreign keys only.
    pub(crate) fn navigations_joinable(&self, model: &Model) -> bool {
        navigations_joinable(&self.predicate, model, false)
    }
}

fn navigations_joinable(predicate: &AbstractPredicate, model: &Model, conditional: bool) -> bool {
    match predicate {
        Predicate::And(l, r) => {
            navigations_joinable(l, model, conditional)
                && navigations_joinable(r, model, conditional)
        }
        Predicate::Or(l, r) => {
            navigations_joinable(l, model, true) && navigations_joinable(r, model, true)
        }
        Predicate::Not(p) => navigations_joinable(p, model, true),
        comparison => !comparison.any_operand(&|operand: &Operand| match operand {
            Operand::Property(path) if !path.navigations.is_empty() => {
                conditional
                    || path
                        .navigations
                        .iter()
                        .any(|foreign_key| !model.is_required_foreign_key(*foreign_key))
            }
            _ => false,
        }),
    }
}

pub(crate) trait BulkStrategy {
    /// A unique identifier for this strategy (for debugging purposes)
    fn id(&self) -> &'static str;

    /// Whether this strategy can render the request in the given dialect. Strategies are tried
    /// in order, so a strategy may assume that earlier ones were not suitable.
    fn suitable(&self, request: &BulkRequest, model: &Model, dialect: Dialect) -> bool;

    fn to_operation(
        &self,
        request: &BulkRequest,
        transformer: &BulkTransformer,
    ) -> Result<BulkOperation, TranslationError>;
}

/// Render the request as a single statement, reading referenced entity types as `mode` says.
pub(super) fn render_request(
    request: &BulkRequest,
    transformer: &BulkTransformer,
    mode: NavigationMode,
) -> Result<BulkOperation, TranslationError> {
    let model = transformer.model();
    let dialect = transformer.config().dialect;

    let mut predicates = PredicateTransformer::new(transformer.scopes(), mode);
    let target = predicates.source(request.entity_type, request.table);

    let predicate = predicates.to_predicate(&request.predicate, &target)?;
    if predicate == ConcretePredicate::False {
        return Ok(BulkOperation::NoOp(NoOpReason::Unsatisfiable));
    }

    let column_values = match request.assignments {
        Some(assignments) => Some(
            assignments
                .iter()
                .map(|assignment| {
                    predicates
                        .assignment(assignment, &target)
                        .map(|(column, value)| (column, value.into()))
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let joins = predicates.into_joins();
    let table = TableReference::new(model.table(request.table), &target.alias);

    let statement = match column_values {
        Some(column_values) => SqlStatement::render(
            &Update {
                table,
                joins,
                column_values,
                predicate: predicate.into(),
            },
            dialect,
        ),
        None => SqlStatement::render(
            &Delete {
                table,
                joins,
                predicate: predicate.into(),
            },
            dialect,
        ),
    };

    Ok(BulkOperation::Statement(statement))
}
