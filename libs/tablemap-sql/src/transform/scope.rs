// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Restricting a statement to the rows of one entity type.
//!
//! Several entity types can live in one table: a whole hierarchy distinguished by a
//! discriminator column, entity types sharing rows through row-internal foreign keys, and
//! fragments of an entity type restricted by a condition. The scope of an entity type in a table
//! is the predicate that must be conjoined with any caller predicate so that a statement against
//! that table only touches rows of the entity type.

use std::collections::HashMap;

use tablemap_model::{
    DiscriminatorScope, EntityTypeId, LiteralValue, MappingShape, Model, PropertyId, TableId,
};

use crate::asql::{
    operand::Operand,
    predicate::{AbstractPredicate, filters_predicate},
};

/// Scopes of every entity type in every table it is mapped onto, resolved once per model.
pub struct ScopeResolver<'m> {
    model: &'m Model,
    scopes: HashMap<(EntityTypeId, TableId), AbstractPredicate>,
}

impl<'m> ScopeResolver<'m> {
    pub fn new(model: &'m Model) -> Self {
        let mut scopes = HashMap::new();

        for (entity_type, entity) in model.entity_types.iter() {
            for table in &entity.tables {
                let conjuncts = scope_conjuncts(model, entity_type, &entity.shape, *table);
                scopes.insert(
                    (entity_type, *table),
                    AbstractPredicate::and_all(conjuncts),
                );
            }
        }

        Self { model, scopes }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// The predicate selecting the rows of `entity_type` in `table`. `None` if the entity type
    /// is not mapped onto the table, which is always the case for JSON-mapped types and types
    /// mapped onto a query.
    pub fn scope(&self, entity_type: EntityTypeId, table: TableId) -> Option<&AbstractPredicate> {
        self.scopes.get(&(entity_type, table))
    }
}

/// Conjuncts in order: fragment condition, presence check, discriminator. Only conjuncts whose
/// columns live in `table` are produced.
fn scope_conjuncts(
    model: &Model,
    entity_type: EntityTypeId,
    shape: &MappingShape,
    table: TableId,
) -> Vec<AbstractPredicate> {
    match shape {
        MappingShape::Unmapped { .. }
        | MappingShape::JsonMapped { .. }
        | MappingShape::SingleTable { .. } => vec![],
        MappingShape::DiscriminatedHierarchy {
            discriminator,
            scope,
            ..
        } => {
            if model.table(table).column_for(*discriminator).is_none() {
                return vec![];
            }
            discriminator_conjuncts(*discriminator, scope)
        }
        MappingShape::RowSharing {
            base,
            table: shared_table,
            optional_dependent,
            ..
        } => {
            let mut conjuncts = vec![];
            if *shared_table == table && *optional_dependent {
                conjuncts.extend(presence_check(model, entity_type, table));
            }
            conjuncts.extend(scope_conjuncts(model, entity_type, base, table));
            conjuncts
        }
        MappingShape::FilteredFragment {
            base,
            fragment_table,
            condition,
        } => {
            let mut conjuncts = vec![];
            if *fragment_table == table {
                conjuncts.push(filters_predicate(condition));
            }
            conjuncts.extend(scope_conjuncts(model, entity_type, base, table));
            conjuncts
        }
    }
}

fn discriminator_conjuncts(
    discriminator: PropertyId,
    scope: &DiscriminatorScope,
) -> Vec<AbstractPredicate> {
    let column = Operand::property(discriminator);

    match scope {
        DiscriminatorScope::Unrestricted => vec![],
        DiscriminatorScope::Unsatisfiable => vec![AbstractPredicate::False],
        DiscriminatorScope::Values(values) => match values.as_slice() {
            [] => vec![AbstractPredicate::False],
            [value] => vec![AbstractPredicate::eq(column, Operand::literal(value.as_str()))],
            values => vec![AbstractPredicate::In(
                column,
                Operand::List(
                    values
                        .iter()
                        .map(|value| LiteralValue::from(value.as_str()))
                        .collect(),
                ),
            )],
        },
    }
}

/// A row of an optional dependent exists when any of its required columns is set. Without
/// required columns, any owned column counts.
fn presence_check(
    model: &Model,
    entity_type: EntityTypeId,
    table: TableId,
) -> Option<AbstractPredicate> {
    let discriminator = model.discriminator(entity_type).map(|d| d.property);

    let candidates: Vec<PropertyId> = model
        .owned_non_key_properties(entity_type, table)
        .into_iter()
        .filter(|property| Some(*property) != discriminator)
        .collect();
    let required: Vec<PropertyId> = candidates
        .iter()
        .copied()
        .filter(|property| !model.property(*property).nullable)
        .collect();

    let properties = if required.is_empty() {
        candidates
    } else {
        required
    };
    if properties.is_empty() {
        return None;
    }

    Some(AbstractPredicate::or_all(properties.into_iter().map(
        |property| AbstractPredicate::neq(Operand::property(property), Operand::Null),
    )))
}
