// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
//! Translation of bulk deletes and updates over a mapped entity model into SQL.
//!
//! An [AbstractBulkOperation] expresses the intention to delete or update every entity of an
//! entity type matching a predicate. The predicate and assignments refer to properties, not
//! columns, and may reach other entity types through reference navigations or count related
//! entities. The [BulkTransformer] resolves the table the operation targets, restricts the
//! statement to the rows of the entity type (discriminator values, optional row-sharing
//! dependents, fragment conditions, global query filters) and renders a single statement in
//! the configured [Dialect](sql::dialect::Dialect).
//!
//! Operations that cannot touch any row, such as ones against an entity type read from a query
//! or stored in a JSON column, translate to [BulkOperation::NoOp] instead of a statement.

pub mod asql;
pub mod config;
pub mod sql;
mod transform;
mod translation_error;

pub use asql::{
    abstract_operation::AbstractBulkOperation,
    delete::AbstractBulkDelete,
    operand::{Operand, PropertyPath, RelatedCount},
    predicate::AbstractPredicate,
    update::{AbstractBulkUpdate, Assignment},
};
pub use config::{Environment, MapEnvironment, SystemEnvironment, TranslatorConfig};
pub use sql::{
    dialect::Dialect,
    statement::{BulkOperation, NoOpReason, SqlStatement},
};
pub use transform::{
    BulkTransformer, DeleteTransformer, OperationTransformer, ScopeResolver, UpdateTransformer,
};
pub use translation_error::TranslationError;
