// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};
use tablemap_model::LiteralValue;

use super::{ExpressionBuilder, dialect::Dialect};

/// A rendered statement ready to be handed to a driver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    /// Values for the placeholders of `sql`, in order.
    pub params: Vec<LiteralValue>,
}

impl SqlStatement {
    pub fn render(expression: &impl ExpressionBuilder, dialect: Dialect) -> Self {
        let (sql, params) = expression.to_sql(dialect);
        Self { sql, params }
    }
}

/// Why a bulk operation affects no rows and needs no statement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The combined predicate can never be satisfied.
    Unsatisfiable,
    /// The entity type is read from a query and cannot be written.
    QuerySource,
    /// The entity type is stored inside a JSON column of its owner.
    JsonMapped,
    /// The entity type is not mapped onto any table.
    NoStoreObject,
}

/// The result of translating a bulk operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum BulkOperation {
    Statement(SqlStatement),
    NoOp(NoOpReason),
}

impl BulkOperation {
    pub fn statement(&self) -> Option<&SqlStatement> {
        match self {
            BulkOperation::Statement(statement) => Some(statement),
            BulkOperation::NoOp(_) => None,
        }
    }
}
