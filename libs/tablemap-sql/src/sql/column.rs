// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::LiteralValue;

use super::{ExpressionBuilder, SQLBuilder, select::Select};

/// An operand of a predicate or the value of an assignment.
#[derive(Debug, PartialEq, Clone)]
pub enum Column {
    /// A column of an aliased table such as `"a"."Name"`.
    Physical { table_alias: String, name: String },
    /// A constant rendered inline.
    Literal(LiteralValue),
    /// A constant passed as a statement parameter.
    Param(LiteralValue),
    Null,
    /// A parenthesized list such as `(1, 2)`, for the right side of `IN`.
    List(Vec<Column>),
    /// A scalar or list subquery such as `(SELECT COUNT(*) ...)`.
    SubSelect(Box<Select>),
}

impl Column {
    pub fn physical(table_alias: impl Into<String>, name: impl Into<String>) -> Self {
        Column::Physical {
            table_alias: table_alias.into(),
            name: name.into(),
        }
    }
}

impl ExpressionBuilder for Column {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Column::Physical { table_alias, name } => builder.push_column(table_alias, name),
            Column::Literal(value) => builder.push_literal(value),
            Column::Param(value) => builder.push_param(value.clone()),
            Column::Null => builder.push_str("NULL"),
            Column::List(elems) => {
                builder.push('(');
                builder.push_elems(elems, ", ");
                builder.push(')');
            }
            Column::SubSelect(select) => {
                builder.push('(');
                builder.indented(|builder| {
                    builder.push_newline();
                    select.build(builder);
                });
                builder.push(')');
            }
        }
    }
}
