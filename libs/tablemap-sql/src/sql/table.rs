// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::Table;

use super::{ExpressionBuilder, SQLBuilder};

/// An aliased reference to a table, such as `[dbo].[Animals] AS [a]`.
#[derive(Debug, PartialEq, Clone)]
pub struct TableReference {
    pub name: String,
    pub schema: Option<String>,
    pub alias: String,
}

impl TableReference {
    pub fn new(table: &Table, alias: impl Into<String>) -> Self {
        Self {
            name: table.name().to_string(),
            schema: table.schema().map(|schema| schema.to_string()),
            alias: alias.into(),
        }
    }

    /// Build just the table name, without the alias.
    pub fn build_name(&self, builder: &mut SQLBuilder) {
        if let Some(schema) = &self.schema {
            builder.push_identifier(schema);
            builder.push('.');
        }
        builder.push_identifier(&self.name);
    }
}

impl ExpressionBuilder for TableReference {
    /// Build expression of the form `<name> AS <alias>`.
    fn build(&self, builder: &mut SQLBuilder) {
        self.build_name(builder);
        builder.push_str(" AS ");
        builder.push_identifier(&self.alias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;

    #[test]
    fn schema_qualified() {
        let table = TableReference {
            name: "Animals".to_string(),
            schema: Some("zoo".to_string()),
            alias: "a".to_string(),
        };

        assert_eq!(table.to_sql(Dialect::SqlServer).0, "[zoo].[Animals] AS [a]");
        assert_eq!(table.to_sql(Dialect::Postgres).0, r#""zoo"."Animals" AS "a""#);
    }
}
