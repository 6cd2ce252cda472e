// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tablemap_model::DatabaseProvider;

/// The SQL flavor statements are rendered in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    SqlServer,
    Sqlite,
}

impl Dialect {
    pub fn for_provider(provider: DatabaseProvider) -> Self {
        match provider {
            DatabaseProvider::Postgres => Dialect::Postgres,
            DatabaseProvider::SqlServer => Dialect::SqlServer,
            DatabaseProvider::Sqlite => Dialect::Sqlite,
        }
    }

    /// Append `name` as a quoted identifier, escaping the closing quote character.
    pub fn quote_identifier(&self, name: &str, out: &mut String) {
        let (open, close) = match self {
            Dialect::SqlServer => ('[', ']'),
            Dialect::Postgres | Dialect::Sqlite => ('"', '"'),
        };

        out.push(open);
        for c in name.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
    }

    pub fn string_literal(&self, value: &str) -> String {
        let escaped = value.replace('\'', "''");
        match self {
            Dialect::SqlServer => format!("N'{escaped}'"),
            Dialect::Postgres | Dialect::Sqlite => format!("'{escaped}'"),
        }
    }

    pub fn bool_literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::Postgres, true) => "TRUE",
            (Dialect::Postgres, false) => "FALSE",
            (Dialect::SqlServer, true) => "CAST(1 AS bit)",
            (Dialect::SqlServer, false) => "CAST(0 AS bit)",
            (Dialect::Sqlite, true) => "1",
            (Dialect::Sqlite, false) => "0",
        }
    }

    /// A predicate that is always true or always false. SQL Server has no boolean literal
    /// usable as a predicate.
    pub fn constant_predicate(&self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::SqlServer, true) => "1 = 1",
            (Dialect::SqlServer, false) => "0 = 1",
            (_, true) => "TRUE",
            (_, false) => "FALSE",
        }
    }

    /// Placeholder for the parameter at `position` (1-based).
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            Dialect::Postgres => format!("${position}"),
            Dialect::SqlServer | Dialect::Sqlite => format!("@p{}", position - 1),
        }
    }

    /// Whether the target of a DELETE or UPDATE may be joined with other tables (`FROM ... INNER
    /// JOIN` on SQL Server, `USING`/`FROM` on PostgreSQL).
    pub fn supports_dml_join(&self) -> bool {
        match self {
            Dialect::Postgres | Dialect::SqlServer => true,
            Dialect::Sqlite => false,
        }
    }

    /// SQL Server names the alias after `DELETE`/`UPDATE` and declares the table in a `FROM`
    /// clause. The others alias the table inline.
    pub fn targets_dml_by_alias(&self) -> bool {
        matches!(self, Dialect::SqlServer)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "sqlite" => Ok(Dialect::Sqlite),
            _ => Err(format!(
                "unknown dialect '{s}'. Expected postgres, sqlserver or sqlite"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted_and_escaped() {
        let mut out = String::new();
        Dialect::SqlServer.quote_identifier("Odd]Name", &mut out);
        assert_eq!(out, "[Odd]]Name]");

        let mut out = String::new();
        Dialect::Sqlite.quote_identifier("Odd\"Name", &mut out);
        assert_eq!(out, r#""Odd""Name""#);
    }

    #[test]
    fn string_literals() {
        assert_eq!(Dialect::SqlServer.string_literal("O'Hara"), "N'O''Hara'");
        assert_eq!(Dialect::Postgres.string_literal("Kiwi"), "'Kiwi'");
    }

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(2), "$2");
        assert_eq!(Dialect::SqlServer.placeholder(1), "@p0");
        assert_eq!(Dialect::Sqlite.placeholder(3), "@p2");
    }

    #[test]
    fn parse() {
        assert_eq!("SqlServer".parse::<Dialect>(), Ok(Dialect::SqlServer));
        assert_eq!("postgresql".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert!("oracle".parse::<Dialect>().is_err());
    }
}
