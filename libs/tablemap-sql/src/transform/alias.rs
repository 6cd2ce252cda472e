// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;

/// Hands out table aliases for one statement: the lowercase first letter of the table name,
/// with a numeric suffix once that letter is taken (`a`, `a0`, `a1`, ...).
#[derive(Debug, Default)]
pub(crate) struct AliasGenerator {
    used: HashSet<String>,
}

impl AliasGenerator {
    pub(crate) fn next(&mut self, table_name: &str) -> String {
        let base = table_name
            .chars()
            .find(|c| c.is_alphabetic())
            .map(|c| c.to_lowercase().to_string())
            .unwrap_or_else(|| "t".to_string());

        if self.used.insert(base.clone()) {
            return base;
        }

        let mut suffix = 0;
        loop {
            let candidate = format!("{base}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_unique() {
        let mut aliases = AliasGenerator::default();
        assert_eq!(aliases.next("Animals"), "a");
        assert_eq!(aliases.next("Countries"), "c");
        assert_eq!(aliases.next("Animals"), "a0");
        assert_eq!(aliases.next("animals"), "a1");
        assert_eq!(aliases.next("_1"), "t");
    }
}
