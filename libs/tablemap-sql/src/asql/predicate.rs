// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::PropertyFilter;

use crate::sql::predicate::Predicate;

use super::operand::Operand;

pub type AbstractPredicate = Predicate<Operand>;

/// Conjunction of `property <op> value` filters, as used by fragment conditions and global
/// query filters.
pub fn filters_predicate(filters: &[PropertyFilter]) -> AbstractPredicate {
    AbstractPredicate::and_all(filters.iter().map(|filter| {
        AbstractPredicate::compare(
            filter.op,
            Operand::property(filter.property),
            Operand::Literal(filter.value.clone()),
        )
    }))
}
