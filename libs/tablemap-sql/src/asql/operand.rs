// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::{EntityTypeId, ForeignKeyId, LiteralValue, PropertyId};

use crate::sql::predicate::ParamEquality;

use super::predicate::AbstractPredicate;

/// A property reached from the target entity type, possibly through reference navigations.
///
/// Each navigation follows a foreign key from its dependent to its principal, so
/// `[Animal.CountryId -> Country.Id]` with property `Country.Name` reads the name of the animal's
/// country.
#[derive(Debug, PartialEq, Clone)]
pub struct PropertyPath {
    pub navigations: Vec<ForeignKeyId>,
    pub property: PropertyId,
}

impl PropertyPath {
    pub fn through(navigations: Vec<ForeignKeyId>, property: PropertyId) -> Self {
        Self {
            navigations,
            property,
        }
    }
}

impl From<PropertyId> for PropertyPath {
    fn from(property: PropertyId) -> Self {
        Self {
            navigations: vec![],
            property,
        }
    }
}

/// The number of dependents of the current row matching a predicate, such as the animals of a
/// country with `CountryId > 0`.
#[derive(Debug, PartialEq, Clone)]
pub struct RelatedCount {
    /// Foreign key whose principal is the current entity type (or one of its base types).
    pub foreign_key: ForeignKeyId,
    /// The counted entity type: the dependent of `foreign_key` or one of its derived types.
    pub entity_type: EntityTypeId,
    /// Predicate over the properties of `entity_type`.
    pub predicate: AbstractPredicate,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operand {
    Property(PropertyPath),
    /// A constant rendered inline.
    Literal(LiteralValue),
    /// A constant passed as a statement parameter.
    Param(LiteralValue),
    Null,
    List(Vec<LiteralValue>),
    Count(Box<RelatedCount>),
}

impl Operand {
    pub fn property(property: PropertyId) -> Self {
        Operand::Property(property.into())
    }

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Operand::Literal(value.into())
    }

    pub fn param(value: impl Into<LiteralValue>) -> Self {
        Operand::Param(value.into())
    }

    pub fn count(
        foreign_key: ForeignKeyId,
        entity_type: EntityTypeId,
        predicate: AbstractPredicate,
    ) -> Self {
        Operand::Count(Box::new(RelatedCount {
            foreign_key,
            entity_type,
            predicate,
        }))
    }

    /// The property read by this operand, if any.
    pub fn read_property(&self) -> Option<PropertyId> {
        match self {
            Operand::Property(path) => Some(path.property),
            _ => None,
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Operand::Property(path) if !path.navigations.is_empty())
    }
}

impl ParamEquality for Operand {
    fn param_eq(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Operand::Param(v1), Operand::Param(v2))
            | (Operand::Literal(v1), Operand::Literal(v2)) => Some(v1 == v2),
            _ => None,
        }
    }
}
