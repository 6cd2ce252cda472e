// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The semantic type of a property, independent of how it is stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Bool,
    String,
    Enum(EnumDefinition),
    /// A raw JSON document. Used to pick the physical type of a JSON column.
    JsonElement,
}

impl ValueType {
    pub fn is_enum(&self) -> bool {
        matches!(self, ValueType::Enum(_))
    }
}

/// An enumeration with its variants in declaration order. The position of a variant is its
/// numeric backing code.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumDefinition {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumDefinition {
    pub fn new(name: impl Into<String>, variants: &[&str]) -> Self {
        Self {
            name: name.into(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn ordinal(&self, variant: &str) -> Option<usize> {
        self.variants.iter().position(|v| v == variant)
    }
}

/// How a property value is converted before it reaches the store.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueConversion {
    /// Store enum values by variant name.
    EnumToString,
    /// Store enum values by ordinal (the default for relational columns).
    EnumToNumber,
}

/// Where a piece of configuration came from. Higher sources override lower ones, so a
/// convention never replaces something the user configured explicitly.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigurationSource {
    Convention,
    DataAnnotation,
    Explicit,
}

impl ConfigurationSource {
    /// Whether configuration from `self` may replace configuration from `existing`.
    pub fn overrides(self, existing: Option<ConfigurationSource>) -> bool {
        existing.is_none_or(|existing| self >= existing)
    }
}

/// A constant value appearing in filters, predicates and assignments.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    /// An enum variant by name. Rendered according to the property's conversion.
    Enum(String),
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        LiteralValue::Int(value as i64)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::String(value)
    }
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralValue::Null => f.write_str("null"),
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Int(i) => write!(f, "{i}"),
            LiteralValue::String(s) => write!(f, "'{s}'"),
            LiteralValue::Enum(v) => write!(f, "{v}"),
        }
    }
}
