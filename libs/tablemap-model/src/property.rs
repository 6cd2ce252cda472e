// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{
    arena::SerializableSlabIndex,
    entity_type::EntityTypeId,
    value::{ConfigurationSource, ValueConversion, ValueType},
};

pub type PropertyId = SerializableSlabIndex<Property>;

/// A scalar property of an entity type.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Property {
    pub name: String,
    pub declaring_entity_type: EntityTypeId,
    pub value_type: ValueType,
    pub nullable: bool,
    /// Column name override. The property name is used otherwise.
    pub column_name: Option<String>,
    conversion: Option<(ValueConversion, ConfigurationSource)>,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        declaring_entity_type: EntityTypeId,
        value_type: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_entity_type,
            value_type,
            nullable: false,
            column_name: None,
            conversion: None,
        }
    }

    pub fn column_name(&self) -> &str {
        self.column_name.as_deref().unwrap_or(&self.name)
    }

    pub fn conversion(&self) -> Option<ValueConversion> {
        self.conversion.map(|(conversion, _)| conversion)
    }

    pub fn conversion_source(&self) -> Option<ConfigurationSource> {
        self.conversion.map(|(_, source)| source)
    }

    /// Set the conversion unless one was configured from a stronger source. Returns whether the
    /// conversion was applied.
    pub fn set_conversion(
        &mut self,
        conversion: Option<ValueConversion>,
        source: ConfigurationSource,
    ) -> bool {
        if !source.overrides(self.conversion_source()) {
            return false;
        }

        self.conversion = conversion.map(|conversion| (conversion, source));
        true
    }

    /// Whether enum values of this property are stored by name.
    pub fn stores_enum_as_string(&self) -> bool {
        self.value_type.is_enum() && self.conversion() == Some(ValueConversion::EnumToString)
    }
}
