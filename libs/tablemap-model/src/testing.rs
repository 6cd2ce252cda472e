// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Model fixtures shared by the tests of this crate and of its dependents.

use crate::{
    builder::ModelBuilder,
    entity_type::EntityTypeId,
    foreign_key::ForeignKeySpec,
    fragment::{ComparisonOp, PropertyFilter},
    model::Model,
    property::PropertyId,
    store_object::StoreObjectIdentifier,
    type_mapping::DatabaseProvider,
    value::{EnumDefinition, ValueType},
};

pub fn entity(model: &Model, name: &str) -> EntityTypeId {
    model
        .entity_type_id(name)
        .unwrap_or_else(|| panic!("entity type '{name}' not found"))
}

pub fn property(model: &Model, entity_type: &str, name: &str) -> PropertyId {
    model
        .find_property(entity(model, entity_type), name)
        .unwrap_or_else(|| panic!("property '{entity_type}.{name}' not found"))
}

#[derive(Debug, Clone, Copy)]
pub struct AnimalsOptions {
    /// Add the global query filter `CountryId = 1` to the animal hierarchy
    pub query_filter: bool,
    pub discriminator_complete: bool,
    /// Make `Animal.CountryId` nullable, so animals need not have a country
    pub optional_country: bool,
}

impl Default for AnimalsOptions {
    fn default() -> Self {
        Self {
            query_filter: false,
            discriminator_complete: true,
            optional_country: false,
        }
    }
}

/// Countries and a TPH animal hierarchy in `Animals`:
///
/// ```text
/// Animal (abstract)
/// └── Bird (abstract)
///     ├── Kiwi
///     ├── Eagle
///     └── Penguin (abstract, no concrete types)
/// ```
///
/// plus the keyless `EagleQuery` mapped onto a raw SQL query.
pub fn animals_model(provider: DatabaseProvider, options: AnimalsOptions) -> Model {
    let mut builder = ModelBuilder::new(provider);

    let country = builder.add_entity_type("Country").unwrap();
    builder.add_property(country, "Id", ValueType::Int).unwrap();
    builder.add_property(country, "Name", ValueType::String).unwrap();
    builder.set_primary_key(country, &["Id"]).unwrap();
    builder.to_table(country, "Countries");

    let animal = builder.add_entity_type("Animal").unwrap();
    builder.set_abstract(animal, true);
    builder.add_property(animal, "Id", ValueType::Int).unwrap();
    builder.add_property(animal, "Name", ValueType::String).unwrap();
    let country_id = builder.add_property(animal, "CountryId", ValueType::Int).unwrap();
    builder.set_nullable(country_id, options.optional_country);
    builder.set_primary_key(animal, &["Id"]).unwrap();
    builder.to_table(animal, "Animals");
    builder.has_discriminator(animal, "Discriminator").unwrap();
    builder
        .set_discriminator_mapping_complete(animal, options.discriminator_complete)
        .unwrap();
    builder
        .add_foreign_key(ForeignKeySpec::new(animal, country, &["CountryId"]))
        .unwrap();

    let bird = builder.add_entity_type("Bird").unwrap();
    builder.set_base_type(bird, animal).unwrap();
    builder.set_abstract(bird, true);
    builder.add_property(bird, "IsFlightless", ValueType::Bool).unwrap();
    let eagle_id = builder.add_property(bird, "EagleId", ValueType::Int).unwrap();
    builder.set_nullable(eagle_id, true);

    let kiwi = builder.add_entity_type("Kiwi").unwrap();
    builder.set_base_type(kiwi, bird).unwrap();
    builder
        .add_property(
            kiwi,
            "FoundOn",
            ValueType::Enum(EnumDefinition::new("Island", &["North", "South"])),
        )
        .unwrap();

    let eagle = builder.add_entity_type("Eagle").unwrap();
    builder.set_base_type(eagle, bird).unwrap();
    builder.add_property(eagle, "Group", ValueType::Int).unwrap();

    let penguin = builder.add_entity_type("Penguin").unwrap();
    builder.set_base_type(penguin, bird).unwrap();
    builder.set_abstract(penguin, true);

    if options.query_filter {
        builder
            .set_query_filter(animal, vec![PropertyFilter::equals(country_id, 1)])
            .unwrap();
    }

    let eagle_query = builder.add_entity_type("EagleQuery").unwrap();
    builder.add_property(eagle_query, "Name", ValueType::String).unwrap();
    builder.add_property(eagle_query, "EagleId", ValueType::Int).unwrap();
    builder.to_sql_query(eagle_query, r#"SELECT * FROM "Animals""#);

    builder.finalize().unwrap()
}

/// Table splitting in `Vehicles`: `Engine` and `Operator` share rows with `Vehicle`, and
/// `FuelTank` with `Engine`. `Description` is mapped from `Vehicle`, `Engine` and `FuelTank`.
pub fn vehicles_model(provider: DatabaseProvider) -> Model {
    let mut builder = ModelBuilder::new(provider);

    let vehicle = keyed_entity(&mut builder, "Vehicle", "Vehicles");
    builder.add_property(vehicle, "Name", ValueType::String).unwrap();
    let description = builder
        .add_property(vehicle, "Description", ValueType::String)
        .unwrap();
    builder.set_nullable(description, true);

    let engine = keyed_entity(&mut builder, "Engine", "Vehicles");
    builder
        .add_property(
            engine,
            "FuelType",
            ValueType::Enum(EnumDefinition::new("FuelType", &["Petrol", "Diesel", "Electric"])),
        )
        .unwrap();
    let description = builder
        .add_property(engine, "Description", ValueType::String)
        .unwrap();
    builder.set_nullable(description, true);
    let capacity = builder.add_property(engine, "Capacity", ValueType::Int).unwrap();
    builder.set_nullable(capacity, true);
    builder
        .add_foreign_key(ForeignKeySpec::new(engine, vehicle, &["Id"]))
        .unwrap();

    let operator = keyed_entity(&mut builder, "Operator", "Vehicles");
    builder
        .add_property(operator, "OperatorName", ValueType::String)
        .unwrap();
    builder
        .add_foreign_key(ForeignKeySpec::new(operator, vehicle, &["Id"]).required_dependent())
        .unwrap();

    let fuel_tank = keyed_entity(&mut builder, "FuelTank", "Vehicles");
    let description = builder
        .add_property(fuel_tank, "Description", ValueType::String)
        .unwrap();
    builder.set_nullable(description, true);
    builder.add_property(fuel_tank, "Volume", ValueType::Int).unwrap();
    builder
        .add_foreign_key(ForeignKeySpec::new(fuel_tank, engine, &["Id"]))
        .unwrap();

    builder.finalize().unwrap()
}

/// `Customer` split across `Customers` and `CustomerDetails` (for rows with
/// `DetailsKind = 'Full'`), owning a JSON-mapped `Address`.
pub fn customers_model(provider: DatabaseProvider) -> Model {
    let mut builder = ModelBuilder::new(provider);

    let customer = keyed_entity(&mut builder, "Customer", "Customers");
    builder.add_property(customer, "Name", ValueType::String).unwrap();
    let phone = builder.add_property(customer, "Phone", ValueType::String).unwrap();
    builder.set_nullable(phone, true);
    let details_kind = builder
        .add_property(customer, "DetailsKind", ValueType::String)
        .unwrap();
    builder
        .add_mapping_fragment(
            customer,
            StoreObjectIdentifier::table("CustomerDetails", None),
            &["Phone", "DetailsKind"],
            vec![PropertyFilter::equals(details_kind, "Full")],
        )
        .unwrap();

    let address = builder.add_entity_type("Address").unwrap();
    builder.add_property(address, "CustomerId", ValueType::Int).unwrap();
    builder.add_property(address, "Street", ValueType::String).unwrap();
    builder
        .add_property(
            address,
            "Kind",
            ValueType::Enum(EnumDefinition::new("AddressKind", &["Home", "Work"])),
        )
        .unwrap();
    builder.set_primary_key(address, &["CustomerId"]).unwrap();
    builder
        .add_foreign_key(
            ForeignKeySpec::new(address, customer, &["CustomerId"])
                .ownership()
                .required_dependent(),
        )
        .unwrap();
    builder.to_json(address, "Address");

    builder.finalize().unwrap()
}

/// An engine hierarchy that optionally shares rows with `Vehicle` in both `Vehicles` and
/// `VehicleDetails`. The engine's `Rating` lives in `VehicleDetails` for rows with
/// `Rating > 0`.
pub fn engines_model(provider: DatabaseProvider) -> Model {
    let mut builder = ModelBuilder::new(provider);
    let details = StoreObjectIdentifier::table("VehicleDetails", None);

    let vehicle = keyed_entity(&mut builder, "Vehicle", "Vehicles");
    builder.add_property(vehicle, "Name", ValueType::String).unwrap();
    let color = builder.add_property(vehicle, "Color", ValueType::String).unwrap();
    builder.set_nullable(color, true);
    builder
        .add_mapping_fragment(vehicle, details.clone(), &["Color"], vec![])
        .unwrap();

    let engine = keyed_entity(&mut builder, "Engine", "Vehicles");
    builder.add_property(engine, "Serial", ValueType::String).unwrap();
    builder
        .add_property(engine, "Manufacturer", ValueType::String)
        .unwrap();
    let rating = builder.add_property(engine, "Rating", ValueType::Int).unwrap();
    builder.has_discriminator(engine, "EngineKind").unwrap();
    builder
        .add_mapping_fragment(
            engine,
            details,
            &["Rating"],
            vec![PropertyFilter::new(rating, ComparisonOp::Gt, 0)],
        )
        .unwrap();
    builder
        .add_foreign_key(ForeignKeySpec::new(engine, vehicle, &["Id"]))
        .unwrap();

    let electric = builder.add_entity_type("ElectricEngine").unwrap();
    builder.set_base_type(electric, engine).unwrap();
    let battery = builder
        .add_property(electric, "BatteryCapacity", ValueType::Int)
        .unwrap();
    builder.set_nullable(battery, true);

    builder.finalize().unwrap()
}

fn keyed_entity(builder: &mut ModelBuilder, name: &str, table: &str) -> EntityTypeId {
    let id = builder.add_entity_type(name).unwrap();
    builder.add_property(id, "Id", ValueType::Int).unwrap();
    builder.set_primary_key(id, &["Id"]).unwrap();
    builder.to_table(id, table);
    id
}
