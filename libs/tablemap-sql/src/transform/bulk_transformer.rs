// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
use tablemap_model::{EntityTypeId, MappingShape, Model, TableId, UnmappedReason};
use tracing::{debug, instrument};

use crate::{
    asql::{
        abstract_operation::AbstractBulkOperation,
        predicate::{AbstractPredicate, filters_predicate},
    },
    config::TranslatorConfig,
    sql::{
        dialect::Dialect,
        statement::{BulkOperation, NoOpReason},
    },
    translation_error::TranslationError,
};

use super::{
    scope::ScopeResolver,
    strategy::{bulk_strategy::BulkRequest, bulk_strategy_chain::BulkStrategyChain},
    transformer::OperationTransformer,
};

/// Translates bulk deletes and updates against one finalized model. Scopes are resolved once
/// on construction; translation itself does not mutate the transformer.
pub struct BulkTransformer<'m> {
    model: &'m Model,
    scopes: ScopeResolver<'m>,
    config: TranslatorConfig,
}

impl<'m> BulkTransformer<'m> {
    pub fn new(model: &'m Model, config: TranslatorConfig) -> Self {
        Self {
            model,
            scopes: ScopeResolver::new(model),
            config,
        }
    }

    /// A transformer rendering for the model's own database provider.
    pub fn for_model(model: &'m Model) -> Self {
        Self::new(
            model,
            TranslatorConfig::new(Dialect::for_provider(model.provider)),
        )
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn scopes(&self) -> &ScopeResolver<'m> {
        &self.scopes
    }

    #[instrument(name = "BulkTransformer::translate", skip(self))]
    pub fn translate(
        &self,
        abstract_operation: &AbstractBulkOperation,
    ) -> Result<BulkOperation, TranslationError> {
        self.model.try_entity_type(abstract_operation.entity_type())?;
        self.to_bulk_operation(abstract_operation)
    }

    /// The table a statement against `entity_type` targets, or why there is none.
    pub(super) fn mapped_table(&self, entity_type: EntityTypeId) -> Result<TableId, NoOpReason> {
        let shape = self.model.mapping_shape(entity_type);

        match shape {
            MappingShape::Unmapped {
                reason: UnmappedReason::QuerySource,
            } => Err(NoOpReason::QuerySource),
            MappingShape::Unmapped {
                reason: UnmappedReason::NoStoreObject,
            } => Err(NoOpReason::NoStoreObject),
            MappingShape::JsonMapped { .. } => Err(NoOpReason::JsonMapped),
            _ => shape.primary_table().ok_or(NoOpReason::NoStoreObject),
        }
    }

    pub(super) fn no_op(&self, entity_type: EntityTypeId, reason: NoOpReason) -> BulkOperation {
        debug!(
            entity_type = %self.model.entity_type(entity_type).name,
            ?reason,
            "Bulk operation affects no rows"
        );
        BulkOperation::NoOp(reason)
    }

    /// Scope of the entity type in `table`, then its query filter, then `predicate`.
    pub(super) fn scoped_predicate(
        &self,
        entity_type: EntityTypeId,
        table: TableId,
        predicate: &AbstractPredicate,
    ) -> AbstractPredicate {
        let scope = self
            .scopes
            .scope(entity_type, table)
            .cloned()
            .unwrap_or(AbstractPredicate::True);
        let query_filter = self
            .model
            .query_filter(entity_type)
            .map(filters_predicate)
            .unwrap_or(AbstractPredicate::True);

        AbstractPredicate::and_all([scope, query_filter, predicate.clone()])
    }

    pub(super) fn run(&self, request: BulkRequest) -> Result<BulkOperation, TranslationError> {
        if request.predicate == AbstractPredicate::False {
            return Ok(self.no_op(request.entity_type, NoOpReason::Unsatisfiable));
        }

        let operation = BulkStrategyChain::default().to_operation(&request, self)?;

        match &operation {
            BulkOperation::Statement(statement) if self.config.log_sql => {
                debug!(
                    sql = %statement.sql,
                    params = ?statement.params,
                    "Generated bulk statement"
                );
            }
            BulkOperation::NoOp(reason) => {
                debug!(?reason, "Bulk operation affects no rows");
            }
            _ => {}
        }

        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use tablemap_model::{
        ComparisonOp, DatabaseProvider, EnumDefinition, LiteralValue, ModelBuilder,
        ModelBuildingError, ValueConversion, ValueType,
        testing::{AnimalsOptions, animals_model, customers_model, engines_model, entity, property},
    };
    use test_log::test;

    use super::*;
    use crate::{
        asql::operand::Operand,
        config::{DIALECT_PARAM, LOG_SQL_PARAM, MapEnvironment},
        transform::test_util::{delete, foreign_key, translate, translate_with, update},
    };

    fn kiwi_named(model: &Model, name: &str) -> AbstractPredicate {
        AbstractPredicate::eq(
            Operand::property(property(model, "Animal", "Name")),
            Operand::literal(name),
        )
    }

    #[test]
    fn delete_kiwis_sql_server() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());

        assert_statement!(
            translate(
                &model,
                delete(entity(&model, "Kiwi"), kiwi_named(&model, "Great spotted kiwi"))
            )
            .unwrap(),
            "DELETE FROM [a]\nFROM [Animals] AS [a]\nWHERE [a].[Discriminator] = N'Kiwi' AND [a].[Name] = N'Great spotted kiwi'"
        );
    }

    #[test]
    fn delete_kiwis_sqlite_with_query_filter() {
        let model = animals_model(
            DatabaseProvider::Sqlite,
            AnimalsOptions {
                query_filter: true,
                ..Default::default()
            },
        );

        assert_statement!(
            translate(
                &model,
                delete(entity(&model, "Kiwi"), kiwi_named(&model, "Great spotted kiwi"))
            )
            .unwrap(),
            "DELETE FROM \"Animals\" AS \"a\"\nWHERE \"a\".\"Discriminator\" = 'Kiwi' AND \"a\".\"CountryId\" = 1 AND \"a\".\"Name\" = 'Great spotted kiwi'"
        );
    }

    #[test]
    fn update_hierarchy_root() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());
        let animal = entity(&model, "Animal");

        assert_statement!(
            translate(
                &model,
                update(
                    animal,
                    kiwi_named(&model, "Great spotted kiwi"),
                    vec![(property(&model, "Animal", "Name"), Operand::literal("Animal"))]
                )
            )
            .unwrap(),
            "UPDATE [a]\n    SET [a].[Name] = N'Animal'\nFROM [Animals] AS [a]\nWHERE [a].[Name] = N'Great spotted kiwi'"
        );

        assert_statement!(
            translate_with(
                &model,
                Dialect::Sqlite,
                update(
                    animal,
                    kiwi_named(&model, "Great spotted kiwi"),
                    vec![(property(&model, "Animal", "Name"), Operand::literal("Animal"))]
                )
            )
            .unwrap(),
            "UPDATE \"Animals\" AS \"a\"\n    SET \"Name\" = 'Animal'\nWHERE \"a\".\"Name\" = 'Great spotted kiwi'"
        );
    }

    #[test]
    fn incomplete_discriminator_mapping_lists_concrete_values() {
        let model = animals_model(
            DatabaseProvider::Postgres,
            AnimalsOptions {
                discriminator_complete: false,
                ..Default::default()
            },
        );

        assert_statement!(
            translate(
                &model,
                update(
                    entity(&model, "Animal"),
                    AbstractPredicate::True,
                    vec![(property(&model, "Animal", "Name"), Operand::literal("Animal"))]
                )
            )
            .unwrap(),
            "UPDATE \"Animals\" AS \"a\"\n    SET \"Name\" = 'Animal'\nWHERE \"a\".\"Discriminator\" IN ('Kiwi', 'Eagle')"
        );
    }

    #[test]
    fn parameters_are_numbered_in_statement_order() {
        let model = animals_model(DatabaseProvider::Postgres, AnimalsOptions::default());
        let name = property(&model, "Animal", "Name");

        let operation = update(
            entity(&model, "Kiwi"),
            AbstractPredicate::eq(Operand::property(name), Operand::param("Great spotted kiwi")),
            vec![(name, Operand::param("Animal"))],
        );

        assert_statement!(
            translate(&model, operation.clone()).unwrap(),
            "UPDATE \"Animals\" AS \"a\"\n    SET \"Name\" = $1\nWHERE \"a\".\"Discriminator\" = 'Kiwi' AND \"a\".\"Name\" = $2",
            "Animal",
            "Great spotted kiwi"
        );
        assert_statement!(
            translate_with(&model, Dialect::SqlServer, operation).unwrap(),
            "UPDATE [a]\n    SET [a].[Name] = @p0\nFROM [Animals] AS [a]\nWHERE [a].[Discriminator] = N'Kiwi' AND [a].[Name] = @p1",
            "Animal",
            "Great spotted kiwi"
        );
    }

    #[test]
    fn count_of_related_entities() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());
        let has_kiwis = AbstractPredicate::Gt(
            Operand::count(
                foreign_key(&model, "Animal"),
                entity(&model, "Kiwi"),
                AbstractPredicate::Gt(
                    Operand::property(property(&model, "Animal", "CountryId")),
                    Operand::literal(0),
                ),
            ),
            Operand::literal(0),
        );

        assert_statement!(
            translate(&model, delete(entity(&model, "Country"), has_kiwis)).unwrap(),
            "DELETE FROM [c]\nFROM [Countries] AS [c]\nWHERE (\n    SELECT COUNT(*)\n    FROM [Animals] AS [a]\n    WHERE [c].[Id] = [a].[CountryId] AND [a].[Discriminator] = N'Kiwi' AND [a].[CountryId] > 0) > 0"
        );
    }

    #[test]
    fn count_of_related_entities_with_query_filter() {
        let model = animals_model(
            DatabaseProvider::Sqlite,
            AnimalsOptions {
                query_filter: true,
                ..Default::default()
            },
        );
        let has_kiwis = AbstractPredicate::Gt(
            Operand::count(
                foreign_key(&model, "Animal"),
                entity(&model, "Kiwi"),
                AbstractPredicate::Gt(
                    Operand::property(property(&model, "Animal", "CountryId")),
                    Operand::literal(0),
                ),
            ),
            Operand::literal(0),
        );

        assert_statement!(
            translate(
                &model,
                update(
                    entity(&model, "Country"),
                    has_kiwis,
                    vec![(property(&model, "Country", "Name"), Operand::literal("Monovia"))]
                )
            )
            .unwrap(),
            "UPDATE \"Countries\" AS \"c\"\n    SET \"Name\" = 'Monovia'\nWHERE (\n    SELECT COUNT(*)\n    FROM \"Animals\" AS \"a\"\n    WHERE \"a\".\"CountryId\" = 1 AND \"c\".\"Id\" = \"a\".\"CountryId\" AND \"a\".\"Discriminator\" = 'Kiwi' AND \"a\".\"CountryId\" > 0) > 0"
        );
    }

    fn has_animals(model: &Model) -> AbstractPredicate {
        AbstractPredicate::Gt(
            Operand::count(
                foreign_key(model, "Animal"),
                entity(model, "Animal"),
                AbstractPredicate::Gt(
                    Operand::property(property(model, "Animal", "CountryId")),
                    Operand::literal(0),
                ),
            ),
            Operand::literal(0),
        )
    }

    #[test]
    fn count_over_hierarchy_root_is_unscoped() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());

        assert_statement!(
            translate(&model, delete(entity(&model, "Country"), has_animals(&model))).unwrap(),
            "DELETE FROM [c]\nFROM [Countries] AS [c]\nWHERE (\n    SELECT COUNT(*)\n    FROM [Animals] AS [a]\n    WHERE [c].[Id] = [a].[CountryId] AND [a].[CountryId] > 0) > 0"
        );
    }

    #[test]
    fn count_over_hierarchy_root_with_query_filter() {
        let model = animals_model(
            DatabaseProvider::Sqlite,
            AnimalsOptions {
                query_filter: true,
                ..Default::default()
            },
        );

        assert_statement!(
            translate(&model, delete(entity(&model, "Country"), has_animals(&model))).unwrap(),
            "DELETE FROM \"Countries\" AS \"c\"\nWHERE (\n    SELECT COUNT(*)\n    FROM \"Animals\" AS \"a\"\n    WHERE \"a\".\"CountryId\" = 1 AND \"c\".\"Id\" = \"a\".\"CountryId\" AND \"a\".\"CountryId\" > 0) > 0"
        );
    }

    #[test]
    fn delete_hierarchy_root() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());

        assert_statement!(
            translate(
                &model,
                delete(entity(&model, "Animal"), kiwi_named(&model, "Great spotted kiwi"))
            )
            .unwrap(),
            "DELETE FROM [a]\nFROM [Animals] AS [a]\nWHERE [a].[Name] = N'Great spotted kiwi'"
        );
    }

    #[test]
    fn delete_hierarchy_root_with_query_filter() {
        let model = animals_model(
            DatabaseProvider::Sqlite,
            AnimalsOptions {
                query_filter: true,
                ..Default::default()
            },
        );

        assert_statement!(
            translate(
                &model,
                delete(entity(&model, "Animal"), kiwi_named(&model, "Great spotted kiwi"))
            )
            .unwrap(),
            "DELETE FROM \"Animals\" AS \"a\"\nWHERE \"a\".\"CountryId\" = 1 AND \"a\".\"Name\" = 'Great spotted kiwi'"
        );
    }

    #[test]
    fn counting_unrelated_entities_is_rejected() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());
        let predicate = AbstractPredicate::Gt(
            Operand::count(
                foreign_key(&model, "Animal"),
                entity(&model, "Country"),
                AbstractPredicate::True,
            ),
            Operand::literal(0),
        );

        assert!(matches!(
            translate(&model, delete(entity(&model, "Country"), predicate)),
            Err(TranslationError::InvalidNavigation { .. })
        ));
    }

    #[test]
    fn unwritable_targets_are_no_ops() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());

        assert_eq!(
            translate(
                &model,
                delete(entity(&model, "EagleQuery"), AbstractPredicate::True)
            ),
            Ok(BulkOperation::NoOp(NoOpReason::QuerySource))
        );
        assert_eq!(
            translate(
                &model,
                delete(entity(&model, "Penguin"), kiwi_named(&model, "Emperor"))
            ),
            Ok(BulkOperation::NoOp(NoOpReason::Unsatisfiable))
        );
        assert_eq!(
            translate(&model, delete(entity(&model, "Kiwi"), AbstractPredicate::False)),
            Ok(BulkOperation::NoOp(NoOpReason::Unsatisfiable))
        );

        let model = customers_model(DatabaseProvider::Sqlite);
        assert_eq!(
            translate(
                &model,
                update(
                    entity(&model, "Address"),
                    AbstractPredicate::True,
                    vec![(property(&model, "Address", "Street"), Operand::literal("Main"))]
                )
            ),
            Ok(BulkOperation::NoOp(NoOpReason::JsonMapped))
        );
    }

    #[test]
    fn entity_types_must_belong_to_the_model() {
        let animals = animals_model(DatabaseProvider::Sqlite, AnimalsOptions::default());
        let customers = customers_model(DatabaseProvider::Sqlite);

        assert!(matches!(
            translate(
                &customers,
                delete(entity(&animals, "EagleQuery"), AbstractPredicate::True)
            ),
            Err(TranslationError::Model(ModelBuildingError::UnknownEntityType(_)))
        ));
    }

    #[test]
    fn enum_values_follow_the_property_conversion() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());
        let found_on = property(&model, "Kiwi", "FoundOn");

        assert_statement!(
            translate(
                &model,
                update(
                    entity(&model, "Kiwi"),
                    AbstractPredicate::True,
                    vec![(found_on, Operand::Literal(LiteralValue::Enum("South".to_string())))]
                )
            )
            .unwrap(),
            "UPDATE [a]\n    SET [a].[FoundOn] = 1\nFROM [Animals] AS [a]\nWHERE [a].[Discriminator] = N'Kiwi'"
        );

        let mut builder = ModelBuilder::new(DatabaseProvider::Sqlite);
        let ship = builder.add_entity_type("Ship").unwrap();
        builder.add_property(ship, "Id", ValueType::Int).unwrap();
        let class = builder
            .add_property(
                ship,
                "Class",
                ValueType::Enum(EnumDefinition::new("ShipClass", &["Frigate", "Destroyer"])),
            )
            .unwrap();
        builder.set_conversion(class, Some(ValueConversion::EnumToString));
        builder.set_primary_key(ship, &["Id"]).unwrap();
        builder.to_table(ship, "Ships");
        let model = builder.finalize().unwrap();

        assert_statement!(
            translate(
                &model,
                update(
                    ship,
                    AbstractPredicate::eq(
                        Operand::property(class),
                        Operand::param(LiteralValue::Enum("Frigate".to_string()))
                    ),
                    vec![(class, Operand::Literal(LiteralValue::Enum("Destroyer".to_string())))]
                )
            )
            .unwrap(),
            "UPDATE \"Ships\" AS \"s\"\n    SET \"Class\" = 'Destroyer'\nWHERE \"s\".\"Class\" = @p0",
            "Frigate"
        );
    }

    #[test]
    fn fragment_update_is_scoped_by_its_condition() {
        let model = customers_model(DatabaseProvider::Sqlite);

        assert_statement!(
            translate(
                &model,
                update(
                    entity(&model, "Customer"),
                    AbstractPredicate::True,
                    vec![(property(&model, "Customer", "Phone"), Operand::literal("555"))]
                )
            )
            .unwrap(),
            "UPDATE \"CustomerDetails\" AS \"c\"\n    SET \"Phone\" = '555'\nWHERE \"c\".\"DetailsKind\" = 'Full'"
        );
    }

    #[test]
    fn optional_split_fragment_checks_presence_after_condition() {
        let model = engines_model(DatabaseProvider::SqlServer);

        assert_statement!(
            translate(
                &model,
                update(
                    entity(&model, "ElectricEngine"),
                    AbstractPredicate::True,
                    vec![(property(&model, "Engine", "Rating"), Operand::literal(5))]
                )
            )
            .unwrap(),
            "UPDATE [v]\n    SET [v].[Rating] = 5\nFROM [VehicleDetails] AS [v]\nWHERE [v].[Rating] > 0 AND [v].[Rating] IS NOT NULL"
        );
    }

    #[test]
    fn optional_dependent_update_checks_presence() {
        let model = engines_model(DatabaseProvider::Postgres);

        assert_statement!(
            translate(
                &model,
                update(
                    entity(&model, "ElectricEngine"),
                    AbstractPredicate::compare(
                        ComparisonOp::Gt,
                        Operand::property(property(&model, "ElectricEngine", "BatteryCapacity")),
                        Operand::literal(40)
                    ),
                    vec![(property(&model, "Engine", "Manufacturer"), Operand::literal("Acme"))]
                )
            )
            .unwrap(),
            "UPDATE \"Vehicles\" AS \"v\"\n    SET \"Manufacturer\" = 'Acme'\nWHERE (\"v\".\"Serial\" IS NOT NULL OR \"v\".\"Manufacturer\" IS NOT NULL) AND \"v\".\"EngineKind\" = 'ElectricEngine' AND \"v\".\"BatteryCapacity\" > 40"
        );
    }

    #[test]
    fn configuration_from_environment() {
        let model = animals_model(DatabaseProvider::Postgres, AnimalsOptions::default());
        let env = MapEnvironment::from([(DIALECT_PARAM, "mssql"), (LOG_SQL_PARAM, "true")]);
        let transformer = BulkTransformer::new(&model, TranslatorConfig::from_env(&env).unwrap());

        assert_statement!(
            transformer
                .translate(&delete(entity(&model, "Eagle"), AbstractPredicate::True))
                .unwrap(),
            "DELETE FROM [a]\nFROM [Animals] AS [a]\nWHERE [a].[Discriminator] = N'Eagle'"
        );
    }
}
