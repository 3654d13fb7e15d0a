//! Initial schema.
//!
//! - `catalog_variants`: purchasable variants with packaging, costs and price tiers
//! - `scenarios`: saved worksheets with their control variables
//! - `scenario_lines`: the lines of a saved worksheet, in order

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum CatalogVariants {
    Table,
    Id,
    Brand,
    ModelName,
    Code,
    Description,
    UnitsPerCarton,
    LengthCm,
    WidthCm,
    HeightCm,
    UnitCostForeign,
    UnitCostLocal,
    PriceStandard,
    PriceOnline,
    PriceProposal,
}

#[derive(Iden)]
enum Scenarios {
    Table,
    Id,
    Name,
    CreatedAt,
    ExchangeRate,
    OceanLumpSum,
    TruckingLumpSum,
    DutyExempt,
    ManualDutyPercent,
    ConsumableFeePerUnit,
    LicenseFeePerUnit,
}

#[derive(Iden)]
enum ScenarioLines {
    Table,
    Id,
    ScenarioId,
    Position,
    VariantId,
    Brand,
    ModelName,
    Code,
    Description,
    UnitsPerCarton,
    LengthCm,
    WidthCm,
    HeightCm,
    UnitCostForeign,
    UnitCostLocal,
    Quantity,
    TargetPrice,
    CapturedStandard,
    CapturedOnline,
    CapturedProposal,
}

fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).double().not_null().default(0.0).to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Catalog
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CatalogVariants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogVariants::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CatalogVariants::Brand).string().not_null())
                    .col(
                        ColumnDef::new(CatalogVariants::ModelName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CatalogVariants::Code).string().not_null())
                    .col(
                        ColumnDef::new(CatalogVariants::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CatalogVariants::UnitsPerCarton)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(money(CatalogVariants::LengthCm))
                    .col(money(CatalogVariants::WidthCm))
                    .col(money(CatalogVariants::HeightCm))
                    .col(money(CatalogVariants::UnitCostForeign))
                    .col(money(CatalogVariants::UnitCostLocal))
                    .col(money(CatalogVariants::PriceStandard))
                    .col(money(CatalogVariants::PriceOnline))
                    .col(money(CatalogVariants::PriceProposal))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-catalog_variants-code")
                    .table(CatalogVariants::Table)
                    .col(CatalogVariants::Code)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Scenarios
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Scenarios::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scenarios::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Scenarios::Name).string().not_null())
                    .col(
                        ColumnDef::new(Scenarios::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Scenarios::ExchangeRate).double().not_null())
                    .col(money(Scenarios::OceanLumpSum))
                    .col(money(Scenarios::TruckingLumpSum))
                    .col(
                        ColumnDef::new(Scenarios::DutyExempt)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(money(Scenarios::ManualDutyPercent))
                    .col(money(Scenarios::ConsumableFeePerUnit))
                    .col(money(Scenarios::LicenseFeePerUnit))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-scenarios-created_at")
                    .table(Scenarios::Table)
                    .col(Scenarios::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Scenario lines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ScenarioLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScenarioLines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScenarioLines::ScenarioId).uuid().not_null())
                    .col(ColumnDef::new(ScenarioLines::Position).integer().not_null())
                    .col(ColumnDef::new(ScenarioLines::VariantId).uuid().not_null())
                    .col(ColumnDef::new(ScenarioLines::Brand).string().not_null())
                    .col(ColumnDef::new(ScenarioLines::ModelName).string().not_null())
                    .col(ColumnDef::new(ScenarioLines::Code).string().not_null())
                    .col(
                        ColumnDef::new(ScenarioLines::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ScenarioLines::UnitsPerCarton)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(money(ScenarioLines::LengthCm))
                    .col(money(ScenarioLines::WidthCm))
                    .col(money(ScenarioLines::HeightCm))
                    .col(money(ScenarioLines::UnitCostForeign))
                    .col(money(ScenarioLines::UnitCostLocal))
                    .col(ColumnDef::new(ScenarioLines::Quantity).integer().not_null())
                    .col(money(ScenarioLines::TargetPrice))
                    .col(money(ScenarioLines::CapturedStandard))
                    .col(money(ScenarioLines::CapturedOnline))
                    .col(money(ScenarioLines::CapturedProposal))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-scenario_lines-scenario_id")
                            .from(ScenarioLines::Table, ScenarioLines::ScenarioId)
                            .to(Scenarios::Table, Scenarios::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-scenario_lines-scenario_id-position")
                    .table(ScenarioLines::Table)
                    .col(ScenarioLines::ScenarioId)
                    .col(ScenarioLines::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ScenarioLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Scenarios::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CatalogVariants::Table).to_owned())
            .await?;
        Ok(())
    }
}
