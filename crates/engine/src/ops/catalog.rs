use sea_orm::{QueryOrder, prelude::*, sea_query::OnConflict};
use uuid::Uuid;

use crate::{
    ResultEngine,
    catalog::{self, CatalogVariant},
    scenario::CatalogSource,
};

use super::Engine;

impl Engine {
    /// Every purchasable variant, ordered by brand, model and code.
    pub async fn list_purchasable_variants(&self) -> ResultEngine<Vec<CatalogVariant>> {
        let models = catalog::Entity::find()
            .order_by_asc(catalog::Column::Brand)
            .order_by_asc(catalog::Column::ModelName)
            .order_by_asc(catalog::Column::Code)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(CatalogVariant::from).collect())
    }

    /// Look a variant up by id.
    pub async fn catalog_variant(&self, variant_id: Uuid) -> ResultEngine<Option<CatalogVariant>> {
        Ok(catalog::Entity::find_by_id(variant_id)
            .one(&self.database)
            .await?
            .map(CatalogVariant::from))
    }

    /// Insert or replace variants, keyed by id.
    ///
    /// Only used to seed the catalog; the worksheet never writes to it.
    pub async fn upsert_variants(&self, variants: &[CatalogVariant]) -> ResultEngine<usize> {
        if variants.is_empty() {
            return Ok(0);
        }
        for variant in variants {
            variant.validate()?;
        }
        let models: Vec<catalog::ActiveModel> = variants.iter().map(Into::into).collect();
        catalog::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(catalog::Column::Id)
                    .update_columns([
                        catalog::Column::Brand,
                        catalog::Column::ModelName,
                        catalog::Column::Code,
                        catalog::Column::Description,
                        catalog::Column::UnitsPerCarton,
                        catalog::Column::LengthCm,
                        catalog::Column::WidthCm,
                        catalog::Column::HeightCm,
                        catalog::Column::UnitCostForeign,
                        catalog::Column::UnitCostLocal,
                        catalog::Column::PriceStandard,
                        catalog::Column::PriceOnline,
                        catalog::Column::PriceProposal,
                    ])
                    .to_owned(),
            )
            .exec(&self.database)
            .await?;
        tracing::info!(count = variants.len(), "catalog variants upserted");
        Ok(variants.len())
    }
}

impl CatalogSource for Engine {
    async fn list_purchasable_variants(&self) -> ResultEngine<Vec<CatalogVariant>> {
        Engine::list_purchasable_variants(self).await
    }
}
