//! Order lines: a catalog selection plus a quantity and a target price.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    catalog::{CatalogVariant, PriceTiers},
};

/// One of the preset selling prices of a variant.
///
/// This is also the worksheet-wide tier selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    #[default]
    Standard,
    Online,
    Proposal,
}

impl PriceTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PriceTier::Standard => "standard",
            PriceTier::Online => "online",
            PriceTier::Proposal => "proposal",
        }
    }
}

/// Where the target price of a line comes from.
///
/// `Manual` means the price was typed in by hand (or restored from a saved
/// scenario) and is no longer tied to any tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierLabel {
    Standard,
    Online,
    Proposal,
    Manual,
}

impl TierLabel {
    /// The tier backing this label, `None` for manual prices.
    #[must_use]
    pub const fn tier(self) -> Option<PriceTier> {
        match self {
            TierLabel::Standard => Some(PriceTier::Standard),
            TierLabel::Online => Some(PriceTier::Online),
            TierLabel::Proposal => Some(PriceTier::Proposal),
            TierLabel::Manual => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TierLabel::Standard => "standard",
            TierLabel::Online => "online",
            TierLabel::Proposal => "proposal",
            TierLabel::Manual => "manual",
        }
    }
}

impl From<PriceTier> for TierLabel {
    fn from(value: PriceTier) -> Self {
        match value {
            PriceTier::Standard => TierLabel::Standard,
            PriceTier::Online => TierLabel::Online,
            PriceTier::Proposal => TierLabel::Proposal,
        }
    }
}

/// A line of the working set.
///
/// `variant` is a value copy taken when the line was added and `captured`
/// holds the three tier prices frozen at the same instant (or at load time).
/// Unless `tier_label` is [`TierLabel::Manual`], `target_price` equals
/// `captured.price(tier)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub variant: CatalogVariant,
    pub quantity: u32,
    pub target_price: f64,
    pub tier_label: TierLabel,
    pub captured: PriceTiers,
}

impl OrderLine {
    /// Build a line from a catalog selection, priced at `tier`.
    pub fn from_variant(
        variant: &CatalogVariant,
        quantity: u32,
        tier: PriceTier,
    ) -> ResultEngine<Self> {
        ensure_quantity(quantity)?;
        variant.validate()?;
        let captured = variant.prices;
        Ok(Self {
            id: Uuid::new_v4(),
            variant: variant.clone(),
            quantity,
            target_price: captured.price(tier),
            tier_label: tier.into(),
            captured,
        })
    }

    /// Rebuild a line from a saved scenario.
    ///
    /// The tier the price came from is not stored, so restored lines are
    /// always labelled manual.
    pub fn restored(
        variant: CatalogVariant,
        quantity: u32,
        target_price: f64,
        captured: PriceTiers,
    ) -> ResultEngine<Self> {
        ensure_quantity(quantity)?;
        ensure_price(target_price)?;
        Ok(Self {
            id: Uuid::new_v4(),
            variant,
            quantity,
            target_price,
            tier_label: TierLabel::Manual,
            captured,
        })
    }

    /// Re-price the line from its captured tiers, dropping any manual price.
    pub fn apply_tier(&mut self, tier: PriceTier) {
        self.target_price = self.captured.price(tier);
        self.tier_label = tier.into();
    }

    /// Set a hand-typed target price.
    pub fn set_manual_price(&mut self, price: f64) -> ResultEngine<()> {
        ensure_price(price)?;
        self.target_price = price;
        self.tier_label = TierLabel::Manual;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: u32) -> ResultEngine<()> {
        ensure_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

fn ensure_quantity(quantity: u32) -> ResultEngine<()> {
    if quantity == 0 {
        return Err(EngineError::InvalidQuantity(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn ensure_price(price: f64) -> ResultEngine<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "target price must be a finite value >= 0, got {price}"
        )));
    }
    Ok(())
}
