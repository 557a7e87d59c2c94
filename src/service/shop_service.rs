//! Shop and campaign management: registration, lookup, position sync, and
//! campaign creation.

use std::sync::Arc;

use super::normalize;
use crate::domain::{Campaign, GeoPoint, NewCampaign, NewShop, Shop, ShopId};
use crate::error::PinpointError;
use crate::persistence::OfferStore;

/// Write-side operations on shops and campaigns.
///
/// Validates input and delegates storage to the [`OfferStore`]. Campaigns
/// are not checked against existing shops: a campaign whose `owner_uid`
/// matches no shop is stored and simply never appears in proximity results.
#[derive(Debug, Clone)]
pub struct ShopService {
    store: Arc<dyn OfferStore>,
}

impl ShopService {
    /// Creates a new `ShopService`.
    #[must_use]
    pub fn new(store: Arc<dyn OfferStore>) -> Self {
        Self { store }
    }

    /// Registers a shop.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if the name is blank or
    /// `avg_spend` is negative, or the store's error on failure.
    pub async fn register_shop(&self, mut shop: NewShop) -> Result<Shop, PinpointError> {
        shop.name = shop.name.trim().to_string();
        if shop.name.is_empty() {
            return Err(PinpointError::invalid("shop name is required"));
        }
        if let Some(spend) = shop.avg_spend
            && (!spend.is_finite() || spend < 0.0)
        {
            return Err(PinpointError::invalid(
                "avg_spend must be a non-negative number",
            ));
        }
        shop.owner_uid = normalize(shop.owner_uid);

        let stored = self.store.insert_shop(shop).await?;
        tracing::info!(
            shop_id = %stored.id,
            positioned = stored.position.is_some(),
            "shop registered"
        );
        Ok(stored)
    }

    /// Fetches a shop.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ShopNotFound`] if no such shop exists.
    pub async fn get_shop(&self, id: ShopId) -> Result<Shop, PinpointError> {
        self.store.get_shop(id).await
    }

    /// Moves a shop, e.g. when a mobile stall reports its device location.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ShopNotFound`] if no such shop exists.
    pub async fn update_shop_position(
        &self,
        id: ShopId,
        position: GeoPoint,
    ) -> Result<Shop, PinpointError> {
        let shop = self.store.update_shop_position(id, position).await?;
        tracing::info!(shop_id = %id, %position, "shop position updated");
        Ok(shop)
    }

    /// Creates a campaign.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if a required text field
    /// is blank, the radius is not a positive number, or the window ends
    /// before it starts.
    pub async fn create_campaign(
        &self,
        mut campaign: NewCampaign,
    ) -> Result<Campaign, PinpointError> {
        campaign.owner_uid = campaign.owner_uid.trim().to_string();
        campaign.title = campaign.title.trim().to_string();
        campaign.offer = campaign.offer.trim().to_string();

        if campaign.owner_uid.is_empty() {
            return Err(PinpointError::invalid("owner_uid is required"));
        }
        if campaign.title.is_empty() || campaign.offer.is_empty() {
            return Err(PinpointError::invalid("title and offer are required"));
        }
        if !campaign.radius_km.is_finite() || campaign.radius_km <= 0.0 {
            return Err(PinpointError::invalid(
                "radius_km must be a positive number",
            ));
        }
        if campaign.end < campaign.start {
            return Err(PinpointError::invalid("end must not be before start"));
        }
        campaign.poster_path = normalize(campaign.poster_path);

        let stored = self.store.insert_campaign(campaign).await?;
        tracing::info!(
            campaign_id = stored.id.get(),
            owner_uid = %stored.owner_uid,
            "campaign created"
        );
        Ok(stored)
    }

    /// Lists an owner's campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] for a blank owner, or the
    /// store's error on failure.
    pub async fn list_campaigns(&self, owner_uid: &str) -> Result<Vec<Campaign>, PinpointError> {
        let owner_uid = owner_uid.trim();
        if owner_uid.is_empty() {
            return Err(PinpointError::invalid("owner_uid is required"));
        }
        self.store.list_campaigns(owner_uid).await
    }
}
