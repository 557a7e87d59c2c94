//! Time-bounded promotional campaigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database identifier of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(i64);

impl CampaignId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

/// A campaign run by a shop owner.
///
/// Campaigns correlate with shops through `owner_uid`, not a foreign key.
/// A campaign whose owner has no shop is valid and simply never appears in
/// proximity results.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    /// Primary key.
    pub id: CampaignId,
    /// Owner identifier shared with the owning shop.
    pub owner_uid: String,
    /// Headline.
    pub title: String,
    /// Offer text shown to customers.
    pub offer: String,
    /// Promotional radius in kilometers.
    pub radius_km: f64,
    /// Window start (inclusive).
    pub start: DateTime<Utc>,
    /// Window end (inclusive).
    pub end: DateTime<Utc>,
    /// Poster asset reference.
    pub poster_path: Option<String>,
    /// Manual activation flag. Informational only; time filtering uses the
    /// window.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// `true` iff `start <= now <= end`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}

/// Fields supplied when creating a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCampaign {
    /// Owner identifier.
    pub owner_uid: String,
    /// Headline.
    pub title: String,
    /// Offer text.
    pub offer: String,
    /// Promotional radius in kilometers.
    pub radius_km: f64,
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
    /// Poster asset reference.
    pub poster_path: Option<String>,
    /// Manual activation flag.
    pub active: bool,
}

impl NewCampaign {
    /// Materializes the record with a store-assigned ID.
    #[must_use]
    pub fn into_campaign(self, id: CampaignId, now: DateTime<Utc>) -> Campaign {
        Campaign {
            id,
            owner_uid: self.owner_uid,
            title: self.title,
            offer: self.offer,
            radius_km: self.radius_km,
            start: self.start,
            end: self.end,
            poster_path: self.poster_path,
            active: self.active,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn campaign(start: DateTime<Utc>, end: DateTime<Utc>) -> Campaign {
        NewCampaign {
            owner_uid: "owner-1".to_string(),
            title: "Diwali".to_string(),
            offer: "20% off".to_string(),
            radius_km: 2.0,
            start,
            end,
            poster_path: None,
            active: true,
        }
        .into_campaign(CampaignId::new(1), start)
    }

    #[test]
    fn active_inside_window() {
        let now = Utc::now();
        let c = campaign(now - Duration::days(1), now + Duration::days(1));
        assert!(c.is_active_at(now));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc::now();
        let c = campaign(now, now + Duration::hours(1));
        assert!(c.is_active_at(now));
        assert!(c.is_active_at(now + Duration::hours(1)));
    }

    #[test]
    fn inactive_outside_window() {
        let now = Utc::now();
        let expired = campaign(now - Duration::days(2), now - Duration::days(1));
        let upcoming = campaign(now + Duration::days(1), now + Duration::days(2));
        assert!(!expired.is_active_at(now));
        assert!(!upcoming.is_active_at(now));
    }

    #[test]
    fn manual_flag_does_not_override_window() {
        let now = Utc::now();
        let mut c = campaign(now - Duration::days(2), now - Duration::days(1));
        c.active = true;
        assert!(!c.is_active_at(now));
    }
}
