//! PostgreSQL implementation of the offer store.
//!
//! Both distance strategies are plain parameterized SQL:
//!
//! - geodesic: PostGIS `geography` points, `ST_DWithin` as the
//!   index-backed prefilter and `ST_Distance` for the value that is both
//!   filtered on and ordered by;
//! - haversine: the spherical formula written out in SQL, usable on a
//!   vanilla Postgres.
//!
//! When PostGIS is missing, Postgres reports SQLSTATE `42883`
//! (undefined_function) for `ST_*` calls, or `42704` (undefined_object)
//! when it reaches the `geography` cast first. `42883` always becomes
//! [`PinpointError::GeoCapabilityUnavailable`]; `42704` only does when the
//! missing object is the `geography` type. Anything else is a plain
//! [`PinpointError::Persistence`].
//!
//! Catalog and device queries are plain CRUD. A duplicate device uid
//! surfaces as SQLSTATE `23505` and becomes
//! [`PinpointError::DeviceAlreadyRegistered`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::OfferStore;
use super::models::{
    CampaignRow, DeviceRow, NearbyCampaignRow, NearbyShopRow, ProductRow, ShopRow,
};
use crate::domain::{
    Campaign, Device, DistanceStrategy, GeoPoint, NearbyCampaign, NearbyShop, NewCampaign,
    NewDevice, NewProduct, NewShop, Product, ProductId, ProductPage, ProductPatch, ProductQuery,
    ProximityRequest, Shop, ShopId,
};
use crate::error::PinpointError;

const UNDEFINED_FUNCTION: &str = "42883";
const UNDEFINED_OBJECT: &str = "42704";
const UNIQUE_VIOLATION: &str = "23505";

const SHOP_COLUMNS: &str = "s.id, s.owner_uid, s.name, s.category, s.description, \
     s.address_line, s.city, s.lat, s.lon, s.registration_no, s.contact_number, \
     s.avg_spend, s.has_offer, s.image_url, s.logo_url, s.created_at, s.updated_at";

const RETURNING_SHOP: &str = "RETURNING id, owner_uid, name, category, description, \
     address_line, city, lat, lon, registration_no, contact_number, avg_spend, has_offer, \
     image_url, logo_url, created_at, updated_at";

const CAMPAIGN_COLUMNS: &str =
    "id, owner_uid, title, offer, radius_km, start_at, end_at, poster_path, active, created_at";

const PRODUCT_COLUMNS: &str =
    "id, owner_uid, name, description, price, image_url, created_at, updated_at";

/// `$1` = owner, `$2` = `ILIKE` pattern or NULL for no text filter.
const PRODUCT_FILTER: &str = "WHERE owner_uid = $1 \
     AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)";

const DEVICE_COLUMNS: &str = "id, uid, phone_number, lat, lon, c_status, created_at, updated_at";

/// Shop position as a geography value. Must match the expression of the
/// `shops_position_geog_idx` index for the planner to use it.
const SHOP_GEOGRAPHY: &str = "ST_SetSRID(ST_MakePoint(s.lon, s.lat), 4326)::geography";

const ORIGIN_GEOGRAPHY: &str = "ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography";

/// `$1` = origin lat, `$2` = origin lon. `LEAST` guards `asin` against
/// rounding just above 1.
const HAVERSINE_DISTANCE: &str = "6371000.0::float8 * 2 * asin(LEAST(1.0::float8, sqrt(\
     power(sin(radians(s.lat - $1) / 2), 2) + \
     cos(radians($1)) * cos(radians(s.lat)) * \
     power(sin(radians(s.lon - $2) / 2), 2))))";

/// Inner select producing every positioned shop within `$3` meters, with
/// `distance_m` computed once by the chosen strategy.
fn candidates_sql(strategy: DistanceStrategy) -> String {
    let (distance, prefilter) = match strategy {
        DistanceStrategy::Geodesic => (
            format!("ST_Distance({SHOP_GEOGRAPHY}, {ORIGIN_GEOGRAPHY})"),
            format!("AND ST_DWithin({SHOP_GEOGRAPHY}, {ORIGIN_GEOGRAPHY}, $3)"),
        ),
        DistanceStrategy::Haversine => (HAVERSINE_DISTANCE.to_string(), String::new()),
    };
    format!(
        "SELECT * FROM ( \
           SELECT {SHOP_COLUMNS}, {distance} AS distance_m \
           FROM shops s \
           WHERE s.lat IS NOT NULL AND s.lon IS NOT NULL {prefilter} \
         ) AS within_radius \
         WHERE within_radius.distance_m <= $3"
    )
}

/// Binds: `$1` lat, `$2` lon, `$3` radius, `$4` limit, `$5` now.
fn nearby_shops_sql(strategy: DistanceStrategy) -> String {
    format!(
        "SELECT n.*, EXISTS ( \
           SELECT 1 FROM campaigns c \
           WHERE c.owner_uid = n.owner_uid AND c.start_at <= $5 AND c.end_at >= $5 \
         ) AS has_active_campaign \
         FROM ({candidates}) AS n \
         ORDER BY n.distance_m ASC, n.id ASC \
         LIMIT $4",
        candidates = candidates_sql(strategy),
    )
}

/// Same binds as [`nearby_shops_sql`]. Inner join: shops without campaigns
/// and campaigns without a shop produce no row.
fn active_campaigns_sql(strategy: DistanceStrategy) -> String {
    format!(
        "SELECT n.*, \
           c.id AS campaign_id, c.owner_uid AS campaign_owner_uid, \
           c.title AS campaign_title, c.offer AS campaign_offer, \
           c.radius_km AS campaign_radius_km, c.start_at AS campaign_start_at, \
           c.end_at AS campaign_end_at, c.poster_path AS campaign_poster_path, \
           c.active AS campaign_active, c.created_at AS campaign_created_at \
         FROM ({candidates}) AS n \
         JOIN campaigns c ON c.owner_uid = n.owner_uid \
         WHERE c.start_at <= $5 AND c.end_at >= $5 \
         ORDER BY n.distance_m ASC, n.id ASC, c.id ASC \
         LIMIT $4",
        candidates = candidates_sql(strategy),
    )
}

/// Maps a failure of a spatial query, singling out missing-PostGIS errors.
fn spatial_error(err: sqlx::Error) -> PinpointError {
    if let sqlx::Error::Database(db) = &err
        && is_missing_postgis(db.code().as_deref(), db.message())
    {
        return PinpointError::GeoCapabilityUnavailable(db.message().to_string());
    }
    persistence_error(err)
}

/// `42704` is raised for any undefined object, so it only counts when the
/// message names the `geography` type.
fn is_missing_postgis(code: Option<&str>, message: &str) -> bool {
    match code {
        Some(UNDEFINED_FUNCTION) => true,
        Some(UNDEFINED_OBJECT) => message.contains("\"geography\""),
        _ => false,
    }
}

fn persistence_error(err: sqlx::Error) -> PinpointError {
    PinpointError::Persistence(err.to_string())
}

fn device_insert_error(err: sqlx::Error, uid: String) -> PinpointError {
    if let sqlx::Error::Database(db) = &err
        && db.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        return PinpointError::DeviceAlreadyRegistered(uid);
    }
    persistence_error(err)
}

/// Wraps a search term as a substring `ILIKE` pattern, escaping the
/// wildcard characters it contains.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`PinpointError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), PinpointError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PinpointError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl OfferStore for PostgresStore {
    async fn probe_strategy(&self) -> Result<DistanceStrategy, PinpointError> {
        let installed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'postgis')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(persistence_error)?;

        Ok(if installed {
            DistanceStrategy::Geodesic
        } else {
            DistanceStrategy::Haversine
        })
    }

    async fn nearby_shops(
        &self,
        request: &ProximityRequest,
        strategy: DistanceStrategy,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyShop>, PinpointError> {
        let sql = nearby_shops_sql(strategy);
        let rows = sqlx::query_as::<_, NearbyShopRow>(&sql)
            .bind(request.origin().lat())
            .bind(request.origin().lon())
            .bind(request.radius_m())
            .bind(i64::from(request.limit()))
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(spatial_error)?;

        Ok(rows.into_iter().map(NearbyShop::from).collect())
    }

    async fn active_campaigns_nearby(
        &self,
        request: &ProximityRequest,
        strategy: DistanceStrategy,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyCampaign>, PinpointError> {
        let sql = active_campaigns_sql(strategy);
        let rows = sqlx::query_as::<_, NearbyCampaignRow>(&sql)
            .bind(request.origin().lat())
            .bind(request.origin().lon())
            .bind(request.radius_m())
            .bind(i64::from(request.limit()))
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(spatial_error)?;

        Ok(rows.into_iter().map(NearbyCampaign::from).collect())
    }

    async fn insert_shop(&self, shop: NewShop) -> Result<Shop, PinpointError> {
        let sql = format!(
            "INSERT INTO shops (owner_uid, name, category, description, address_line, city, \
             lat, lon, registration_no, contact_number, avg_spend, has_offer, image_url, logo_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             {RETURNING_SHOP}"
        );
        let row = sqlx::query_as::<_, ShopRow>(&sql)
            .bind(shop.owner_uid)
            .bind(shop.name)
            .bind(shop.category)
            .bind(shop.description)
            .bind(shop.address_line)
            .bind(shop.city)
            .bind(shop.position.map(|p| p.lat()))
            .bind(shop.position.map(|p| p.lon()))
            .bind(shop.registration_no)
            .bind(shop.contact_number)
            .bind(shop.avg_spend)
            .bind(shop.has_offer)
            .bind(shop.image_url)
            .bind(shop.logo_url)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence_error)?;

        Ok(row.into())
    }

    async fn get_shop(&self, id: ShopId) -> Result<Shop, PinpointError> {
        let sql = format!("SELECT {SHOP_COLUMNS} FROM shops s WHERE s.id = $1");
        sqlx::query_as::<_, ShopRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error)?
            .map(Shop::from)
            .ok_or(PinpointError::ShopNotFound(id.get()))
    }

    async fn update_shop_position(
        &self,
        id: ShopId,
        position: GeoPoint,
    ) -> Result<Shop, PinpointError> {
        let sql = format!(
            "UPDATE shops SET lat = $2, lon = $3, updated_at = now() WHERE id = $1 {RETURNING_SHOP}"
        );
        sqlx::query_as::<_, ShopRow>(&sql)
            .bind(id.get())
            .bind(position.lat())
            .bind(position.lon())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error)?
            .map(Shop::from)
            .ok_or(PinpointError::ShopNotFound(id.get()))
    }

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, PinpointError> {
        let sql = format!(
            "INSERT INTO campaigns (owner_uid, title, offer, radius_km, start_at, end_at, \
             poster_path, active) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(campaign.owner_uid)
            .bind(campaign.title)
            .bind(campaign.offer)
            .bind(campaign.radius_km)
            .bind(campaign.start)
            .bind(campaign.end)
            .bind(campaign.poster_path)
            .bind(campaign.active)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence_error)?;

        Ok(row.into())
    }

    async fn list_campaigns(&self, owner_uid: &str) -> Result<Vec<Campaign>, PinpointError> {
        let sql = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE owner_uid = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(owner_uid)
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error)?;

        Ok(rows.into_iter().map(Campaign::from).collect())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, PinpointError> {
        let sql = format!(
            "INSERT INTO products (owner_uid, name, description, price, image_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product.owner_uid)
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence_error)?;

        Ok(row.into())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, PinpointError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error)?
            .map(Product::from)
            .ok_or(PinpointError::ProductNotFound(id.get()))
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, PinpointError> {
        let pattern = query.search().map(contains_pattern);

        let count_sql = format!("SELECT COUNT(*) FROM products {PRODUCT_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(query.owner_uid())
            .bind(pattern.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(persistence_error)?;

        let page_sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {PRODUCT_FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&page_sql)
            .bind(query.owner_uid())
            .bind(pattern.as_deref())
            .bind(i64::from(query.limit()))
            .bind(i64::from(query.offset()))
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error)?;

        Ok(ProductPage {
            total: u64::try_from(total).unwrap_or(0),
            products: rows.into_iter().map(Product::from).collect(),
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, PinpointError> {
        let sql = format!(
            "UPDATE products SET \
               name = COALESCE($2, name), \
               description = CASE WHEN $3 THEN $4 ELSE description END, \
               price = COALESCE($5, price), \
               image_url = CASE WHEN $6 THEN $7 ELSE image_url END, \
               updated_at = now() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let set_description = patch.description.is_some();
        let set_image_url = patch.image_url.is_some();
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.get())
            .bind(patch.name)
            .bind(set_description)
            .bind(patch.description.flatten())
            .bind(patch.price)
            .bind(set_image_url)
            .bind(patch.image_url.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error)?
            .map(Product::from)
            .ok_or(PinpointError::ProductNotFound(id.get()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), PinpointError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(persistence_error)?;
        if result.rows_affected() == 0 {
            return Err(PinpointError::ProductNotFound(id.get()));
        }
        Ok(())
    }

    async fn insert_device(&self, device: NewDevice) -> Result<Device, PinpointError> {
        let sql = format!(
            "INSERT INTO devices (uid, phone_number, lat, lon, c_status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {DEVICE_COLUMNS}"
        );
        let uid = device.uid.clone();
        let row = sqlx::query_as::<_, DeviceRow>(&sql)
            .bind(device.uid)
            .bind(device.phone_number)
            .bind(device.position.map(|p| p.lat()))
            .bind(device.position.map(|p| p.lon()))
            .bind(device.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| device_insert_error(err, uid))?;

        Device::try_from(row)
    }

    async fn get_device(&self, uid: &str) -> Result<Device, PinpointError> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE uid = $1");
        let row = sqlx::query_as::<_, DeviceRow>(&sql)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence_error)?
            .ok_or_else(|| PinpointError::DeviceNotFound(uid.to_string()))?;

        Device::try_from(row)
    }

    async fn list_devices(&self) -> Result<Vec<Device>, PinpointError> {
        let sql =
            format!("SELECT {DEVICE_COLUMNS} FROM devices ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, DeviceRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(persistence_error)?
            .into_iter()
            .map(Device::try_from)
            .collect()
    }
}
