//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::api::dto::{
    ActiveCampaignsResponse, CampaignDto, CampaignListResponse, CreateCampaignRequest,
    CreateCampaignResponse, CreateDeviceRequest, CreateDeviceResponse, CreateProductRequest,
    CreateProductResponse, CreateShopRequest, CreateShopResponse, DeviceDto, DeviceListResponse,
    MessageResponse, NearbyCampaignDto, NearbyShopDto, NearbyShopsResponse, ProductDto,
    ProductListResponse, ProductResponse, ShopDto, ShopProfileDto, UpdateLocationRequest,
    UpdateProductRequest, UpdateProductResponse,
};
use crate::api::handlers::{campaign, device, nearby, product, shop, system};
use crate::domain::{ConnectionStatus, DistanceStrategy};
use crate::error::{ErrorBody, ErrorResponse};

/// Root OpenAPI description of the gateway.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pinpoint-gateway",
        description = "Proximity search over shops and their active campaigns, with owner product catalogs and a device registry."
    ),
    paths(
        nearby::nearby_shops,
        nearby::active_campaigns_nearby,
        shop::create_shop,
        shop::get_shop,
        shop::update_shop_location,
        campaign::create_campaign,
        campaign::list_campaigns,
        product::create_product,
        product::list_products,
        product::get_product,
        product::update_product,
        product::patch_product,
        product::delete_product,
        device::create_device,
        device::list_devices,
        device::get_device,
        system::health_handler,
    ),
    components(schemas(
        ShopProfileDto,
        ShopDto,
        CampaignDto,
        NearbyShopDto,
        NearbyShopsResponse,
        NearbyCampaignDto,
        ActiveCampaignsResponse,
        CreateShopRequest,
        CreateShopResponse,
        UpdateLocationRequest,
        CreateCampaignRequest,
        CreateCampaignResponse,
        CampaignListResponse,
        ProductDto,
        CreateProductRequest,
        CreateProductResponse,
        ProductResponse,
        UpdateProductRequest,
        UpdateProductResponse,
        ProductListResponse,
        MessageResponse,
        DeviceDto,
        CreateDeviceRequest,
        CreateDeviceResponse,
        DeviceListResponse,
        ConnectionStatus,
        DistanceStrategy,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Proximity", description = "Nearby shops and running campaigns"),
        (name = "Shops", description = "Shop registration and location"),
        (name = "Campaigns", description = "Campaign management"),
        (name = "Products", description = "Owner product catalogs"),
        (name = "Devices", description = "Device registry"),
        (name = "System", description = "Health and metadata"),
    )
)]
pub struct ApiDoc;
