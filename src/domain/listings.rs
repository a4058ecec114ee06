//! Mock travel-listing data providers
//!
//! Every payload is built from fixed templates parameterised by the request
//! arguments. Nothing here fails and nothing here performs I/O.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::params::SearchParams;

pub const DEFAULT_LOCATION: &str = "Anywhere";
pub const DEFAULT_ADULTS: u32 = 1;
pub const CURRENCY: &str = "USD";

struct ListingTemplate {
    id: &'static str,
    name: &'static str,
    property_type: &'static str,
    price_per_night: u32,
    rating: f32,
    reviews_count: u32,
    bedrooms: u32,
    bathrooms: u32,
    max_guests: u32,
    amenities: &'static [&'static str],
    superhost: bool,
}

static TEMPLATES: [ListingTemplate; 3] = [
    ListingTemplate {
        id: "mcp-1",
        name: "Cozy Downtown Apartment",
        property_type: "Entire apartment",
        price_per_night: 120,
        rating: 4.8,
        reviews_count: 124,
        bedrooms: 1,
        bathrooms: 1,
        max_guests: 2,
        amenities: &["WiFi", "Kitchen", "Air conditioning", "Washer"],
        superhost: true,
    },
    ListingTemplate {
        id: "mcp-2",
        name: "Spacious Family Home",
        property_type: "Entire house",
        price_per_night: 245,
        rating: 4.9,
        reviews_count: 89,
        bedrooms: 3,
        bathrooms: 2,
        max_guests: 6,
        amenities: &["WiFi", "Kitchen", "Free parking", "Backyard", "Crib"],
        superhost: false,
    },
    ListingTemplate {
        id: "mcp-3",
        name: "Modern Studio with City Views",
        property_type: "Private studio",
        price_per_night: 95,
        rating: 4.6,
        reviews_count: 212,
        bedrooms: 1,
        bathrooms: 1,
        max_guests: 2,
        amenities: &["WiFi", "Workspace", "Elevator"],
        superhost: false,
    },
];

static GENERIC_TEMPLATE: ListingTemplate = ListingTemplate {
    id: "",
    name: "Charming Guest Suite",
    property_type: "Entire guest suite",
    price_per_night: 150,
    rating: 4.7,
    reviews_count: 57,
    bedrooms: 2,
    bathrooms: 1,
    max_guests: 4,
    amenities: &["WiFi", "Kitchen", "Heating", "Self check-in"],
    superhost: true,
};

const CLEANING_FEE: u32 = 45;
const SERVICE_FEE_PERCENT: u32 = 12;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub location: String,
    pub property_type: &'static str,
    pub price_per_night: u32,
    pub currency: &'static str,
    pub rating: f32,
    pub reviews_count: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub max_guests: u32,
    pub amenities: Vec<&'static str>,
    pub superhost: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub success: bool,
    pub search_params: SearchParams,
    pub total_results: usize,
    pub listings: Vec<Listing>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub name: &'static str,
    pub superhost: bool,
    pub response_rate: &'static str,
    pub response_time: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub price_per_night: u32,
    pub currency: &'static str,
    pub cleaning_fee: u32,
    pub service_fee: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(flatten)]
    pub summary: Listing,
    pub description: String,
    pub host: Host,
    pub house_rules: Vec<&'static str>,
    pub check_in_time: &'static str,
    pub check_out_time: &'static str,
    pub cancellation_policy: &'static str,
    pub pricing: PriceBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    pub success: bool,
    pub listing: ListingDetail,
    pub search_params: SearchParams,
    pub timestamp: String,
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn search(params: &SearchParams) -> SearchResults {
    let search_params = effective_params(params);
    let location = search_params.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let nights = params.nights();

    let listings: Vec<Listing> = TEMPLATES
        .iter()
        .map(|template| build_listing(template, template.id, location, nights))
        .collect();

    SearchResults {
        success: true,
        total_results: listings.len(),
        listings,
        search_params,
        timestamp: now_utc(),
    }
}

pub fn listing_details(id: &str, params: &SearchParams) -> ListingDetails {
    let search_params = effective_params(params);
    let location = search_params.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let nights = params.nights();
    let template = TEMPLATES
        .iter()
        .find(|template| template.id == id)
        .unwrap_or(&GENERIC_TEMPLATE);

    let summary = build_listing(template, id, location, nights);
    let service_fee = template.price_per_night * SERVICE_FEE_PERCENT / 100;
    let total = nights.and_then(|nights| {
        template
            .price_per_night
            .checked_add(service_fee)?
            .checked_mul(nights)?
            .checked_add(CLEANING_FEE)
    });

    let listing = ListingDetail {
        description: format!(
            "{} in {}. Sleeps {} guests across {} bedroom(s), close to local shops and transit.",
            template.name, location, template.max_guests, template.bedrooms
        ),
        host: Host {
            name: "Alex",
            superhost: template.superhost,
            response_rate: "98%",
            response_time: "within an hour",
        },
        house_rules: vec!["No smoking", "No parties or events", "Quiet hours after 22:00"],
        check_in_time: "15:00",
        check_out_time: "11:00",
        cancellation_policy: "Flexible",
        pricing: PriceBreakdown {
            price_per_night: template.price_per_night,
            currency: CURRENCY,
            cleaning_fee: CLEANING_FEE,
            service_fee,
            nights,
            total,
        },
        summary,
    };

    ListingDetails {
        success: true,
        listing,
        search_params,
        timestamp: now_utc(),
    }
}

fn effective_params(params: &SearchParams) -> SearchParams {
    SearchParams {
        location: Some(
            params
                .location
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        ),
        adults: Some(params.adults.unwrap_or(DEFAULT_ADULTS)),
        children: Some(params.children.unwrap_or(0)),
        infants: Some(params.infants.unwrap_or(0)),
        pets: Some(params.pets.unwrap_or(0)),
        ..params.clone()
    }
}

fn build_listing(
    template: &ListingTemplate,
    id: &str,
    location: &str,
    nights: Option<u32>,
) -> Listing {
    Listing {
        id: id.to_string(),
        name: format!("{} in {}", template.name, location),
        location: location.to_string(),
        property_type: template.property_type,
        price_per_night: template.price_per_night,
        currency: CURRENCY,
        rating: template.rating,
        reviews_count: template.reviews_count,
        bedrooms: template.bedrooms,
        bathrooms: template.bathrooms,
        max_guests: template.max_guests,
        amenities: template.amenities.to_vec(),
        superhost: template.superhost,
        url: format!("https://www.airbnb.com/rooms/{id}"),
        nights,
        total_price: nights.and_then(|nights| template.price_per_night.checked_mul(nights)),
    }
}
