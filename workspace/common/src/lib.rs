//! Transport-layer types of the store backend.
//! These structs mirror the REST payloads so the admin client can
//! deserialize API responses without duplicating shapes.

mod wire;

pub use wire::{ErrorResponse, ListPayload, MessageField};

use catalog::Record;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ===================== Catalogs =====================

/// Product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Subcategory, always hanging from a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubcategoryDto {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

// ===================== Inventory =====================

/// Product as listed in the inventory screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub image_url: Option<String>,
    /// Technical datasheet (PDF)
    pub datasheet_url: Option<String>,
}

// ===================== Purchases & sales =====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseDto {
    pub id: i64,
    pub supplier: Option<String>,
    pub date: Option<NaiveDate>,
    pub total: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleDto {
    pub id: i64,
    pub customer: Option<String>,
    pub date: Option<NaiveDate>,
    pub total: Option<Decimal>,
    pub payment_method: Option<String>,
}

// ===================== Pricing =====================

/// Price list entry, optionally with a promotional price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceDto {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub price: Decimal,
    pub promo_price: Option<Decimal>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

// ===================== Cash register =====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashMovementDto {
    pub id: i64,
    /// "ingreso" or "egreso"
    pub kind: String,
    pub amount: Decimal,
    pub concept: Option<String>,
    pub date: Option<NaiveDate>,
}

// ===================== Online orders =====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OnlineOrderDto {
    pub id: i64,
    pub customer_name: Option<String>,
    pub status: String,
    pub total: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
}

// ===================== Record impls =====================

macro_rules! named_record {
    ($($dto:ty),* $(,)?) => {
        $(
            impl Record for $dto {
                fn id(&self) -> i64 {
                    self.id
                }

                fn name(&self) -> Option<&str> {
                    Some(&self.name)
                }
            }
        )*
    };
}

named_record!(CategoryDto, SubcategoryDto, BrandDto, ProductDto);

impl Record for PurchaseDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.supplier.as_deref()
    }
}

impl Record for SaleDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.customer.as_deref()
    }
}

impl Record for PriceDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }
}

impl Record for CashMovementDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.concept.as_deref()
    }
}

impl Record for OnlineOrderDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }
}
