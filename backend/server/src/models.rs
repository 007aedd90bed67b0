//! # Records
//!
//! Shapes exchanged with the store.
//!
//! - `New*` structs are what a registration inserts. They carry the declarative
//!   rule set checked before any request leaves the process.
//! - `*Row` structs are the listing projections read back, newest first.
//!
//! `id`, `created_at` and `updated_at` are never sent; the store assigns them.
use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::catalog::{Industry, SalesMethod};

pub const MAX_INDUSTRIES: usize = 3;

/// A table the application writes to and lists from.
pub trait Entity: Send + Sync + 'static {
    const TABLE: &'static str;
    /// Columns fetched by the listing page.
    const PROJECTION: &'static [&'static str];
    /// How the entity is named in user-facing messages.
    const NOUN: &'static str;

    type New: Serialize + Validate + Clone + Send + Sync;
    type Row: DeserializeOwned + Serialize + Clone + Send;
}

pub struct Koc;

pub struct Brand;

impl Entity for Koc {
    const TABLE: &'static str = "kocs";
    const PROJECTION: &'static [&'static str] = &[
        "id",
        "full_name",
        "channel_link",
        "industries",
        "sales_method",
        "follower_count",
        "short_description",
        "created_at",
    ];
    const NOUN: &'static str = "KOC";

    type New = NewKoc;
    type Row = KocRow;
}

impl Entity for Brand {
    const TABLE: &'static str = "brands";
    const PROJECTION: &'static [&'static str] = &[
        "id",
        "brand_name",
        "contact_person",
        "industry",
        "expected_budget",
        "short_description",
        "created_at",
    ];
    const NOUN: &'static str = "Brand";

    type New = NewBrand;
    type Row = BrandRow;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewKoc {
    #[validate(length(min = 2, message = "Họ tên phải có ít nhất 2 ký tự"))]
    pub full_name: String,

    #[validate(length(min = 10, message = "Số điện thoại không hợp lệ"))]
    pub phone: String,

    #[validate(email(message = "Email không hợp lệ"))]
    pub email: String,

    #[validate(url(message = "Link kênh không hợp lệ"))]
    pub channel_link: String,

    #[validate(length(min = 1, message = "ID kênh không được để trống"))]
    pub channel_id: String,

    #[validate(custom(function = "industries_in_range"))]
    pub industries: Vec<Industry>,

    pub sales_method: SalesMethod,

    #[validate(range(min = 0, message = "Số lượng follower phải >= 0"))]
    pub follower_count: i64,

    #[validate(range(min = 0, message = "Mức cast mong muốn phải >= 0"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_cast: Option<i64>,

    #[validate(length(min = 10, message = "Địa chỉ nhận hàng phải chi tiết"))]
    pub shipping_address: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmv_30_days: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaboration_description: Option<String>,

    #[validate(range(min = 1, message = "Tốc độ trả job phải >= 1 ngày"))]
    pub job_completion_days: i64,

    #[validate(range(min = 0, message = "Số lượng KOC có thể tập hợp phải >= 0"))]
    pub team_size: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

fn industries_in_range(industries: &[Industry]) -> Result<(), ValidationError> {
    if industries.is_empty() {
        return Err(ValidationError::new("industries_min")
            .with_message(Cow::Borrowed("Chọn ít nhất 1 ngành hàng")));
    }

    if industries.len() > MAX_INDUSTRIES {
        return Err(ValidationError::new("industries_max")
            .with_message(Cow::Borrowed("Chọn tối đa 3 ngành hàng")));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewBrand {
    #[validate(length(min = 2, message = "Tên thương hiệu phải có ít nhất 2 ký tự"))]
    pub brand_name: String,

    #[validate(length(min = 2, message = "Tên người liên hệ phải có ít nhất 2 ký tự"))]
    pub contact_person: String,

    #[validate(length(min = 10, message = "Số điện thoại không hợp lệ"))]
    pub phone: String,

    #[validate(email(message = "Email không hợp lệ"))]
    pub email: String,

    pub industry: Industry,

    #[validate(range(min = 0, message = "Ngân sách dự kiến phải >= 0"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_budget: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KocRow {
    pub id: Uuid,
    pub full_name: String,
    pub channel_link: String,
    pub industries: Vec<Industry>,
    pub sales_method: SalesMethod,
    pub follower_count: i64,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRow {
    pub id: Uuid,
    pub brand_name: String,
    pub contact_person: String,
    pub industry: Industry,
    pub expected_budget: Option<i64>,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
}
