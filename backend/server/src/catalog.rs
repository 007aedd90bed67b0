//! # Catalog
//!
//! Closed label sets shared by both registration forms, both listings and the store.
//!
//! The store keeps these as Postgres enums (`industry_type`, `sales_method`), so the
//! serialized form is always the Vietnamese label.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Industry {
    #[serde(rename = "Thời trang")]
    Fashion,
    #[serde(rename = "Làm đẹp")]
    Beauty,
    #[serde(rename = "Điện tử")]
    Electronics,
    #[serde(rename = "Gia dụng")]
    Household,
    #[serde(rename = "Thực phẩm")]
    Food,
    #[serde(rename = "Du lịch")]
    Travel,
    #[serde(rename = "Giáo dục")]
    Education,
    #[serde(rename = "Sức khỏe")]
    Health,
    #[serde(rename = "Thể thao")]
    Sports,
    #[serde(rename = "Mẹ và bé")]
    MotherAndBaby,
    #[serde(rename = "Nội thất")]
    Furniture,
    #[serde(rename = "Phụ kiện")]
    Accessories,
    #[serde(rename = "Giải trí")]
    Entertainment,
    #[serde(rename = "Khác")]
    Other,
}

impl Industry {
    /// Display order of the checkbox grid and the filter dropdown.
    pub const ALL: [Industry; 14] = [
        Industry::Fashion,
        Industry::Beauty,
        Industry::Electronics,
        Industry::Household,
        Industry::Food,
        Industry::Travel,
        Industry::Education,
        Industry::Health,
        Industry::Sports,
        Industry::MotherAndBaby,
        Industry::Furniture,
        Industry::Accessories,
        Industry::Entertainment,
        Industry::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Industry::Fashion => "Thời trang",
            Industry::Beauty => "Làm đẹp",
            Industry::Electronics => "Điện tử",
            Industry::Household => "Gia dụng",
            Industry::Food => "Thực phẩm",
            Industry::Travel => "Du lịch",
            Industry::Education => "Giáo dục",
            Industry::Health => "Sức khỏe",
            Industry::Sports => "Thể thao",
            Industry::MotherAndBaby => "Mẹ và bé",
            Industry::Furniture => "Nội thất",
            Industry::Accessories => "Phụ kiện",
            Industry::Entertainment => "Giải trí",
            Industry::Other => "Khác",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label: {}", self.0)
    }
}

impl FromStr for Industry {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::ALL
            .into_iter()
            .find(|industry| industry.label() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SalesMethod {
    #[default]
    Video,
    Livestream,
    #[serde(rename = "Cả hai")]
    Both,
}

impl SalesMethod {
    pub const ALL: [SalesMethod; 3] = [SalesMethod::Video, SalesMethod::Livestream, SalesMethod::Both];

    pub fn label(self) -> &'static str {
        match self {
            SalesMethod::Video => "Video",
            SalesMethod::Livestream => "Livestream",
            SalesMethod::Both => "Cả hai",
        }
    }
}

impl fmt::Display for SalesMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SalesMethod {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SalesMethod::ALL
            .into_iter()
            .find(|method| method.label() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}
