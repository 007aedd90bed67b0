//! Listing cards and the number abbreviations shown on them.
//!
//! Followers keep one decimal in both the K and M ranges. Budgets keep one decimal
//! for millions but none for thousands. Rounding follows what a browser's
//! `toFixed` prints for the floating point quotient, so `1_150` reads `1.1K`
//! (the quotient sits just under 1.15) while `1_250` reads `1.3K`.
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    catalog::{Industry, SalesMethod},
    models::{BrandRow, KocRow},
};

const THOUSAND: i64 = 1_000;
const MILLION: i64 = 1_000_000;
const BADGE_LIMIT: usize = 3;

/// `value / unit` rounded to `decimals` places, as text.
///
/// Away from a decimal tie the exact quotient and its `f64` round the same way.
/// On a tie the `f64` decides: it rounds up unless it landed below the tie.
fn scaled(value: i64, unit: i64, decimals: u32) -> String {
    let factor = 10i64.pow(decimals);
    let step = unit / factor;
    let (whole, rest) = (value / step, value % step);

    let up = match (2 * rest).cmp(&step) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            let quotient = value as f64 / unit as f64;
            // exact sign of quotient * unit - value
            quotient.mul_add(unit as f64, -(value as f64)) >= 0.0
        }
    };
    let rounded = if up { whole + 1 } else { whole };

    if decimals == 0 {
        rounded.to_string()
    } else {
        format!(
            "{}.{:0width$}",
            rounded / factor,
            rounded % factor,
            width = decimals as usize
        )
    }
}

pub fn format_follower_count(count: i64) -> String {
    if count >= MILLION {
        format!("{}M", scaled(count, MILLION, 1))
    } else if count >= THOUSAND {
        format!("{}K", scaled(count, THOUSAND, 1))
    } else {
        count.to_string()
    }
}

pub fn format_budget(budget: i64) -> String {
    if budget >= MILLION {
        format!("{}M VNĐ", scaled(budget, MILLION, 1))
    } else if budget >= THOUSAND {
        format!("{}K VNĐ", scaled(budget, THOUSAND, 0))
    } else {
        format!("{budget} VNĐ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KocCard {
    pub id: Uuid,
    pub full_name: String,
    pub channel_link: String,
    pub followers: String,
    /// At most three, in stored order.
    pub industries: Vec<Industry>,
    /// How many industries did not fit, rendered as "+N".
    pub more_industries: usize,
    pub sales_method: SalesMethod,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&KocRow> for KocCard {
    fn from(row: &KocRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name.clone(),
            channel_link: row.channel_link.clone(),
            followers: format_follower_count(row.follower_count),
            industries: row.industries.iter().take(BADGE_LIMIT).copied().collect(),
            more_industries: row.industries.len().saturating_sub(BADGE_LIMIT),
            sales_method: row.sales_method,
            short_description: row.short_description.clone(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandCard {
    pub id: Uuid,
    pub brand_name: String,
    pub contact_person: String,
    pub industry: Industry,
    /// Missing when the brand gave no budget.
    pub budget: Option<String>,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&BrandRow> for BrandCard {
    fn from(row: &BrandRow) -> Self {
        Self {
            id: row.id,
            brand_name: row.brand_name.clone(),
            contact_person: row.contact_person.clone(),
            industry: row.industry,
            budget: row.expected_budget.filter(|budget| *budget != 0).map(format_budget),
            short_description: row.short_description.clone(),
            created_at: row.created_at,
        }
    }
}
