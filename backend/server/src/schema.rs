//! # Registration Schema
//!
//! Raw form input and its validation into a typed record.
//!
//! Forms hold text exactly as the widgets emit it. Numeric widgets are lenient:
//! unreadable input falls back to a default instead of failing (see [`crate::utils`]).
//! Everything else fails with a message keyed by field name, and nothing reaches
//! the store.
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

use crate::{
    catalog::{Industry, SalesMethod},
    models::{Brand, Entity, Koc, NewBrand, NewKoc},
    utils::{count_or, nonzero_or, optional_amount, optional_text},
};

const SALES_METHOD_REQUIRED: &str = "Vui lòng chọn hình thức bán hàng";
const INDUSTRY_REQUIRED: &str = "Vui lòng chọn ngành hàng";
const INDUSTRY_UNKNOWN: &str = "Ngành hàng không hợp lệ";

/// Field name to first failing message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Keeps the first message recorded for a field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn absorb(&mut self, errors: ValidationErrors) {
        for (field, failures) in errors.field_errors() {
            let message = failures
                .iter()
                .find_map(|failure| failure.message.as_ref())
                .map(|message| message.to_string())
                .unwrap_or_else(|| format!("{field} không hợp lệ"));

            self.insert(field.to_string(), message);
        }
    }

    fn finish<T>(mut self, record: T) -> Result<T, FieldErrors>
    where
        T: Validate,
    {
        if let Err(errors) = record.validate() {
            self.absorb(errors);
        }

        if self.is_empty() { Ok(record) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }

        Ok(())
    }
}

/// A registration form for one entity.
pub trait Form: Default + Clone + Send {
    type Entity: Entity;

    fn validate(&self) -> Result<<Self::Entity as Entity>::New, FieldErrors>;

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KocForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub channel_link: String,
    pub channel_id: String,
    pub industries: Vec<String>,
    pub sales_method: String,
    #[serde(deserialize_with = "text_or_number")]
    pub follower_count: String,
    #[serde(deserialize_with = "text_or_number")]
    pub expected_cast: String,
    pub shipping_address: String,
    #[serde(deserialize_with = "text_or_number")]
    pub gmv_30_days: String,
    pub collaboration_description: String,
    #[serde(deserialize_with = "text_or_number")]
    pub job_completion_days: String,
    #[serde(deserialize_with = "text_or_number")]
    pub team_size: String,
    pub short_description: String,
}

impl Default for KocForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            email: String::new(),
            channel_link: String::new(),
            channel_id: String::new(),
            industries: Vec::new(),
            sales_method: SalesMethod::Video.label().to_string(),
            follower_count: "0".to_string(),
            expected_cast: String::new(),
            shipping_address: String::new(),
            gmv_30_days: String::new(),
            collaboration_description: String::new(),
            job_completion_days: "3".to_string(),
            team_size: "0".to_string(),
            short_description: String::new(),
        }
    }
}

impl KocForm {
    /// Checkbox toggle. Never caps the selection; validation does.
    pub fn toggle_industry(&mut self, industry: Industry, checked: bool) {
        let label = industry.label();
        let selected = self.industries.iter().any(|value| value == label);

        if checked && !selected {
            self.industries.push(label.to_string());
        } else if !checked {
            self.industries.retain(|value| value != label);
        }
    }
}

impl Form for KocForm {
    type Entity = Koc;

    fn validate(&self) -> Result<NewKoc, FieldErrors> {
        let mut errors = FieldErrors::default();

        let mut industries = Vec::with_capacity(self.industries.len());
        for label in &self.industries {
            match label.parse::<Industry>() {
                Ok(industry) => industries.push(industry),
                Err(_) => errors.insert("industries", INDUSTRY_UNKNOWN),
            }
        }

        let sales_method = self.sales_method.parse().unwrap_or_else(|_| {
            errors.insert("sales_method", SALES_METHOD_REQUIRED);
            SalesMethod::default()
        });

        let record = NewKoc {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            channel_link: self.channel_link.clone(),
            channel_id: self.channel_id.clone(),
            industries,
            sales_method,
            follower_count: count_or(&self.follower_count, 0),
            expected_cast: optional_amount(&self.expected_cast),
            shipping_address: self.shipping_address.clone(),
            gmv_30_days: optional_amount(&self.gmv_30_days),
            collaboration_description: optional_text(&self.collaboration_description),
            job_completion_days: nonzero_or(&self.job_completion_days, 1),
            team_size: count_or(&self.team_size, 0),
            short_description: optional_text(&self.short_description),
        };

        errors.finish(record)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandForm {
    pub brand_name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub industry: String,
    #[serde(deserialize_with = "text_or_number")]
    pub expected_budget: String,
    pub short_description: String,
}

impl Default for BrandForm {
    fn default() -> Self {
        Self {
            brand_name: String::new(),
            contact_person: String::new(),
            phone: String::new(),
            email: String::new(),
            industry: Industry::Fashion.label().to_string(),
            expected_budget: String::new(),
            short_description: String::new(),
        }
    }
}

impl Form for BrandForm {
    type Entity = Brand;

    fn validate(&self) -> Result<NewBrand, FieldErrors> {
        let mut errors = FieldErrors::default();

        let industry = self.industry.parse().unwrap_or_else(|_| {
            let message = if self.industry.is_empty() {
                INDUSTRY_REQUIRED
            } else {
                INDUSTRY_UNKNOWN
            };
            errors.insert("industry", message);
            Industry::Fashion
        });

        let record = NewBrand {
            brand_name: self.brand_name.clone(),
            contact_person: self.contact_person.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            industry,
            expected_budget: optional_amount(&self.expected_budget),
            short_description: optional_text(&self.short_description),
        };

        errors.finish(record)
    }
}

/// Number inputs may arrive as JSON numbers or as the text typed into them.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Missing(()) => String::new(),
    })
}
