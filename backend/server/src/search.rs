//! # Listing Search
//!
//! Both listing pages fetch their whole table once, newest first, then narrow it
//! down in memory.
//!
//! ## Filters
//! - Search term: case-insensitive substring of the name, or of the short
//!   description when there is one
//! - Category: Brand industry equality, or membership in a KOC's industries
//! - Both apply together, in either order, and never touch the fetched rows
//!
//! ## Fetching
//! A failed fetch leaves the listing empty and emits one error notice. A second
//! fetch simply replaces whatever the first one left behind.
use std::str::FromStr;

use tracing::{debug, warn};

use crate::{
    catalog::{Industry, UnknownLabel},
    database::RecordStore,
    models::{BrandRow, Entity, KocRow},
    notify::{Notice, Notifier},
};

/// Sentinel value of the category dropdown.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Industry),
}

impl FromStr for CategoryFilter {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL_CATEGORIES {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// A row that shows up on a listing page.
pub trait Listed {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str>;

    fn in_category(&self, industry: Industry) -> bool;
}

impl Listed for KocRow {
    fn name(&self) -> &str {
        &self.full_name
    }

    fn description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    fn in_category(&self, industry: Industry) -> bool {
        self.industries.contains(&industry)
    }
}

impl Listed for BrandRow {
    fn name(&self) -> &str {
        &self.brand_name
    }

    fn description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    fn in_category(&self, industry: Industry) -> bool {
        self.industry == industry
    }
}

pub fn by_term<'a, T, I>(records: I, term: &str) -> Vec<&'a T>
where
    T: Listed + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if term.is_empty() {
        return records.into_iter().collect();
    }

    let needle = term.to_lowercase();

    records
        .into_iter()
        .filter(|record| {
            record.name().to_lowercase().contains(&needle)
                || record
                    .description()
                    .is_some_and(|description| description.to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn by_category<'a, T, I>(records: I, category: CategoryFilter) -> Vec<&'a T>
where
    T: Listed + 'a,
    I: IntoIterator<Item = &'a T>,
{
    match category {
        CategoryFilter::All => records.into_iter().collect(),
        CategoryFilter::Only(industry) => records
            .into_iter()
            .filter(|record| record.in_category(industry))
            .collect(),
    }
}

pub fn filter<'a, T: Listed>(records: &'a [T], term: &str, category: CategoryFilter) -> Vec<&'a T> {
    by_category(by_term(records, term), category)
}

/// One listing page: the fetched rows plus the current filter inputs.
pub struct Listing<E: Entity> {
    records: Vec<E::Row>,
    search: String,
    category: CategoryFilter,
}

impl<E: Entity> Default for Listing<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            search: String::new(),
            category: CategoryFilter::All,
        }
    }
}

impl<E> Listing<E>
where
    E: Entity,
    E::Row: Listed,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the table. Returns whether the fetch succeeded.
    pub async fn load<S, N>(&mut self, store: &S, notifier: &N) -> bool
    where
        S: RecordStore,
        N: Notifier + ?Sized,
    {
        match store.select::<E>().await {
            Ok(records) => {
                debug!("Fetched {} {} rows", records.len(), E::TABLE);
                self.replace(records);
                true
            }
            Err(e) => {
                warn!("Failed to fetch {}: {e}", E::TABLE);
                self.replace(Vec::new());
                notifier.notify(Notice::error(
                    "Lỗi",
                    format!("Không thể tải danh sách {}", E::NOUN),
                ));
                false
            }
        }
    }

    pub fn replace(&mut self, records: Vec<E::Row>) {
        self.records = records;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn records(&self) -> &[E::Row] {
        &self.records
    }

    pub fn visible(&self) -> Vec<&E::Row> {
        filter(&self.records, &self.search, self.category)
    }
}
