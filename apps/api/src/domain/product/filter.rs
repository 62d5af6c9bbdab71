use rust_decimal::Decimal;
use uuid::Uuid;

use super::product::Product;

/// Sort keys accepted by product listings (`-` prefix means descending)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    NewestFirst,
    OldestFirst,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    RatingAsc,
    RatingDesc,
}

impl ProductSort {
    /// Parses a sort key; unknown keys fall back to newest first
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("createdAt") => Self::OldestFirst,
            Some("basePrice") | Some("price") => Self::PriceAsc,
            Some("-basePrice") | Some("-price") => Self::PriceDesc,
            Some("name") => Self::NameAsc,
            Some("-name") => Self::NameDesc,
            Some("rating") => Self::RatingAsc,
            Some("-rating") => Self::RatingDesc,
            _ => Self::NewestFirst,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::NewestFirst => "created_at DESC",
            Self::OldestFirst => "created_at ASC",
            Self::PriceAsc => "base_price ASC",
            Self::PriceDesc => "base_price DESC",
            Self::NameAsc => "name ASC",
            Self::NameDesc => "name DESC",
            Self::RatingAsc => "rating_average ASC",
            Self::RatingDesc => "rating_average DESC",
        }
    }

    pub fn compare(&self, a: &Product, b: &Product) -> std::cmp::Ordering {
        match self {
            Self::NewestFirst => b.created_at.cmp(&a.created_at),
            Self::OldestFirst => a.created_at.cmp(&b.created_at),
            Self::PriceAsc => a.base_price.cmp(&b.base_price),
            Self::PriceDesc => b.base_price.cmp(&a.base_price),
            Self::NameAsc => a.name.cmp(&b.name),
            Self::NameDesc => b.name.cmp(&a.name),
            Self::RatingAsc => a.rating.average.total_cmp(&b.rating.average),
            Self::RatingDesc => b.rating.average.total_cmp(&a.rating.average),
        }
    }
}

/// Catalog query; every `None` means "no constraint"
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub active: Option<bool>,
    pub category: Option<Uuid>,
    /// Matched case-insensitively as substrings of the brand name, any of them
    pub brands: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub sort: ProductSort,
}

impl ProductFilter {
    /// Splits a comma separated brand list, dropping blanks and the literal "undefined"
    pub fn parse_brands(raw: Option<&str>) -> Vec<String> {
        raw.map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty() && *b != "undefined")
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(active) = self.active {
            if product.is_active != active {
                return false;
            }
        }
        if let Some(category) = self.category {
            if product.category_id != category {
                return false;
            }
        }
        if !self.brands.is_empty() {
            let brand = product.brand.to_lowercase();
            if !self.brands.iter().any(|b| brand.contains(&b.to_lowercase())) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.base_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.base_price > max) {
            return false;
        }
        if self.min_rating.is_some_and(|min| product.rating.average < min) {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.is_featured != featured {
                return false;
            }
        }
        true
    }
}
