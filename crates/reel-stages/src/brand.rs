//! Brands and the brand scope filter
//!
//! Every view reads stage output through [`filter_by_brand`], applied to the
//! effective output at read time. Nothing here is cached.

use crate::error::StageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// One of the three content brands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    /// Newborn parenting
    Newborns,
    /// Toddler parenting
    Toddlers,
    /// Teen parenting
    Teenagers,
}

impl Brand {
    /// Fixed enumeration order. Hook concatenation and approval keys depend on it.
    pub const ORDER: [Brand; 3] = [Brand::Newborns, Brand::Toddlers, Brand::Teenagers];

    /// Lower-case key used in agent payloads
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Brand::Newborns => "newborns",
            Brand::Toddlers => "toddlers",
            Brand::Teenagers => "teenagers",
        }
    }

    /// Capitalized label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Brand::Newborns => "Newborns",
            Brand::Toddlers => "Toddlers",
            Brand::Teenagers => "Teenagers",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active brand scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandScope {
    /// No filtering
    #[default]
    All,
    /// Newborns only
    Newborns,
    /// Toddlers only
    Toddlers,
    /// Teenagers only
    Teenagers,
}

impl BrandScope {
    /// Every scope value, `All` first
    pub const ALL: [BrandScope; 4] = [
        BrandScope::All,
        BrandScope::Newborns,
        BrandScope::Toddlers,
        BrandScope::Teenagers,
    ];

    /// The single brand selected, or `None` for `All`
    #[must_use]
    pub const fn brand(&self) -> Option<Brand> {
        match self {
            BrandScope::All => None,
            BrandScope::Newborns => Some(Brand::Newborns),
            BrandScope::Toddlers => Some(Brand::Toddlers),
            BrandScope::Teenagers => Some(Brand::Teenagers),
        }
    }

    /// Scope key (`all`, `newborns`, ...)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self.brand() {
            Some(brand) => brand.as_str(),
            None => "all",
        }
    }

    /// Audience phrase used in request text
    #[must_use]
    pub const fn audience(&self) -> &'static str {
        match self.brand() {
            Some(brand) => brand.as_str(),
            None => "all brands (Newborns, Toddlers, Teenagers)",
        }
    }

    /// Whether a raw brand field belongs to this scope (case-insensitive)
    #[must_use]
    pub fn admits(&self, brand_field: Option<&str>) -> bool {
        match self.brand() {
            None => true,
            Some(brand) => brand_field.is_some_and(|b| b.eq_ignore_ascii_case(brand.as_str())),
        }
    }

    /// Whether a concrete brand belongs to this scope
    #[must_use]
    pub fn includes(&self, brand: Brand) -> bool {
        self.brand().map_or(true, |b| b == brand)
    }
}

impl From<Brand> for BrandScope {
    fn from(brand: Brand) -> Self {
        match brand {
            Brand::Newborns => BrandScope::Newborns,
            Brand::Toddlers => BrandScope::Toddlers,
            Brand::Teenagers => BrandScope::Teenagers,
        }
    }
}

impl fmt::Display for BrandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrandScope {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrandScope::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StageError::UnknownScope(s.to_string()))
    }
}

/// Items that carry a brand field
pub trait Branded {
    /// Raw brand value, if the item has one
    fn brand_key(&self) -> Option<&str>;
}

impl Branded for Value {
    /// `brand`, falling back to `target_niche` for trend briefs
    fn brand_key(&self) -> Option<&str> {
        self.get("brand")
            .and_then(Value::as_str)
            .or_else(|| self.get("target_niche").and_then(Value::as_str))
    }
}

impl<T: Branded + ?Sized> Branded for &T {
    fn brand_key(&self) -> Option<&str> {
        (**self).brand_key()
    }
}

/// Filter items to the active scope
///
/// `All` borrows the input unchanged; any other scope keeps the items whose
/// brand matches, in input order.
#[must_use]
pub fn filter_by_brand<T>(items: &[T], scope: BrandScope) -> Cow<'_, [T]>
where
    T: Branded + Clone,
{
    if scope == BrandScope::All {
        return Cow::Borrowed(items);
    }
    Cow::Owned(
        items
            .iter()
            .filter(|item| scope.admits(item.brand_key()))
            .cloned()
            .collect(),
    )
}
