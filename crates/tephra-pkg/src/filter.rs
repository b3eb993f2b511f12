//! Product filters: which build products of a dependency are visible to a
//! consumer.
//!
//! A filter is either "everything" (the default for root packages and
//! unfiltered edges) or an explicit product set. The build-graph builder
//! narrows dependency edges by projecting a new filter onto a dependency
//! specification; the filter itself is an opaque value carried verbatim.

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// Selects which build products of a dependency are visible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ProductFilter {
    /// All products are visible.
    #[default]
    Everything,
    /// Only the named products are visible.
    Specific(BTreeSet<String>),
}

impl ProductFilter {
    /// Create a filter for an explicit set of product names.
    #[must_use]
    pub fn specific<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Specific(products.into_iter().map(Into::into).collect())
    }

    /// Returns true if every product is visible through this filter.
    #[must_use]
    pub fn is_everything(&self) -> bool {
        matches!(self, Self::Everything)
    }

    /// Returns true if the named product is visible through this filter.
    #[must_use]
    pub fn allows(&self, product: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Specific(products) => products.contains(product),
        }
    }
}

impl std::fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Everything => write!(f, "everything"),
            Self::Specific(products) => {
                let names: Vec<&str> = products.iter().map(String::as_str).collect();
                write!(f, "specific({})", names.join(", "))
            }
        }
    }
}

// The wire form is either the bare keyword "everything" or a container with
// a single `specific` key. Both shapes must survive round-trips unchanged,
// so the serde impls are written by hand instead of derived.

impl Serialize for ProductFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Everything => serializer.serialize_str("everything"),
            Self::Specific(products) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("specific", products)?;
                map.end()
            }
        }
    }
}

struct ProductFilterVisitor;

impl<'de> Visitor<'de> for ProductFilterVisitor {
    type Value = ProductFilter;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("the keyword \"everything\" or a container with a `specific` key")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value == "everything" {
            Ok(ProductFilter::Everything)
        } else {
            Err(E::custom(format!(
                "cannot decode product filter: unknown keyword `{value}`, expected `everything`"
            )))
        }
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut specific: Option<BTreeSet<String>> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "specific" {
                specific = Some(map.next_value()?);
            } else {
                // Unknown keys are ignored for forward compatibility.
                map.next_value::<IgnoredAny>()?;
            }
        }
        specific.map(ProductFilter::Specific).ok_or_else(|| {
            de::Error::custom("cannot decode product filter: expected a `specific` key")
        })
    }
}

impl<'de> Deserialize<'de> for ProductFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ProductFilterVisitor)
    }
}
