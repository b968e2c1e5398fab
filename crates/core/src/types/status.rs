//! Status and kind enums for accounts and restaurants.

use serde::{Deserialize, Serialize};

/// The two terminal account kinds.
///
/// An account's kind is determined by which collection holds its profile
/// document (`customers` or `restaurants`), assigned exactly once during
/// onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Customer,
    Restaurant,
}

impl AccountKind {
    /// The backing collection for this account kind.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::Restaurant => "restaurants",
        }
    }

    /// The opposite account kind.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Customer => Self::Restaurant,
            Self::Restaurant => Self::Customer,
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Restaurant => write!(f, "restaurant"),
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "restaurant" => Ok(Self::Restaurant),
            _ => Err(format!("invalid account kind: {s}")),
        }
    }
}

/// What kind of establishment a restaurant account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestaurantType {
    Restaurant,
    #[serde(rename = "Food Truck")]
    FoodTruck,
}

impl std::fmt::Display for RestaurantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restaurant => write!(f, "Restaurant"),
            Self::FoodTruck => write!(f, "Food Truck"),
        }
    }
}

impl std::str::FromStr for RestaurantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Restaurant" | "restaurant" => Ok(Self::Restaurant),
            "Food Truck" | "food-truck" | "foodtruck" => Ok(Self::FoodTruck),
            _ => Err(format!("invalid restaurant type: {s}")),
        }
    }
}

/// Self-reported busyness shown on the restaurant profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestaurantStatus {
    Busy,
    Moderate,
    Slow,
}

impl std::fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "Busy"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Slow => write!(f, "Slow"),
        }
    }
}

impl std::str::FromStr for RestaurantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Busy" | "busy" => Ok(Self::Busy),
            "Moderate" | "moderate" => Ok(Self::Moderate),
            "Slow" | "slow" => Ok(Self::Slow),
            _ => Err(format!("invalid restaurant status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_kind_collections() {
        assert_eq!(AccountKind::Customer.collection(), "customers");
        assert_eq!(AccountKind::Restaurant.collection(), "restaurants");
        assert_eq!(AccountKind::Customer.other(), AccountKind::Restaurant);
    }

    #[test]
    fn test_restaurant_type_wire_names() {
        // The stored value uses the human-readable label from the app.
        let json = serde_json::to_string(&RestaurantType::FoodTruck).expect("serialize");
        assert_eq!(json, "\"Food Truck\"");
        let back: RestaurantType = serde_json::from_str("\"Restaurant\"").expect("deserialize");
        assert_eq!(back, RestaurantType::Restaurant);
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            RestaurantStatus::Busy,
            RestaurantStatus::Moderate,
            RestaurantStatus::Slow,
        ] {
            let parsed: RestaurantStatus = s.to_string().parse().expect("parse");
            assert_eq!(parsed, s);
        }
    }
}
