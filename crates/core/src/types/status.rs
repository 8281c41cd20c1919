//! Status enums for various entities.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Order lifecycle status.
///
/// The backend is inconsistent about casing (`"Pending"`, `"SHIPPED"`,
/// `"delivered"`), so parsing is case-insensitive. Serialization is always
/// lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the order can no longer change.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Error returned when a status string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct StatusParseError(pub String);

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            // Both spellings appear in stored orders.
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(StatusParseError(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Account role as reported by the backend.
///
/// Parsing ignores case. Any role other than `admin` is treated as a
/// customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

impl UserRole {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().eq_ignore_ascii_case("admin") {
            Ok(Self::Admin)
        } else {
            Ok(Self::Customer)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("SHIPPED".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" delivered ".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert_eq!("Canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "lost".parse::<OrderStatus>(),
            Err(StatusParseError("lost".to_string()))
        );
    }

    #[test]
    fn test_serde_normalizes_casing() {
        let status: OrderStatus = serde_json::from_str("\"Processing\"").unwrap();
        assert_eq!(status, OrderStatus::Processing);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"processing\"");
    }

    #[test]
    fn test_is_final() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Shipped.is_final());
    }

    #[test]
    fn test_unknown_role_is_customer() {
        let role: UserRole = serde_json::from_str("\"seller\"").unwrap();
        assert_eq!(role, UserRole::Customer);
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_role_ignores_case() {
        for raw in ["\"Admin\"", "\"ADMIN\"", "\" admin \""] {
            let role: UserRole = serde_json::from_str(raw).unwrap();
            assert_eq!(role, UserRole::Admin, "{raw}");
        }
        let role: UserRole = serde_json::from_str("\"Customer\"").unwrap();
        assert_eq!(role, UserRole::Customer);
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }
}
