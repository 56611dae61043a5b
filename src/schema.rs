//! Canonical column names and the small enums derived from order rows.
//!
//! Source headers are mapped onto these names when the dataset is loaded, so the rest of the
//! crate only ever refers to columns through [`Field`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every column of the normalized order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    OrderId,
    SettledAmount,
    PaymentAmount,
    UnitPrice,
    SupplyPrice,
    OrderedAt,
    OrderDate,
    Seller,
    SellerGroup,
    Variety,
    Channel,
    Region,
    RepeatCount,
    Membership,
}

impl Field {
    /// Fields read from the source file, in display order.
    pub const SOURCE: [Field; 12] = [
        Field::OrderId,
        Field::OrderedAt,
        Field::Seller,
        Field::Variety,
        Field::Channel,
        Field::Region,
        Field::RepeatCount,
        Field::Membership,
        Field::SettledAmount,
        Field::PaymentAmount,
        Field::UnitPrice,
        Field::SupplyPrice,
    ];

    /// Currency-like columns that may arrive as `1,234` text.
    pub const CURRENCY: [Field; 4] = [
        Field::SettledAmount,
        Field::PaymentAmount,
        Field::UnitPrice,
        Field::SupplyPrice,
    ];

    /// Column name inside the normalized table.
    pub fn name(self) -> &'static str {
        match self {
            Field::OrderId => "order_id",
            Field::SettledAmount => "settled_amount",
            Field::PaymentAmount => "payment_amount",
            Field::UnitPrice => "unit_price",
            Field::SupplyPrice => "supply_price",
            Field::OrderedAt => "ordered_at",
            Field::OrderDate => "order_date",
            Field::Seller => "seller",
            Field::SellerGroup => "seller_group",
            Field::Variety => "variety",
            Field::Channel => "channel",
            Field::Region => "region",
            Field::RepeatCount => "repeat_count",
            Field::Membership => "membership",
        }
    }

    /// Optional currency columns are skipped when the source lacks them.
    pub fn is_required(self) -> bool {
        !matches!(
            self,
            Field::PaymentAmount | Field::UnitPrice | Field::SupplyPrice
        )
    }

    pub fn is_currency(self) -> bool {
        Self::CURRENCY.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary partition of sellers: the reserved seller versus everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerGroup {
    Reserved,
    Other,
}

impl SellerGroup {
    pub const ALL: [SellerGroup; 2] = [SellerGroup::Reserved, SellerGroup::Other];

    /// Value stored in the `seller_group` column.
    pub fn key(self) -> &'static str {
        match self {
            SellerGroup::Reserved => "reserved",
            SellerGroup::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "reserved" => Some(SellerGroup::Reserved),
            "other" => Some(SellerGroup::Other),
            _ => None,
        }
    }

    /// Classify a seller name against the reserved name. Missing names are never reserved.
    pub fn classify(seller: Option<&str>, reserved_seller: &str) -> Self {
        match seller {
            Some(name) if name == reserved_seller => SellerGroup::Reserved,
            _ => SellerGroup::Other,
        }
    }
}

impl From<orderdash_cli::GroupArg> for SellerGroup {
    fn from(arg: orderdash_cli::GroupArg) -> Self {
        match arg {
            orderdash_cli::GroupArg::Reserved => SellerGroup::Reserved,
            orderdash_cli::GroupArg::Other => SellerGroup::Other,
        }
    }
}

/// First-time versus repeat buyer, derived from the repeat-purchase count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorType {
    New,
    Returning,
}

impl VisitorType {
    pub fn from_repeat_count(count: i64) -> Self {
        if count == 0 {
            VisitorType::New
        } else {
            VisitorType::Returning
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisitorType::New => "new",
            VisitorType::Returning => "returning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique() {
        let names: HashSet<&str> = Field::SOURCE.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Field::SOURCE.len());
    }

    #[test]
    fn test_optional_fields() {
        assert!(Field::SettledAmount.is_required());
        assert!(!Field::PaymentAmount.is_required());
        assert!(!Field::SupplyPrice.is_required());
        assert!(Field::SettledAmount.is_currency());
        assert!(!Field::Seller.is_currency());
    }

    #[test]
    fn test_classify_seller() {
        assert_eq!(
            SellerGroup::classify(Some("킹댕즈"), "킹댕즈"),
            SellerGroup::Reserved
        );
        assert_eq!(
            SellerGroup::classify(Some("킹댕즈 "), "킹댕즈"),
            SellerGroup::Other
        );
        assert_eq!(SellerGroup::classify(None, "킹댕즈"), SellerGroup::Other);
    }

    #[test]
    fn test_group_key_round_trip() {
        for group in SellerGroup::ALL {
            assert_eq!(SellerGroup::from_key(group.key()), Some(group));
        }
        assert_eq!(SellerGroup::from_key("unknown"), None);
    }

    #[test]
    fn test_visitor_type() {
        assert_eq!(VisitorType::from_repeat_count(0), VisitorType::New);
        assert_eq!(VisitorType::from_repeat_count(3), VisitorType::Returning);
    }
}
