//! # Access Module
//!
//! Staff roles, the signed-in session, and which screens each role sees.
//!
//! ## Navigation Table
//! ```text
//! ┌────────────────────┬─────────────┬─────────────────┬────────────┐
//! │ Section            │ store_owner │ warehouse_admin │ shopkeeper │
//! ├────────────────────┼─────────────┼─────────────────┼────────────┤
//! │ dashboard          │      ✓      │        ✓        │     ✓      │
//! │ pos                │      ✓      │                 │     ✓      │
//! │ products           │      ✓      │                 │     ✓      │
//! │ product-management │      ✓      │        ✓        │            │
//! │ stock              │      ✓      │        ✓        │            │
//! │ shift              │      ✓      │                 │     ✓      │
//! │ customers          │      ✓      │                 │     ✓      │
//! │ reports            │      ✓      │                 │            │
//! └────────────────────┴─────────────┴─────────────────┴────────────┘
//! ```
//!
//! The session is a plain value handed to every command that needs it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Roles
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum UserRole {
    StoreOwner,
    WarehouseAdmin,
    Shopkeeper,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [
        UserRole::StoreOwner,
        UserRole::WarehouseAdmin,
        UserRole::Shopkeeper,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::StoreOwner => "store_owner",
            UserRole::WarehouseAdmin => "warehouse_admin",
            UserRole::Shopkeeper => "shopkeeper",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            UserRole::StoreOwner => "Pemilik Toko",
            UserRole::WarehouseAdmin => "Admin Gudang",
            UserRole::Shopkeeper => "Kasir",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: UserRole::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Sections
// =============================================================================

/// A screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Section {
    Dashboard,
    Pos,
    Products,
    ProductManagement,
    Stock,
    Shift,
    Customers,
    Reports,
}

const ALL_ROLES: &[UserRole] = &[
    UserRole::StoreOwner,
    UserRole::WarehouseAdmin,
    UserRole::Shopkeeper,
];
const SALES_FLOOR: &[UserRole] = &[UserRole::StoreOwner, UserRole::Shopkeeper];
const WAREHOUSE: &[UserRole] = &[UserRole::StoreOwner, UserRole::WarehouseAdmin];
const OWNER_ONLY: &[UserRole] = &[UserRole::StoreOwner];

impl Section {
    /// Navigation order.
    pub const ALL: [Section; 8] = [
        Section::Dashboard,
        Section::Pos,
        Section::Products,
        Section::ProductManagement,
        Section::Stock,
        Section::Shift,
        Section::Customers,
        Section::Reports,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Pos => "pos",
            Section::Products => "products",
            Section::ProductManagement => "product-management",
            Section::Stock => "stock",
            Section::Shift => "shift",
            Section::Customers => "customers",
            Section::Reports => "reports",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Pos => "Kasir",
            Section::Products => "Produk",
            Section::ProductManagement => "Atur Produk",
            Section::Stock => "Stok",
            Section::Shift => "Shift",
            Section::Customers => "Pelanggan",
            Section::Reports => "Laporan",
        }
    }

    pub const fn allowed_roles(&self) -> &'static [UserRole] {
        match self {
            Section::Dashboard => ALL_ROLES,
            Section::Pos | Section::Products | Section::Shift | Section::Customers => SALES_FLOOR,
            Section::ProductManagement | Section::Stock => WAREHOUSE,
            Section::Reports => OWNER_ONLY,
        }
    }

    pub fn allows(&self, role: UserRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One entry in the side navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: &'static str,
    pub label: &'static str,
    pub roles: &'static [UserRole],
}

impl From<Section> for NavItem {
    fn from(section: Section) -> Self {
        NavItem {
            id: section.id(),
            label: section.label(),
            roles: section.allowed_roles(),
        }
    }
}

/// The navigation a role sees, in menu order.
pub fn nav_items_for(role: UserRole) -> Vec<NavItem> {
    Section::ALL
        .into_iter()
        .filter(|s| s.allows(role))
        .map(NavItem::from)
        .collect()
}

// =============================================================================
// Session
// =============================================================================

/// The signed-in staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    pub user_id: String,
    pub full_name: String,
    pub role: UserRole,
}

impl Session {
    pub fn new(user_id: impl Into<String>, full_name: impl Into<String>, role: UserRole) -> Self {
        Session {
            user_id: user_id.into(),
            full_name: full_name.into(),
            role,
        }
    }

    #[inline]
    pub fn can_access(&self, section: Section) -> bool {
        section.allows(self.role)
    }

    /// Fails with `Forbidden` unless the role may open `section`.
    pub fn require(&self, section: Section) -> CoreResult<()> {
        if self.can_access(section) {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                role: self.role.as_str().to_string(),
                section,
            })
        }
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        nav_items_for(self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(role: UserRole) -> Vec<&'static str> {
        nav_items_for(role).into_iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_owner_sees_everything() {
        assert_eq!(ids(UserRole::StoreOwner).len(), Section::ALL.len());
    }

    #[test]
    fn test_shopkeeper_navigation() {
        assert_eq!(
            ids(UserRole::Shopkeeper),
            vec!["dashboard", "pos", "products", "shift", "customers"]
        );
    }

    #[test]
    fn test_warehouse_admin_navigation() {
        assert_eq!(
            ids(UserRole::WarehouseAdmin),
            vec!["dashboard", "product-management", "stock"]
        );
    }

    #[test]
    fn test_session_require() {
        let admin = Session::new("u-2", "Budi", UserRole::WarehouseAdmin);
        assert!(admin.require(Section::Stock).is_ok());
        assert!(matches!(
            admin.require(Section::Pos),
            Err(CoreError::Forbidden { section: Section::Pos, .. })
        ));
    }

    #[test]
    fn test_role_parse_and_serde() {
        assert_eq!("warehouse_admin".parse::<UserRole>().unwrap(), UserRole::WarehouseAdmin);
        assert!("manager".parse::<UserRole>().is_err());
        assert_eq!(
            serde_json::to_string(&Section::ProductManagement).unwrap(),
            "\"product-management\""
        );
    }
}
