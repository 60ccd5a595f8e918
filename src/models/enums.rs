//! Shared domain enums for the lending workflow
//!
//! All states are stored as lowercase text columns. The SQLx conversions
//! follow the same manual Encode/Decode pattern for each enum so the string
//! form lives in exactly one place (`as_str` / `FromStr`).

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! impl_pg_text_enum {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// ToolState
// ---------------------------------------------------------------------------

/// Lifecycle state of a physical tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToolState {
    Available,
    Loaned,
    Maintenance,
    Decommissioned,
}

impl ToolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolState::Available => "available",
            ToolState::Loaned => "loaned",
            ToolState::Maintenance => "maintenance",
            ToolState::Decommissioned => "decommissioned",
        }
    }

    /// Whether a new active loan may be created for a tool in this state
    pub fn is_lendable(&self) -> bool {
        matches!(self, ToolState::Available)
    }

    /// Whether a tool in this state may be deleted (given no active loan)
    pub fn is_deletable(&self) -> bool {
        matches!(self, ToolState::Available | ToolState::Decommissioned)
    }

    /// Valid outcomes an admin may pick when approving a return
    pub fn is_return_outcome(&self) -> bool {
        matches!(
            self,
            ToolState::Available | ToolState::Maintenance | ToolState::Decommissioned
        )
    }
}

impl std::str::FromStr for ToolState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ToolState::Available),
            "loaned" => Ok(ToolState::Loaned),
            "maintenance" => Ok(ToolState::Maintenance),
            "decommissioned" => Ok(ToolState::Decommissioned),
            _ => Err(format!("Invalid tool state: {}", s)),
        }
    }
}

impl_pg_text_enum!(ToolState);

// ---------------------------------------------------------------------------
// RequestState
// ---------------------------------------------------------------------------

/// State of a borrow request awaiting (or past) admin review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => "pending",
            RequestState::Approved => "approved",
            RequestState::Rejected => "rejected",
            RequestState::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for RequestState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestState::Pending),
            "approved" => Ok(RequestState::Approved),
            "rejected" => Ok(RequestState::Rejected),
            "cancelled" => Ok(RequestState::Cancelled),
            _ => Err(format!("Invalid request state: {}", s)),
        }
    }
}

impl_pg_text_enum!(RequestState);

// ---------------------------------------------------------------------------
// LoanState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanState {
    Active,
    Returned,
}

impl LoanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanState::Active => "active",
            LoanState::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanState::Active),
            "returned" => Ok(LoanState::Returned),
            _ => Err(format!("Invalid loan state: {}", s)),
        }
    }
}

impl_pg_text_enum!(LoanState);

// ---------------------------------------------------------------------------
// ReturnState
// ---------------------------------------------------------------------------

/// State of a return submission awaiting (or past) admin review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReturnState {
    Pending,
    Approved,
    Rejected,
}

impl ReturnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnState::Pending => "pending",
            ReturnState::Approved => "approved",
            ReturnState::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ReturnState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReturnState::Pending),
            "approved" => Ok(ReturnState::Approved),
            "rejected" => Ok(ReturnState::Rejected),
            _ => Err(format!("Invalid return state: {}", s)),
        }
    }
}

impl_pg_text_enum!(ReturnState);

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User roles. The string forms keep wire compatibility with the existing
/// clients, which predate this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "usuario")]
    User,
    #[serde(rename = "docente")]
    Teacher,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "usuario",
            Role::Teacher => "docente",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usuario" => Ok(Role::User),
            "docente" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl_pg_text_enum!(Role);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_state_round_trip() {
        for s in ["available", "loaned", "maintenance", "decommissioned"] {
            let state: ToolState = s.parse().unwrap();
            assert_eq!(state.as_str(), s);
        }
        assert!("broken".parse::<ToolState>().is_err());
    }

    #[test]
    fn only_available_tools_are_lendable() {
        assert!(ToolState::Available.is_lendable());
        assert!(!ToolState::Loaned.is_lendable());
        assert!(!ToolState::Maintenance.is_lendable());
        assert!(!ToolState::Decommissioned.is_lendable());
    }

    #[test]
    fn loaned_and_maintenance_tools_are_not_deletable() {
        assert!(ToolState::Available.is_deletable());
        assert!(ToolState::Decommissioned.is_deletable());
        assert!(!ToolState::Loaned.is_deletable());
        assert!(!ToolState::Maintenance.is_deletable());
    }

    #[test]
    fn loaned_is_not_a_return_outcome() {
        assert!(ToolState::Available.is_return_outcome());
        assert!(ToolState::Maintenance.is_return_outcome());
        assert!(ToolState::Decommissioned.is_return_outcome());
        assert!(!ToolState::Loaned.is_return_outcome());
    }

    #[test]
    fn role_slugs_match_wire_format() {
        assert_eq!(Role::User.as_str(), "usuario");
        assert_eq!(Role::Teacher.as_str(), "docente");
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn serde_uses_lowercase_slugs() {
        assert_eq!(
            serde_json::to_string(&ToolState::Decommissioned).unwrap(),
            "\"decommissioned\""
        );
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"docente\"");
    }
}
