//! Form domain model and identifiers shared across crates

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SharedError;

/// Unique identifier for an interactive design session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, SharedError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidSessionId { input: s.to_string() })
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of project the design is for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    RealEstateDevelopment,
    HomeRenovation,
    ArchitecturalFirm,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::RealEstateDevelopment => write!(f, "Real Estate Development"),
            Scenario::HomeRenovation => write!(f, "Home Renovation"),
            Scenario::ArchitecturalFirm => write!(f, "Architectural Firm"),
        }
    }
}

impl FromStr for Scenario {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "real-estate-development" | "real-estate" => Ok(Scenario::RealEstateDevelopment),
            "home-renovation" | "renovation" => Ok(Scenario::HomeRenovation),
            "architectural-firm" | "architecture" => Ok(Scenario::ArchitecturalFirm),
            _ => Err(SharedError::invalid_value("scenario", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    #[default]
    Economy,
    MidRange,
    Luxury,
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Economy => write!(f, "Economy"),
            Budget::MidRange => write!(f, "Mid-range"),
            Budget::Luxury => write!(f, "Luxury"),
        }
    }
}

impl FromStr for Budget {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "economy" => Ok(Budget::Economy),
            "mid-range" | "midrange" => Ok(Budget::MidRange),
            "luxury" => Ok(Budget::Luxury),
            _ => Err(SharedError::invalid_value("budget", s)),
        }
    }
}

/// Design focus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Function,
    Aesthetics,
    Balance,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Function => write!(f, "Function"),
            Priority::Aesthetics => write!(f, "Aesthetics"),
            Priority::Balance => write!(f, "Balance"),
        }
    }
}

impl FromStr for Priority {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "function" => Ok(Priority::Function),
            "aesthetics" => Ok(Priority::Aesthetics),
            "balance" => Ok(Priority::Balance),
            _ => Err(SharedError::invalid_value("priority", s)),
        }
    }
}

/// Selectable amenities. Declaration order is the canonical set order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    SwimmingPool,
    HomeOffice,
    SmartHome,
    Garden,
    Garage,
    Gym,
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amenity::SwimmingPool => write!(f, "Swimming Pool"),
            Amenity::HomeOffice => write!(f, "Home Office"),
            Amenity::SmartHome => write!(f, "Smart Home"),
            Amenity::Garden => write!(f, "Garden"),
            Amenity::Garage => write!(f, "Garage"),
            Amenity::Gym => write!(f, "Gym"),
        }
    }
}

impl FromStr for Amenity {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "swimming-pool" | "pool" => Ok(Amenity::SwimmingPool),
            "home-office" | "office" => Ok(Amenity::HomeOffice),
            "smart-home" => Ok(Amenity::SmartHome),
            "garden" => Ok(Amenity::Garden),
            "garage" => Ok(Amenity::Garage),
            "gym" => Ok(Amenity::Gym),
            _ => Err(SharedError::invalid_value("amenity", s)),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '_'], "-")
}

/// A single room in the ordered room list. Identity is its position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomEntry {
    pub name: String,
    pub size: Option<f64>,
    pub notes: String,
}

impl RoomEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Field-level changes to a room. Absent fields are left untouched;
/// `size: Some(None)` clears the size.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub size: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RoomPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Optional new values for the scalar form fields
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormFieldsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<BTreeSet<Amenity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Immutable capture of every form field at submit time.
///
/// Field order here is the serialization order used for fingerprinting,
/// so reordering fields changes every fingerprint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub scenario: Scenario,
    pub style: String,
    pub budget: Budget,
    pub priority: Priority,
    pub square_footage: Option<u32>,
    pub rooms: Vec<RoomEntry>,
    pub amenities: BTreeSet<Amenity>,
    pub requirements: String,
}

impl FormSnapshot {
    /// Names of required fields that are still empty
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.style.trim().is_empty() {
            missing.push("style".to_string());
        }
        if self.square_footage.is_none() {
            missing.push("square_footage".to_string());
        }
        if self.rooms.is_empty() {
            missing.push("rooms".to_string());
        }
        missing
    }
}

/// An image returned by the image search collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub url: String,
    pub attribution: String,
    pub source_url: Option<String>,
}

/// Why a call to an external collaborator failed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ApiFailure {
    AuthenticationFailed,
    RateLimitExceeded,
    ServiceUnavailable,
    Timeout,
    NetworkError(String),
    InvalidResponse(String),
    ServerError(String),
}

impl ApiFailure {
    /// Map a non-success HTTP status to a failure
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            401 | 403 => ApiFailure::AuthenticationFailed,
            429 => ApiFailure::RateLimitExceeded,
            503 => ApiFailure::ServiceUnavailable,
            _ => ApiFailure::ServerError(detail.into()),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::AuthenticationFailed => write!(f, "authentication failed"),
            ApiFailure::RateLimitExceeded => write!(f, "rate limit or quota exceeded"),
            ApiFailure::ServiceUnavailable => write!(f, "service unavailable"),
            ApiFailure::Timeout => write!(f, "request timed out"),
            ApiFailure::NetworkError(msg) => write!(f, "network error: {msg}"),
            ApiFailure::InvalidResponse(msg) => write!(f, "malformed response: {msg}"),
            ApiFailure::ServerError(msg) => write!(f, "server error: {msg}"),
        }
    }
}
