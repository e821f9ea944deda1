//! Job board platform identifiers.
//!
//! The set of supported platforms is closed: every template kind maps to
//! exactly one platform, and each platform has exactly one bot controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template kinds that run against LinkedIn.
pub const LINKEDIN_TEMPLATE_KINDS: [&str; 2] = ["linkedin-apply", "linkedin-search"];

/// All template kinds the orchestrator knows how to launch.
pub const SUPPORTED_TEMPLATE_KINDS: [&str; 7] = [
    "linkedin-apply",
    "linkedin-search",
    "indeed-search",
    "ziprecruiter-search",
    "glassdoor-search",
    "dice-search",
    "autonomous-auto-search",
];

/// Error returned when a platform or template kind string is not recognized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported platform identifier: {0}")]
pub struct UnknownPlatform(pub String);

/// A supported job board platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(rename = "linkedin")]
    LinkedIn,
    Indeed,
    #[serde(rename = "ziprecruiter")]
    ZipRecruiter,
    Glassdoor,
    Dice,
    Autonomous,
}

impl Platform {
    /// All platforms, in scheduling-neutral order.
    pub const ALL: [Platform; 6] = [
        Platform::LinkedIn,
        Platform::Indeed,
        Platform::ZipRecruiter,
        Platform::Glassdoor,
        Platform::Dice,
        Platform::Autonomous,
    ];

    /// Stable lowercase identifier stored in run payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Indeed => "indeed",
            Platform::ZipRecruiter => "ziprecruiter",
            Platform::Glassdoor => "glassdoor",
            Platform::Dice => "dice",
            Platform::Autonomous => "autonomous",
        }
    }

    /// Human-readable label used when naming runs.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn Auto Apply",
            Platform::Indeed => "Indeed Auto Search",
            Platform::ZipRecruiter => "ZipRecruiter Auto Search",
            Platform::Glassdoor => "Glassdoor Auto Search",
            Platform::Dice => "Dice Auto Search",
            Platform::Autonomous => "Autonomous Agent",
        }
    }

    /// Human-readable label for a specific template kind.
    ///
    /// LinkedIn distinguishes apply and search templates; everywhere else the
    /// platform label is the template label.
    pub fn label_for_kind(kind: &str) -> Option<&'static str> {
        match kind {
            "linkedin-apply" => Some("LinkedIn Auto Apply"),
            "linkedin-search" => Some("LinkedIn Auto Search"),
            "indeed-search" => Some("Indeed Auto Search"),
            "ziprecruiter-search" => Some("ZipRecruiter Auto Search"),
            "glassdoor-search" => Some("Glassdoor Auto Search"),
            "dice-search" => Some("Dice Auto Search"),
            "autonomous-auto-search" => Some("Autonomous Agent"),
            _ => None,
        }
    }

    /// Resolve the platform for a template kind (e.g. "indeed-search").
    pub fn for_template_kind(kind: &str) -> Result<Platform, UnknownPlatform> {
        if LINKEDIN_TEMPLATE_KINDS.contains(&kind) {
            return Ok(Platform::LinkedIn);
        }
        match kind {
            "indeed-search" => Ok(Platform::Indeed),
            "ziprecruiter-search" => Ok(Platform::ZipRecruiter),
            "glassdoor-search" => Ok(Platform::Glassdoor),
            "dice-search" => Ok(Platform::Dice),
            "autonomous-auto-search" => Ok(Platform::Autonomous),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    /// Accepts both bare platform names ("linkedin") and template kinds
    /// ("linkedin-apply").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linkedin" => Ok(Platform::LinkedIn),
            "indeed" => Ok(Platform::Indeed),
            "ziprecruiter" => Ok(Platform::ZipRecruiter),
            "glassdoor" => Ok(Platform::Glassdoor),
            "dice" => Ok(Platform::Dice),
            "autonomous" => Ok(Platform::Autonomous),
            other => Platform::for_template_kind(other),
        }
    }
}
