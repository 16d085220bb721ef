//! Agent service catalog
//!
//! The fixed set of services the coordinator understands, with the
//! parameters each one accepts. The catalog is static configuration; it is
//! never fetched from the server.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// A named agent service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    /// Productivity insights and analytics
    Insights,
    /// Schedule optimization
    Optimize,
    /// Free-form productivity questions
    Questions,
    /// Stored user preferences
    Preferences,
    /// Summary reports
    Reports,
    /// Conversational interface
    Chat,
    /// Storage read-back check; bypasses the coordinator's base fields
    R2Test,
}

/// Static description of a service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// The service
    pub service: Service,
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Parameter names the service reads
    pub params: &'static [&'static str],
}

const CATALOG: &[ServiceInfo] = &[
    ServiceInfo {
        service: Service::Insights,
        name: "Insights",
        description: "Generate productivity insights and analytics",
        params: &["timeframe"],
    },
    ServiceInfo {
        service: Service::Optimize,
        name: "Optimize",
        description: "Get personalized schedule recommendations",
        params: &["timeframe"],
    },
    ServiceInfo {
        service: Service::Questions,
        name: "Questions",
        description: "Ask specific productivity questions",
        params: &["question"],
    },
    ServiceInfo {
        service: Service::Preferences,
        name: "Preferences",
        description: "Read the stored user preferences",
        params: &[],
    },
    ServiceInfo {
        service: Service::Reports,
        name: "Reports",
        description: "Create detailed productivity reports",
        params: &["timeframe"],
    },
    ServiceInfo {
        service: Service::Chat,
        name: "Chat",
        description: "AI-powered conversation interface",
        params: &["message"],
    },
    ServiceInfo {
        service: Service::R2Test,
        name: "R2 Test",
        description: "Read an object back from tide storage",
        params: &["r2_path"],
    },
];

/// All known services, in display order
pub fn catalog() -> &'static [ServiceInfo] {
    CATALOG
}

impl Service {
    /// Wire name of the service
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Insights => "insights",
            Service::Optimize => "optimize",
            Service::Questions => "questions",
            Service::Preferences => "preferences",
            Service::Reports => "reports",
            Service::Chat => "chat",
            Service::R2Test => "r2-test",
        }
    }

    /// Catalog entry for this service
    pub fn info(&self) -> &'static ServiceInfo {
        CATALOG.iter()
            .find(|info| info.service == *self)
            .unwrap_or(&CATALOG[0])
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "insights" => Ok(Service::Insights),
            "optimize" => Ok(Service::Optimize),
            "questions" => Ok(Service::Questions),
            "preferences" => Ok(Service::Preferences),
            "reports" => Ok(Service::Reports),
            "chat" => Ok(Service::Chat),
            "r2-test" => Ok(Service::R2Test),
            other => Err(Error::Validation(format!("Unknown service: {}", other))),
        }
    }
}
