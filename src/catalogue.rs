//! Service catalogue shown to citizens before they ask anything.

use crate::types::ServiceType;

#[derive(Debug, Clone, Copy)]
pub struct ServiceInfo {
    pub service: ServiceType,
    pub name: &'static str,
    pub description: &'static str,
    pub examples: [&'static str; 3],
}

pub const SERVICES: [ServiceInfo; 3] = [
    ServiceInfo {
        service: ServiceType::Nhif,
        name: "NHIF Health Insurance",
        description: "Check status, renew membership, and get coverage information",
        examples: [
            "How do I register for NHIF?",
            "What are the NHIF contribution rates?",
            "How do I check my NHIF balance?",
        ],
    },
    ServiceInfo {
        service: ServiceType::Kra,
        name: "KRA Tax Services",
        description: "File returns, get PIN, check compliance status",
        examples: [
            "How do I file my tax returns?",
            "How do I get a KRA PIN?",
            "What are the tax deadlines?",
        ],
    },
    ServiceInfo {
        service: ServiceType::Huduma,
        name: "Huduma Centre",
        description: "Register for Huduma Number and manage services",
        examples: [
            "How do I book a Huduma Centre appointment?",
            "What documents do I need for ID renewal?",
            "Where is the nearest Huduma Centre?",
        ],
    },
];

/// Catalogue entry for a service.
#[must_use]
pub fn service_info(service: ServiceType) -> &'static ServiceInfo {
    match service {
        ServiceType::Nhif => &SERVICES[0],
        ServiceType::Kra => &SERVICES[1],
        ServiceType::Huduma => &SERVICES[2],
    }
}

impl ServiceType {
    /// Citizen-facing name, e.g. "KRA Tax Services".
    #[must_use]
    pub fn display_name(self) -> &'static str {
        service_info(self).name
    }
}
