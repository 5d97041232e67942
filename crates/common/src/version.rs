use std::fmt;

use serde::Serialize;

use crate::cdmi::SPECIFICATION_VERSION;

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_profile: &'static str,
    pub build_features: &'static str,
    pub build_timestamp: &'static str,
    pub cdmi_specification_version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_profile: env!("BUILD_PROFILE"),
        build_features: env!("BUILD_FEATURES"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        cdmi_specification_version: SPECIFICATION_VERSION,
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cdmi {} ({}, built {}, CDMI {})",
            self.version, self.build_profile, self.build_timestamp, self.cdmi_specification_version
        )
    }
}
