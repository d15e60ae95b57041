use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

pub const REPORT_DATASET_BASE_URL: &str =
    "https://raw.githubusercontent.com/brainycodelab/report-datasets/master/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    AccessControl,
    AuditingAndLogging,
    Authentication,
    Configuration,
    DataValidation,
    DenialOfService,
    Patching,
    Testing,
    Timing,
    UndefinedBehaviour,
}

impl ReportKind {
    const ALL: [ReportKind; 10] = [
        Self::AccessControl,
        Self::AuditingAndLogging,
        Self::Authentication,
        Self::Configuration,
        Self::DataValidation,
        Self::DenialOfService,
        Self::Patching,
        Self::Testing,
        Self::Timing,
        Self::UndefinedBehaviour,
    ];

    pub fn all() -> &'static [ReportKind] {
        &Self::ALL
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AccessControl => "Access Control",
            Self::AuditingAndLogging => "Auditing and Logging",
            Self::Authentication => "Authentication",
            Self::Configuration => "Configuration",
            Self::DataValidation => "Data Validation",
            Self::DenialOfService => "Denial of Service",
            Self::Patching => "Patching",
            Self::Testing => "Testing",
            Self::Timing => "Timing",
            Self::UndefinedBehaviour => "Undefined Behaviour",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Self::AccessControl => "access_controls.md",
            Self::AuditingAndLogging => "auditing_and_logging.md",
            Self::Authentication => "authentication.md",
            Self::Configuration => "configuration.md",
            Self::DataValidation => "data_validation.md",
            Self::DenialOfService => "denial_of_service.md",
            Self::Patching => "patching.md",
            Self::Testing => "testing.md",
            Self::Timing => "timing.md",
            Self::UndefinedBehaviour => "undefined_behaviour.md",
        }
    }

    /// Location of the sample report this kind is modelled on.
    pub fn sample_url(&self) -> String {
        format!("{REPORT_DATASET_BASE_URL}{}", self.file_name())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    /// Parses a display name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownReport(s.to_string()))
    }
}
