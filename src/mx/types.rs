use serde::Serialize;

/// A mail exchanger for a domain. Lower `preference` means higher priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MxRecord {
    pub preference: u16,
    pub host: String,
}

impl MxRecord {
    pub fn new(preference: u16, host: impl Into<String>) -> Self {
        Self {
            preference,
            host: host.into(),
        }
    }
}

/// Outcome of an MX lookup, keeping the reason behind an empty answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxResolution {
    /// At least one record, sorted by ascending preference.
    Records(Vec<MxRecord>),
    /// Authoritative negative answer: NXDOMAIN, no nameservers, or no MX.
    NoMailDomain { reason: String },
    /// The lookup itself failed (timeout, network, malformed response).
    Failed { reason: String },
}

impl MxResolution {
    pub fn records(&self) -> &[MxRecord] {
        match self {
            Self::Records(records) => records.as_slice(),
            Self::NoMailDomain { .. } | Self::Failed { .. } => &[],
        }
    }

    pub fn into_records(self) -> Vec<MxRecord> {
        match self {
            Self::Records(records) => records,
            Self::NoMailDomain { .. } | Self::Failed { .. } => Vec::new(),
        }
    }
}
