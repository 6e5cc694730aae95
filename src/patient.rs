//! Patient identity passed explicitly to backend requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating a patient identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatientError {
    #[error("Patient identifier is empty")]
    Empty,

    #[error("Patient identifier contains whitespace: {0:?}")]
    Whitespace(String),
}

/// A validated patient record identifier (DID).
///
/// Trimmed, non-empty and free of inner whitespace, so it can be used as a
/// path segment and query value without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientDid(String);

impl PatientDid {
    pub fn parse(raw: &str) -> Result<Self, PatientError> {
        let did = raw.trim();
        if did.is_empty() {
            return Err(PatientError::Empty);
        }
        if did.chars().any(char::is_whitespace) {
            return Err(PatientError::Whitespace(did.to_string()));
        }
        Ok(Self(did.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PatientDid {
    type Error = PatientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PatientDid> for String {
    fn from(did: PatientDid) -> Self {
        did.0
    }
}

impl fmt::Display for PatientDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The patient a viewer session is working on.
///
/// Owned by the host and handed to each request that needs it; there is no
/// process-wide "current patient".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatientContext {
    did: Option<PatientDid>,
}

impl PatientContext {
    /// No patient selected (anonymous analysis).
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_patient(did: PatientDid) -> Self {
        Self { did: Some(did) }
    }

    pub fn did(&self) -> Option<&PatientDid> {
        self.did.as_ref()
    }

    pub fn select(&mut self, did: PatientDid) {
        log::info!("👤 Selected patient {}", did);
        self.did = Some(did);
    }

    pub fn clear(&mut self) {
        self.did = None;
    }
}
