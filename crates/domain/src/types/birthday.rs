//! Birthday digest types for the CRM enrichment

use serde::{Deserialize, Serialize};

/// An employee or client whose birthday falls on the digest day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayPerson {
    pub id: String,
    pub name: String,
    /// Normalized phone numbers; empty for employees.
    #[serde(default)]
    pub phones: Vec<String>,
}

/// The daily birthday lookup result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BirthdayDigest {
    pub employees: Vec<BirthdayPerson>,
    pub clients: Vec<BirthdayPerson>,
}

impl BirthdayDigest {
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.clients.is_empty()
    }
}
