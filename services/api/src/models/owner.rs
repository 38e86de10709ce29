//! Owner model

use serde::{Deserialize, Serialize};

/// Dealership customer who can appear on sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub contact_info: String,
    pub address: String,
}

impl Owner {
    pub fn draft(&self) -> OwnerDraft {
        OwnerDraft {
            name: self.name.clone(),
            contact_info: self.contact_info.clone(),
            address: self.address.clone(),
        }
    }
}

/// Writable owner fields
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerDraft {
    pub name: String,
    pub contact_info: String,
    pub address: String,
}

impl OwnerDraft {
    pub fn into_owner(self, id: i64) -> Owner {
        Owner {
            id,
            name: self.name,
            contact_info: self.contact_info,
            address: self.address,
        }
    }
}
