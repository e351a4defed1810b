use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Document;

/// One tracked object: its name and the raw element-set lines, keyed by catalog number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrbitalElementRecord {
    pub catalog_id: u32,
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl Document for OrbitalElementRecord {
    const COLLECTION: &'static str = "records";

    fn key(&self) -> u32 {
        self.catalog_id
    }
}
