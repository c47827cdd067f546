use serde::{Deserialize, Serialize};

/// A region and the communes that belong to it, in dataset order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    #[serde(rename = "comunas")]
    pub communes: Vec<String>,
}
