use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ActionResponse<T> {
    pub result: Vec<T>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "product")]
    pub name: String,
    pub price: f64,
    // missing for part of the catalog
    pub brand: Option<String>,
}
