use serde::Serialize;
use serde_json::Value;

use super::Document;

/// A salon client as shown in the roster. Every field besides `id` is optional
/// because the remote records carry no schema.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: String,
    pub name: Option<String>,
    pub visit_count: Option<i64>,
    pub last_visit: Option<Value>,
    pub hair_analysis: Option<Value>,
}

/// A product suggested by an AI recommendation.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProductSuggestion {
    pub name: Option<String>,
    pub sold: bool,
}

/// One AI recommendation made for a client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
    pub id: String,
    pub client_id: Option<String>,
    pub created_at: Option<Value>,
    pub hair_analysis: Option<Value>,
    pub products: Vec<ProductSuggestion>,
}

fn non_null(document: &Document, field: &str) -> Option<Value> {
    document.get(field).filter(|v| !v.is_null()).cloned()
}

impl ClientRecord {
    pub fn from_document(document: &Document) -> Self {
        ClientRecord {
            id: document.id.clone(),
            name: document.get_str("name").map(str::to_string),
            visit_count: document.get_i64("visitCount"),
            last_visit: non_null(document, "lastVisit"),
            hair_analysis: non_null(document, "hairAnalysis"),
        }
    }
}

impl ProductSuggestion {
    fn from_value(value: &Value) -> Self {
        ProductSuggestion {
            name: value.get("name").and_then(Value::as_str).map(str::to_string),
            sold: value.get("sold").and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

impl RecommendationRecord {
    pub fn from_document(document: &Document) -> Self {
        let products = document
            .get("products")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(ProductSuggestion::from_value).collect())
            .unwrap_or_default();

        RecommendationRecord {
            id: document.id.clone(),
            client_id: document.get_str("clientId").map(str::to_string),
            created_at: non_null(document, "createdAt"),
            hair_analysis: non_null(document, "hairAnalysis"),
            products,
        }
    }

    pub fn sold_count(&self) -> usize {
        self.products.iter().filter(|p| p.sold).count()
    }
}
