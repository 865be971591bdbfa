//! Query description shared by every document store backend.

use std::cmp::Ordering;

use serde_json::Value;

use crate::models::Document;

/// Which documents a query runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A single collection addressed by its full path, e.g. `managers`.
    Collection(String),
    /// Every collection whose last path segment is this name,
    /// e.g. `clients` matches `salons/s1/clients` and `salons/s2/clients`.
    Group(String),
}

impl Scope {
    pub fn name(&self) -> &str {
        match self {
            Scope::Collection(path) => path,
            Scope::Group(name) => name,
        }
    }

    pub fn matches(&self, collection_path: &str) -> bool {
        match self {
            Scope::Collection(path) => path == collection_path,
            Scope::Group(name) => {
                collection_path.rsplit('/').next() == Some(name.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

/// Equality filters (all must hold), one optional sort key and an optional limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub scope: Scope,
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(path: impl Into<String>) -> Self {
        Query::new(Scope::Collection(path.into()))
    }

    pub fn group(name: impl Into<String>) -> Self {
        Query::new(Scope::Group(name.into()))
    }

    fn new(scope: Scope) -> Self {
        Query {
            scope,
            filters: Vec::new(),
            sort: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every filter holds for the document. `id` filters match the document id.
    pub fn accepts(&self, document: &Document) -> bool {
        self.filters.iter().all(|filter| {
            if filter.field == "id" {
                return filter.value.as_str() == Some(document.id.as_str());
            }
            document.get(&filter.field) == Some(&filter.value)
        })
    }

    /// Orders and truncates an already filtered result set in place.
    pub fn arrange(&self, documents: &mut Vec<Document>) {
        if let Some(sort) = &self.sort {
            documents.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order used for sorting: missing < bool < number < string < array < object.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
