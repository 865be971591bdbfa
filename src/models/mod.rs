pub mod client;
pub mod document;
pub mod role;
pub mod session;

pub use client::{ClientRecord, ProductSuggestion, RecommendationRecord};
pub use document::Document;
pub use role::Role;
pub use session::Session;
