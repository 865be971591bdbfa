use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::AuthError;
use crate::config::CollectionsConfig;
use crate::models::{Role, Session};
use crate::store::{DocumentStore, Query};

/// Looks credentials up in the account collection of the requested role.
///
/// Passwords are compared as stored (plaintext) because that is how the
/// account records are kept remotely.
pub struct AuthService {
    store: Arc<dyn DocumentStore>,
    collections: CollectionsConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn DocumentStore>, collections: CollectionsConfig) -> Self {
        AuthService { store, collections }
    }

    /// The account collection backing a role.
    pub fn collection_for(&self, role: Role) -> &str {
        match role {
            Role::Manager => &self.collections.managers,
            Role::Super => &self.collections.super_admins,
        }
    }

    pub async fn authenticate(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let collection = self.collection_for(role);
        debug!("Looking up {} account '{}' in '{}'", role, email, collection);

        let query = Query::collection(collection)
            .where_eq("email", email)
            .where_eq("password", password)
            .limit(1);

        let documents = self.store.query(&query).await.map_err(|e| {
            warn!("Account lookup in '{}' failed: {}", collection, e);
            AuthError::ServiceUnavailable(e.to_string())
        })?;

        match documents.into_iter().next() {
            Some(document) => {
                info!("Authenticated {} account '{}'", role, document.id);
                Ok(Session::from_document(document, role))
            }
            None => {
                debug!("No {} account matches '{}'", role, email);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
