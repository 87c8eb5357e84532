//! Accounts: registration, sign-in, administration and the bootstrap admin.

use crate::credentials::CredentialVerifier;
use crate::error::{CatalogError, Result};
use crate::{parse_id, Listing};
use authz::{Principal, Role};
use database::{collections, now_timestamp, DatabaseError, Document, DocumentStore, Filter, FindQuery};
use entities::user::{build_user_query, normalize_username, parse_role_change, LoginRequest};
use entities::{Pagination, PublicUser, QueryParams, Registration, User};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

const TAKEN: &str = "Username is already taken";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Where the bootstrap admin's password comes from.
#[derive(Debug, Clone)]
pub enum AdminSecret {
    Plain(String),
    /// A hash produced earlier, for example by `hash-password`.
    Hashed(String),
}

/// Account created at startup when absent.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub secret: AdminSecret,
    pub role: Role,
}

/// A signed-in account: what the client sees and what the session keeps.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: PublicUser,
    pub principal: Principal,
}

impl From<User> for SignedIn {
    fn from(user: User) -> Self {
        let principal = user.principal();
        Self {
            user: PublicUser::from(user),
            principal,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    credentials: Arc<dyn CredentialVerifier>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self { store, credentials }
    }

    /// Create a regular account.
    pub async fn register(&self, payload: &JsonValue) -> Result<SignedIn> {
        let registration = Registration::validate(payload)?;

        if self.find_by_username(&registration.username).await?.is_some() {
            return Err(CatalogError::Conflict(TAKEN.to_string()));
        }

        let hash = self.credentials.hash_password(&registration.password).await?;
        let user = self
            .insert(&registration.username, hash, Role::User)
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(SignedIn::from(user))
    }

    /// Check a username/password pair. Unknown users and wrong passwords
    /// are indistinguishable to the caller.
    pub async fn authenticate(&self, payload: &JsonValue) -> Result<SignedIn> {
        let login = LoginRequest::parse(payload)?;

        let Some(user) = self.find_by_username(&login.username).await? else {
            return Err(CatalogError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };
        let Some(hash) = user.password_hash.as_deref().filter(|h| !h.is_empty()) else {
            return Err(CatalogError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        if !self.credentials.verify_password(&login.password, hash).await? {
            warn!(username = %login.username, "Rejected sign-in attempt");
            return Err(CatalogError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User signed in");
        Ok(SignedIn::from(user))
    }

    /// List accounts, newest first.
    pub async fn list(&self, params: &QueryParams) -> Result<Listing<PublicUser>> {
        let query = build_user_query(params).validate()?;
        let pagination = Pagination::from_params(params);

        let total_items = self.store.count(collections::USERS, &query.filter).await?;
        let find = FindQuery::new(query.filter)
            .sort(query.sort)
            .page(pagination.skip, pagination.limit);

        let items = self
            .store
            .find(collections::USERS, &find)
            .await?
            .into_iter()
            .map(|doc| -> Result<PublicUser> { Ok(PublicUser::from(User::from_document(doc)?)) })
            .collect::<Result<Vec<_>>>()?;

        Ok(Listing {
            items,
            meta: pagination.meta(total_items),
        })
    }

    /// Administrative role change.
    pub async fn change_role(&self, id: &str, payload: &JsonValue, admin: &Principal) -> Result<PublicUser> {
        let id = parse_id(id, "Invalid user ID format")?;
        let role = parse_role_change(payload)?;

        let mut changes = Document::new();
        changes.insert("role".into(), JsonValue::String(role.as_str().to_string()));
        changes.insert("updatedAt".into(), JsonValue::String(now_timestamp()));

        let changed = self
            .store
            .update_one(collections::USERS, &Filter::by_id(&id), changes)
            .await?;
        if changed == 0 {
            return Err(CatalogError::not_found("User not found"));
        }

        info!(user_id = %id, %role, by = %admin.id, "User role changed");

        let user = self
            .store
            .find_one(collections::USERS, &Filter::by_id(&id), None)
            .await?
            .ok_or_else(|| CatalogError::not_found("User not found"))?;
        Ok(PublicUser::from(User::from_document(user)?))
    }

    /// The current form of a session principal: role and username are read
    /// back from the account. `None` when the account no longer exists.
    pub async fn current_principal(&self, principal: &Principal) -> Result<Option<Principal>> {
        let Ok(id) = parse_id(&principal.id, "Invalid user ID format") else {
            return Ok(None);
        };
        let found = self
            .store
            .find_one(collections::USERS, &Filter::by_id(&id), None)
            .await?;
        Ok(found
            .map(User::from_document)
            .transpose()?
            .map(|user| user.principal()))
    }

    /// Create the bootstrap account unless the username is already taken.
    /// Returns whether an account was created.
    pub async fn ensure_account(&self, account: &AdminAccount) -> Result<bool> {
        let username = normalize_username(Some(&JsonValue::String(account.username.clone())));
        if username.is_empty() {
            return Err(CatalogError::bad_request("Admin username cannot be empty"));
        }
        if self.find_by_username(&username).await?.is_some() {
            return Ok(false);
        }

        let hash = match &account.secret {
            AdminSecret::Hashed(hash) => hash.trim().to_string(),
            AdminSecret::Plain(password) => self.credentials.hash_password(password).await?,
        };

        match self.insert(&username, hash, account.role).await {
            Ok(user) => {
                info!(username = %user.username, role = %user.role, "Created default user");
                Ok(true)
            }
            Err(CatalogError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let found = self
            .store
            .find_one(collections::USERS, &Filter::new().eq("username", username), None)
            .await?;
        Ok(found.map(User::from_document).transpose()?)
    }

    async fn insert(&self, username: &str, password_hash: String, role: Role) -> Result<User> {
        let now = now_timestamp();
        let mut document = Document::new();
        document.insert("username".into(), JsonValue::String(username.to_string()));
        document.insert("passwordHash".into(), JsonValue::String(password_hash));
        document.insert("role".into(), JsonValue::String(role.as_str().to_string()));
        document.insert("createdAt".into(), JsonValue::String(now.clone()));
        document.insert("updatedAt".into(), JsonValue::String(now));

        let id = match self.store.insert_one(collections::USERS, document.clone()).await {
            Ok(id) => id,
            Err(DatabaseError::UniqueViolation(_)) => {
                return Err(CatalogError::Conflict(TAKEN.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        document.insert("id".into(), JsonValue::String(id));
        Ok(User::from_document(document)?)
    }
}
