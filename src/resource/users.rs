//! `segment_user` lifecycle
//!
//! A user is created by inviting an email address with a role. Until the
//! invite is accepted only the invite exists; afterwards the workspace has
//! a member with that email. The resource ID is the invited email.

use super::error::{ProviderError, ProviderResult};
use super::state;
use crate::segment::models::Permission;
use crate::segment::users::{Invite, User};
use crate::segment::SegmentClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const TYPE_NAME: &str = "segment_user";

pub const STATUS_INVITED: &str = "invited";
pub const STATUS_ACTIVE: &str = "active";

/// Host state of a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub role_name: String,
    pub user_id: String,
    pub status: String,
}

impl UserModel {
    fn active(email: &str, role_name: &str, user: &User) -> Self {
        Self {
            id: Some(email.to_string()),
            email: user.email.clone(),
            role_name: first_role_name(&user.permissions).unwrap_or_else(|| role_name.to_string()),
            user_id: user.id.clone(),
            status: STATUS_ACTIVE.to_string(),
        }
    }

    fn invited(email: &str, role_name: &str, invite: &Invite) -> Self {
        Self {
            id: Some(email.to_string()),
            email: invite.email.clone(),
            role_name: first_role_name(&invite.permissions).unwrap_or_else(|| role_name.to_string()),
            user_id: String::new(),
            status: STATUS_INVITED.to_string(),
        }
    }
}

fn first_role_name(permissions: &[Permission]) -> Option<String> {
    permissions
        .iter()
        .find_map(|permission| permission.role_name.clone())
        .filter(|name| !name.is_empty())
}

/// Email and role can only change by replacement
pub fn changed_attributes(prior: &UserModel, planned: &UserModel) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if !prior.email.eq_ignore_ascii_case(&planned.email) {
        changed.push("email");
    }
    if prior.role_name != planned.role_name {
        changed.push("role_name");
    }
    changed
}

pub fn diff(prior: &Value, planned: &Value) -> ProviderResult<Vec<&'static str>> {
    let prior: UserModel = state::decode(TYPE_NAME, prior)?;
    let planned: UserModel = state::decode(TYPE_NAME, planned)?;
    Ok(changed_attributes(&prior, &planned))
}

async fn read_by_email(client: &SegmentClient, email: &str, role_name: &str) -> ProviderResult<Value> {
    if let Some(user) = client.find_user_by_email(email).await? {
        return state::encode(TYPE_NAME, &UserModel::active(email, role_name, &user));
    }

    if let Some(invite) = client.find_invite(email).await? {
        return state::encode(TYPE_NAME, &UserModel::invited(email, role_name, &invite));
    }

    Err(ProviderError::NotFound {
        resource: TYPE_NAME,
        id: email.to_string(),
    })
}

pub async fn create(client: &SegmentClient, planned: &Value) -> ProviderResult<Value> {
    let model: UserModel = state::decode(TYPE_NAME, planned)?;

    let role = client.role_by_name(&model.role_name).await?;
    let invited = client.create_invite(&model.email, &role.id).await?;
    tracing::info!("invited {} as {}", invited, role.name);

    read_by_email(client, &invited, &model.role_name).await
}

pub async fn read(client: &SegmentClient, current: &Value) -> ProviderResult<Value> {
    let model: UserModel = state::decode(TYPE_NAME, current)?;
    let email = state::require_id(TYPE_NAME, model.id.as_deref())?;
    read_by_email(client, email, &model.role_name).await
}

/// Email and role are replace-only, so the only valid update changes nothing
pub async fn update(_client: &SegmentClient, prior: &Value, planned: &Value) -> ProviderResult<Value> {
    let prior_model: UserModel = state::decode(TYPE_NAME, prior)?;
    let planned_model: UserModel = state::decode(TYPE_NAME, planned)?;
    let email = state::require_id(TYPE_NAME, prior_model.id.as_deref())?;

    let changed = changed_attributes(&prior_model, &planned_model);
    state::in_place_changes(TYPE_NAME, &changed)?;
    tracing::debug!("user {} unchanged", email);
    Ok(prior.clone())
}

/// Remove the member if the invite was accepted, otherwise revoke the invite
pub async fn delete(client: &SegmentClient, current: &Value) -> ProviderResult<()> {
    let model: UserModel = state::decode(TYPE_NAME, current)?;
    let email = state::require_id(TYPE_NAME, model.id.as_deref())?;

    match client.find_user_by_email(email).await? {
        Some(user) => {
            client.delete_users(&[user.id.as_str()]).await?;
            tracing::info!("removed user {} ({})", email, user.id);
        }
        None => {
            client.delete_invite(email).await?;
            tracing::info!("revoked invite for {}", email);
        }
    }
    Ok(())
}

pub async fn import(client: &SegmentClient, email: &str) -> ProviderResult<Value> {
    read(client, &json!({ "id": email, "email": email })).await
}
