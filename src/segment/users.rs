//! Segment Users, Roles and Invites
//!
//! Inviting someone creates a pending invite; the user only exists once the
//! invite is accepted. Both listings are cursor-paginated like the catalogs.

use super::catalog::Page;
use super::client::SegmentClient;
use super::error::{ApiError, ApiResult};
use super::models::{Pagination, Permission};
use serde::{Deserialize, Serialize};

/// A workspace role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A workspace member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// A pending invitation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub email: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Invite listings come back either as bare emails or as objects
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InviteEntry {
    Email(String),
    Full(Invite),
}

impl From<InviteEntry> for Invite {
    fn from(entry: InviteEntry) -> Self {
        match entry {
            InviteEntry::Email(email) => Invite {
                email,
                permissions: Vec::new(),
            },
            InviteEntry::Full(invite) => invite,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RolesPage {
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl Page for RolesPage {
    type Item = Role;

    fn into_parts(self) -> (Vec<Role>, Option<Pagination>) {
        (self.roles, self.pagination)
    }
}

#[derive(Debug, Deserialize)]
struct UsersPage {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl Page for UsersPage {
    type Item = User;

    fn into_parts(self) -> (Vec<User>, Option<Pagination>) {
        (self.users, self.pagination)
    }
}

#[derive(Debug, Deserialize)]
struct InvitesPage {
    #[serde(default)]
    invites: Vec<InviteEntry>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl Page for InvitesPage {
    type Item = Invite;

    fn into_parts(self) -> (Vec<Invite>, Option<Pagination>) {
        (
            self.invites.into_iter().map(Invite::from).collect(),
            self.pagination,
        )
    }
}

#[derive(Debug, Serialize)]
struct CreateInvitesRequest {
    invites: Vec<Invite>,
}

#[derive(Debug, Deserialize)]
struct CreateInvitesData {
    #[serde(default)]
    emails: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EmailsRequest<'a> {
    emails: &'a [&'a str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserIdsRequest<'a> {
    user_ids: &'a [&'a str],
}

impl SegmentClient {
    /// Look a role up by its display name
    pub async fn role_by_name(&self, role_name: &str) -> ApiResult<Role> {
        self.find_paginated::<RolesPage, _>("/roles", |role: &Role| role.name == role_name)
            .await?
            .ok_or_else(|| ApiError::RoleNotFound {
                name: role_name.to_string(),
            })
    }

    /// Invite `email` with `role_id`; returns the invited email as echoed by the API
    pub async fn create_invite(&self, email: &str, role_id: &str) -> ApiResult<String> {
        let request = CreateInvitesRequest {
            invites: vec![Invite {
                email: email.to_string(),
                permissions: vec![Permission::for_role(role_id)],
            }],
        };

        let data: CreateInvitesData = self.post_data("/invites", &request).await?;
        data.emails
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::UnexpectedResponse {
                url: self.http.url("/invites"),
                message: "invite response listed no emails".to_string(),
            })
    }

    /// Find a pending invite for `email`
    pub async fn find_invite(&self, email: &str) -> ApiResult<Option<Invite>> {
        self.find_paginated::<InvitesPage, _>("/invites", |invite: &Invite| {
            invite.email.eq_ignore_ascii_case(email)
        })
        .await
    }

    /// Revoke the pending invite for `email`
    pub async fn delete_invite(&self, email: &str) -> ApiResult<()> {
        self.http
            .delete_with_body("/invites", &EmailsRequest { emails: &[email] })
            .await
    }

    /// Find a workspace member by email
    pub async fn find_user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        self.find_paginated::<UsersPage, _>("/users", |user: &User| {
            user.email.eq_ignore_ascii_case(email)
        })
        .await
    }

    /// Remove members from the workspace
    pub async fn delete_users(&self, user_ids: &[&str]) -> ApiResult<()> {
        self.http
            .delete_with_body("/users", &UserIdsRequest { user_ids })
            .await
    }
}
