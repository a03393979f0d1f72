use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A membership record as every caller sees it. The password hash lives
/// only in the store and never travels with this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub status: MemberStatus,
    pub category: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub business_name: String,
    pub business_address: String,
    pub state: String,
    pub materials: String,
    pub machinery: String,
    pub monthly_volume: f64,
    pub employees: i64,
    pub date_joined: NaiveDate,
    pub expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub documents: UserDocuments,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Pending,
    Active,
    Suspended,
    Expired,
}

/// Uploaded and issued files, each an inline data-URL blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocuments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cac_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_id_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_certificate: Option<String>,
}

impl UserDocuments {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Documents only an administrator issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssuedDocument {
    IdCard,
    Certificate,
}

impl IssuedDocument {
    pub fn as_path(&self) -> &'static str {
        match self {
            IssuedDocument::IdCard => "id-card",
            IssuedDocument::Certificate => "certificate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub business_name: String,
    pub business_address: String,
    pub business_category: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub machinery: String,
    pub monthly_volume: Option<f64>,
    pub employees: Option<f64>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub documents: Option<UserDocuments>,
}

/// Partial update. Fields left out keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machinery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cac_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,

    // Administrator-only fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn touches_admin_fields(&self) -> bool {
        self.status.is_some()
            || self.expiry_date.is_some()
            || self.category.is_some()
            || self.role.is_some()
    }
}

/// Public face of an active member in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub id: String,
    pub business_name: String,
    pub contact_name: String,
    pub category: String,
    pub state: String,
    pub materials: String,
    pub machinery: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl From<&User> for DirectoryEntry {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            business_name: user.business_name.clone(),
            contact_name: user.full_name(),
            category: user.category.clone(),
            state: user.state.clone(),
            materials: user.materials.clone(),
            machinery: user.machinery.clone(),
            logo: user.documents.logo.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}
