use crate::field_value::{Document, FieldValue};

pub mod fields {
    pub const ADMIN_NAME: &str = "adminName";
    pub const EMAIL: &str = "email";
    pub const CREATED_AT: &str = "createdAt";
}

/// Profile written to `admins/{user id}` when an account is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminProfile {
    pub admin_name: String,
    pub email: String,
    pub created_at_ms: i64,
}

impl AdminProfile {
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(fields::ADMIN_NAME.into(), FieldValue::Text(self.admin_name.clone()));
        doc.insert(fields::EMAIL.into(), FieldValue::Text(self.email.clone()));
        doc.insert(fields::CREATED_AT.into(), FieldValue::Timestamp(self.created_at_ms));
        doc
    }

    pub fn from_document(doc: &Document) -> Option<Self> {
        let admin_name = doc.get(fields::ADMIN_NAME)?.as_text()?.to_string();
        let email = doc.get(fields::EMAIL)?.as_text()?.to_string();
        let created_at_ms = match doc.get(fields::CREATED_AT)? {
            FieldValue::Timestamp(ms) | FieldValue::Integer(ms) => *ms,
            _ => return None,
        };
        Some(Self {
            admin_name,
            email,
            created_at_ms,
        })
    }
}
