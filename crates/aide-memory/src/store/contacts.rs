//! Contact records.

use super::rows::{contact_from_row, ContactRow, CONTACT_COLUMNS};
use super::Store;
use aide_core::domain::Contact;
use aide_core::error::{AideError, ValidationError};
use uuid::Uuid;

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Store {
    pub async fn create_contact(
        &self,
        owner_id: &str,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Contact, AideError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Other("contact name must not be empty".to_string()).into());
        }
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            email: non_empty(email),
            phone: non_empty(phone),
        };

        sqlx::query(
            "INSERT INTO contacts (id, owner_id, name, email, phone) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&contact.id)
        .bind(&contact.owner_id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("create contact failed: {e}")))?;

        Ok(contact)
    }

    pub async fn get_contact(&self, owner_id: &str, id: &str) -> Result<Option<Contact>, AideError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("get contact failed: {e}")))?;
        Ok(row.map(contact_from_row))
    }
}
