//! List records. Items are kept as a JSON array of strings.

use super::rows::{list_from_row, ListRow, LIST_COLUMNS};
use super::Store;
use aide_core::domain::ListRecord;
use aide_core::error::{AideError, ValidationError};
use uuid::Uuid;

impl Store {
    pub async fn create_list(
        &self,
        owner_id: &str,
        list_name: &str,
        items: Vec<String>,
        is_checklist: bool,
    ) -> Result<ListRecord, AideError> {
        let list_name = list_name.trim();
        if list_name.is_empty() {
            return Err(ValidationError::Other("list name must not be empty".to_string()).into());
        }
        let list = ListRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            list_name: list_name.to_string(),
            content: items,
            is_checklist,
        };

        sqlx::query(
            "INSERT INTO lists (id, owner_id, list_name, content, is_checklist) \
             VALUES (?1, ?2, ?3, json(?4), ?5)",
        )
        .bind(&list.id)
        .bind(&list.owner_id)
        .bind(&list.list_name)
        .bind(serde_json::to_string(&list.content)?)
        .bind(list.is_checklist)
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("create list failed: {e}")))?;

        Ok(list)
    }

    pub async fn get_list(&self, owner_id: &str, id: &str) -> Result<Option<ListRecord>, AideError> {
        let row: Option<ListRow> = sqlx::query_as(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("get list failed: {e}")))?;
        Ok(row.map(list_from_row))
    }

    /// Append one item to the end of a list.
    pub async fn append_list_item(
        &self,
        owner_id: &str,
        id: &str,
        item: &str,
    ) -> Result<ListRecord, AideError> {
        let item = item.trim();
        if item.is_empty() {
            return Err(ValidationError::Other("list item must not be empty".to_string()).into());
        }
        let affected = sqlx::query(
            "UPDATE lists SET content = json_insert(content, '$[#]', ?1) \
             WHERE id = ?2 AND owner_id = ?3",
        )
        .bind(item)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AideError::Memory(format!("append list item failed: {e}")))?
        .rows_affected();
        if affected == 0 {
            return Err(AideError::NotFound(format!("list {id}")));
        }
        self.get_list(owner_id, id)
            .await?
            .ok_or_else(|| AideError::NotFound(format!("list {id}")))
    }
}
