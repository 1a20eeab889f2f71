use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};

use roomsvital_core::field_value::{document_from_msgpack, document_to_msgpack, Document};

use crate::error::StorageError;
use crate::traits::{Collection, DocumentStore};

fn encode(doc: &Document) -> Result<Vec<u8>, StorageError> {
    Ok(document_to_msgpack(doc)?)
}

fn decode(bytes: &[u8]) -> Result<Document, StorageError> {
    Ok(document_from_msgpack(bytes)?)
}

/// Document store backed by a single SQLite table. Bodies are MessagePack.
///
/// Calls run on the caller's task; the connection lock is never held
/// across an await.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        tracing::debug!(path, "opened document store");
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn schema_version(&self) -> Result<i32, StorageError> {
        crate::schema::schema_version(&self.conn.lock())
    }

    fn read(&self, collection: Collection, id: &str) -> Result<Option<Document>, StorageError> {
        let conn = self.conn.lock();
        let body: Option<Vec<u8>> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                rusqlite::params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| decode(&b)).transpose()
    }

    fn write(&self, collection: Collection, id: &str, doc: &Document) -> Result<(), StorageError> {
        let body = encode(doc)?;
        self.conn.lock().execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, doc_id) DO UPDATE SET
                body = excluded.body,
                updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![collection.as_str(), id, body],
        )?;
        Ok(())
    }

    fn merge(&self, collection: Collection, id: &str, fields: Document) -> Result<(), StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let body: Option<Vec<u8>> = tx
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
                rusqlite::params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(body) = body else {
            return Err(StorageError::NotFound(format!("{}/{id}", collection.as_str())));
        };
        let mut doc = decode(&body)?;
        doc.extend(fields);
        tx.execute(
            "UPDATE documents SET body = ?1, updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)
             WHERE collection = ?2 AND doc_id = ?3",
            rusqlite::params![encode(&doc)?, collection.as_str(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, collection: Collection, id: &str) -> Result<(), StorageError> {
        self.conn.lock().execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection.as_str(), id],
        )?;
        Ok(())
    }

    fn scan(&self, collection: Collection) -> Result<Vec<(String, Document)>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT doc_id, body FROM documents WHERE collection = ?1 ORDER BY doc_id")?;
        let rows = stmt.query_map(rusqlite::params![collection.as_str()], |row| {
            let id: String = row.get(0)?;
            let body: Vec<u8> = row.get(1)?;
            Ok((id, body))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (id, body) = row?;
            result.push((id, decode(&body)?));
        }
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StorageError> {
        self.read(collection, id)
    }

    async fn set(&self, collection: Collection, id: &str, doc: Document) -> Result<(), StorageError> {
        self.write(collection, id, &doc)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<(), StorageError> {
        self.merge(collection, id, fields)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StorageError> {
        self.remove(collection, id)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<(String, Document)>, StorageError> {
        self.scan(collection)
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomsvital_core::FieldValue;

    fn doc(pairs: &[(&str, FieldValue)]) -> Document {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[tokio::test]
    async fn set_then_get() -> Result<(), StorageError> {
        let store = SqliteStore::open_in_memory()?;
        store
            .set(Collection::Rooms, "12", doc(&[("name", "Asha".into())]))
            .await?;
        let got = store.get(Collection::Rooms, "12").await?;
        assert_eq!(got, Some(doc(&[("name", "Asha".into())])));
        assert_eq!(store.get(Collection::Admins, "12").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn set_replaces_whole_document() -> Result<(), StorageError> {
        let store = SqliteStore::open_in_memory()?;
        store
            .set(
                Collection::Rooms,
                "1",
                doc(&[("name", "A".into()), ("isLocked", true.into())]),
            )
            .await?;
        store
            .set(Collection::Rooms, "1", doc(&[("name", "B".into())]))
            .await?;
        let got = store.get(Collection::Rooms, "1").await?.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got.get("name"), Some(&FieldValue::Text("B".into())));
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_and_requires_existing() -> Result<(), StorageError> {
        let store = SqliteStore::open_in_memory()?;
        let missing = store
            .update(Collection::Rooms, "9", doc(&[("isLocked", true.into())]))
            .await;
        assert!(matches!(missing, Err(StorageError::NotFound(_))));

        store
            .set(Collection::Rooms, "9", doc(&[("name", "Ravi".into())]))
            .await?;
        store
            .update(Collection::Rooms, "9", doc(&[("isLocked", true.into())]))
            .await?;
        let got = store.get(Collection::Rooms, "9").await?.unwrap();
        assert_eq!(got.get("name"), Some(&FieldValue::Text("Ravi".into())));
        assert_eq!(got.get("isLocked"), Some(&FieldValue::Boolean(true)));
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_body_is_a_core_error() -> Result<(), StorageError> {
        let store = SqliteStore::open_in_memory()?;
        store.conn.lock().execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES ('rooms', '4', ?1)",
            rusqlite::params![vec![0xc1u8]],
        )?;
        let result = store.get(Collection::Rooms, "4").await;
        assert!(matches!(result, Err(StorageError::Core(_))));
        let listed = store.list(Collection::Rooms).await;
        assert!(matches!(listed, Err(StorageError::Core(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent() -> Result<(), StorageError> {
        let store = SqliteStore::open_in_memory()?;
        store.set(Collection::Rooms, "3", Document::new()).await?;
        store.delete(Collection::Rooms, "3").await?;
        store.delete(Collection::Rooms, "3").await?;
        assert!(store.list(Collection::Rooms).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_is_scoped_to_collection() -> Result<(), StorageError> {
        let store = SqliteStore::open_in_memory()?;
        store.set(Collection::Rooms, "5", Document::new()).await?;
        store.set(Collection::Rooms, "12", Document::new()).await?;
        store.set(Collection::Admins, "u1", Document::new()).await?;
        let ids: Vec<String> = store
            .list(Collection::Rooms)
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["12".to_string(), "5".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn reopen_keeps_documents() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("rooms.db");
        let path = path.to_str().ok_or("non-utf8 temp path")?;
        {
            let store = SqliteStore::open(path)?;
            store
                .set(Collection::Rooms, "12", doc(&[("name", "Asha".into())]))
                .await?;
        }
        let store = SqliteStore::open(path)?;
        assert_eq!(store.schema_version()?, crate::schema::SCHEMA_VERSION);
        assert!(store.get(Collection::Rooms, "12").await?.is_some());
        Ok(())
    }
}
