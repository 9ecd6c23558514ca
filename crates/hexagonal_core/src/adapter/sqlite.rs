//! SQLite-backed persistence adapter.
//!
//! # Responsibility
//! - Store records of every collection in the migrated `records` table.
//! - Map rusqlite failures onto the pipeline taxonomy.
//!
//! # Invariants
//! - Write paths call `Record::validate()` before SQL mutations.
//! - Read paths reject undecodable rows instead of masking them.
//! - Transactions are connection-wide; the adapter never nests `BEGIN`.

use crate::adapter::{PersistenceAdapter, RecordQuery};
use crate::db::DbError;
use crate::error::{PipelineError, PipelineResult, RecordInvalid, RecordNotFound, StatementInvalid};
use crate::model::field_errors::FieldErrors;
use crate::model::record::{Attributes, Record, RecordId};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    collection,
    owner_uuid,
    attributes
FROM records";

/// Adapter over one migrated SQLite connection.
pub struct SqliteAdapter<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAdapter<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert(&self, record: &mut Record, attributes_json: &str) -> PipelineResult<()> {
        self.conn
            .execute(
                "INSERT INTO records (collection, owner_uuid, attributes)
                 VALUES (?1, ?2, ?3);",
                params![
                    record.collection.as_str(),
                    record.owner.map(|owner| owner.to_string()),
                    attributes_json,
                ],
            )
            .map_err(|err| statement_invalid("save", err))?;

        let id = self.conn.last_insert_rowid();
        record.id = Some(id);
        debug!(
            "event=adapter_insert module=adapter status=ok collection={} id={id}",
            record.collection
        );
        Ok(())
    }

    fn update(&self, record: &Record, id: RecordId, attributes_json: &str) -> PipelineResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE records
                 SET
                    owner_uuid = ?1,
                    attributes = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3
                   AND collection = ?4;",
                params![
                    record.owner.map(|owner| owner.to_string()),
                    attributes_json,
                    id,
                    record.collection.as_str(),
                ],
            )
            .map_err(|err| statement_invalid("save", err))?;

        if changed == 0 {
            return Err(not_found(&record.collection, id));
        }

        debug!(
            "event=adapter_update module=adapter status=ok collection={} id={id}",
            record.collection
        );
        Ok(())
    }

    fn execute_control(&self, operation: &'static str, sql: &str) -> PipelineResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|err| statement_invalid(operation, err))?;
        debug!("event=adapter_transaction module=adapter status=ok operation={operation}");
        Ok(())
    }
}

impl PersistenceAdapter for SqliteAdapter<'_> {
    fn find(&self, collection: &str, id: RecordId) -> PipelineResult<Record> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{RECORD_SELECT_SQL}
                 WHERE collection = ?1
                   AND id = ?2;"
            ))
            .map_err(|err| statement_invalid("find", err))?;

        let record = stmt
            .query_row(params![collection, id], parse_record_row)
            .optional()
            .map_err(|err| statement_invalid("find", err))?;

        match record {
            Some(record) => record.map_err(|err| statement_invalid("find", err)),
            None => Err(not_found(collection, id)),
        }
    }

    fn save_strict(&self, record: &mut Record) -> PipelineResult<()> {
        if let Err(errors) = record.validate() {
            return Err(RecordInvalid::from_record(errors, record.attributes.clone()).into());
        }

        let attributes_json = serde_json::to_string(&record.attributes)
            .map_err(|err| statement_invalid("save", err))?;

        match record.id {
            Some(id) => self.update(record, id, &attributes_json),
            None => self.insert(record, &attributes_json),
        }
    }

    fn destroy(&self, record: &Record) -> PipelineResult<()> {
        let Some(id) = record.id else {
            let mut errors = FieldErrors::new();
            errors.add("id", "must be persisted before destroy");
            return Err(RecordInvalid::from_record(errors, record.attributes.clone()).into());
        };

        let changed = self
            .conn
            .execute(
                "DELETE FROM records WHERE id = ?1 AND collection = ?2;",
                params![id, record.collection.as_str()],
            )
            .map_err(|err| statement_invalid("destroy", err))?;

        if changed == 0 {
            return Err(not_found(&record.collection, id));
        }

        debug!(
            "event=adapter_destroy module=adapter status=ok collection={} id={id}",
            record.collection
        );
        Ok(())
    }

    fn query(&self, query: &RecordQuery) -> PipelineResult<Vec<Record>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE collection = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.collection.clone())];

        if let Some(owner) = query.owner {
            sql.push_str(" AND owner_uuid = ?");
            bind_values.push(Value::Text(owner.to_string()));
        }

        // Types must match as well: true vs 1, null vs missing key, 1 vs 1.0.
        for (key, value) in &query.attributes {
            let path = format!("$.\"{key}\"");
            let encoded =
                serde_json::to_string(value).map_err(|err| statement_invalid("query", err))?;
            sql.push_str(
                " AND json_type(attributes, ?) IS json_type(?, '$')
                  AND json_extract(attributes, ?) IS json_extract(?, '$')",
            );
            bind_values.extend([
                Value::Text(path.clone()),
                Value::Text(encoded.clone()),
                Value::Text(path),
                Value::Text(encoded),
            ]);
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| statement_invalid("query", err))?;
        let mut rows = stmt
            .query(params_from_iter(bind_values))
            .map_err(|err| statement_invalid("query", err))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(|err| statement_invalid("query", err))? {
            let record = parse_record_row(row)
                .map_err(|err| statement_invalid("query", err))?
                .map_err(|err| statement_invalid("query", err))?;
            records.push(record);
        }

        debug!(
            "event=adapter_query module=adapter status=ok collection={} count={}",
            query.collection,
            records.len()
        );
        Ok(records)
    }

    fn begin(&self) -> PipelineResult<()> {
        self.execute_control("begin", "BEGIN IMMEDIATE;")
    }

    fn commit(&self) -> PipelineResult<()> {
        self.execute_control("commit", "COMMIT;")
    }

    fn rollback(&self) -> PipelineResult<()> {
        self.execute_control("rollback", "ROLLBACK;")
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

/// Decodes one row; the outer result carries column access errors, the inner
/// one carries data decoding errors.
fn parse_record_row(row: &Row<'_>) -> rusqlite::Result<Result<Record, DbError>> {
    let id: RecordId = row.get("id")?;
    let collection: String = row.get("collection")?;
    let owner_text: Option<String> = row.get("owner_uuid")?;
    let attributes_text: String = row.get("attributes")?;

    Ok(decode_record(id, collection, owner_text, &attributes_text))
}

fn decode_record(
    id: RecordId,
    collection: String,
    owner_text: Option<String>,
    attributes_text: &str,
) -> Result<Record, DbError> {
    let owner = match owner_text {
        Some(text) => Some(Uuid::parse_str(&text).map_err(|_| {
            DbError::InvalidData(format!("invalid uuid value `{text}` in records.owner_uuid"))
        })?),
        None => None,
    };

    let attributes: Attributes = serde_json::from_str(attributes_text).map_err(|err| {
        DbError::InvalidData(format!("records.attributes is not a JSON object: {err}"))
    })?;

    Ok(Record {
        id: Some(id),
        collection,
        owner,
        attributes,
    })
}

fn not_found(collection: &str, id: RecordId) -> PipelineError {
    debug!("event=adapter_find module=adapter status=not_found collection={collection} id={id}");
    RecordNotFound {
        collection: collection.to_string(),
        id,
    }
    .into()
}

fn statement_invalid(operation: &'static str, err: impl Into<DbError>) -> PipelineError {
    let err = err.into();
    warn!("event=adapter_error module=adapter status=error operation={operation} error={err}");
    StatementInvalid::new(operation, err).into()
}

#[cfg(test)]
mod tests {
    use super::decode_record;
    use crate::db::DbError;

    #[test]
    fn decode_rejects_bad_owner_uuid() {
        let err = decode_record(1, "posts".to_string(), Some("nope".to_string()), "{}")
            .expect_err("bad uuid must fail");
        assert!(matches!(err, DbError::InvalidData(message) if message.contains("owner_uuid")));
    }

    #[test]
    fn decode_rejects_non_object_attributes() {
        let err = decode_record(1, "posts".to_string(), None, "[1, 2]")
            .expect_err("array attributes must fail");
        assert!(matches!(err, DbError::InvalidData(_)));
    }

    #[test]
    fn decode_builds_persisted_record() {
        let record = decode_record(7, "posts".to_string(), None, r#"{"title":"Hi"}"#)
            .expect("valid row decodes");
        assert_eq!(record.id, Some(7));
        assert_eq!(record.attribute_str("title"), Some("Hi"));
    }
}
