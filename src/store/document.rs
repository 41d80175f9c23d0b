use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{StoreError, StoreResult};
use crate::site::model::SiteDocument;
use crate::state::DbPool;

/// Slot under which the serialized site document is kept.
pub const STRUCT_KEY: &str = "site-structure-v1";

/// File name offered for downloads of an export.
pub const EXPORT_FILE_NAME: &str = "vitrine-portfolio.json";

/// Shape of an export file. Imports accept exactly this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    #[serde(rename = "struct")]
    pub document: SiteDocument,
    #[serde(rename = "exportedAt")]
    pub exported_at: String,
}

impl ExportEnvelope {
    /// Stamp `document` with the current time.
    pub fn new(document: SiteDocument) -> Self {
        Self {
            document,
            exported_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    pub fn to_pretty_json(&self) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Single-slot JSON persistence for the site document. Last write wins.
#[derive(Clone)]
pub struct DocumentStore {
    db: DbPool,
}

impl DocumentStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Read the stored document. A slot holding unparseable JSON loads as absent.
    pub fn load(&self) -> StoreResult<Option<SiteDocument>> {
        let conn = self.db.get()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![STRUCT_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                tracing::warn!("Stored site document is unreadable, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, doc: &SiteDocument) -> StoreResult<()> {
        let json = serde_json::to_string(doc)?;
        let conn = self.db.get()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            params![STRUCT_KEY, json],
        )?;
        Ok(())
    }

    /// Wrap the stored document for download. Before the first save this is
    /// the starter document a fresh site shows.
    pub fn export(&self) -> StoreResult<ExportEnvelope> {
        let document = self.load()?.unwrap_or_else(SiteDocument::starter);
        Ok(ExportEnvelope::new(document))
    }

    /// Replace the stored document with the `struct` of an export file.
    ///
    /// Nothing is written unless the whole input parses.
    pub fn import(&self, contents: &[u8]) -> StoreResult<SiteDocument> {
        let document = parse_import(contents)?;
        self.save(&document)?;
        tracing::info!(
            projects = document.projects.len(),
            creative = document.creative.len(),
            "Imported site document"
        );
        Ok(document)
    }
}

fn parse_import(contents: &[u8]) -> StoreResult<SiteDocument> {
    let value: Value = serde_json::from_slice(contents)
        .map_err(|e| StoreError::MalformedImport(format!("not valid JSON: {}", e)))?;

    let document = match value {
        Value::Object(mut map) => match map.remove("struct") {
            Some(Value::Null) | None => {
                return Err(StoreError::MalformedImport(
                    "missing \"struct\" field".into(),
                ))
            }
            Some(document) => document,
        },
        _ => {
            return Err(StoreError::MalformedImport(
                "expected a JSON object".into(),
            ))
        }
    };

    serde_json::from_value(document)
        .map_err(|e| StoreError::MalformedImport(format!("invalid site document: {}", e)))
}
