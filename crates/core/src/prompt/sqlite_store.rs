//! SQLite-backed prompt template store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::store::{PromptError, PromptStore};
use super::types::{CreatePromptRequest, Prompt, UpdatePromptRequest};

pub struct SqlitePromptStore {
    conn: Mutex<Connection>,
}

impl SqlitePromptStore {
    /// Create a new SQLite store, creating the database file and table if needed.
    pub fn new(path: &Path) -> Result<Self, PromptError> {
        let conn = Connection::open(path).map_err(|e| PromptError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, PromptError> {
        let conn =
            Connection::open_in_memory().map_err(|e| PromptError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), PromptError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                prompt_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                template TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| PromptError::Database(e.to_string()))?;

        Ok(())
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_prompt(row: &rusqlite::Row) -> rusqlite::Result<Prompt> {
        let prompt_id: String = row.get(0)?;
        let name: String = row.get(1)?;
        let description: Option<String> = row.get(2)?;
        let template: String = row.get(3)?;
        let created_at_str: String = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        Ok(Prompt {
            prompt_id,
            name,
            description,
            template,
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn fetch_prompt(conn: &Connection, prompt_id: &str) -> Result<Prompt, PromptError> {
        let result = conn.query_row(
            "SELECT prompt_id, name, description, template, created_at, updated_at FROM prompts WHERE prompt_id = ?",
            params![prompt_id],
            Self::row_to_prompt,
        );

        match result {
            Ok(prompt) => Ok(prompt),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(PromptError::NotFound(format!("prompt {}", prompt_id)))
            }
            Err(e) => Err(PromptError::Database(e.to_string())),
        }
    }
}

impl PromptStore for SqlitePromptStore {
    fn create_prompt(&self, request: &CreatePromptRequest) -> Result<Prompt, PromptError> {
        let conn = self.conn.lock().unwrap();

        match Self::fetch_prompt(&conn, &request.prompt_id) {
            Ok(_) => return Err(PromptError::AlreadyExists(request.prompt_id.clone())),
            Err(PromptError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let now = Utc::now();

        conn.execute(
            "INSERT INTO prompts (prompt_id, name, description, template, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                request.prompt_id,
                request.name,
                request.description,
                request.template,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| PromptError::Database(e.to_string()))?;

        Ok(Prompt {
            prompt_id: request.prompt_id.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
            template: request.template.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_prompt(&self, prompt_id: &str) -> Result<Option<Prompt>, PromptError> {
        let conn = self.conn.lock().unwrap();

        match Self::fetch_prompt(&conn, prompt_id) {
            Ok(prompt) => Ok(Some(prompt)),
            Err(PromptError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list_prompts(&self) -> Result<Vec<Prompt>, PromptError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT prompt_id, name, description, template, created_at, updated_at FROM prompts ORDER BY prompt_id ASC")
            .map_err(|e| PromptError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_prompt)
            .map_err(|e| PromptError::Database(e.to_string()))?;

        let mut prompts = Vec::new();
        for row_result in rows {
            let prompt = row_result.map_err(|e| PromptError::Database(e.to_string()))?;
            prompts.push(prompt);
        }

        Ok(prompts)
    }

    fn update_prompt(
        &self,
        prompt_id: &str,
        request: &UpdatePromptRequest,
    ) -> Result<Prompt, PromptError> {
        let conn = self.conn.lock().unwrap();

        let current = Self::fetch_prompt(&conn, prompt_id)?;
        let now = Utc::now();

        let updated = Prompt {
            name: request.name.clone().unwrap_or(current.name),
            description: request.description.clone().or(current.description),
            template: request.template.clone().unwrap_or(current.template),
            updated_at: now,
            ..current
        };

        conn.execute(
            "UPDATE prompts SET name = ?, description = ?, template = ?, updated_at = ? WHERE prompt_id = ?",
            params![
                updated.name,
                updated.description,
                updated.template,
                now.to_rfc3339(),
                prompt_id,
            ],
        )
        .map_err(|e| PromptError::Database(e.to_string()))?;

        Ok(updated)
    }

    fn delete_prompt(&self, prompt_id: &str) -> Result<Prompt, PromptError> {
        let conn = self.conn.lock().unwrap();

        let prompt = Self::fetch_prompt(&conn, prompt_id)?;

        conn.execute("DELETE FROM prompts WHERE prompt_id = ?", params![prompt_id])
            .map_err(|e| PromptError::Database(e.to_string()))?;

        Ok(prompt)
    }
}
