//! SQLite-backed course catalog store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{
    Concept, Course, CourseError, CourseFilter, CourseStore, CreateConceptRequest,
    CreateCourseRequest, CreateModuleRequest, EntityStatus, Module, UpdateConceptRequest,
    UpdateCourseRequest, UpdateModuleRequest,
};
use crate::course::{CourseLevel, CourseTopic};

/// SQLite-backed course catalog store.
pub struct SqliteCourseStore {
    conn: Mutex<Connection>,
}

impl SqliteCourseStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CourseError> {
        let conn = Connection::open(path).map_err(|e| CourseError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, CourseError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CourseError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CourseError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS courses (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                topic TEXT NOT NULL,
                level TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS modules (
                id TEXT PRIMARY KEY,
                course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                order_index INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS concepts (
                id TEXT PRIMARY KEY,
                module_id TEXT NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                order_index INTEGER NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                learning_objectives TEXT NOT NULL DEFAULT '[]',
                prerequisites TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'draft',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_courses_topic ON courses(topic);
            CREATE INDEX IF NOT EXISTS idx_courses_level ON courses(level);
            CREATE INDEX IF NOT EXISTS idx_modules_course_id ON modules(course_id);
            CREATE INDEX IF NOT EXISTS idx_concepts_module_id ON concepts(module_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_modules_order
                ON modules(course_id, order_index);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_concepts_order
                ON concepts(module_id, order_index);
            "#,
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &CourseFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(topic) = filter.topic {
            conditions.push("topic = ?");
            params.push(Box::new(topic.as_str().to_string()));
        }

        if let Some(level) = filter.level {
            conditions.push("level = ?");
            params.push(Box::new(level.as_str().to_string()));
        }

        if let Some(ref search) = filter.search {
            conditions.push("(title LIKE ? OR description LIKE ?)");
            let pattern = format!("%{}%", search);
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        // Use now if parsing fails (shouldn't happen with valid data)
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_course(row: &rusqlite::Row) -> rusqlite::Result<Course> {
        let id: String = row.get(0)?;
        let title: String = row.get(1)?;
        let description: Option<String> = row.get(2)?;
        let topic_str: String = row.get(3)?;
        let level_str: String = row.get(4)?;
        let status_str: String = row.get(5)?;
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        let topic = topic_str
            .parse::<CourseTopic>()
            .unwrap_or(CourseTopic::Programming);
        let level = level_str.parse::<CourseLevel>().unwrap_or_default();
        let status = status_str.parse::<EntityStatus>().unwrap_or_default();

        Ok(Course {
            id,
            title,
            description,
            topic,
            level,
            status,
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn row_to_module(row: &rusqlite::Row) -> rusqlite::Result<Module> {
        let id: String = row.get(0)?;
        let course_id: String = row.get(1)?;
        let title: String = row.get(2)?;
        let description: Option<String> = row.get(3)?;
        let order_index: u32 = row.get(4)?;
        let status_str: String = row.get(5)?;
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        Ok(Module {
            id,
            course_id,
            title,
            description,
            order_index,
            status: status_str.parse::<EntityStatus>().unwrap_or_default(),
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn row_to_concept(row: &rusqlite::Row) -> rusqlite::Result<Concept> {
        let id: String = row.get(0)?;
        let module_id: String = row.get(1)?;
        let title: String = row.get(2)?;
        let description: Option<String> = row.get(3)?;
        let order_index: u32 = row.get(4)?;
        let content: String = row.get(5)?;
        let objectives_json: String = row.get(6)?;
        let prerequisites_json: String = row.get(7)?;
        let status_str: String = row.get(8)?;
        let created_at_str: String = row.get(9)?;
        let updated_at_str: String = row.get(10)?;

        // JSON list columns should never fail with valid data
        let learning_objectives: Vec<String> =
            serde_json::from_str(&objectives_json).unwrap_or_default();
        let prerequisites: Vec<String> =
            serde_json::from_str(&prerequisites_json).unwrap_or_default();

        Ok(Concept {
            id,
            module_id,
            title,
            description,
            order_index,
            content,
            learning_objectives,
            prerequisites,
            status: status_str.parse::<EntityStatus>().unwrap_or_default(),
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn fetch_course(conn: &Connection, id: &str) -> Result<Course, CourseError> {
        let result = conn.query_row(
            "SELECT id, title, description, topic, level, status, created_at, updated_at FROM courses WHERE id = ?",
            params![id],
            Self::row_to_course,
        );

        match result {
            Ok(course) => Ok(course),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(CourseError::NotFound(format!("course {}", id)))
            }
            Err(e) => Err(CourseError::Database(e.to_string())),
        }
    }

    fn fetch_module(conn: &Connection, id: &str) -> Result<Module, CourseError> {
        let result = conn.query_row(
            "SELECT id, course_id, title, description, order_index, status, created_at, updated_at FROM modules WHERE id = ?",
            params![id],
            Self::row_to_module,
        );

        match result {
            Ok(module) => Ok(module),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(CourseError::NotFound(format!("module {}", id)))
            }
            Err(e) => Err(CourseError::Database(e.to_string())),
        }
    }

    fn fetch_concept(conn: &Connection, id: &str) -> Result<Concept, CourseError> {
        let result = conn.query_row(
            "SELECT id, module_id, title, description, order_index, content, learning_objectives, prerequisites, status, created_at, updated_at FROM concepts WHERE id = ?",
            params![id],
            Self::row_to_concept,
        );

        match result {
            Ok(concept) => Ok(concept),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(CourseError::NotFound(format!("concept {}", id)))
            }
            Err(e) => Err(CourseError::Database(e.to_string())),
        }
    }
}

impl CourseStore for SqliteCourseStore {
    fn create_course(&self, request: CreateCourseRequest) -> Result<Course, CourseError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = EntityStatus::Draft;

        conn.execute(
            "INSERT INTO courses (id, title, description, topic, level, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.title,
                request.description,
                request.topic.as_str(),
                request.level.as_str(),
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(Course {
            id,
            title: request.title,
            description: request.description,
            topic: request.topic,
            level: request.level,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_course(&self, id: &str) -> Result<Option<Course>, CourseError> {
        let conn = self.conn.lock().unwrap();

        match Self::fetch_course(&conn, id) {
            Ok(course) => Ok(Some(course)),
            Err(CourseError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT id, title, description, topic, level, status, created_at, updated_at FROM courses {} ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CourseError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_course)
            .map_err(|e| CourseError::Database(e.to_string()))?;

        let mut courses = Vec::new();
        for row_result in rows {
            let course = row_result.map_err(|e| CourseError::Database(e.to_string()))?;
            courses.push(course);
        }

        Ok(courses)
    }

    fn count_courses(&self, filter: &CourseFilter) -> Result<i64, CourseError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM courses {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn
            .query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(count)
    }

    fn update_course(&self, id: &str, update: UpdateCourseRequest) -> Result<Course, CourseError> {
        let conn = self.conn.lock().unwrap();

        let current = Self::fetch_course(&conn, id)?;
        let now = Utc::now();

        let updated = Course {
            title: update.title.unwrap_or(current.title),
            description: update.description.or(current.description),
            topic: update.topic.unwrap_or(current.topic),
            level: update.level.unwrap_or(current.level),
            status: update.status.unwrap_or(current.status),
            updated_at: now,
            ..current
        };

        conn.execute(
            "UPDATE courses SET title = ?, description = ?, topic = ?, level = ?, status = ?, updated_at = ? WHERE id = ?",
            params![
                updated.title,
                updated.description,
                updated.topic.as_str(),
                updated.level.as_str(),
                updated.status.as_str(),
                now.to_rfc3339(),
                id,
            ],
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(updated)
    }

    fn delete_course(&self, id: &str) -> Result<Course, CourseError> {
        let conn = self.conn.lock().unwrap();

        let course = Self::fetch_course(&conn, id)?;

        conn.execute("DELETE FROM courses WHERE id = ?", params![id])
            .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(course)
    }

    fn create_module(&self, request: CreateModuleRequest) -> Result<Module, CourseError> {
        let conn = self.conn.lock().unwrap();

        // Owning course must exist
        Self::fetch_course(&conn, &request.course_id)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = EntityStatus::Draft;

        conn.execute(
            "INSERT INTO modules (id, course_id, title, description, order_index, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.course_id,
                request.title,
                request.description,
                request.order_index,
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(Module {
            id,
            course_id: request.course_id,
            title: request.title,
            description: request.description,
            order_index: request.order_index,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_module(&self, id: &str) -> Result<Option<Module>, CourseError> {
        let conn = self.conn.lock().unwrap();

        match Self::fetch_module(&conn, id) {
            Ok(module) => Ok(Some(module)),
            Err(CourseError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list_modules(&self, course_id: &str) -> Result<Vec<Module>, CourseError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, course_id, title, description, order_index, status, created_at, updated_at FROM modules WHERE course_id = ? ORDER BY order_index ASC",
            )
            .map_err(|e| CourseError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![course_id], Self::row_to_module)
            .map_err(|e| CourseError::Database(e.to_string()))?;

        let mut modules = Vec::new();
        for row_result in rows {
            let module = row_result.map_err(|e| CourseError::Database(e.to_string()))?;
            modules.push(module);
        }

        Ok(modules)
    }

    fn update_module(&self, id: &str, update: UpdateModuleRequest) -> Result<Module, CourseError> {
        let conn = self.conn.lock().unwrap();

        let current = Self::fetch_module(&conn, id)?;
        let now = Utc::now();

        let updated = Module {
            title: update.title.unwrap_or(current.title),
            description: update.description.or(current.description),
            order_index: update.order_index.unwrap_or(current.order_index),
            status: update.status.unwrap_or(current.status),
            updated_at: now,
            ..current
        };

        conn.execute(
            "UPDATE modules SET title = ?, description = ?, order_index = ?, status = ?, updated_at = ? WHERE id = ?",
            params![
                updated.title,
                updated.description,
                updated.order_index,
                updated.status.as_str(),
                now.to_rfc3339(),
                id,
            ],
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(updated)
    }

    fn delete_module(&self, id: &str) -> Result<Module, CourseError> {
        let conn = self.conn.lock().unwrap();

        let module = Self::fetch_module(&conn, id)?;

        conn.execute("DELETE FROM modules WHERE id = ?", params![id])
            .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(module)
    }

    fn create_concept(&self, request: CreateConceptRequest) -> Result<Concept, CourseError> {
        let conn = self.conn.lock().unwrap();

        // Owning module must exist
        Self::fetch_module(&conn, &request.module_id)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = EntityStatus::Draft;

        let objectives_json = serde_json::to_string(&request.learning_objectives)
            .map_err(|e| CourseError::Database(e.to_string()))?;
        let prerequisites_json = serde_json::to_string(&request.prerequisites)
            .map_err(|e| CourseError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO concepts (id, module_id, title, description, order_index, content, learning_objectives, prerequisites, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.module_id,
                request.title,
                request.description,
                request.order_index,
                request.content,
                objectives_json,
                prerequisites_json,
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(Concept {
            id,
            module_id: request.module_id,
            title: request.title,
            description: request.description,
            order_index: request.order_index,
            content: request.content,
            learning_objectives: request.learning_objectives,
            prerequisites: request.prerequisites,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_concept(&self, id: &str) -> Result<Option<Concept>, CourseError> {
        let conn = self.conn.lock().unwrap();

        match Self::fetch_concept(&conn, id) {
            Ok(concept) => Ok(Some(concept)),
            Err(CourseError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list_concepts(&self, module_id: &str) -> Result<Vec<Concept>, CourseError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, module_id, title, description, order_index, content, learning_objectives, prerequisites, status, created_at, updated_at FROM concepts WHERE module_id = ? ORDER BY order_index ASC",
            )
            .map_err(|e| CourseError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![module_id], Self::row_to_concept)
            .map_err(|e| CourseError::Database(e.to_string()))?;

        let mut concepts = Vec::new();
        for row_result in rows {
            let concept = row_result.map_err(|e| CourseError::Database(e.to_string()))?;
            concepts.push(concept);
        }

        Ok(concepts)
    }

    fn set_concept_content(&self, id: &str, content: &str) -> Result<Concept, CourseError> {
        let conn = self.conn.lock().unwrap();

        let current = Self::fetch_concept(&conn, id)?;
        let now = Utc::now();

        conn.execute(
            "UPDATE concepts SET content = ?, updated_at = ? WHERE id = ?",
            params![content, now.to_rfc3339(), id],
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(Concept {
            content: content.to_string(),
            updated_at: now,
            ..current
        })
    }

    fn update_concept(
        &self,
        id: &str,
        update: UpdateConceptRequest,
    ) -> Result<Concept, CourseError> {
        let conn = self.conn.lock().unwrap();

        let current = Self::fetch_concept(&conn, id)?;
        let now = Utc::now();

        let updated = Concept {
            title: update.title.unwrap_or(current.title),
            description: update.description.or(current.description),
            order_index: update.order_index.unwrap_or(current.order_index),
            learning_objectives: update
                .learning_objectives
                .unwrap_or(current.learning_objectives),
            prerequisites: update.prerequisites.unwrap_or(current.prerequisites),
            status: update.status.unwrap_or(current.status),
            updated_at: now,
            ..current
        };

        let objectives_json = serde_json::to_string(&updated.learning_objectives)
            .map_err(|e| CourseError::Database(e.to_string()))?;
        let prerequisites_json = serde_json::to_string(&updated.prerequisites)
            .map_err(|e| CourseError::Database(e.to_string()))?;

        conn.execute(
            "UPDATE concepts SET title = ?, description = ?, order_index = ?, learning_objectives = ?, prerequisites = ?, status = ?, updated_at = ? WHERE id = ?",
            params![
                updated.title,
                updated.description,
                updated.order_index,
                objectives_json,
                prerequisites_json,
                updated.status.as_str(),
                now.to_rfc3339(),
                id,
            ],
        )
        .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(updated)
    }

    fn delete_concept(&self, id: &str) -> Result<Concept, CourseError> {
        let conn = self.conn.lock().unwrap();

        let concept = Self::fetch_concept(&conn, id)?;

        conn.execute("DELETE FROM concepts WHERE id = ?", params![id])
            .map_err(|e| CourseError::Database(e.to_string()))?;

        Ok(concept)
    }
}
