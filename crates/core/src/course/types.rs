//! Core course catalog data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of an entity title.
pub const MAX_TITLE_LEN: usize = 255;
/// Maximum length of an entity description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Maximum number of learning objectives / prerequisites per concept.
pub const MAX_LIST_ITEMS: usize = 10;
/// Maximum length of a single learning objective / prerequisite entry.
pub const MAX_LIST_ENTRY_LEN: usize = 100;

// ============================================================================
// Enums
// ============================================================================

/// Available course topics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CourseTopic {
    ComputerScience,
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    Programming,
    DataScience,
    MachineLearning,
    IntradayTrading,
    Calculus,
    Metallurgy,
}

impl CourseTopic {
    /// All topics, in a stable order.
    pub const ALL: [CourseTopic; 11] = [
        CourseTopic::ComputerScience,
        CourseTopic::Mathematics,
        CourseTopic::Physics,
        CourseTopic::Chemistry,
        CourseTopic::Biology,
        CourseTopic::Programming,
        CourseTopic::DataScience,
        CourseTopic::MachineLearning,
        CourseTopic::IntradayTrading,
        CourseTopic::Calculus,
        CourseTopic::Metallurgy,
    ];

    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseTopic::ComputerScience => "computer-science",
            CourseTopic::Mathematics => "mathematics",
            CourseTopic::Physics => "physics",
            CourseTopic::Chemistry => "chemistry",
            CourseTopic::Biology => "biology",
            CourseTopic::Programming => "programming",
            CourseTopic::DataScience => "data-science",
            CourseTopic::MachineLearning => "machine-learning",
            CourseTopic::IntradayTrading => "intraday-trading",
            CourseTopic::Calculus => "calculus",
            CourseTopic::Metallurgy => "metallurgy",
        }
    }
}

impl FromStr for CourseTopic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseTopic::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown topic: {}", s))
    }
}

impl fmt::Display for CourseTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course difficulty levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub const ALL: [CourseLevel; 3] = [
        CourseLevel::Beginner,
        CourseLevel::Intermediate,
        CourseLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for CourseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseLevel::ALL
            .iter()
            .find(|l| l.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown level: {}", s))
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status shared by courses, modules and concepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Inactive,
    #[default]
    Draft,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Inactive => "inactive",
            EntityStatus::Draft => "draft",
        }
    }
}

impl FromStr for EntityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntityStatus::Active),
            "inactive" => Ok(EntityStatus::Inactive),
            "draft" => Ok(EntityStatus::Draft),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A course: the top-level unit of published content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Unique identifier (UUID).
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub topic: CourseTopic,
    pub level: CourseLevel,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A module within a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    /// Unique identifier (UUID).
    pub id: String,
    /// Owning course.
    pub course_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 1-based position within the course; unique per course.
    pub order_index: u32,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A concept within a module, carrying the generated HTML content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Concept {
    /// Unique identifier (UUID).
    pub id: String,
    /// Owning module.
    pub module_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 1-based position within the module; unique per module.
    pub order_index: u32,
    /// Generated HTML. Empty string until a generation cycle fills it.
    pub content: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Requests
// ============================================================================

/// Request to create a new course. Status starts as draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub topic: CourseTopic,
    #[serde(default)]
    pub level: CourseLevel,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())
    }
}

/// Partial course update. At least one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topic: Option<CourseTopic>,
    #[serde(default)]
    pub level: Option<CourseLevel>,
    #[serde(default)]
    pub status: Option<EntityStatus>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.topic.is_none()
            && self.level.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_description(self.description.as_deref())
    }
}

/// Request to create a module under an existing course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModuleRequest {
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 1-based position within the course.
    pub order_index: u32,
}

impl CreateModuleRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())?;
        validate_order_index(self.order_index)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModuleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: Option<u32>,
    #[serde(default)]
    pub status: Option<EntityStatus>,
}

impl UpdateModuleRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.order_index.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_description(self.description.as_deref())?;
        if let Some(idx) = self.order_index {
            validate_order_index(idx)?;
        }
        Ok(())
    }
}

/// Request to create a concept under an existing module.
///
/// `content` is set here only by generation flows; direct callers leave it
/// empty and fill it through a generation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConceptRequest {
    pub module_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 1-based position within the module.
    pub order_index: u32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl CreateConceptRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())?;
        validate_order_index(self.order_index)?;
        validate_list_entries("learning_objectives", &self.learning_objectives)?;
        validate_list_entries("prerequisites", &self.prerequisites)
    }
}

/// Partial concept update. Content is never updated through this path;
/// generation and regeneration flows own the `content` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConceptRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: Option<u32>,
    #[serde(default)]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(default)]
    pub prerequisites: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<EntityStatus>,
}

impl UpdateConceptRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.order_index.is_none()
            && self.learning_objectives.is_none()
            && self.prerequisites.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_description(self.description.as_deref())?;
        if let Some(idx) = self.order_index {
            validate_order_index(idx)?;
        }
        if let Some(items) = &self.learning_objectives {
            validate_list_entries("learning_objectives", items)?;
        }
        if let Some(items) = &self.prerequisites {
            validate_list_entries("prerequisites", items)?;
        }
        Ok(())
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Filter for querying courses.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    /// Filter by topic.
    pub topic: Option<CourseTopic>,
    /// Filter by level.
    pub level: Option<CourseLevel>,
    /// Substring match on title or description.
    pub search: Option<String>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl CourseFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            topic: None,
            level: None,
            search: None,
            limit: 100,
            offset: 0,
        }
    }

    pub fn with_topic(mut self, topic: CourseTopic) -> Self {
        self.topic = Some(topic);
        self
    }

    pub fn with_level(mut self, level: CourseLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

// ============================================================================
// Field validation
// ============================================================================

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title cannot be empty".to_string());
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(format!("title cannot exceed {} characters", MAX_TITLE_LEN));
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), String> {
    if let Some(desc) = description {
        if desc.len() > MAX_DESCRIPTION_LEN {
            return Err(format!(
                "description cannot exceed {} characters",
                MAX_DESCRIPTION_LEN
            ));
        }
    }
    Ok(())
}

pub fn validate_order_index(order_index: u32) -> Result<(), String> {
    if order_index < 1 {
        return Err("order_index must be at least 1".to_string());
    }
    Ok(())
}

/// Strict validation for directly-submitted objective/prerequisite lists.
/// LLM-sourced lists go through plan normalization instead, which clamps.
pub fn validate_list_entries(field: &str, items: &[String]) -> Result<(), String> {
    if items.len() > MAX_LIST_ITEMS {
        return Err(format!(
            "{} cannot have more than {} items",
            field, MAX_LIST_ITEMS
        ));
    }
    for item in items {
        if item.trim().is_empty() {
            return Err(format!("{} entries cannot be empty", field));
        }
        if item.len() > MAX_LIST_ENTRY_LEN {
            return Err(format!(
                "{} entries cannot exceed {} characters",
                field, MAX_LIST_ENTRY_LEN
            ));
        }
    }
    Ok(())
}
