use common::FileCategory;
use serde::Serialize;

use crate::entity::project_file;

/// File metadata returned by the list and detail endpoints. Raw bytes are
/// only reachable through the download endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FilePayload {
    #[schema(example = 3)]
    pub id: i32,
    pub project_id: i32,
    #[schema(example = "Launch checklist")]
    pub name: String,
    pub description: String,
    pub category: FileCategory,
    #[schema(example = "checklist.pdf")]
    pub file_name: String,
    pub file_size: Option<i64>,
    /// Human-readable size, `"Unknown"` when never recorded.
    #[schema(example = "1.2 MB")]
    pub file_size_display: String,
    pub is_confidential: bool,
    pub uploaded_by: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<project_file::Model> for FilePayload {
    fn from(f: project_file::Model) -> Self {
        Self {
            id: f.id,
            project_id: f.project_id,
            name: f.name,
            description: f.description,
            category: f.category,
            file_name: f.file_name,
            file_size: f.file_size,
            file_size_display: file_size_display(f.file_size),
            is_confidential: f.is_confidential,
            uploaded_by: f.uploaded_by,
            created_at: f.created_at,
        }
    }
}

/// Render a byte count with a 1024 divisor and one decimal place.
///
/// A recorded size of zero renders `0.0 B`; only a missing size is
/// `Unknown`.
pub fn file_size_display(size: Option<i64>) -> String {
    let Some(size) = size else {
        return "Unknown".to_string();
    };

    let mut value = size as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} TB")
}
