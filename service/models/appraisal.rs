use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::utils::error::{ApiError, Result};

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";

/// A stored appraisal. Rows are never updated once written.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appraisal {
    pub id: i32,
    pub employee_name: String,
    pub employee_id: String,
    pub task_name: String,
    pub feedback: String,
    pub rating: i32,
    /// Absent only when listing from a table that predates the column.
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/appraisals`.
///
/// Fields are kept as raw JSON so that presence is checked here while format
/// and range are left to the table constraints.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalSubmission {
    #[schema(value_type = Option<String>, example = "Jane Doe")]
    pub employee_name: Option<Value>,
    #[schema(value_type = Option<String>, example = "ENG0001")]
    pub employee_id: Option<Value>,
    #[schema(value_type = Option<String>, example = "Code Review")]
    pub task_name: Option<Value>,
    #[schema(value_type = Option<String>, example = "Great work")]
    pub feedback: Option<Value>,
    #[schema(value_type = Option<i32>, example = 5)]
    pub rating: Option<Value>,
}

/// A submission with every field present, ready to bind positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppraisal {
    pub employee_name: String,
    pub employee_id: String,
    pub task_name: String,
    pub feedback: String,
    /// Textual form; the store parses it into the integer column.
    pub rating: String,
}

impl AppraisalSubmission {
    pub fn validate(self) -> Result<NewAppraisal> {
        let fields = (
            text_field(self.employee_name),
            text_field(self.employee_id),
            text_field(self.task_name),
            text_field(self.feedback),
            rating_field(self.rating),
        );

        match fields {
            (Some(employee_name), Some(employee_id), Some(task_name), Some(feedback), Some(rating)) => {
                Ok(NewAppraisal {
                    employee_name,
                    employee_id,
                    task_name,
                    feedback,
                    rating,
                })
            }
            (employee_name, employee_id, task_name, feedback, rating) => {
                let missing = [
                    ("employeeName", employee_name.is_none()),
                    ("employeeId", employee_id.is_none()),
                    ("taskName", task_name.is_none()),
                    ("feedback", feedback.is_none()),
                    ("rating", rating.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect::<Vec<_>>()
                .join(", ");

                Err(ApiError::Validation {
                    field: missing,
                    message: ALL_FIELDS_REQUIRED.to_owned(),
                })
            }
        }
    }
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// null, false, 0 and "" count as not provided
fn text_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(scalar_text(other)),
    }
}

// A numeric 0 is passed through so the rating constraint rejects it.
fn rating_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(scalar_text(other)),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}
