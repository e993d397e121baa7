use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier, passed through untouched. Serial keys arrive as
/// integers; uuid (or other text) keys arrive as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestimonialId {
    Int(i64),
    Text(String),
}

impl fmt::Display for TestimonialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestimonialId::Int(n) => write!(f, "{n}"),
            TestimonialId::Text(s) => f.write_str(s),
        }
    }
}

/// Public projection of a `testimonials` row. The `approved` moderation flag is
/// never exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

/// A validated submission, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestimonial {
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub rating: i32,
}

/// 201 body for a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitTestimonialResponse {
    pub success: bool,
    pub message: String,
    pub testimonial: Testimonial,
}
