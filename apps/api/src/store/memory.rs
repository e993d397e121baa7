//! In-memory `QueryExecutor` used by tests. It understands exactly the statements
//! issued by `testimonials::queries` and nothing else.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use super::{timestamp_value, QueryExecutor, Row, SqlParam, StoreError};
use crate::models::testimonial::TestimonialId;
use crate::testimonials::queries::{APPROVED_PAGE_SIZE, INSERT_TESTIMONIAL, LIST_APPROVED};

#[derive(Debug, Clone)]
pub struct StoredTestimonial {
    pub id: TestimonialId,
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub rating: i32,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredTestimonial {
    fn projection(&self) -> Row {
        let mut row = Row::new();
        let id = match &self.id {
            TestimonialId::Int(n) => Value::from(*n),
            TestimonialId::Text(s) => Value::from(s.clone()),
        };
        row.insert("id".into(), id);
        row.insert("name".into(), Value::from(self.name.clone()));
        row.insert("position".into(), self.position.clone().into());
        row.insert("company".into(), self.company.clone().into());
        row.insert("message".into(), Value::from(self.message.clone()));
        row.insert("rating".into(), Value::from(self.rating));
        row.insert("created_at".into(), timestamp_value(self.created_at));
        row
    }
}

#[derive(Default)]
pub struct MemoryExecutor {
    rows: Mutex<Vec<StoredTestimonial>>,
    failure: Mutex<Option<String>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent query fails with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Adds an already-moderated row created `minutes_ago` minutes in the past.
    pub fn seed(&self, name: &str, approved: bool, minutes_ago: i64) -> TestimonialId {
        let mut rows = self.rows.lock().unwrap();
        let id = TestimonialId::Int(rows.len() as i64 + 1);
        rows.push(StoredTestimonial {
            id: id.clone(),
            name: name.to_string(),
            position: None,
            company: None,
            message: format!("Message from {name}"),
            rating: 5,
            approved,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        });
        id
    }

    /// Stands in for the external moderation process.
    pub fn approve(&self, id: &TestimonialId) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| &r.id == id) {
            row.approved = true;
        }
    }

    pub fn rows(&self) -> Vec<StoredTestimonial> {
        self.rows.lock().unwrap().clone()
    }

    fn insert(&self, params: &[SqlParam]) -> Result<Vec<Row>, StoreError> {
        let (name, position, company, message, rating) = match params {
            [SqlParam::Text(name), SqlParam::NullableText(position), SqlParam::NullableText(company), SqlParam::Text(message), SqlParam::Int(rating)] => {
                (name, position, company, message, *rating)
            }
            other => {
                return Err(StoreError::Decode(format!(
                    "unexpected insert params: {other:?}"
                )))
            }
        };

        let mut rows = self.rows.lock().unwrap();
        let stored = StoredTestimonial {
            id: TestimonialId::Int(rows.len() as i64 + 1),
            name: name.clone(),
            position: position.clone(),
            company: company.clone(),
            message: message.clone(),
            rating,
            approved: false,
            created_at: Utc::now(),
        };
        let row = stored.projection();
        rows.push(stored);
        Ok(vec![row])
    }

    fn list_approved(&self) -> Vec<Row> {
        let mut approved: Vec<StoredTestimonial> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.approved)
            .cloned()
            .collect();
        approved.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        approved
            .iter()
            .take(APPROVED_PAGE_SIZE)
            .map(StoredTestimonial::projection)
            .collect()
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, StoreError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(StoreError::Remote {
                status: 503,
                message,
            });
        }

        if sql == INSERT_TESTIMONIAL {
            self.insert(params)
        } else if sql == LIST_APPROVED {
            Ok(self.list_approved())
        } else {
            Err(StoreError::Decode(format!("unsupported statement: {sql}")))
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
