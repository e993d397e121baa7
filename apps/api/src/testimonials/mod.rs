pub mod handlers;
pub mod queries;
pub mod validation;
