//! API handlers module

pub mod citations;
pub mod health;
pub mod papers;

use citeforge_common::errors::AppError;
use validator::ValidationErrors;

/// Map validator output onto the API error, naming the first failing field
pub(crate) fn validation_error(errors: ValidationErrors) -> AppError {
    let field = errors.field_errors().keys().min().map(|field| field.to_string());
    AppError::Validation {
        message: errors.to_string(),
        field,
    }
}
