use crate::errors::repository::RepositoryError;
use rdkafka::error::KafkaError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepositoryError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error(
        "Insufficient stock for product {product_id}: requested={requested}, available={available}"
    )]
    InsufficientStock {
        product_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Broker error: {0}")]
    Broker(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_) | ServiceError::Repo(RepositoryError::NotFound)
        )
    }
}

impl From<KafkaError> for ServiceError {
    fn from(error: KafkaError) -> Self {
        ServiceError::Broker(error.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();

        if messages.is_empty() {
            messages.push(errors.to_string());
        }

        ServiceError::Validation(messages)
    }
}
