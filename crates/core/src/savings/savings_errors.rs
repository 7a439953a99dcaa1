use thiserror::Error;

/// Failures raised by savings account lookups that guarantee a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SavingsAccountError {
    #[error("Savings account with identifier {0} does not exist")]
    NotFound(i64),
}
