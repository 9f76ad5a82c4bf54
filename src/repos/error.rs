/*
 * Responsibility
 * - Errors the repos hand upward
 * - The authenticator passes these through untouched
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
