use serde::Serialize;

use crate::repo::RepoError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

/// Command-boundary error; groups repository failures into exit classes.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")] Invalid(RepoError),
    #[error("{0}")] NotFound(RepoError),
    #[error("{0}")] Conflict(RepoError),
    #[error("internal error: {0}")] Internal(RepoError),
}

impl From<RepoError> for CliError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::InvalidHandle | RepoError::InvalidPost => CliError::Invalid(e),
            RepoError::HandleNotFound | RepoError::AccountIdNotFound | RepoError::PostIdNotFound => CliError::NotFound(e),
            RepoError::HandleAlreadyInUse | RepoError::NotActionable => CliError::Conflict(e),
            RepoError::Io(_) | RepoError::Snapshot(_) => CliError::Internal(e),
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Internal(_) => 1,
            CliError::Invalid(_) => 2,
            CliError::NotFound(_) => 3,
            CliError::Conflict(_) => 4,
        }
    }

    fn source_error(&self) -> &RepoError {
        match self {
            CliError::Invalid(e) | CliError::NotFound(e) | CliError::Conflict(e) | CliError::Internal(e) => e,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let kind = match self.source_error() {
            RepoError::InvalidHandle => "invalid_handle",
            RepoError::HandleAlreadyInUse => "handle_already_in_use",
            RepoError::HandleNotFound => "handle_not_found",
            RepoError::AccountIdNotFound => "account_id_not_found",
            RepoError::InvalidPost => "invalid_post",
            RepoError::PostIdNotFound => "post_id_not_found",
            RepoError::NotActionable => "not_actionable",
            RepoError::Io(_) => "io",
            RepoError::Snapshot(_) => "snapshot",
        };
        ErrorBody { error: self.to_string(), kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_domain_error_has_a_distinct_kind() {
        let errs = [
            RepoError::InvalidHandle,
            RepoError::HandleAlreadyInUse,
            RepoError::HandleNotFound,
            RepoError::AccountIdNotFound,
            RepoError::InvalidPost,
            RepoError::PostIdNotFound,
            RepoError::NotActionable,
        ];
        let mut kinds: Vec<_> = errs.into_iter().map(|e| CliError::from(e).body().kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 7);
    }

    #[test]
    fn exit_codes_by_class() {
        assert_eq!(CliError::from(RepoError::InvalidPost).exit_code(), 2);
        assert_eq!(CliError::from(RepoError::PostIdNotFound).exit_code(), 3);
        assert_eq!(CliError::from(RepoError::NotActionable).exit_code(), 4);
    }
}
