pub mod content_repository;
pub mod progress_repository;
pub mod user_repository;

pub use content_repository::{ContentRepository, MongoContentRepository};
pub use progress_repository::{MongoProgressRepository, ProgressRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use content_repository::MockContentRepository;
#[cfg(test)]
pub use progress_repository::MockProgressRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

use mongodb::error::{ErrorKind, WriteFailure};

const DUPLICATE_KEY_CODE: i32 = 11000;

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}
