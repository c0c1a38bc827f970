use thiserror::Error;

use crate::model::QuestionError;
use crate::model::QuizResultError;
use crate::model::QuizSettingsError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Result(#[from] QuizResultError),
}
