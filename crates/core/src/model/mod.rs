mod category;
mod outcome;
mod question;
mod settings;

pub use category::{CATEGORY_TTL_MS, CachedCategories, Category, CategoryId, ParseCategoryIdError};
pub use outcome::{QuizResult, QuizResultError, ReviewEntry};
pub use question::{Answer, AnswerId, Question, QuestionError, RawQuestion, RawQuestionSet};
pub use settings::{
    DEFAULT_AMOUNT, Difficulty, MAX_AMOUNT, MIN_AMOUNT, QuizSettings, QuizSettingsDraft,
    QuizSettingsError,
};
