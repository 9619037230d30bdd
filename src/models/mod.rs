pub mod loaders;
pub mod progress;
pub mod quiz_question;

pub use loaders::{load_questions, parse_questions};
pub use progress::{Progress, ProgressParseError};
pub use quiz_question::{QuestionError, QuizQuestion};
