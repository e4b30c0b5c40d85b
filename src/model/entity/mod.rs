mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod session;
pub use session::{Session, SessionCreate};

mod lesson;
pub use lesson::{Difficulty, Lesson, LessonCreate, LessonPatch};

mod quiz;
pub use quiz::{Quiz, QuizCreate};

mod quiz_submission;
pub use quiz_submission::{QuizSubmission, QuizSubmissionCreate};

mod progress;
pub use progress::{Progress, ProgressStats, ProgressUpsert};

mod hint;
pub use hint::{Hint, HintCreate, MAX_HINT_LEVEL, MIN_HINT_LEVEL};

mod chat_log;
pub use chat_log::ChatLog;

mod ai_interaction;
pub use ai_interaction::{AiInteraction, AiInteractionCreate};

mod code_evaluation;
pub use code_evaluation::{CodeEvaluation, CodeEvaluationCreate};
