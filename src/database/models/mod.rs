mod document;
mod flashcard;
mod lesson;
mod profile;
mod progress;
mod quiz;
mod quiz_attempt;
mod review;

pub use document::{Document, DocumentChanges, NewDocument};
pub use flashcard::{Flashcard, FlashcardChanges, NewFlashcard};
pub use lesson::{Lesson, LessonChanges, NewLesson};
pub use profile::{Profile, ProfileChanges};
pub use progress::{Progress, ProgressChanges};
pub use quiz::{NewQuiz, Quiz, QuizChanges};
pub use quiz_attempt::{NewQuizAttempt, QuizAttempt, QuizAttemptChanges};
pub use review::{NewReview, Review, ReviewChanges};
