pub mod lesson_advancer;

pub use lesson_advancer::{AdvanceReport, LessonAdvancer};
