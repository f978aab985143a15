pub mod logging;
pub mod text;

pub use text::{lesson_number, normalize};
