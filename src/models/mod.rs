pub mod stop;
pub mod ui;

pub use stop::StopCondition;
pub use ui::{Script, Selector};
