pub mod session;
pub mod wait;

pub use session::Session;
pub use wait::Waiter;
