mod controller;
mod error;
mod task;

pub use controller::Controller;
pub use error::ControllerError;
pub use task::Task;
