pub mod aggregate;
pub mod forms;
pub mod number;
pub mod status;
