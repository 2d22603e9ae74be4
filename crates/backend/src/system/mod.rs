pub mod auth;
pub mod handlers;
pub mod initialization;
pub mod middleware;
pub mod sys_sequence;
pub mod tracing;
