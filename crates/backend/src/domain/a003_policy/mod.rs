pub mod document;
pub mod repository;
pub mod service;
