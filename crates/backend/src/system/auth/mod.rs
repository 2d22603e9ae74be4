pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod revocation;
