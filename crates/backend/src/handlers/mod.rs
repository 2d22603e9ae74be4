pub mod a001_agent;
pub mod a003_policy;
pub mod a005_payment;
pub mod d400_overview;
pub mod d401_reports;
