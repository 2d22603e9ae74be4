pub mod a001_agent;
pub mod a002_policy_holder;
pub mod a003_policy;
pub mod a004_member;
pub mod a005_payment;
pub mod a006_commission;
pub mod common;
