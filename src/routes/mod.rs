pub mod blog;
pub mod contact;
pub mod csp_report;
pub mod health;
pub mod stats;
pub mod works;
