mod handler;

pub use handler::csp_report;
