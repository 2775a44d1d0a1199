mod handler;
mod model;

pub use handler::{contact_status, submit_contact};
