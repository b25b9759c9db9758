mod price;
mod submission;

pub use price::Price;
pub use submission::{Submission, STATUS_ACTIVE};
