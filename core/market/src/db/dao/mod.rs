mod price;
mod submission;

pub use price::PriceDao;
pub use submission::{RemovalOutcome, SubmissionDao};
