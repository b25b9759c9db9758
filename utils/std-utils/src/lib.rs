mod result;

pub use result::LogErr;
