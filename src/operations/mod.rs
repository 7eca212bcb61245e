pub mod add;
pub mod calculator;
pub mod export;
pub mod import;
pub mod report;
pub mod summary;
