pub mod theme;
pub mod transaction;
