pub mod balance;
pub mod ids;
pub mod percent;
pub mod timestamp;
