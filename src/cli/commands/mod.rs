pub mod data;
pub mod decide;
