pub mod agent;
pub mod catalog;
