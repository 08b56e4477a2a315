pub mod demo;
pub mod employee;
pub mod token;
