pub mod cards;
pub mod catalog;
pub mod report;
pub mod repository;
pub mod service;
pub mod session;
