//! Storage layer - database entities and repositories

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod repositories;
pub mod unit_of_work;

pub use unit_of_work::SeaOrmUnitOfWork;
