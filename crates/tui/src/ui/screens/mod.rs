pub mod assistant;
pub mod lists;
pub mod login;
pub mod resource;
pub mod tracking;
