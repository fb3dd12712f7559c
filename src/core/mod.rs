pub mod errors;
pub mod models;
pub mod pagination;
pub mod services;
pub mod validation;
