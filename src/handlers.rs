pub mod auth;
pub mod backup;
pub mod catalog;
pub mod dashboard;
pub mod documents;
pub mod markup;
pub mod projects;
pub mod purchases;
pub mod settings;
pub mod sync;
pub mod vouchers;
