pub mod auth;
pub mod catalog;
pub mod markup;
pub mod project;
pub mod purchase;
pub mod remote;
pub mod report;
pub mod settings;
pub mod stock;
pub mod sync;
pub mod voucher;
