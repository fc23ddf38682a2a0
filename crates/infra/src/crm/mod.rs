//! CRM directory adapters

pub mod bitrix;

pub use bitrix::BitrixClient;
