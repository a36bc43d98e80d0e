//! Core business logic for trialcheck.
//!
//! All validation rules live here, free of any web framework.
//!
//! # Modules
//!
//! - `trial_balance` - Trial balance validation and the upload/lookup service
//! - `import` - Column-detecting CSV/spreadsheet import
//! - `storage` - Key-value persistence over OpenDAL

pub mod import;
pub mod storage;
pub mod trial_balance;
