pub mod allocation;
pub mod dividend_service;
pub mod ledger_service;
pub mod t0_service;
