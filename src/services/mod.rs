//! Resource operations over the shared pool. Each function is one
//! use case; handlers stay thin and only translate HTTP.

pub mod company_service;
pub mod job_service;
pub mod user_service;
