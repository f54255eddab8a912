//! Free-tier usage metering and the essay evaluation lifecycle behind the RedacAI
//! correction tool.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
