//! mftax - mutual fund capital gains split for Indian ITR filing
//!
//! Reads a capital gains export (Kuvera report or a flat transaction table),
//! splits every redemption around the July 23, 2024 tax rule change,
//! classifies gains as STCG/LTCG and writes per-period and fund-wise reports.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod importers;
pub mod models;
pub mod reports;
pub mod tax;
pub mod utils;
