//! Contract test crate; see `tests/contract_validation.rs`.
