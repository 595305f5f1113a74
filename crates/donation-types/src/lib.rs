//! Shared types and pure-logic utilities for the donation platform.
//! No web or runtime dependency, so the API service and tooling can share it.

mod code;
mod error;
mod fee;
mod pincode;
mod validate;

pub use code::{generate_code, is_valid_code};
pub use error::ValidationError;
pub use fee::{
    compute_breakdown, round2, Breakdown, FeeConfig, PercentSnapshot,
    DEFAULT_PLATFORM_FEE_PERCENT, SPLIT_TOLERANCE,
};
pub use pincode::{check_pincode_format, DEFAULT_PINCODE_LENGTH};
pub use validate::{validate_percent, validate_share_split};
