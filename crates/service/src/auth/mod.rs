//! One-time-token (`OTP`) challenge/response authentication.

pub mod errors;
pub mod nonce;
pub mod otp;
pub mod service;
