pub mod algorithm;
pub mod derivation;
pub mod signer;
pub mod timed;
