//! Access-token model, local claim decoding, and the expiry-based validity check.

pub mod claims;
pub mod secret;
pub mod validity;

pub use claims::*;
pub use secret::*;
pub use validity::*;
