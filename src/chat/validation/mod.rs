//! Referential integrity checks shared by every store backend.

mod referential;

pub use referential::{ParsePolicyError, ReferentialValidator, UnconfirmedPolicy};
