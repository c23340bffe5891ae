//! Utility functions for sniff implementations.

pub mod ignore;

#[doc(inline)]
pub use ignore::IgnoreSet;
