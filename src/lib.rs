#![doc = include_str!("RUSTDOC.md")]

pub mod messaging;
pub mod platform;
pub mod session;
pub mod topics;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;
