//! 密码学原语：随机数、密钥派生、AEAD

pub mod aead;
pub mod kdf;
pub mod random;

pub use kdf::{DerivedKey, KdfParams};
