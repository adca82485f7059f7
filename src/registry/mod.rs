// src/registry/mod.rs
pub mod abi;
pub mod dex;
pub mod networks;
pub mod tokens;
pub mod vechainstats;
