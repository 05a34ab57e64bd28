pub mod codec;
pub mod files;
pub mod vault;

pub use codec::{decode, encode};
pub use files::{atomic_write, create_new, read_file, timelog_file};
pub use vault::{FsVault, Vault};

#[cfg(test)]
pub use vault::FailingVault;
