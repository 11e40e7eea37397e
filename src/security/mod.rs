pub mod passwords;
pub mod tokens;
pub mod vault;

pub use tokens::{Claims, TokenIssuer};
pub use vault::{KeyVault, VaultError};
