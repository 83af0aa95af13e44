//! Authentication: password login, HS256 tokens and request identities.

pub mod identity;
pub mod service;
pub mod token;

pub use identity::{Identity, Principal};
pub use service::{AuthService, Session};
pub use token::{bearer_token, Claims, IssuedToken, TokenCodec, TokenKind, TokenSettings};
