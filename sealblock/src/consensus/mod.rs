//! Block construction: seals, blocks and the factory creating them.

mod block;
mod block_factory;
pub mod genesis;
mod height;
mod proposer;
mod seal;
mod transaction;
mod validator;

pub use block::{Block, DefaultBlock};
pub use block_factory::BlockFactory;
pub use genesis::GenesisConfig;
pub use height::Height;
pub use proposer::Proposer;
pub use seal::{Seal, TxSeal};
pub use transaction::{DefaultTransaction, Transaction};
pub use validator::{DefaultValidator, Validator};
