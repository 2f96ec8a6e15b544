use crate::{node::NodeId, time};
use serde::{Deserialize, Serialize};
use std::{error::Error as StdError, fmt::Debug, time::SystemTime};

/// A `Transaction` is something that can be digested into a `TxSeal`.
///
/// ```
/// use sealblock::consensus::Transaction;
/// use std::convert::Infallible;
///
/// #[derive(Debug, Clone)]
/// struct Memo(String);
///
/// impl Transaction for Memo {
///     type DigestData = Vec<u8>;
///     type Error = Infallible;
///     fn digest_data(&self) -> Result<Self::DigestData, Self::Error> {
///         Ok(self.0.as_bytes().to_vec())
///     }
/// }
///
/// assert_eq!(Memo("hi".to_string()).digest_data().unwrap(), b"hi");
/// ```
pub trait Transaction: Debug + Clone + Send + Sync {
    /// The type for representing the digestible data.
    type DigestData: AsRef<[u8]>;

    /// The type of error that can occur while creating the digestible data.
    type Error: StdError + Send + Sync + 'static;

    /// Create the canonical bytes this transaction is digested from.
    fn digest_data(&self) -> Result<Self::DigestData, Self::Error>;
}

/// The canonical `Transaction`: a call of a `function` with `args` issued by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefaultTransaction {
    /// Identifier chosen by the issuer.
    pub id: String,
    /// The node that received the transaction from a client.
    pub peer_id: NodeId,
    /// The time the transaction was issued.
    pub time_stamp: SystemTime,
    /// The function to call.
    pub function: String,
    /// Arguments of the function call.
    pub args: Vec<String>,
}

impl DefaultTransaction {
    /// Create a new transaction issued now.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        peer_id: NodeId,
        function: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            peer_id,
            time_stamp: SystemTime::now(),
            function: function.into(),
            args,
        }
    }
}

impl Default for DefaultTransaction {
    fn default() -> Self {
        Self {
            id: String::new(),
            peer_id: NodeId::default(),
            time_stamp: SystemTime::UNIX_EPOCH,
            function: String::new(),
            args: Vec::new(),
        }
    }
}

impl Transaction for DefaultTransaction {
    type DigestData = Vec<u8>;
    type Error = postcard::Error;

    fn digest_data(&self) -> Result<Self::DigestData, Self::Error> {
        let time_stamp = time::system_time_to_bytes(self.time_stamp);
        postcard::to_stdvec(&(
            &self.id,
            &self.peer_id,
            time_stamp.as_ref(),
            &self.function,
            &self.args,
        ))
    }
}
