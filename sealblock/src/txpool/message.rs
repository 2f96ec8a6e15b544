use super::SEND_TRANSACTIONS_TO_LEADER_PROTOCOL;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Carries the pending transactions of a node to the leader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendTransactionsToLeader<T> {
    /// Always `SEND_TRANSACTIONS_TO_LEADER_PROTOCOL`.
    pub protocol: String,
    /// The forwarding node.
    pub sender: NodeId,
    /// The forwarded transactions in pool order.
    pub transactions: Vec<T>,
}

impl<T> SendTransactionsToLeader<T> {
    /// Create a message forwarding `transactions` from `sender`.
    #[must_use]
    pub fn new(sender: NodeId, transactions: Vec<T>) -> Self {
        Self {
            protocol: SEND_TRANSACTIONS_TO_LEADER_PROTOCOL.to_string(),
            sender,
            transactions,
        }
    }

    /// Check whether the message is tagged with the forwarding protocol.
    #[must_use]
    pub fn has_forwarding_protocol(&self) -> bool {
        self.protocol == SEND_TRANSACTIONS_TO_LEADER_PROTOCOL
    }

    /// Encode the message for the wire.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error>
    where
        T: Serialize,
    {
        postcard::to_stdvec(self)
    }

    /// Decode a message received from the wire.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::DefaultTransaction;

    #[test]
    fn messages_are_tagged() {
        let message = SendTransactionsToLeader::new(NodeId::from("a"), vec![1_u8, 2]);
        assert_eq!(message.protocol, "SendTransactionsToLeaderProtocol");
        assert!(message.has_forwarding_protocol());
    }

    #[test]
    fn messages_survive_the_wire() {
        let transaction =
            DefaultTransaction::new("tx-1", NodeId::from("a"), "transfer", vec!["5".to_string()]);
        let message = SendTransactionsToLeader::new(NodeId::from("a"), vec![transaction]);

        let bytes = message.to_bytes().unwrap();
        let decoded: SendTransactionsToLeader<DefaultTransaction> =
            SendTransactionsToLeader::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, message);
    }
}
