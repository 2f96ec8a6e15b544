use futures::future::BoxFuture;
use sealblock::{
    config::NodeConfig,
    consensus::{Block, DefaultTransaction, Height},
    event::LeaderUpdated,
    node::NodeId,
    runtime::Runtime,
    txpool::{SendTransactionsToLeader, TransactionPool, TransactionSender},
    BoxError,
};
use std::{fs, path::Path, sync::Arc, time::Duration};
use tempfile::TempDir;

const GENESIS_CONFIG: &str = r#"{
    "Seal": [],
    "PrevSeal": [],
    "Height": 0,
    "TxList": [],
    "TxSeal": [],
    "TimeStamp": "0001-01-01T00:00:00-00:00",
    "Creator": []
}"#;

/// Delivers forwarded transactions straight into the leader's pool.
struct InProcessSender {
    leader: NodeId,
    leader_pool: Arc<TransactionPool<DefaultTransaction>>,
}

impl TransactionSender<DefaultTransaction> for InProcessSender {
    fn send<'a>(
        &'a self,
        leader: &'a NodeId,
        message: SendTransactionsToLeader<DefaultTransaction>,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            if *leader != self.leader {
                return Err(format!("unknown node {}", leader).into());
            }
            let bytes = message.to_bytes()?;
            let message = SendTransactionsToLeader::from_bytes(&bytes)?;
            self.leader_pool.receive_forwarded(message);
            Ok::<_, BoxError>(())
        })
    }
}

/// A sender for nodes that never forward.
struct Unreachable;

impl TransactionSender<DefaultTransaction> for Unreachable {
    fn send<'a>(
        &'a self,
        leader: &'a NodeId,
        _message: SendTransactionsToLeader<DefaultTransaction>,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move { Err::<(), BoxError>(format!("{} is unreachable", leader).into()) })
    }
}

fn node_config(dir: &Path, node_id: &str) -> NodeConfig {
    let genesis_path = dir.join("genesis.json");
    fs::write(&genesis_path, GENESIS_CONFIG).unwrap();

    NodeConfig::from_toml_str(&format!(
        r#"
        node_id = "{0}"
        block_path = "{1}"
        genesis_path = "{2}"
        routing_interval_ms = 20
        "#,
        node_id,
        dir.join(node_id).display(),
        genesis_path.display(),
    ))
    .unwrap()
}

fn transaction(id: &str, peer: &str) -> DefaultTransaction {
    DefaultTransaction::new(
        id,
        NodeId::from(peer),
        "log",
        vec![format!("payload of {}", id)],
    )
}

/// Collect the ids of all transactions in blocks on top of the genesis block.
fn sealed_ids(node: &Runtime) -> Vec<String> {
    let mut ids = Vec::new();
    let mut seal = node.seal();
    while &seal != node.genesis_block().seal() {
        let block = node.load_block(&seal).unwrap();
        assert_eq!(block.creator(), node.config().node_id.as_bytes());
        ids.extend(block.tx_list().iter().map(|transaction| transaction.id.clone()));
        seal = block.prev_seal().clone();
    }
    ids
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition was not reached in time");
}

#[tokio::test]
async fn test_sealblock() {
    let _ = pretty_env_logger::try_init();
    log::info!("Starting two nodes.");

    let dir = TempDir::new().unwrap();

    let leader = Runtime::start(node_config(dir.path(), "node-a"), Arc::new(Unreachable)).unwrap();
    let follower = Runtime::start(
        node_config(dir.path(), "node-b"),
        Arc::new(InProcessSender {
            leader: NodeId::from("node-a"),
            leader_pool: leader.pool().clone(),
        }),
    )
    .unwrap();

    assert_eq!(leader.height(), Height::GENESIS);
    assert!(leader.genesis_block().prev_seal().is_empty());

    // Without a leader every transaction stays where it was submitted.
    let first = transaction("tx-1", "node-b");
    assert!(follower.submit(first.clone()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(follower.pool().len(), 1);

    let announcement = LeaderUpdated::new(NodeId::from("node-a"));
    leader.handle_leader_updated_event(&announcement).unwrap();
    follower.handle_leader_updated_event(&announcement).unwrap();

    assert!(leader.submit(transaction("tx-2", "node-a")));

    wait_for(|| follower.pool().is_empty() && sealed_ids(&leader).len() == 2).await;

    // Both transactions end up in blocks created by the leader.
    let mut sealed = sealed_ids(&leader);
    sealed.sort();
    assert_eq!(sealed, ["tx-1", "tx-2"]);
    assert!(leader.pool().is_empty());
    assert!(leader.height() >= Height::new(1));

    // A repeated delivery of a sealed transaction is not sealed twice.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let resent = SendTransactionsToLeader::new(NodeId::from("node-b"), vec![first]);
    assert_eq!(leader.receive_forwarded(resent), 0);
    assert!(leader.pool().is_empty());

    follower.shutdown().await.unwrap();
    leader.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_genesis_config_prevents_start() {
    let dir = TempDir::new().unwrap();
    let mut config = node_config(dir.path(), "node-c");
    config.genesis_path = dir.path().join("missing.json").display().to_string();

    let result = Runtime::start(config, Arc::new(Unreachable));
    let err = result.err().expect("start without genesis config");
    assert!(err.to_string().contains("missing.json"));
}
