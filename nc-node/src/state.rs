use dashmap::{DashMap, mapref::entry::Entry};
use nc_core::{Block, BlockTemplate, Blockchain};
use nc_protocol::Message;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::peer_handler::PeerHandler;

#[derive(Debug)]
struct RegisteredPeer {
    seq: u64,
    handler: PeerHandler,
}

/// What a `ResponseBlockchain` did to the local chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainUpdate {
    /// Nothing received, or nothing longer than what we hold
    Ignored,
    /// The received latest block extended our chain
    Appended,
    /// A single unrelated block: the whole chain was requested from peers
    QueriedAll,
    /// Our chain was swapped for the received one
    Replaced,
    /// The received blocks failed validation
    Rejected,
}

#[derive(Debug)]
pub(crate) struct AppState {
    chain: RwLock<Blockchain>,
    peers: DashMap<String, RegisteredPeer>,
    next_seq: AtomicU64,
}

impl AppState {
    pub(crate) fn new(chain: Blockchain) -> Self {
        Self {
            chain: RwLock::new(chain),
            peers: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    pub(crate) fn add_peer(&self, peer_handler: PeerHandler) -> Result<String, crate::Error> {
        let address = peer_handler.address().to_string();

        match self.peers.entry(address.clone()) {
            Entry::Occupied(_) => {
                warn!("Attempted to add existing peer: {address}");
                Err(crate::Error::PeerAlreadyExists(address))
            }
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert(RegisteredPeer {
                    seq,
                    handler: peer_handler,
                });
                debug!("Peer added: {address}");
                Ok(address)
            }
        }
    }

    pub(crate) fn remove_peer(&self, address: &str) {
        if self.peers.remove(address).is_some() {
            debug!("Peer removed: {address}");
        }
    }

    pub(crate) fn has_peer(&self, address: &str) -> bool {
        self.peers.contains_key(address)
    }

    /// Addresses of the connected peers, in the order they connected.
    pub(crate) fn peer_addresses(&self) -> Vec<String> {
        let mut peers: Vec<(u64, String)> = self
            .peers
            .iter()
            .map(|entry| (entry.value().seq, entry.key().clone()))
            .collect();
        peers.sort_unstable_by_key(|(seq, _)| *seq);
        peers.into_iter().map(|(_, address)| address).collect()
    }

    /// Queues `message` for one peer. Messages to the same peer keep their
    /// order.
    pub(crate) fn send_to_peer(&self, address: &str, message: Arc<Message>) {
        match self.peers.get(address) {
            Some(entry) => {
                if !entry.value().handler.send(message) {
                    warn!("Send failed to peer {address}");
                }
            }
            None => warn!("send_to_peer: peer not found: {address}"),
        }
    }

    pub(crate) fn broadcast(&self, message: Message) {
        let message = Arc::new(message);
        let addresses: Vec<String> = self.peers.iter().map(|e| e.key().clone()).collect();
        info!("Broadcasting {message} to {} peers", addresses.len());
        for address in addresses {
            self.send_to_peer(&address, message.clone());
        }
    }

    pub(crate) async fn blocks(&self) -> Vec<Block> {
        self.chain.read().await.blocks().to_vec()
    }

    pub(crate) async fn block_by_hash(&self, hash: &str) -> Option<Block> {
        self.chain.read().await.get_by_hash(hash).cloned()
    }

    /// Mines a block carrying `data` on top of the current latest block and
    /// announces it to every peer.
    pub(crate) async fn mine_block(&self, data: String) -> Result<Block, crate::Error> {
        let template = self.block_template(data).await;
        self.mine_template(template).await
    }

    pub(crate) async fn block_template(&self, data: String) -> BlockTemplate {
        self.chain.read().await.next_block_template(data)
    }

    /// Runs the nonce search for `template` off the runtime, then appends the
    /// block. Fails with [`crate::Error::Block`] when the chain moved past
    /// the template meanwhile.
    pub(crate) async fn mine_template(
        &self,
        template: BlockTemplate,
    ) -> Result<Block, crate::Error> {
        debug!(
            "Mining block #{} at difficulty {}",
            template.index, template.difficulty
        );

        let block = tokio::task::spawn_blocking(move || template.mine())
            .await
            .map_err(|e| crate::Error::Mining(e.to_string()))?;

        let announcement = {
            let mut chain = self.chain.write().await;
            chain.add_block(block.clone())?;
            Message::latest(&chain)
        };
        info!("Mined block {block}");
        self.broadcast(announcement);
        Ok(block)
    }

    pub(crate) async fn handle_message(&self, from: &str, message: Message) {
        match message {
            Message::QueryLatest => {
                let reply = Message::latest(&*self.chain.read().await);
                self.send_to_peer(from, Arc::new(reply));
            }
            Message::QueryAll => {
                let reply = Message::all(&*self.chain.read().await);
                self.send_to_peer(from, Arc::new(reply));
            }
            Message::ResponseBlockchain(blocks) => {
                let update = self.handle_blockchain_response(blocks).await;
                debug!("Blockchain response from {from}: {update:?}");
            }
        }
    }

    pub(crate) async fn handle_blockchain_response(&self, blocks: Vec<Block>) -> ChainUpdate {
        let Some(received_latest) = blocks.last().cloned() else {
            warn!("Received empty blockchain response");
            return ChainUpdate::Ignored;
        };

        let mut chain = self.chain.write().await;
        let held_latest = chain.latest().clone();

        if received_latest.index <= held_latest.index {
            debug!(
                "Received chain ends at #{}, ours at #{}; nothing to do",
                received_latest.index, held_latest.index
            );
            return ChainUpdate::Ignored;
        }

        info!(
            "Chain possibly behind: ours ends at #{}, peer has #{}",
            held_latest.index, received_latest.index
        );

        if received_latest.prev_hash.as_deref() == Some(held_latest.hash.as_str()) {
            match chain.add_block(received_latest) {
                Ok(()) => {
                    let announcement = Message::latest(&chain);
                    drop(chain);
                    self.broadcast(announcement);
                    ChainUpdate::Appended
                }
                Err(e) => {
                    warn!("Received block rejected: {e}");
                    ChainUpdate::Rejected
                }
            }
        } else if blocks.len() == 1 {
            drop(chain);
            self.broadcast(Message::QueryAll);
            ChainUpdate::QueriedAll
        } else {
            match chain.replace_chain(blocks) {
                Ok(()) => {
                    let announcement = Message::latest(&chain);
                    drop(chain);
                    self.broadcast(announcement);
                    ChainUpdate::Replaced
                }
                Err(e) => {
                    warn!("Received chain rejected: {e}");
                    ChainUpdate::Rejected
                }
            }
        }
    }
}

pub(crate) trait AppStateInterface: Send + Sync + 'static {
    async fn handle_message(&self, from: &str, message: Message);
}

impl AppStateInterface for AppState {
    async fn handle_message(&self, from: &str, message: Message) {
        self.handle_message(from, message).await
    }
}
