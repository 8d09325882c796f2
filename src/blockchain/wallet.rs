use alloy::primitives::Address;
use tokio::sync::{broadcast, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletEvent {
    Connected(Address),
    Disconnected,
}

/// The wallet currently driving the session, plus a feed of connect and
/// disconnect events for anything that needs to react to them.
pub struct WalletSession {
    address: RwLock<Option<Address>>,
    events: broadcast::Sender<WalletEvent>,
}

impl WalletSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            address: RwLock::new(None),
            events,
        }
    }

    pub async fn connect(&self, address: Address) {
        *self.address.write().await = Some(address);
        tracing::info!(wallet = %address, "Wallet connected");
        // No subscribers is fine
        let _ = self.events.send(WalletEvent::Connected(address));
    }

    pub async fn disconnect(&self) {
        let previous = self.address.write().await.take();
        if let Some(address) = previous {
            tracing::info!(wallet = %address, "Wallet disconnected");
            let _ = self.events.send(WalletEvent::Disconnected);
        }
    }

    pub async fn address(&self) -> Option<Address> {
        *self.address.read().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}
