// Move suggestion client. The coordinator never waits on the network: it hands out requests
// tagged with a `RequestId` and receives outcomes later through
// `GameSessionCoordinator::process_api_response`. A response whose id is no longer expected is
// stale and gets dropped.

use std::fmt;
use std::sync::mpsc;

use log::debug;

use crate::api::ApiCommand;


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RequestId(pub u32);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OutgoingRequest {
    pub id: RequestId,
    pub command: ApiCommand,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ClientTraffic {
    Send(OutgoingRequest),
    // Best-effort: the transport may abort the request or just let it finish.
    Cancel(RequestId),
}

pub trait MoveSuggestionClient {
    // Starts a request and returns its ticket. Never blocks.
    fn send(&mut self, command: ApiCommand) -> RequestId;
    fn cancel(&mut self, id: RequestId);
}

// Queues traffic into a channel drained by whoever performs the actual HTTP calls: a network
// thread in the console client, JS `fetch` in the browser.
pub struct ChannelMoveClient {
    next_id: u32,
    traffic_tx: mpsc::Sender<ClientTraffic>,
}

impl ChannelMoveClient {
    pub fn new(traffic_tx: mpsc::Sender<ClientTraffic>) -> Self {
        ChannelMoveClient { next_id: 1, traffic_tx }
    }

    fn post(&self, traffic: ClientTraffic) {
        // Receiver gone means the front-end is shutting down; nobody is listening for the
        // response anyway.
        if self.traffic_tx.send(traffic).is_err() {
            debug!("API traffic dropped: transport disconnected");
        }
    }
}

impl MoveSuggestionClient for ChannelMoveClient {
    fn send(&mut self, command: ApiCommand) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.post(ClientTraffic::Send(OutgoingRequest { id, command }));
        id
    }

    fn cancel(&mut self, id: RequestId) { self.post(ClientTraffic::Cancel(id)); }
}
