// HTTP transport for the move suggestion service. Requests are executed one at a time on a worker
// thread; results are delivered back to the event loop.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use whales_chess::api::{API_PATH, ApiCommand, ApiError};
use whales_chess::move_client::{ClientTraffic, OutgoingRequest, RequestId};

use crate::client_config::ClientConfig;


pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&config.api_url)?.join(API_PATH)?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(HttpTransport { client, endpoint })
    }

    // Returns response body on success.
    pub fn post(&self, command: &ApiCommand) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(command.to_json())
            .send()
            .map_err(|err| ApiError::Transport(transport_error_message(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(status_message(status)));
        }
        response.text().map_err(|err| ApiError::Transport(transport_error_message(&err)))
    }
}

fn status_message(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("error").to_lowercase()
}

fn transport_error_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_owned()
    } else if let Some(status) = err.status() {
        status_message(status)
    } else {
        "error".to_owned()
    }
}

#[derive(Debug)]
pub struct ApiResponse {
    pub id: RequestId,
    pub response: Result<String, ApiError>,
}

// Pulls everything currently queued so that cancellations can catch requests not started yet.
fn absorb(traffic: ClientTraffic, queue: &mut VecDeque<OutgoingRequest>) {
    match traffic {
        ClientTraffic::Send(request) => queue.push_back(request),
        ClientTraffic::Cancel(id) => {
            if let Some(pos) = queue.iter().position(|r| r.id == id) {
                debug!("Request {id} cancelled before sending");
                queue.remove(pos);
            }
        }
    }
}

pub fn spawn_worker<E>(
    transport: HttpTransport, traffic_rx: mpsc::Receiver<ClientTraffic>, events_tx: mpsc::Sender<E>,
) -> thread::JoinHandle<()>
where
    E: From<ApiResponse> + Send + 'static,
{
    thread::spawn(move || {
        let mut queue = VecDeque::new();
        while let Ok(traffic) = traffic_rx.recv() {
            absorb(traffic, &mut queue);
            for traffic in traffic_rx.try_iter() {
                absorb(traffic, &mut queue);
            }
            while let Some(request) = queue.pop_front() {
                info!("Sending {} {}", request.command.name(), request.id);
                let response = transport.post(&request.command);
                if events_tx.send(ApiResponse { id: request.id, response }.into()).is_err() {
                    return;
                }
                for traffic in traffic_rx.try_iter() {
                    absorb(traffic, &mut queue);
                }
            }
        }
    })
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_messages() {
        assert_eq!(status_message(reqwest::StatusCode::NOT_FOUND), "not found");
        assert_eq!(status_message(reqwest::StatusCode::INTERNAL_SERVER_ERROR), "internal server error");
    }

    #[test]
    fn cancel_drops_queued_request() {
        let request = |id| OutgoingRequest { id: RequestId(id), command: ApiCommand::ListModels };
        let mut queue = VecDeque::new();
        absorb(ClientTraffic::Send(request(1)), &mut queue);
        absorb(ClientTraffic::Send(request(2)), &mut queue);
        absorb(ClientTraffic::Cancel(RequestId(1)), &mut queue);
        absorb(ClientTraffic::Cancel(RequestId(7)), &mut queue);
        assert_eq!(queue, VecDeque::from([request(2)]));
    }
}
