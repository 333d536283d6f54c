//! Real-time event feed
//!
//! `GET /api/events` upgrades to a WebSocket. The session starts out
//! joined to the channels its role implies (plus an optional table
//! channel from the query string) and can adjust membership afterwards
//! with text commands:
//!
//! ```json
//! {"join": "table:5"}
//! {"leave": "kitchen"}
//! ```
//!
//! Events arrive as JSON text frames. There is no replay: a session only
//! sees what is published while it is attached.

use axum::{
    Router,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::actor::{Actor, Role};
use shared::message::ChannelKey;

use crate::api::actor::CurrentActor;
use crate::core::ServerState;
use crate::notify::{NotificationRouter, SessionId};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(attach))
}

#[derive(Debug, Deserialize)]
pub struct AttachQuery {
    pub table_id: Option<i64>,
}

/// Membership command sent by the client as a text frame
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClientCommand {
    Join(String),
    Leave(String),
}

/// GET /api/events - upgrade to the event feed
pub async fn attach(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<AttachQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, state, actor, query.table_id))
}

/// Channels a session is joined to on attach
fn initial_channels(actor: Actor, table_id: Option<i64>) -> Vec<ChannelKey> {
    let mut channels = match actor.role {
        Role::Admin => vec![ChannelKey::Admin],
        Role::Kitchen => vec![ChannelKey::Kitchen],
        Role::Waiter => vec![ChannelKey::Staff(actor.id)],
        Role::Customer => Vec::new(),
    };
    if let Some(id) = table_id {
        channels.push(ChannelKey::Table(id));
    }
    channels
}

/// Table channels are open; the rest are tied to roles
fn may_join(actor: Actor, channel: ChannelKey) -> bool {
    match channel {
        ChannelKey::Table(_) => true,
        ChannelKey::Kitchen => actor.has_any_role(&[Role::Kitchen, Role::Admin]),
        ChannelKey::Admin => actor.role == Role::Admin,
        ChannelKey::Staff(id) => {
            actor.role == Role::Admin || (actor.role == Role::Waiter && actor.id == id)
        }
    }
}

async fn handle_session(
    socket: WebSocket,
    state: ServerState,
    actor: Actor,
    table_id: Option<i64>,
) {
    let router = state.router;
    let (session, mut rx) = router.connect();
    for channel in initial_channels(actor, table_id) {
        router.join(session, channel);
    }
    tracing::info!(
        session = %session,
        actor_id = actor.id,
        role = %actor.role,
        "event feed attached"
    );

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) => match serde_json::to_string(event.as_ref()) {
                        Ok(json) => {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(session = %session, "event serialization failed: {e}");
                        }
                    },
                    // outbox reaped by the router
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_command(&router, session, actor, &text);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(session = %session, "websocket error: {e}");
                        break;
                    }
                    _ => {} // Binary, Pong
                }
            }
        }
    }

    let _ = sink.close().await;
    router.disconnect(session);
    tracing::info!(session = %session, "event feed detached");
}

fn handle_command(router: &NotificationRouter, session: SessionId, actor: Actor, text: &str) {
    let command: ClientCommand = match serde_json::from_str(text) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(session = %session, "ignoring malformed command: {e}");
            return;
        }
    };

    match command {
        ClientCommand::Join(raw) => match raw.parse::<ChannelKey>() {
            Ok(channel) if may_join(actor, channel) => {
                router.join(session, channel);
            }
            Ok(channel) => {
                tracing::warn!(
                    session = %session,
                    actor_id = actor.id,
                    channel = %channel,
                    "join refused"
                );
            }
            Err(e) => {
                tracing::debug!(session = %session, "ignoring bad channel: {e}");
            }
        },
        ClientCommand::Leave(raw) => {
            if let Ok(channel) = raw.parse::<ChannelKey>() {
                router.leave(session, channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_channels_follow_the_role() {
        let channels = initial_channels(Actor::new(1, Role::Admin), None);
        assert_eq!(channels, vec![ChannelKey::Admin]);

        let channels = initial_channels(Actor::new(9, Role::Waiter), None);
        assert_eq!(channels, vec![ChannelKey::Staff(9)]);

        let channels = initial_channels(Actor::new(0, Role::Customer), Some(5));
        assert_eq!(channels, vec![ChannelKey::Table(5)]);
    }

    #[test]
    fn join_policy() {
        let admin = Actor::new(1, Role::Admin);
        let kitchen = Actor::new(2, Role::Kitchen);
        let waiter = Actor::new(9, Role::Waiter);
        let customer = Actor::new(0, Role::Customer);

        assert!(may_join(customer, ChannelKey::Table(5)));
        assert!(!may_join(customer, ChannelKey::Kitchen));
        assert!(!may_join(waiter, ChannelKey::Admin));
        assert!(may_join(kitchen, ChannelKey::Kitchen));
        assert!(may_join(waiter, ChannelKey::Staff(9)));
        assert!(!may_join(waiter, ChannelKey::Staff(12)));
        assert!(may_join(admin, ChannelKey::Staff(12)));
    }
}
