//! WebSocket session handler tests.

use super::*;
use crate::domain::ports::{FeedSubscription, ListenerId, NotificationFeed};
use crate::domain::{AffiliationGroup, ListingId, NotificationKind, ProductSummary};
use crate::inbound::ws;
use crate::inbound::ws::state::{OriginPolicy, WsState};
use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle, http::header};
use async_trait::async_trait;
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Mutex;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

/// Feed double that hands out one subscription and records membership calls.
struct RecordingFeed {
    sender: mpsc::Sender<Arc<NotificationEvent>>,
    receiver: Mutex<Option<mpsc::Receiver<Arc<NotificationEvent>>>>,
    joined: Mutex<Vec<AffiliationGroup>>,
    disconnected: Mutex<Vec<ListenerId>>,
}

impl RecordingFeed {
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel(8);
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            joined: Mutex::new(Vec::new()),
            disconnected: Mutex::new(Vec::new()),
        }
    }

    fn joined(&self) -> Vec<AffiliationGroup> {
        self.joined.lock().expect("joined lock").clone()
    }

    fn disconnected(&self) -> Vec<ListenerId> {
        self.disconnected.lock().expect("disconnected lock").clone()
    }
}

#[async_trait]
impl NotificationFeed for RecordingFeed {
    async fn connect(&self) -> FeedSubscription {
        let events = self
            .receiver
            .lock()
            .expect("receiver lock")
            .take()
            .expect("single connection per test");
        FeedSubscription {
            listener: ListenerId::new(7),
            events,
        }
    }

    async fn join(&self, _listener: ListenerId, group: AffiliationGroup) {
        self.joined.lock().expect("joined lock").push(group);
    }

    async fn disconnect(&self, listener: ListenerId) {
        self.disconnected
            .lock()
            .expect("disconnected lock")
            .push(listener);
    }
}

#[fixture]
fn feed() -> Arc<RecordingFeed> {
    Arc::new(RecordingFeed::new())
}

fn start_ws_server(feed: Arc<RecordingFeed>) -> (String, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let ws_state = WsState::new(feed, OriginPolicy::new(Vec::<String>::new(), true));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    (format!("http://{addr}"), server)
}

async fn connect(feed: Arc<RecordingFeed>) -> (Socket, ServerHandle) {
    let (url, server) = start_ws_server(feed);
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::ORIGIN, "http://localhost:3000")
        .connect()
        .await
        .expect("websocket connect");
    (socket, handle)
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("send text");
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json"),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

fn event(title: &str) -> NotificationEvent {
    NotificationEvent {
        kind: NotificationKind::NewProduct,
        message: format!("New product listed: {title}"),
        product: ProductSummary {
            id: ListingId::random(),
            title: title.to_owned(),
            price: 40.0,
            category: "cycles".to_owned(),
            seller: "Asha".to_owned(),
            college: "IIT Delhi".to_owned(),
            image: None,
        },
        timestamp: Utc::now(),
    }
}

#[rstest]
#[actix_rt::test]
async fn join_acknowledges_normalised_room(feed: Arc<RecordingFeed>) {
    let (mut socket, _server) = connect(feed.clone()).await;
    send_json(&mut socket, json!({"event": "join-college", "data": "IIT  Delhi"})).await;

    let value = next_json(&mut socket).await;
    assert_eq!(
        value,
        json!({"event": "joined", "data": {"room": "college-iit-delhi"}})
    );
    assert_eq!(
        feed.joined(),
        vec![AffiliationGroup::from_affiliation("iit delhi").expect("group")]
    );
}

#[rstest]
#[actix_rt::test]
async fn forwards_feed_events_as_new_product_frames(feed: Arc<RecordingFeed>) {
    let (mut socket, _server) = connect(feed.clone()).await;
    send_json(&mut socket, json!({"event": "join-college", "data": "IIT Delhi"})).await;
    let _joined = next_json(&mut socket).await;

    feed.sender
        .send(Arc::new(event("Hero Sprint cycle")))
        .await
        .expect("session listening");

    let value = next_json(&mut socket).await;
    assert_eq!(value["event"], json!("new-product"));
    assert_eq!(value["data"]["type"], json!("NEW_PRODUCT"));
    assert_eq!(
        value["data"]["message"],
        json!("New product listed: Hero Sprint cycle")
    );
    assert_eq!(value["data"]["product"]["college"], json!("IIT Delhi"));
}

#[rstest]
#[actix_rt::test]
async fn blank_college_gets_error_frame(feed: Arc<RecordingFeed>) {
    let (mut socket, _server) = connect(feed.clone()).await;
    send_json(&mut socket, json!({"event": "join-college", "data": "   "})).await;

    let value = next_json(&mut socket).await;
    assert_eq!(value["event"], json!("error"));
    assert_eq!(value["data"]["message"], json!("College name is required"));
    assert!(feed.joined().is_empty());
}

#[rstest]
#[actix_rt::test]
async fn closes_on_malformed_json(feed: Arc<RecordingFeed>) {
    let (mut socket, _server) = connect(feed).await;
    socket
        .send(Message::Text("not-json".into()))
        .await
        .expect("send text");

    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Ping(_) | Frame::Pong(_) => continue,
            Frame::Close(reason) => {
                assert_eq!(reason.expect("reason").code, CloseCode::Policy);
                break;
            }
            other => panic!("expected close frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(feed: Arc<RecordingFeed>) {
    let (mut socket, _server) = connect(feed).await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}

#[rstest]
#[actix_rt::test]
async fn disconnects_listener_when_client_closes(feed: Arc<RecordingFeed>) {
    let (mut socket, _server) = connect(feed.clone()).await;
    socket
        .send(Message::Close(Some(CloseCode::Normal.into())))
        .await
        .expect("send close");

    let disconnected = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let seen = feed.disconnected();
            if !seen.is_empty() {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("listener disconnected");
    assert_eq!(disconnected, vec![ListenerId::new(7)]);
}
