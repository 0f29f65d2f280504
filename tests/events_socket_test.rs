mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use common::{expert_with_morning_slot, get, json_request, send, test_app, CLIENT_ORIGIN};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, Message},
};

async fn serve(app: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn successful_reservation_is_pushed_to_open_channels() {
    let (app, state) = test_app();
    let expert_id = expert_with_morning_slot(&state).await.expert.id;
    let addr = serve(app.clone()).await;

    let mut request = format!("ws://{}/api/ws", addr).into_client_request().unwrap();
    request
        .headers_mut()
        .insert("origin", CLIENT_ORIGIN.parse().unwrap());
    let (mut socket, _) = connect_async(request).await.expect("handshake");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/bookings",
            json!({
                "expertId": expert_id,
                "name": "Client A",
                "email": "a@example.com",
                "phone": "555-123-4567",
                "date": "2025-06-01",
                "timeSlot": "09:00"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("event within deadline")
        .expect("socket open")
        .expect("valid frame");
    let text = match frame {
        Message::Text(text) => text,
        other => panic!("expected text frame, got {:?}", other),
    };
    let event: JsonValue = serde_json::from_str(&text).unwrap();
    assert_eq!(
        event,
        json!({
            "type": "slotUpdate",
            "expertId": expert_id,
            "date": "2025-06-01",
            "time": "09:00",
            "isBooked": true
        })
    );
}

#[tokio::test]
async fn failed_reservation_publishes_nothing() {
    let (app, state) = test_app();
    let expert_id = expert_with_morning_slot(&state).await.expert.id;
    let addr = serve(app.clone()).await;

    let (mut socket, _) = connect_async(format!("ws://{}/api/ws", addr))
        .await
        .expect("handshake");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/bookings",
            json!({
                "expertId": expert_id,
                "name": "Client A",
                "email": "a@example.com",
                "phone": "555-123-4567",
                "date": "2025-06-01",
                "timeSlot": "13:00"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let nothing = tokio::time::timeout(Duration::from_millis(200), socket.next()).await;
    assert!(nothing.is_err(), "no event expected, got {:?}", nothing);
}

#[tokio::test]
async fn disallowed_origin_is_refused() {
    let (app, _) = test_app();
    let addr = serve(app).await;

    let mut request = format!("ws://{}/api/ws", addr).into_client_request().unwrap();
    request
        .headers_mut()
        .insert("origin", "https://elsewhere.example".parse().unwrap());

    assert!(connect_async(request).await.is_err());
}

async fn wait_for_connections(app: &axum::Router, expected: u64) -> bool {
    for _ in 0..50 {
        let (_, health) = send(app, get("/api/health")).await;
        if health["connections"] == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn open_channels_are_counted_per_app() {
    let (app, _) = test_app();
    let (other_app, _) = test_app();
    let addr = serve(app.clone()).await;

    let (mut socket, _) = connect_async(format!("ws://{}/api/ws", addr))
        .await
        .expect("handshake");
    assert!(wait_for_connections(&app, 1).await);
    let (_, other_health) = send(&other_app, get("/api/health")).await;
    assert_eq!(other_health["connections"], 0);

    socket.send(Message::Close(None)).await.unwrap();
    assert!(wait_for_connections(&app, 0).await);
}
