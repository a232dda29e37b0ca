//! End-to-end session scenarios against a scripted mock helper.
//!
//! Each test binds a listener on an ephemeral port, plays one side of the
//! wire protocol, and asserts on the session outcome. Timeouts are shrunk
//! via the injected configuration so quiet-helper cases finish quickly.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use helper_harness::{Error, Session, SessionConfig, SessionState, StopReason};

// ============================================================================
// Constants
// ============================================================================

const TOKEN: &str = "helper-smoke";
const BROWSER_ID: &str = "b-smoke";
const CALL_TIMEOUT: Duration = Duration::from_millis(250);
const SESSION_BUDGET: Duration = Duration::from_secs(2);

// ============================================================================
// Helpers
// ============================================================================

fn test_config(port: u16) -> SessionConfig {
    SessionConfig::new()
        .with_port(port)
        .with_browser_id(BROWSER_ID)
        .with_call_timeout(CALL_TIMEOUT)
        .with_session_budget(SESSION_BUDGET)
}

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    (listener, port)
}

async fn accept(listener: &TcpListener) -> (BufReader<OwnedReadHalf>, OwnedWriteHalf) {
    let (stream, _) = listener.accept().await.expect("accept");
    let (read_half, write_half) = stream.into_split();
    (BufReader::new(read_half), write_half)
}

async fn next_message(reader: &mut BufReader<OwnedReadHalf>) -> Value {
    let mut line = String::new();
    let read = reader.read_line(&mut line).await.expect("read line");
    assert_ne!(read, 0, "client closed before sending expected message");
    serde_json::from_str(line.trim_end()).expect("client sent invalid JSON")
}

async fn send_message(writer: &mut OwnedWriteHalf, value: &Value) {
    let mut line = value.to_string();
    line.push('\n');
    writer.write_all(line.as_bytes()).await.expect("write line");
    writer.flush().await.expect("flush");
}

/// Plays the handshake and initBrowser steps, acknowledging both.
async fn accept_session(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
) -> Value {
    let handshake = next_message(reader).await;
    assert_eq!(handshake["type"], "handshake");
    assert_eq!(handshake["token"], TOKEN);
    send_message(writer, &json!({ "type": "ok" })).await;

    let init = next_message(reader).await;
    assert_eq!(init["type"], "initBrowser");
    assert_eq!(init["token"], TOKEN);
    assert_eq!(init["id"], BROWSER_ID);
    assert!(init["url"].as_str().is_some_and(|u| !u.is_empty()));
    assert!(init["width"].as_u64().is_some());
    assert!(init["height"].as_u64().is_some());
    send_message(writer, &json!({ "type": "ok", "id": BROWSER_ID })).await;

    init
}

async fn expect_dispose(reader: &mut BufReader<OwnedReadHalf>) {
    let dispose = next_message(reader).await;
    assert_eq!(dispose["type"], "disposeBrowser");
    assert_eq!(dispose["token"], TOKEN);
    assert_eq!(dispose["id"], BROWSER_ID);
}

fn frame_ready(data_len: usize) -> Value {
    json!({
        "type": "frameReady",
        "width": 800,
        "height": 600,
        "data": "x".repeat(data_len),
    })
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn three_frames_exit_by_count() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (mut reader, mut writer) = accept(&listener).await;
        accept_session(&mut reader, &mut writer).await;

        for _ in 0..3 {
            send_message(&mut writer, &frame_ready(600)).await;
        }

        expect_dispose(&mut reader).await;
    });

    let session = Session::new(test_config(port)).expect("session");
    let report = session.run().await.expect("run");

    assert_eq!(report.frames, 3);
    assert_eq!(report.stop, StopReason::Target);
    assert!(report.elapsed < SESSION_BUDGET);

    server.await.expect("server");
}

#[tokio::test]
async fn silent_helper_exits_quiet_with_zero_frames() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (mut reader, mut writer) = accept(&listener).await;
        accept_session(&mut reader, &mut writer).await;

        // Send nothing; the dispose request arrives after the client's
        // receive times out.
        expect_dispose(&mut reader).await;
    });

    let session = Session::new(test_config(port)).expect("session");
    let report = session.run().await.expect("run");

    assert_eq!(report.frames, 0);
    assert_eq!(report.stop, StopReason::Quiet);

    server.await.expect("server");
}

#[tokio::test]
async fn close_mid_handshake_aborts_with_failure() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (mut reader, writer) = accept(&listener).await;
        let handshake = next_message(&mut reader).await;
        assert_eq!(handshake["type"], "handshake");
        drop(writer);
        drop(reader);
    });

    let session = Session::new(test_config(port)).expect("session");
    let result = session.run().await;

    match result {
        Err(e) => assert!(e.is_connection_error(), "unexpected error: {e}"),
        Ok(report) => panic!("session should fail, got {report:?}"),
    }

    server.await.expect("server");
}

#[tokio::test]
async fn frame_without_data_still_counts() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (mut reader, mut writer) = accept(&listener).await;
        accept_session(&mut reader, &mut writer).await;

        for _ in 0..3 {
            send_message(
                &mut writer,
                &json!({ "type": "frameReady", "width": 800, "height": 600 }),
            )
            .await;
        }

        expect_dispose(&mut reader).await;
    });

    let session = Session::new(test_config(port)).expect("session");
    let report = session.run().await.expect("run");

    assert_eq!(report.frames, 3);
    assert_eq!(report.stop, StopReason::Target);

    server.await.expect("server");
}

#[tokio::test]
async fn unknown_types_and_blank_lines_are_skipped() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (mut reader, mut writer) = accept(&listener).await;
        accept_session(&mut reader, &mut writer).await;

        send_message(&mut writer, &json!({ "type": "ping" })).await;
        writer.write_all(b"\n").await.expect("blank line");
        send_message(&mut writer, &frame_ready(16)).await;
        send_message(&mut writer, &json!({ "type": "stats", "fps": 30 })).await;
        send_message(&mut writer, &frame_ready(16)).await;
        send_message(&mut writer, &frame_ready(16)).await;

        expect_dispose(&mut reader).await;
    });

    let session = Session::new(test_config(port)).expect("session");
    let report = session.run().await.expect("run");

    assert_eq!(report.frames, 3);
    assert_eq!(report.stop, StopReason::Target);

    server.await.expect("server");
}

#[tokio::test]
async fn budget_bounds_an_endless_frame_stream() {
    let (listener, port) = bind().await;
    let budget = Duration::from_millis(500);

    let server = tokio::spawn(async move {
        let (mut reader, mut writer) = accept(&listener).await;
        accept_session(&mut reader, &mut writer).await;

        // Stream frames faster than the budget drains; stop once the write
        // fails or the dispose request shows up.
        let feeder = tokio::spawn(async move {
            loop {
                let mut line = frame_ready(32).to_string();
                line.push('\n');
                if writer.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        expect_dispose(&mut reader).await;
        feeder.abort();
    });

    let config = test_config(port)
        .with_target_frames(1_000_000)
        .with_session_budget(budget);
    let session = Session::new(config).expect("session");
    let report = session.run().await.expect("run");

    assert_eq!(report.stop, StopReason::Budget);
    assert!(report.frames > 0);
    // Bounded overrun: the budget plus at most one in-flight timeout.
    assert!(report.elapsed <= budget + CALL_TIMEOUT + Duration::from_millis(100));

    server.await.expect("server");
}

#[tokio::test]
async fn malformed_message_is_fatal() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (mut reader, mut writer) = accept(&listener).await;
        accept_session(&mut reader, &mut writer).await;

        writer.write_all(b"{broken\n").await.expect("write");
        writer.flush().await.expect("flush");

        // The client aborts without disposing; drain until it disconnects.
        let mut rest = String::new();
        let _ = reader.read_line(&mut rest).await;
    });

    let session = Session::new(test_config(port)).expect("session");
    let result = session.run().await;

    assert!(matches!(result, Err(Error::Protocol { .. })));

    server.await.expect("server");
}

// ============================================================================
// State Machine
// ============================================================================

#[tokio::test]
async fn states_advance_through_the_lifecycle() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (mut reader, mut writer) = accept(&listener).await;
        accept_session(&mut reader, &mut writer).await;
        expect_dispose(&mut reader).await;
    });

    let mut session = Session::new(test_config(port)).expect("session");
    assert_eq!(session.state(), SessionState::Disconnected);

    session.connect().await.expect("connect");
    assert_eq!(session.state(), SessionState::Handshaking);

    session.handshake().await.expect("handshake");
    assert_eq!(session.state(), SessionState::Handshaking);

    session.init_browser().await.expect("init browser");
    assert_eq!(session.state(), SessionState::BrowserActive);

    session.dispose().await.expect("dispose");
    assert_eq!(session.state(), SessionState::Disposed);

    // Disposed is terminal; no step may run again.
    assert!(matches!(
        session.collect_frames().await,
        Err(Error::State { .. })
    ));
    assert!(matches!(session.dispose().await, Err(Error::State { .. })));

    session.close().await;
    server.await.expect("server");
}

#[tokio::test]
async fn connect_twice_is_rejected() {
    let (listener, port) = bind().await;

    let server = tokio::spawn(async move {
        let (_reader, _writer) = accept(&listener).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
    });

    let mut session = Session::new(test_config(port)).expect("session");
    session.connect().await.expect("connect");

    let result = session.connect().await;
    assert!(matches!(result, Err(Error::State { .. })));

    session.close().await;
    server.await.expect("server");
}
