//! Integration tests for the WebSocket transport.
//!
//! A real listener and a dialed connection exchange frames over loopback,
//! so both halves of `WebSocketConnection` are exercised.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use roomgate_transport::{
        Connection, PendingConnection, Transport, TransportError,
        WebSocketConnection, WebSocketTransport,
    };

    #[tokio::test]
    async fn test_websocket_dial_and_exchange_both_directions() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound addr").to_string();

        let server = tokio::spawn(async move {
            let conn = transport
                .accept()
                .await
                .expect("should accept")
                .upgrade()
                .await
                .expect("handshake");
            let data = conn.recv().await.expect("recv").expect("message");
            conn.send(&data).await.expect("echo");
            conn
        });

        let client = WebSocketConnection::connect(&addr)
            .await
            .expect("should dial");
        client.send(b"create room").await.expect("send");
        let echoed = client.recv().await.expect("recv").expect("message");
        assert_eq!(echoed, b"create room");

        let server_conn = server.await.expect("task should complete");
        assert_ne!(server_conn.id(), client.id());
    }

    #[tokio::test]
    async fn test_websocket_recv_after_peer_close_returns_none() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound addr").to_string();

        let server = tokio::spawn(async move {
            let conn = transport
                .accept()
                .await
                .expect("should accept")
                .upgrade()
                .await
                .expect("handshake");
            conn.recv().await.expect("clean close")
        });

        let client = WebSocketConnection::connect(&addr)
            .await
            .expect("should dial");
        client.close().await.expect("close");

        let received = server.await.expect("task should complete");
        assert!(received.is_none());
    }

    #[tokio::test]
    async fn test_websocket_connect_to_closed_port_fails() {
        // Bind then drop to obtain a port nobody listens on.
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound addr").to_string();
        drop(transport);

        let result = WebSocketConnection::connect(&addr).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending_is_not_blocked() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound addr").to_string();

        let accepting = tokio::spawn(async move {
            transport.accept().await.expect("should accept").upgrade().await
        });
        let client = WebSocketConnection::connect(&addr)
            .await
            .expect("should dial");
        let server_conn = Arc::new(
            accepting
                .await
                .expect("task should complete")
                .expect("handshake"),
        );

        let parked = Arc::clone(&server_conn);
        let reader = tokio::spawn(async move { parked.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), server_conn.send(b"push"))
            .await
            .expect("send must not wait for the pending recv")
            .expect("send");
        let pushed = client.recv().await.expect("recv").expect("message");
        assert_eq!(pushed, b"push");

        client.send(b"reply").await.expect("send");
        let received = reader.await.expect("task").expect("recv");
        assert_eq!(received.as_deref(), Some(&b"reply"[..]));
    }

    #[tokio::test]
    async fn test_websocket_bind_invalid_addr_reports_addr() {
        let err = match WebSocketTransport::bind("not-an-address").await {
            Ok(_) => panic!("bind should fail"),
            Err(e) => e,
        };
        assert!(matches!(err, TransportError::Bind { .. }));
        assert!(err.to_string().contains("not-an-address"));
    }

    #[tokio::test]
    async fn test_websocket_accept_returns_before_peer_handshakes() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound addr").to_string();

        // Opens TCP and never sends the upgrade request.
        let silent = tokio::net::TcpStream::connect(&addr)
            .await
            .expect("tcp connect");
        let pending = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("accept must not wait for the handshake")
            .expect("should accept");
        assert_eq!(pending.peer_addr(), silent.local_addr().expect("local addr"));

        let accepting = tokio::spawn(async move {
            transport.accept().await.expect("should accept").upgrade().await
        });
        let client = WebSocketConnection::connect(&addr)
            .await
            .expect("should dial");
        let server_conn = accepting
            .await
            .expect("task should complete")
            .expect("handshake");
        client.send(b"hello").await.expect("send");
        assert_eq!(
            server_conn.recv().await.expect("recv").as_deref(),
            Some(&b"hello"[..])
        );
        drop(pending);
    }
}
