//! Mock server startup that tolerates sandboxes without loopback sockets.

use wiremock::MockServer;

/// Starts a wiremock server, or returns `None` (and the test returns early)
/// when the environment forbids binding a loopback socket.
pub(crate) async fn start_mock_server_or_skip() -> Option<MockServer> {
    if let Err(error) = std::net::TcpListener::bind("127.0.0.1:0") {
        eprintln!("skipping network test: cannot bind loopback socket ({error})");
        return None;
    }
    Some(MockServer::start().await)
}
