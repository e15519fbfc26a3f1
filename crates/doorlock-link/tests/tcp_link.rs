//! Integration tests for the TCP link transport.

use doorlock_core::{Command, Credential, Error, Outcome};
use doorlock_link::{Link, TcpLink, TcpLinkListener};

async fn connected_pair() -> (TcpLink, TcpLink) {
    let listener = TcpLinkListener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let (accepted, connected) =
        tokio::join!(listener.accept(), TcpLink::connect(addr));

    (accepted.unwrap(), connected.unwrap())
}

#[tokio::test]
async fn test_byte_round_trip() {
    let (mut local, mut remote) = connected_pair().await;

    remote.send_byte(b'+').await.unwrap();
    assert_eq!(local.recv_byte().await.unwrap(), b'+');

    local.send_byte(1).await.unwrap();
    assert_eq!(remote.recv_byte().await.unwrap(), 1);
}

#[tokio::test]
async fn test_authentication_exchange_over_tcp() {
    let (mut local, mut remote) = connected_pair().await;

    let credential = Credential::new([3, 1, 4, 1, 5]).unwrap();

    remote.send_command(Command::OpenDoor).await.unwrap();
    remote.send_credential(&credential).await.unwrap();

    assert_eq!(
        Command::from_byte(local.recv_byte().await.unwrap()).unwrap(),
        Command::OpenDoor
    );
    assert_eq!(local.recv_credential().await.unwrap(), credential);

    local.send_outcome(Outcome::Match).await.unwrap();
    assert_eq!(remote.recv_outcome().await.unwrap(), Outcome::Match);
}

#[tokio::test]
async fn test_peer_close_surfaces_as_link_closed() {
    let (local, mut remote) = connected_pair().await;

    drop(local);

    let result = remote.recv_byte().await;
    assert!(matches!(result, Err(Error::LinkClosed)));
}

#[tokio::test]
async fn test_listener_reports_bound_addr() {
    let listener = TcpLinkListener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    assert_ne!(addr.port(), 0);
}
