//! Mutual TLS on the HTTPS listener, through a real handshake

mod common;

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType,
    ExtendedKeyUsagePurpose, IsCa, Issuer, KeyPair,
};
use tempfile::TempDir;
use tokio::sync::watch;
use url::Url;

use cdmi_daemon::client::requests::{GetObject, PutContainer};
use cdmi_daemon::client::{CdmiClient, ClientOptions};
use cdmi_daemon::http_server::{self, run_https, tls};
use cdmi_daemon::state::TlsConfig;
use cdmi_daemon::ServiceState;

use crate::common::{service_config, with_user};

/// CA-signed server and client material, plus a client from a CA the server does not trust
struct Pki {
    _dir: TempDir,
    tls: TlsConfig,
    ca: PathBuf,
    client: (PathBuf, PathBuf),
    stranger: (PathBuf, PathBuf),
}

fn name(common_name: &str) -> DistinguishedName {
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, common_name);
    name
}

fn ca(common_name: &str) -> (Certificate, Issuer<'static, KeyPair>) {
    let key = KeyPair::generate().unwrap();
    let mut params = CertificateParams::default();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.distinguished_name = name(common_name);
    let cert = params.self_signed(&key).unwrap();
    (cert, Issuer::new(params, key))
}

fn leaf(
    issuer: &Issuer<'_, KeyPair>,
    common_name: &str,
    sans: Vec<String>,
    usage: ExtendedKeyUsagePurpose,
) -> (Certificate, KeyPair) {
    let key = KeyPair::generate().unwrap();
    let mut params = CertificateParams::new(sans).unwrap();
    params.distinguished_name = name(common_name);
    params.is_ca = IsCa::NoCa;
    params.extended_key_usages = vec![usage];
    let cert = params.signed_by(&key, issuer).unwrap();
    (cert, key)
}

fn write(dir: &Path, file: &str, pem: &str) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, pem).unwrap();
    path
}

fn pki() -> Pki {
    let dir = tempfile::tempdir().unwrap();
    let (ca_cert, issuer) = ca("cdmi test CA");
    let (_, foreign_issuer) = ca("someone else's CA");

    let (server, server_key) = leaf(
        &issuer,
        "cdmi test server",
        vec!["localhost".to_string(), "127.0.0.1".to_string()],
        ExtendedKeyUsagePurpose::ServerAuth,
    );
    let (client, client_key) = leaf(
        &issuer,
        "cdmi test client",
        Vec::new(),
        ExtendedKeyUsagePurpose::ClientAuth,
    );
    let (stranger, stranger_key) = leaf(
        &foreign_issuer,
        "cdmi stranger",
        Vec::new(),
        ExtendedKeyUsagePurpose::ClientAuth,
    );

    let ca = write(dir.path(), "ca.pem", &ca_cert.pem());
    let tls = TlsConfig {
        cert_path: write(dir.path(), "server.pem", &server.pem()),
        key_path: write(dir.path(), "server.key", &server_key.serialize_pem()),
        client_ca_path: ca.clone(),
    };
    let client = (
        write(dir.path(), "client.pem", &client.pem()),
        write(dir.path(), "client.key", &client_key.serialize_pem()),
    );
    let stranger = (
        write(dir.path(), "stranger.pem", &stranger.pem()),
        write(dir.path(), "stranger.key", &stranger_key.serialize_pem()),
    );

    Pki {
        _dir: dir,
        tls,
        ca,
        client,
        stranger,
    }
}

/// Start the HTTPS listener on a free local port. The service has a
///  Basic auth user, which the HTTPS listener must not ask for.
async fn spawn_server(pki: &Pki) -> (Url, watch::Sender<()>) {
    let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr: SocketAddr = free.local_addr().unwrap();
    drop(free);

    let mut config = with_user(service_config(), "test", "test");
    config.https_addr = addr;
    config.tls = Some(pki.tls.clone());
    let state = ServiceState::from_config(&config).await.unwrap();
    let server_config = tls::load_server_config(&pki.tls).unwrap();
    let https_config = http_server::Config::new(addr, config.max_body_bytes, config.log_level);

    let (tx, rx) = watch::channel(());
    tokio::spawn(async move {
        run_https(https_config, server_config, state, rx).await.unwrap();
    });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    (Url::parse(&format!("https://{}", addr)).unwrap(), tx)
}

fn get_root() -> GetObject {
    GetObject {
        target: "/".to_string(),
    }
}

#[tokio::test]
async fn test_trusted_client_certificate_is_enough() {
    let pki = pki();
    let (url, shutdown) = spawn_server(&pki).await;

    let client = CdmiClient::new(
        &url,
        &ClientOptions {
            ca_cert: Some(pki.ca.clone()),
            identity: Some(pki.client.clone()),
            basic: None,
        },
    )
    .unwrap();

    let created = client
        .call(PutContainer {
            path: "/TestContainer".to_string(),
            metadata: None,
        })
        .await
        .unwrap();
    assert_eq!(created["objectName"], "TestContainer/");

    let root = client.call(get_root()).await.unwrap();
    assert_eq!(root["children"][0], "TestContainer/");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_client_without_certificate_is_refused() {
    let pki = pki();
    let (url, shutdown) = spawn_server(&pki).await;

    let client = CdmiClient::new(
        &url,
        &ClientOptions {
            ca_cert: Some(pki.ca.clone()),
            identity: None,
            basic: Some(("test".to_string(), "test".to_string())),
        },
    )
    .unwrap();
    assert!(client.call(get_root()).await.is_err());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_certificate_from_unknown_ca_is_refused() {
    let pki = pki();
    let (url, shutdown) = spawn_server(&pki).await;

    let client = CdmiClient::new(
        &url,
        &ClientOptions {
            ca_cert: Some(pki.ca.clone()),
            identity: Some(pki.stranger.clone()),
            basic: None,
        },
    )
    .unwrap();
    assert!(client.call(get_root()).await.is_err());

    let _ = shutdown.send(());
}
