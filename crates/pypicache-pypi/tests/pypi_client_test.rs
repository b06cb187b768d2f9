//! Contract tests for `PyPiClient` against a simulated upstream index.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/pypi` | `get_versions_*` |
//! | GET    | `/pypi/{package}/{version}/json` | `get_urls_*` |
//! | GET    | `/packages/{pyver}/{first}/{package}/{filename}` | `fetch_file_*` |
//! | GET    | `/simple/{package}/` | `simple_page_*` |

use pypicache_core::{PackageCacheError, PackageName, PackageType};
use pypicache_pypi::{PackageIndex, PyPiClient, PyPiConfig};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> PyPiClient {
    let config = PyPiConfig::from_url_str(&mock_server.uri())
        .unwrap()
        .with_timeout_secs(5);
    PyPiClient::new(config).unwrap()
}

fn pkg(name: &str) -> PackageName {
    PackageName::new(name).unwrap()
}

// ── XML-RPC package_releases ─────────────────────────────────────────

#[tokio::test]
async fn get_versions_posts_xmlrpc_and_preserves_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pypi"))
        .and(header("content-type", "text/xml"))
        .and(body_string_contains("<methodName>package_releases</methodName>"))
        .and(body_string_contains("<string>six</string>"))
        .and(body_string_contains("<boolean>1</boolean>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<?xml version='1.0'?><methodResponse><params><param><value><array><data>\
             <value><string>1.9.0</string></value><value><string>1.10.0</string></value>\
             </data></array></value></param></params></methodResponse>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let versions = client.get_versions(&pkg("six"), true).await.unwrap();
    assert_eq!(versions, vec!["1.9.0", "1.10.0"]);
}

#[tokio::test]
async fn get_versions_fault_is_remote_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pypi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<methodResponse><fault><value><struct>\
             <member><name>faultString</name><value><string>boom</string></value></member>\
             </struct></value></fault></methodResponse>",
        ))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.get_versions(&pkg("six"), false).await.unwrap_err();
    match err {
        PackageCacheError::Remote { message, .. } => assert!(message.contains("boom")),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn get_versions_server_error_is_remote_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pypi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.get_versions(&pkg("six"), false).await.unwrap_err();
    assert!(matches!(err, PackageCacheError::Remote { .. }), "got {err:?}");
}

// ── JSON API ─────────────────────────────────────────────────────────

#[tokio::test]
async fn get_urls_returns_url_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pypi/requests/2.0.1/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": {"name": "requests"},
            "urls": [
                {
                    "filename": "requests-2.0.1-py2.py3-none-any.whl",
                    "packagetype": "bdist_wheel",
                    "md5_digest": "aaa",
                    "url": "https://files.example/requests-2.0.1-py2.py3-none-any.whl"
                },
                {
                    "filename": "requests-2.0.1.tar.gz",
                    "packagetype": "sdist",
                    "md5_digest": "bbb",
                    "url": "https://files.example/requests-2.0.1.tar.gz"
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let urls = client.get_urls(&pkg("requests"), "2.0.1").await.unwrap();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0].packagetype, PackageType::BdistWheel);
    assert!(urls[1].is_sdist());
    assert_eq!(urls[1].md5.as_deref(), Some("bbb"));
}

#[tokio::test]
async fn get_urls_404_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pypi/missingpkg/9.9/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.get_urls(&pkg("missingpkg"), "9.9").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn get_urls_500_is_remote_with_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pypi/six/1.0/json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    match client.get_urls(&pkg("six"), "1.0").await.unwrap_err() {
        PackageCacheError::Remote { endpoint, message } => {
            assert!(endpoint.ends_with("/pypi/six/1.0/json"));
            assert!(message.contains("500"));
            assert!(message.contains("upstream down"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn get_urls_malformed_body_is_remote() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pypi/six/1.0/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.get_urls(&pkg("six"), "1.0").await.unwrap_err();
    assert!(matches!(err, PackageCacheError::Remote { .. }), "got {err:?}");
}

#[tokio::test]
async fn get_urls_encodes_reserved_characters_in_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pypi/six/1.0%23dev%3Fx/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"urls": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let urls = client.get_urls(&pkg("six"), "1.0#dev?x").await.unwrap();
    assert!(urls.is_empty());
}

// ── File downloads ───────────────────────────────────────────────────

#[tokio::test]
async fn fetch_file_uses_source_path_without_python_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages/source/D/Django/Django-1.0.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"sdist bytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let data = client
        .fetch_file(&pkg("Django"), "Django-1.0.tar.gz", None)
        .await
        .unwrap();
    assert_eq!(&data[..], b"sdist bytes");
}

#[tokio::test]
async fn fetch_file_uses_python_version_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages/2.7/s/six/six-1.0-py2.7.egg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"egg".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let data = client
        .fetch_file(&pkg("six"), "six-1.0-py2.7.egg", Some("2.7"))
        .await
        .unwrap();
    assert_eq!(&data[..], b"egg");
}

#[tokio::test]
async fn fetch_file_404_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages/source/z/zzzdoesnotexist/zzzdoesnotexist-1.0.tar.gz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .fetch_file(&pkg("zzzdoesnotexist"), "zzzdoesnotexist-1.0.tar.gz", None)
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn fetch_file_unreachable_index_is_remote() {
    // Nothing listens on port 9 on loopback.
    let config = PyPiConfig::from_url_str("http://127.0.0.1:9/")
        .unwrap()
        .with_timeout_secs(2);
    let client = PyPiClient::new(config).unwrap();
    let err = client
        .fetch_file(&pkg("six"), "six-1.0.tar.gz", None)
        .await
        .unwrap_err();
    assert!(matches!(err, PackageCacheError::Remote { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_file_encodes_filename() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/packages/source/s/six/six%201.0%23.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"exact".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let content = client.fetch_file(&pkg("six"), "six 1.0#.tar.gz", None).await.unwrap();
    assert_eq!(&content[..], b"exact");
}

// ── Simple index ─────────────────────────────────────────────────────

#[tokio::test]
async fn simple_page_is_proxied_verbatim() {
    let mock_server = MockServer::start().await;
    let page = "<html><body><a href=\"../../packages/source/s/six/six-1.0.tar.gz\">six-1.0.tar.gz</a></body></html>";

    Mock::given(method("GET"))
        .and(path("/simple/six/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert_eq!(client.simple_page(&pkg("six")).await.unwrap(), page);
}

#[tokio::test]
async fn simple_page_404_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/nope/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(client.simple_page(&pkg("nope")).await.unwrap_err().is_not_found());
}
