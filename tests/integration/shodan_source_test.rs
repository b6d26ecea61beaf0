// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 主机情报 HTTP 客户端测试
///
/// 使用 wiremock 模拟上游接口，验证响应解析与错误分类
use scanvault::config::settings::IntelligenceSettings;
use scanvault::domain::models::intelligence::RecordType;
use scanvault::domain::services::intelligence_service::{
    ErrorKind, IntelligenceSource, UpstreamError,
};
use scanvault::infrastructure::intelligence::shodan_source::ShodanSource;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn source_for(server: &MockServer) -> ShodanSource {
    let settings = IntelligenceSettings {
        api_key: API_KEY.to_string(),
        base_url: server.uri(),
        min_interval_ms: 0,
        max_in_flight: 1,
        request_timeout_secs: 5,
    };
    ShodanSource::new(&settings).expect("client should build")
}

#[tokio::test]
async fn test_dns_entries_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns/domain/example.com"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domain": "example.com",
            "data": [
                {"subdomain": "www", "type": "A", "value": "1.2.3.4", "ports": [80, 443]},
                {"subdomain": "", "type": "MX", "value": "mail.example.com"},
                {"subdomain": "blog", "type": "CNAME", "value": "hosting.example.net"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries = source_for(&server)
        .fetch_dns_entries("example.com")
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].record_type, RecordType::A);
    assert_eq!(entries[0].subdomain, "www");
    assert_eq!(entries[0].value.as_deref(), Some("1.2.3.4"));
    assert_eq!(entries[0].ports, vec![80, 443]);
    assert_eq!(entries[1].record_type, RecordType::Other("MX".to_string()));
    assert!(entries[1].ports.is_empty());
    assert_eq!(entries[2].record_type, RecordType::Cname);
}

#[tokio::test]
async fn test_unknown_domain_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns/domain/bad-domain"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "No information available"})),
        )
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_dns_entries("bad-domain")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        UpstreamError::InvalidDomain("bad-domain: No information available".to_string())
    );
    assert_eq!(err.kind(), ErrorKind::Permanent);
}

#[tokio::test]
async fn test_server_errors_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns/domain/example.com"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_dns_entries("example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::Server { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_rate_limit_response_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_dns_entries("example.com")
        .await
        .unwrap_err();

    assert_eq!(err, UpstreamError::RateLimited);
}

#[tokio::test]
async fn test_exhausted_credits_are_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(
            json!({"error": "Access denied (403 Forbidden). Insufficient query credits"}),
        ))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_dns_entries("example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::QuotaExhausted(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns/domain/example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_dns_entries("example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_host_details_vulnerabilities() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shodan/host/1.2.3.4"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip_str": "1.2.3.4",
            "ports": [80, 443],
            "vulns": ["CVE-2021-44228", "CVE-2014-0160"]
        })))
        .mount(&server)
        .await;

    let details = source_for(&server)
        .fetch_host_details("1.2.3.4")
        .await
        .unwrap()
        .expect("host should be known");

    assert_eq!(details.vulns, vec!["CVE-2021-44228", "CVE-2014-0160"]);
}

#[tokio::test]
async fn test_host_without_vulns_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shodan/host/5.6.7.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ip_str": "5.6.7.8"})))
        .mount(&server)
        .await;

    let details = source_for(&server)
        .fetch_host_details("5.6.7.8")
        .await
        .unwrap();

    assert_eq!(details.map(|d| d.vulns), Some(Vec::new()));
}

#[tokio::test]
async fn test_unknown_host_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shodan/host/9.9.9.9"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "No information available for that IP."})),
        )
        .mount(&server)
        .await;

    let details = source_for(&server)
        .fetch_host_details("9.9.9.9")
        .await
        .unwrap();

    assert!(details.is_none());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let settings = IntelligenceSettings {
        api_key: API_KEY.to_string(),
        base_url: "http://127.0.0.1:1".to_string(),
        min_interval_ms: 0,
        max_in_flight: 1,
        request_timeout_secs: 2,
    };
    let source = ShodanSource::new(&settings).unwrap();

    let err = source.fetch_dns_entries("example.com").await.unwrap_err();

    assert!(err.is_transient());
    assert!(!err.to_string().contains(API_KEY));
}
