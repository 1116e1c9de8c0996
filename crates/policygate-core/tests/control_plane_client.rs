//! Integration tests for ControlPlaneClient, OAuthTokenClient and GatewayInvoker.
//!
//! Uses wiremock for HTTP mocking. Tests cover request shapes, status mapping
//! (401/404/409/5xx), pagination, and the teardown sequences.

use std::collections::BTreeMap;
use std::time::Duration;

use policygate_core::{
    AuthorizerConfig, ClientInfo, ControlPlaneClient, ControlPlaneConfig, CustomJwtAuthorizer,
    EnforcementMode, GateError, GatewayInvoker, GatewayService, GatewaySpec, IdentityService,
    OAuthTokenClient, Outcome, PolicyService, PolicySpec, TokenSource,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn create_test_client(mock_server: &MockServer) -> ControlPlaneClient {
    let config = ControlPlaneConfig::default()
        .with_url(mock_server.uri())
        .with_token("control-token")
        .with_timeout_secs(5);
    ControlPlaneClient::new(config).expect("failed to create client")
}

fn client_info(token_endpoint: String) -> ClientInfo {
    ClientInfo {
        client_id: "client-abc".into(),
        client_secret: "secret-xyz".into(),
        token_endpoint,
        scope: Some("PolicyGateway/invoke".into()),
        user_pool_id: Some("us-west-2_pool".into()),
        domain_prefix: None,
        extra: BTreeMap::new(),
    }
}

fn authorizer_config() -> AuthorizerConfig {
    AuthorizerConfig {
        custom_jwt_authorizer: CustomJwtAuthorizer {
            discovery_url: "https://idp.example/.well-known/openid-configuration".into(),
            allowed_clients: vec!["client-abc".into()],
        },
    }
}

#[tokio::test]
async fn test_create_authorizer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/oauth-authorizers"))
        .and(header("authorization", "Bearer control-token"))
        .and(body_partial_json(json!({ "clientName": "PolicyGateway" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authorizerConfig": {
                "customJWTAuthorizer": {
                    "discoveryUrl": "https://idp.example/.well-known/openid-configuration",
                    "allowedClients": ["client-abc"]
                }
            },
            "clientInfo": {
                "client_id": "client-abc",
                "client_secret": "secret-xyz",
                "token_endpoint": "https://idp.example/oauth2/token",
                "scope": "PolicyGateway/invoke",
                "user_pool_id": "us-west-2_pool",
                "domain_prefix": "policygateway-1a2b"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let result = client
        .create_oauth_authorizer("PolicyGateway")
        .await
        .expect("create failed");

    assert_eq!(result.authorizer_config, authorizer_config());
    assert_eq!(result.client_info.client_id, "client-abc");
    assert_eq!(
        result.client_info.domain_prefix.as_deref(),
        Some("policygateway-1a2b")
    );
}

#[tokio::test]
async fn test_create_gateway_disables_semantic_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gateways/"))
        .and(body_partial_json(json!({
            "protocolType": "MCP",
            "authorizerType": "CUSTOM_JWT",
            "authorizerConfiguration": {
                "customJWTAuthorizer": { "allowedClients": ["client-abc"] }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gatewayId": "gw-1",
            "gatewayArn": "arn:aws:bedrock-agentcore:us-west-2:123456789012:gateway/gw-1",
            "gatewayUrl": "https://gw-1.gateway.example/mcp",
            "roleArn": "arn:aws:iam::123456789012:role/gw-role",
            "status": "CREATING"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let gateway = client
        .create_gateway(&GatewaySpec {
            name: None,
            role_arn: None,
            authorizer_config: authorizer_config(),
            semantic_search: false,
        })
        .await
        .expect("create failed");

    assert_eq!(gateway.gateway_id, "gw-1");
    assert_eq!(gateway.gateway_url, "https://gw-1.gateway.example/mcp");

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("protocolConfiguration").is_none());
    assert!(body.get("name").is_none());
}

#[tokio::test]
async fn test_attach_policy_engine_enforce() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/gateways/gw-1/policy-engine"))
        .and(body_partial_json(json!({
            "policyEngineConfiguration": {
                "arn": "arn:pe/pe-1",
                "mode": "ENFORCE"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "gatewayId": "gw-1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    client
        .attach_policy_engine("gw-1", "arn:pe/pe-1", EnforcementMode::Enforce)
        .await
        .expect("attach failed");
}

#[tokio::test]
async fn test_create_policy_sends_cedar_definition() {
    let mock_server = MockServer::start().await;

    let statement = "permit(principal, action, resource);";
    Mock::given(method("POST"))
        .and(path("/policy-engines/pe-1/policies"))
        .and(body_partial_json(json!({
            "name": "refund_limit_policy",
            "definition": { "cedar": { "statement": statement } }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "policyId": "pol-1",
            "name": "refund_limit_policy"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let policy = client
        .create_policy(
            "pe-1",
            &PolicySpec {
                name: "refund_limit_policy".into(),
                description: "Allow refunds under $1000".into(),
                statement: statement.into(),
            },
        )
        .await
        .expect("create failed");

    assert_eq!(policy.policy_id, "pol-1");
}

#[tokio::test]
async fn test_find_policy_engine_follows_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/policy-engines"))
        .and(query_param("nextToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policyEngines": [{
                "policyEngineId": "pe-2",
                "policyEngineArn": "arn:pe/pe-2",
                "name": "RefundPolicyEngine"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/policy-engines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policyEngines": [{
                "policyEngineId": "pe-1",
                "policyEngineArn": "arn:pe/pe-1",
                "name": "OtherEngine"
            }],
            "nextToken": "page-2"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let engine = client
        .find_policy_engine("RefundPolicyEngine")
        .await
        .expect("list failed")
        .expect("expected Some");

    assert_eq!(engine.policy_engine_id, "pe-2");
}

#[tokio::test]
async fn test_find_policy_engine_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/policy-engines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "policyEngines": [] })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let engine = client.find_policy_engine("RefundPolicyEngine").await.unwrap();
    assert!(engine.is_none());
}

#[tokio::test]
async fn test_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/policy-engines"))
        .respond_with(ResponseTemplate::new(403).set_body_string("missing permissions"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let result = client
        .create_policy_engine("RefundPolicyEngine", "desc")
        .await;

    match result {
        Err(GateError::Unauthorized { message }) => assert_eq!(message, "missing permissions"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/policy-engines"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already exists"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let result = client
        .create_policy_engine("RefundPolicyEngine", "desc")
        .await;

    assert!(matches!(result, Err(GateError::Conflict { .. })));
}

#[tokio::test]
async fn test_server_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/functions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let result = policygate_core::FunctionService::create_function(
        &client,
        &policygate_core::FunctionSpec {
            function_name: "RefundTool-1".into(),
            runtime: "python3.13".into(),
            handler: "lambda_function.lambda_handler".into(),
            code: "def lambda_handler(event, context): pass".into(),
            role_arn: "arn:aws:iam::123456789012:role/gw-role".into(),
            description: "Refund tool for policy demo".into(),
        },
    )
    .await;

    match result {
        Err(GateError::Remote { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/policy-engines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    let result = client
        .create_policy_engine("RefundPolicyEngine", "desc")
        .await;

    assert!(matches!(result, Err(GateError::InvalidResponse { .. })));
}

#[tokio::test]
async fn test_cleanup_policy_engine_deletes_policies_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/policy-engines/pe-1/policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "policies": [
                { "policyId": "pol-1", "name": "refund_limit_policy" },
                { "policyId": "pol-2", "name": "other" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    for id in ["pol-1", "pol-2"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/policy-engines/pe-1/policies/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("DELETE"))
        .and(path("/policy-engines/pe-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    client
        .cleanup_policy_engine("pe-1")
        .await
        .expect("cleanup failed");

    let requests = mock_server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.method.as_str(), "DELETE");
    assert_eq!(last.url.path(), "/policy-engines/pe-1");
}

#[tokio::test]
async fn test_cleanup_gateway_removes_targets_gateway_and_authorizer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gateways/gw-1/targets/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "targetId": "t-1", "name": "RefundTarget" }]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/gateways/gw-1/targets/t-1"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/gateways/gw-1/"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/identity/oauth-authorizers/us-west-2_pool"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server).await;
    client
        .cleanup_gateway("gw-1", &client_info("https://unused.example/token".into()))
        .await
        .expect("cleanup failed");

    let paths: Vec<String> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        paths,
        vec![
            "GET /gateways/gw-1/targets/",
            "DELETE /gateways/gw-1/targets/t-1",
            "DELETE /gateways/gw-1/",
            "DELETE /identity/oauth-authorizers/us-west-2_pool",
        ]
    );
}

#[tokio::test]
async fn test_delete_authorizer_without_pool_is_noop() {
    let mock_server = MockServer::start().await;

    let client = create_test_client(&mock_server).await;
    let mut info = client_info("https://unused.example/token".into());
    info.user_pool_id = None;

    client.delete_oauth_authorizer(&info).await.unwrap();
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_token_client_credentials() {
    let mock_server = MockServer::start().await;

    // base64("client-abc:secret-xyz")
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header(
            "authorization",
            "Basic Y2xpZW50LWFiYzpzZWNyZXQteHl6",
        ))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=PolicyGateway%2Finvoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "eyJ.test.token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tokens = OAuthTokenClient::new(Duration::from_secs(5)).unwrap();
    let token = tokens
        .access_token(&client_info(format!("{}/oauth2/token", mock_server.uri())))
        .await
        .expect("token failed");

    assert_eq!(token, "eyJ.test.token");
}

#[tokio::test]
async fn test_token_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_client" })))
        .mount(&mock_server)
        .await;

    let tokens = OAuthTokenClient::new(Duration::from_secs(5)).unwrap();
    let result = tokens
        .access_token(&client_info(format!("{}/oauth2/token", mock_server.uri())))
        .await;

    assert!(matches!(result, Err(GateError::Unauthorized { .. })));
}

#[tokio::test]
async fn test_invoker_reports_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("authorization", "Bearer eyJ.test.token"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {
                "name": "RefundTarget___process_refund",
                "arguments": { "amount": 1500 }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32002, "message": "Tool call not allowed due to policy enforcement" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let invoker = GatewayInvoker::new(Duration::from_secs(5)).unwrap();
    let response = invoker
        .call_tool(
            &format!("{}/mcp", mock_server.uri()),
            "eyJ.test.token",
            "RefundTarget___process_refund",
            json!({ "amount": 1500 }),
        )
        .await
        .expect("call failed");

    assert_eq!(response.status, 200);
    assert_eq!(response.outcome(), Outcome::Denied);
    assert!(response.body_pretty().contains("policy enforcement"));
}

#[tokio::test]
async fn test_invoker_non_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let invoker = GatewayInvoker::new(Duration::from_secs(5)).unwrap();
    let response = invoker
        .call_tool(
            &format!("{}/mcp", mock_server.uri()),
            "t",
            "RefundTarget___process_refund",
            json!({ "amount": 1 }),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 403);
    assert_eq!(response.body, json!("Forbidden"));
    assert_eq!(response.outcome(), Outcome::Denied);
}
