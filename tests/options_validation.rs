//! Invalid call options are rejected before anything leaves the process:
//! no token request, no destination lookup, no backend traffic.

use std::collections::HashMap;

use cf_destination::{
    CallOptions, Client, Config, Environment, Error, HttpVerb, VcapServices,
};
use serde_json::json;
use wiremock::MockServer;

fn local_client() -> Client {
    Client::local().expect("client creation should succeed")
}

fn form() -> HashMap<String, String> {
    let mut form = HashMap::new();
    form.insert("form".to_string(), "data".to_string());
    form
}

async fn assert_rejected_without_traffic(options: CallOptions, expected_field: &str) {
    let server = MockServer::start().await;
    let options = options
        .with_instances("connectivity", "uaa", "destination")
        .with_destination(server.uri());

    let err = local_client()
        .call(options)
        .await
        .expect_err("options should be rejected");
    match err {
        Error::Validation(validation) => {
            assert_eq!(validation.field.as_deref(), Some(expected_field));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let requests = server
        .received_requests()
        .await
        .expect("should be able to read received requests");
    assert!(
        requests.is_empty(),
        "request should not be sent on validation failure"
    );
}

#[tokio::test]
async fn form_data_with_a_plain_post_is_rejected() {
    let options = CallOptions::new(HttpVerb::Post, "/builds").with_form_data(form());
    assert_rejected_without_traffic(options, "form_data").await;
}

#[tokio::test]
async fn post_form_without_form_data_is_rejected() {
    let options = CallOptions::new(HttpVerb::PostForm, "/builds");
    assert_rejected_without_traffic(options, "form_data").await;
}

#[tokio::test]
async fn payload_alongside_form_data_is_rejected() {
    let options = CallOptions::new(HttpVerb::PostForm, "/builds")
        .with_form_data(form())
        .with_payload(json!({ "me": "here" }));
    assert_rejected_without_traffic(options, "payload").await;
}

#[tokio::test]
async fn empty_url_is_rejected() {
    let options = CallOptions::new(HttpVerb::Get, "");
    assert_rejected_without_traffic(options, "url").await;
}

#[test]
fn unknown_verb_tokens_never_parse() {
    for raw in ["BLA", "TRACE", "CONNECT", ""] {
        let err = HttpVerb::parse(raw).expect_err("verb should be rejected");
        match err {
            Error::Validation(validation) => {
                assert_eq!(validation.field.as_deref(), Some("http_verb"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // FromStr goes through the same gate.
    assert!("delete".parse::<HttpVerb>().is_ok());
    assert!("BLA".parse::<HttpVerb>().is_err());
}

#[tokio::test]
async fn cloud_validation_fails_before_any_token_request() {
    let uaa = MockServer::start().await;

    let bindings = json!({
        "xsuaa": [{
            "name": "my-uaa",
            "credentials": {
                "clientid": "app-client",
                "clientsecret": "app-secret",
                "url": uaa.uri()
            }
        }],
        "connectivity": [{
            "name": "my-connectivity",
            "credentials": {
                "clientid": "conn-client",
                "clientsecret": "conn-secret",
                "url": uaa.uri(),
                "onpremise_proxy_host": "127.0.0.1",
                "onpremise_proxy_port": "20003"
            }
        }],
        "destination": [{
            "name": "my-destination",
            "credentials": {
                "clientid": "dest-client",
                "clientsecret": "dest-secret",
                "uri": uaa.uri()
            }
        }]
    });
    let client = Client::new(Config {
        environment: Some(Environment::Cloud),
        vcap_services: Some(
            VcapServices::from_json(&bindings.to_string()).expect("bindings should parse"),
        ),
        ..Default::default()
    })
    .expect("client creation should succeed");

    let options = CallOptions::new(HttpVerb::PostForm, "/builds")
        .with_instances("my-connectivity", "my-uaa", "my-destination")
        .with_destination("ERP");

    let err = client.call(options).await.expect_err("options should be rejected");
    assert!(matches!(err, Error::Validation(_)));

    let requests = uaa
        .received_requests()
        .await
        .expect("should be able to read received requests");
    assert!(
        requests.is_empty(),
        "no grant should be requested on validation failure"
    );
}

#[tokio::test]
async fn unknown_instance_name_fails_before_any_grant() {
    let uaa = MockServer::start().await;

    let bindings = json!({
        "xsuaa": [{
            "name": "my-uaa",
            "credentials": {
                "clientid": "app-client",
                "clientsecret": "app-secret",
                "url": uaa.uri()
            }
        }]
    });
    let client = Client::new(Config {
        environment: Some(Environment::Cloud),
        vcap_services: Some(
            VcapServices::from_json(&bindings.to_string()).expect("bindings should parse"),
        ),
        ..Default::default()
    })
    .expect("client creation should succeed");

    let options = CallOptions::new(HttpVerb::Get, "/builds/1")
        .with_instances("no-such-connectivity", "my-uaa", "my-destination")
        .with_destination("ERP");

    let err = client.call(options).await.expect_err("lookup should fail");
    match err {
        Error::Binding(binding) => assert_eq!(binding.instance, "no-such-connectivity"),
        other => panic!("expected binding error, got {other:?}"),
    }

    let requests = uaa
        .received_requests()
        .await
        .expect("should be able to read received requests");
    assert!(requests.is_empty(), "no grant should be requested");
}
