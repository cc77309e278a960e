use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fdb::client::FluidClient;
use fdb::config::{Config, Credentials};
use fdb::fluiddb::FluidDb;
use fdb::paths::{PathStyle, TagPaths};
use fdb::perms::Preset;
use fdb::value::{TagValue, PRIMITIVE_CONTENT_TYPE};
use fdb::CliError;

fn connect(uri: &str) -> FluidDb {
    let config = Config {
        host: uri.to_string(),
        ..Default::default()
    };
    let credentials = Credentials::new("njr", "secret");
    let client = FluidClient::new(&config, &credentials).unwrap();
    FluidDb::new(client, TagPaths::new("njr", PathStyle::Unix))
}

fn object_json(id: &str) -> serde_json::Value {
    json!({ "id": id, "URI": format!("http://fluiddb.example.com/objects/{id}") })
}

#[tokio::test]
async fn test_create_object_with_about() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/objects"))
        .and(header("authorization", "Basic bmpyOnNlY3JldA=="))
        .and(body_json(json!({ "about": "DADGAD" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_json("ca0f")))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let object = tokio::task::spawn_blocking(move || connect(&uri).create_object(Some("DADGAD")))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(object.id, "ca0f");
}

#[tokio::test]
async fn test_tagging_creates_a_missing_tag() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/objects/ca0f/njr/rating"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/objects/ca0f/njr/rating"))
        .and(header("content-type", PRIMITIVE_CONTENT_TYPE))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tags/njr"))
        .and(body_json(json!({ "name": "rating", "description": "", "indexed": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_json("t1")))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        connect(&uri).tag_object_by_id("ca0f", "rating", Some(&TagValue::Int(10)), true)
    })
    .await
    .unwrap()
    .unwrap();
}

#[tokio::test]
async fn test_untag_missing_ok() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/objects/ca0f/njr/rating"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (tolerant, strict) = tokio::task::spawn_blocking(move || {
        let db = connect(&uri);
        (
            db.untag_object_by_id("ca0f", "rating", true),
            db.untag_object_by_id("ca0f", "rating", false),
        )
    })
    .await
    .unwrap();

    assert!(tolerant.is_ok());
    assert_eq!(strict.unwrap_err().status(), Some(404));
}

#[tokio::test]
async fn test_tag_values_primitive_opaque_and_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/objects/ca0f/njr/rating"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("10", PRIMITIVE_CONTENT_TYPE))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/objects/ca0f/njr/photo"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/objects/ca0f/njr/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (rating, photo, missing) = tokio::task::spawn_blocking(move || {
        let db = connect(&uri);
        (
            db.get_tag_value_by_id("ca0f", "rating").unwrap(),
            db.get_tag_value_by_id("ca0f", "/njr/photo").unwrap(),
            db.get_tag_value_by_id("ca0f", "missing").unwrap(),
        )
    })
    .await
    .unwrap();

    assert_eq!(rating, Some(TagValue::Int(10)));
    match photo {
        Some(TagValue::Opaque { content_type, data }) => {
            assert_eq!(content_type, "image/png");
            assert_eq!(data.len(), 4);
        }
        other => panic!("expected opaque value, got {other:?}"),
    }
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_query_ids_and_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/objects"))
        .and(query_param("query", "has njr/rating"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ids": ["a", "b"] })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/objects"))
        .and(query_param("query", "has"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (ids, bad) = tokio::task::spawn_blocking(move || {
        let db = connect(&uri);
        (db.query("has njr/rating"), db.query("has"))
    })
    .await
    .unwrap();

    assert_eq!(ids.unwrap(), vec!["a", "b"]);
    assert!(matches!(bad, Err(CliError::QueryFailed(_))));
}

#[tokio::test]
async fn test_values_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/values"))
        .and(query_param("query", "has njr/rating"))
        .and(query_param("tag", "njr/rating"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": { "id": { "ca0f": { "njr/rating": { "value": 10 } } } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/values"))
        .and(query_param("query", "has njr/rating"))
        .and(body_json(json!({ "njr/seen": { "value": true } })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let rows = tokio::task::spawn_blocking(move || {
        let db = connect(&uri);
        db.tag_by_query("has njr/rating", &[("seen".to_string(), Some(TagValue::Bool(true)))])
            .unwrap();
        db.get_values("has njr/rating", &["rating"]).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "ca0f");
    assert_eq!(rows[0].values.get("njr/rating"), Some(&TagValue::Int(10)));
}

#[tokio::test]
async fn test_create_namespace_with_parents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/namespaces/njr/music"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/namespaces/njr/music"))
        .and(body_json(json!({ "name": "folk", "description": "Folk tunes" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_json("ns2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/namespaces/njr"))
        .and(body_json(json!({ "name": "music", "description": "" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_json("ns1")))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let id = tokio::task::spawn_blocking(move || {
        connect(&uri).create_namespace("music/folk", "Folk tunes", true)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(id, "ns2");
}

#[tokio::test]
async fn test_new_tag_creates_its_missing_namespace() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tags/njr/music"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tags/njr/music"))
        .and(body_json(json!({ "name": "rating", "description": "", "indexed": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_json("t2")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/namespaces/njr"))
        .and(body_json(json!({ "name": "music", "description": "" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_json("ns1")))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let id = tokio::task::spawn_blocking(move || {
        connect(&uri).create_abstract_tag("music/rating", None, true)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(id, "t2");
}

#[tokio::test]
async fn test_object_tags_by_about() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/objects"))
        .and(body_json(json!({ "about": "DADGAD" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_json("ca0f")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/objects/ca0f"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tagPaths": ["fluiddb/about", "njr/rating"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let tags = tokio::task::spawn_blocking(move || connect(&uri).get_object_tags_by_about("DADGAD"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tags, vec!["/fluiddb/about", "/njr/rating"]);
}

#[tokio::test]
async fn test_describe_namespace() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/namespaces/njr/music"))
        .and(query_param("returnDescription", "true"))
        .and(query_param("returnNamespaces", "true"))
        .and(query_param("returnTags", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ns1",
            "description": "Tunes and tunings",
            "namespaceNames": ["folk"],
            "tagNames": ["rating", "tuning"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let info = tokio::task::spawn_blocking(move || connect(&uri).describe_namespace("music"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(info.id.as_deref(), Some("ns1"));
    assert_eq!(info.description.as_deref(), Some("Tunes and tunings"));
    assert_eq!(info.namespace_names, vec!["folk"]);
    assert_eq!(info.tag_names, vec!["rating", "tuning"]);
}

#[tokio::test]
async fn test_primitive_value_with_charset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/objects/ca0f/njr/tuning"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "\"DADGAD\"",
            &*format!("{PRIMITIVE_CONTENT_TYPE}; charset=utf-8"),
        ))
        .mount(&server)
        .await;

    let uri = server.uri();
    let tuning = tokio::task::spawn_blocking(move || connect(&uri).get_tag_value_by_id("ca0f", "tuning"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(tuning, Some(TagValue::Str("DADGAD".to_string())));
}

#[tokio::test]
async fn test_recursive_removal_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/namespaces/njr/music"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "namespaceNames": ["folk"], "tagNames": ["rating"]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/namespaces/njr/music/folk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "namespaceNames": [], "tagNames": ["tuning"]
        })))
        .mount(&server)
        .await;

    for tag in ["/tags/njr/music/rating", "/tags/njr/music/folk/tuning"] {
        Mock::given(method("DELETE"))
            .and(path(tag))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }
    for namespace in ["/namespaces/njr/music/folk", "/namespaces/njr/music"] {
        Mock::given(method("DELETE"))
            .and(path(namespace))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let uri = server.uri();
    tokio::task::spawn_blocking(move || connect(&uri).remove_namespace_recursive("music"))
        .await
        .unwrap()
        .unwrap();

    let deletes: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.method.as_str() == "DELETE")
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(deletes.last().map(String::as_str), Some("/namespaces/njr/music"));
    assert!(deletes[..2].iter().all(|path| path.starts_with("/tags/")));
}

#[tokio::test]
async fn test_tag_permission_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/permissions/tag-values/njr/rating"))
        .and(query_param("action", "read"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "policy": "open", "exceptions": [] })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/permissions/(tags|tag-values)/njr/rating$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "policy": "closed", "exceptions": ["njr"] })),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let summary = tokio::task::spawn_blocking(move || connect(&uri).tag_perms_string("rating"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary, "trwcr--r--");
}

#[tokio::test]
async fn test_lock_preset_closes_write_actions() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path_regex("^/permissions/(tags|tag-values)/njr/rating$"))
        .and(body_json(json!({ "policy": "closed", "exceptions": [] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(4)
        .mount(&server)
        .await;

    let uri = server.uri();
    let (locked, missing_group) = tokio::task::spawn_blocking(move || {
        let db = connect(&uri);
        (
            db.apply_preset("rating", false, Preset::Lock, &[]),
            db.apply_preset("rating", false, Preset::Group, &[]),
        )
    })
    .await
    .unwrap();

    assert!(locked.is_ok());
    assert!(matches!(missing_group, Err(CliError::MissingArgument(_))));
}
