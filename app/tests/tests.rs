use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use maplit::hashset;
use serde_json::{json, Value};

use grubdash::config::{Config, OrderRules, SeedConfig};
use grubdash::dishes::Dish;
use grubdash::orders::Order;
use grubdash::GrubDash;
use infra::persistence::MemStore;

macro_rules! service {
    ($gd:expr) => {{
        let gd = $gd.clone();
        test::init_service(App::new().configure(move |cfg| gd.configure(cfg))).await
    }};
}

macro_rules! send {
    ($svc:expr, $req:expr) => {{
        let resp = test::call_service(&$svc, $req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let json: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };
        (status, json)
    }};
}

fn grubdash() -> GrubDash {
    env_logger::try_init().unwrap_or_default();
    GrubDash::new(&Config::default()).expect("grubdash")
}

fn spaghetti() -> Value {
    json!({
        "name": "Dolcelatte and chickpea spaghetti",
        "description": "Spaghetti topped with a blend of dolcelatte and fresh chickpeas",
        "price": 19,
        "image_url": "https://images.example.com/spaghetti.jpg"
    })
}

fn order(status: &str) -> Value {
    json!({
        "deliverTo": "123 Main",
        "mobileNumber": "555-1234",
        "status": status,
        "dishes": [
            {
                "id": "d351db2b49b69679504652ea1cf38241",
                "name": "Dolcelatte and chickpea spaghetti",
                "description": "Spaghetti topped with a blend of dolcelatte and fresh chickpeas",
                "image_url": "https://images.example.com/spaghetti.jpg",
                "price": 19,
                "quantity": 2
            }
        ]
    })
}

fn post(uri: &str, data: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .set_json(&json!({ "data": data }))
}

fn put(uri: &str, data: Value) -> test::TestRequest {
    test::TestRequest::put()
        .uri(uri)
        .set_json(&json!({ "data": data }))
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

#[actix_web::test]
async fn should_list_no_dishes_initially() {
    let svc = service!(grubdash());

    let (status, body) = send!(svc, get("/dishes"));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [] }));
}

#[actix_web::test]
async fn should_create_then_read_dish() {
    let svc = service!(grubdash());

    let (status, created) = send!(svc, post("/dishes", spaghetti()));
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id = created["data"]["id"].as_str().expect("id").to_string();
    assert!(!id.is_empty());
    assert_eq!(created["data"]["name"], spaghetti()["name"]);
    assert_eq!(created["data"]["price"].as_f64(), Some(19.0));

    let (status, read) = send!(svc, get(&format!("/dishes/{}", id)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read, created);

    let (_, listed) = send!(svc, get("/dishes"));
    assert_eq!(listed["data"], json!([created["data"].clone()]));
}

#[actix_web::test]
async fn should_name_first_missing_dish_field() {
    let svc = service!(grubdash());
    let mut dish = spaghetti();
    dish["price"] = json!(-3);
    dish["image_url"] = json!("");

    let (status, body) = send!(svc, post("/dishes", dish));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Dish must include price" }));
}

#[actix_web::test]
async fn body_without_data_should_report_first_field() {
    let svc = service!(grubdash());

    let req = test::TestRequest::post()
        .uri("/dishes")
        .set_json(&json!({ "name": "not inside data" }));
    let (status, body) = send!(svc, req);

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Dish must include name");
}

#[actix_web::test]
async fn unreadable_body_should_be_rejected() {
    let svc = service!(grubdash());

    let req = test::TestRequest::post()
        .uri("/orders")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json");
    let (status, body) = send!(svc, req);

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{}", body);
}

#[actix_web::test]
async fn reading_missing_resources_should_be_not_found() {
    let svc = service!(grubdash());

    let (status, body) = send!(svc, get("/dishes/no-such-dish"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Dish does not exist: no-such-dish");

    let (status, body) = send!(svc, get("/orders/no-such-order"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order does not exist: no-such-order");
}

#[actix_web::test]
async fn should_update_dish() {
    let svc = service!(grubdash());
    let (_, created) = send!(svc, post("/dishes", spaghetti()));
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let mut changed = spaghetti();
    changed["id"] = json!(id);
    changed["price"] = json!(21.5);
    let (status, updated) = send!(svc, put(&format!("/dishes/{}", id), changed));

    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["data"]["id"], json!(id));
    assert_eq!(updated["data"]["price"], json!(21.5));

    let (_, read) = send!(svc, get(&format!("/dishes/{}", id)));
    assert_eq!(read, updated);
}

#[actix_web::test]
async fn dish_update_should_reject_mismatched_id() {
    let svc = service!(grubdash());
    let (_, created) = send!(svc, post("/dishes", spaghetti()));
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let mut changed = spaghetti();
    changed["id"] = json!("another-dish");
    let (status, body) = send!(svc, put(&format!("/dishes/{}", id), changed));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("message");
    assert!(message.contains("another-dish"), "{}", message);
    assert!(message.contains(&id), "{}", message);
}

#[actix_web::test]
async fn numeric_body_id_should_not_match_route() {
    let mut stored = spaghetti();
    stored["id"] = json!("17");
    let dish: Dish = serde_json::from_value(stored).expect("dish");
    let gd = GrubDash::with_stores(
        Arc::new(MemStore::with_documents(vec![dish])),
        Arc::new(MemStore::<Order>::new()),
        &OrderRules::default(),
    );
    let svc = service!(gd);

    let mut changed = spaghetti();
    changed["id"] = json!(17);
    let (status, body) = send!(svc, put("/dishes/17", changed));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Dish id does not match route id. Dish: 17, Route: 17"
    );
}

#[actix_web::test]
async fn dishes_cannot_be_deleted() {
    let svc = service!(grubdash());
    let (_, created) = send!(svc, post("/dishes", spaghetti()));
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let req = test::TestRequest::delete().uri(&format!("/dishes/{}", id));
    let (status, body) = send!(svc, req);

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["error"].is_string());
    let (status, _) = send!(svc, get(&format!("/dishes/{}", id)));
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn should_place_order() {
    let svc = service!(grubdash());

    let (status, body) = send!(svc, post("/orders", order("pending")));

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let data = &body["data"];
    assert!(data["id"].as_str().map(|s| !s.is_empty()).unwrap_or(false));
    for field in &["deliverTo", "mobileNumber", "status", "dishes"] {
        assert_eq!(data[*field], order("pending")[*field], "field {}", field);
    }
}

#[actix_web::test]
async fn order_with_bad_dishes_should_be_rejected() {
    let svc = service!(grubdash());
    let cases = vec![
        (json!([]), "Order must include at least one dish"),
        (json!("pasta"), "Order must include at least one dish"),
        (
            json!([{ "name": "soup", "quantity": 1 }, { "name": "bread", "quantity": 0 }]),
            "Dish 1 must have a quantity that is an integer greater than 0",
        ),
        (
            json!([{ "name": "soup", "quantity": 1.5 }]),
            "Dish 0 must have a quantity that is an integer greater than 0",
        ),
        (
            json!([{ "name": "soup", "quantity": 1.5 }, { "name": "bread", "quantity": "0" }]),
            "Dish 1 must have a quantity that is an integer greater than 0",
        ),
    ];

    for (dishes, message) in cases {
        let mut body = order("pending");
        body["dishes"] = dishes.clone();
        let (status, resp) = send!(svc, post("/orders", body));

        assert_eq!(status, StatusCode::BAD_REQUEST, "dishes {}", dishes);
        assert_eq!(resp["error"], message, "dishes {}", dishes);
    }

    let (_, listed) = send!(svc, get("/orders"));
    assert_eq!(listed["data"], json!([]));
}

#[actix_web::test]
async fn order_in_progress_cannot_be_deleted() {
    let svc = service!(grubdash());
    let (_, created) = send!(svc, post("/orders", order("pending")));
    let id = created["data"]["id"].as_str().expect("id").to_string();
    let uri = format!("/orders/{}", id);

    let (status, updated) = send!(svc, put(&uri, order("out-for-delivery")));
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["data"]["status"], "out-for-delivery");
    assert_eq!(updated["data"]["id"], json!(id));

    let (status, body) = send!(svc, test::TestRequest::delete().uri(&uri));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "An order cannot be deleted unless it is pending"
    );

    let (status, read) = send!(svc, get(&uri));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read, updated);
}

#[actix_web::test]
async fn pending_order_can_be_deleted() {
    let svc = service!(grubdash());
    let (_, kept) = send!(svc, post("/orders", order("pending")));
    let (_, created) = send!(svc, post("/orders", order("pending")));
    let uri = format!("/orders/{}", created["data"]["id"].as_str().expect("id"));

    let (status, body) = send!(svc, test::TestRequest::delete().uri(&uri));
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send!(svc, get(&uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = send!(svc, get("/orders"));
    assert_eq!(listed["data"], json!([kept["data"].clone()]));
}

#[actix_web::test]
async fn delivered_is_not_accepted_on_update_by_default() {
    let svc = service!(grubdash());
    let (_, created) = send!(svc, post("/orders", order("pending")));
    let uri = format!("/orders/{}", created["data"]["id"].as_str().expect("id"));

    let (status, body) = send!(svc, put(&uri, order("delivered")));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Order must have a status of pending, preparing, out-for-delivery, delivered"
    );
}

#[actix_web::test]
async fn delivered_can_be_enabled() {
    let rules = OrderRules {
        allow_delivered_status: true,
    };
    let gd = GrubDash::with_stores(
        Arc::new(MemStore::<Dish>::new()),
        Arc::new(MemStore::<Order>::new()),
        &rules,
    );
    let svc = service!(gd);
    let (_, created) = send!(svc, post("/orders", order("pending")));
    let uri = format!("/orders/{}", created["data"]["id"].as_str().expect("id"));

    let (status, body) = send!(svc, put(&uri, order("delivered")));

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "delivered");
}

#[actix_web::test]
async fn repeated_reads_should_agree() {
    let svc = service!(grubdash());
    send!(svc, post("/dishes", spaghetti()));
    send!(svc, post("/orders", order("preparing")));

    for uri in &["/dishes", "/orders"] {
        let (_, first) = send!(svc, get(uri));
        let (_, second) = send!(svc, get(uri));
        assert_eq!(first, second, "{}", uri);
    }
}

#[actix_web::test]
async fn should_serve_seeded_records() {
    let dish: Dish = serde_json::from_value(json!({
        "id": "3c637d011d844ebab1205fef8a7e36ea",
        "name": "Broccoli and special sauce",
        "description": "Broccoli florets with a special ginger sauce",
        "price": 15,
        "image_url": "https://images.example.com/broccoli.jpg"
    }))
    .expect("dish");
    let placed: Order = serde_json::from_value(json!({
        "id": "f6069a542257054114138301947672ba",
        "deliverTo": "1600 Pennsylvania Avenue NW, Washington, DC 20500",
        "mobileNumber": "(202) 456-1111",
        "status": "out-for-delivery",
        "dishes": [{ "id": "3c637d011d844ebab1205fef8a7e36ea", "quantity": 1 }]
    }))
    .expect("order");
    let gd = GrubDash::with_stores(
        Arc::new(MemStore::with_documents(vec![dish])),
        Arc::new(MemStore::with_documents(vec![placed])),
        &OrderRules::default(),
    );
    let svc = service!(gd);

    let (status, body) = send!(svc, get("/dishes/3c637d011d844ebab1205fef8a7e36ea"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Broccoli and special sauce");

    send!(svc, post("/orders", order("pending")));
    let (_, listed) = send!(svc, get("/orders"));
    let statuses = listed["data"]
        .as_array()
        .expect("orders")
        .iter()
        .map(|o| o["status"].as_str().expect("status").to_string())
        .collect::<HashSet<_>>();
    assert_eq!(
        statuses,
        hashset! { "out-for-delivery".to_string(), "pending".to_string() }
    );
}

#[actix_web::test]
async fn should_seed_from_configured_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    let seed = json!({
        "dishes": [{
            "id": "90c3d873684bf381dfab29034b5bba73",
            "name": "Falafel and tahini bagel",
            "description": "A warm bagel filled with falafel and tahini",
            "price": 6,
            "image_url": "https://images.example.com/bagel.jpg"
        }],
        "orders": [{
            "id": "5a887d326e83d3c5bdcbee398ea32aff",
            "deliverTo": "308 Negra Arroyo Lane",
            "mobileNumber": "(505) 143-3369",
            "status": "pending",
            "dishes": [{ "id": "90c3d873684bf381dfab29034b5bba73", "quantity": 2 }]
        }]
    });
    file.write_all(seed.to_string().as_bytes()).expect("write seed");
    let config = Config {
        seed: Some(SeedConfig {
            path: file.path().to_path_buf(),
        }),
        ..Config::default()
    };
    let svc = service!(GrubDash::new(&config).expect("grubdash"));

    let (status, body) = send!(svc, get("/dishes/90c3d873684bf381dfab29034b5bba73"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Falafel and tahini bagel");

    let uri = "/orders/5a887d326e83d3c5bdcbee398ea32aff";
    let (status, body) = send!(svc, get(uri));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dishes"][0]["quantity"], 2);
    let (status, _) = send!(svc, test::TestRequest::delete().uri(uri));
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn unknown_paths_should_be_not_found() {
    let svc = service!(grubdash());

    for uri in &["/", "/menu", "/dishes/a/b"] {
        let (status, body) = send!(svc, get(uri));
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], format!("Path not found: {}", uri));
    }
}
