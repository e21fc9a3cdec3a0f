//! API integration tests
//!
//! Require a running server with a bootstrap superuser `admin` / `admin`:
//! `LOCALLIBRARY__BOOTSTRAP__SUPERUSER_USERNAME=admin LOCALLIBRARY__BOOTSTRAP__SUPERUSER_PASSWORD=admin`

use chrono::{Duration, Local};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8000";

/// Client keeping the session cookie and reporting redirects as-is
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

async fn login(client: &Client, username: &str, password: &str) -> Response {
    client
        .post(format!("{}/accounts/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request")
}

async fn librarian() -> Client {
    let client = client();
    let response = login(&client, "admin", "admin").await;
    assert_eq!(response.status(), StatusCode::OK);
    client
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .expect("No location header")
        .to_str()
        .expect("Location is not text")
        .to_string()
}

async fn post(client: &Client, path: &str, body: Value) -> Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn get(client: &Client, path: &str) -> Response {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
}

async fn get_json(client: &Client, path: &str) -> Value {
    let response = get(client, path).await;
    assert_eq!(response.status(), StatusCode::OK, "{}", path);
    response.json().await.expect("Failed to parse response")
}

/// Items of every page of a paginated list
async fn all_items(client: &Client, path: &str) -> Vec<Value> {
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let body = get_json(client, &format!("{}?page={}", path, page)).await;
        items.extend(body["items"].as_array().expect("Items").iter().cloned());
        if page >= body["num_pages"].as_i64().expect("Page count") {
            return items;
        }
        page += 1;
    }
}

/// Ids from `items`, restricted to `wanted`, in list order
fn ids_among(items: &[Value], wanted: &[String]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item["id"].as_str())
        .filter(|id| wanted.iter().any(|w| w == id))
        .map(str::to_string)
        .collect()
}

/// Trailing id of a redirect target such as `/books/12`
fn created_id(response: &Response) -> String {
    location(response)
        .rsplit('/')
        .next()
        .expect("Empty location")
        .to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = get(&client(), "/health").await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let response = login(&client(), "admin", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_login_and_current_user() {
    let client = librarian().await;

    let response = get(&client, "/accounts/me").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
    assert_eq!(body["is_superuser"], true);

    let response = post(&client, "/accounts/logout", json!({})).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = get(&client, "/accounts/me").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore]
async fn test_anonymous_is_redirected_to_login() {
    let response = get(&client(), "/mybooks").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login?next=%2Fmybooks");
}

#[tokio::test]
#[ignore]
async fn test_home_counts_visits() {
    let client = client();

    let first: Value = get(&client, "/").await.json().await.expect("Failed to parse response");
    let second: Value = get(&client, "/").await.json().await.expect("Failed to parse response");

    assert_eq!(first["num_visits"], 0);
    assert_eq!(second["num_visits"], 1);
    assert!(second["num_books"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_out_of_range_page_is_not_found() {
    let response = get(&client(), "/books?page=100000").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&client(), "/books?page=abc").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_invalid_author_form_is_redisplayed() {
    let client = librarian().await;

    let response = post(
        &client,
        "/authors/create",
        json!({
            "first_name": "",
            "last_name": "Le Guin",
            "date_of_birth": "1929-10-21",
            "date_of_death": "1900-01-01"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["form"]["last_name"], "Le Guin");
    assert!(body["errors"]["first_name"].is_array());
    assert!(body["errors"]["date_of_death"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_catalog_loan_and_renewal_workflow() {
    let client = librarian().await;
    let me: Value = get(&client, "/accounts/me").await.json().await.expect("Failed to parse response");
    let today = Local::now().date_naive();
    let suffix = Uuid::new_v4().simple().to_string();

    // Genre
    let response = post(&client, "/genres/create", json!({ "name": format!("Fantasy {}", suffix) })).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let genre_id: i64 = created_id(&response).parse().expect("Genre id");

    // Author
    let response = post(
        &client,
        "/authors/create",
        json!({ "first_name": "Ursula", "last_name": format!("Le Guin {}", suffix) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let author_id: i64 = created_id(&response).parse().expect("Author id");

    // Book
    let isbn = format!("{:013}", Uuid::new_v4().as_u128() % 10_000_000_000_000);
    let response = post(
        &client,
        "/books/create",
        json!({
            "title": "A Wizard of Earthsea",
            "author": author_id,
            "summary": "A young mage on Gont.",
            "isbn": isbn,
            "genre": [genre_id]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let book_path = location(&response);
    let book_id: i64 = created_id(&response).parse().expect("Book id");

    // Copy on loan to the librarian
    let response = post(
        &client,
        "/book-instances/create",
        json!({
            "book": book_id,
            "imprint": "Parnassus, 1968",
            "due_back": (today + Duration::days(3)).to_string(),
            "borrower": me["id"],
            "status": "o"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), book_path);

    let book: Value = get(&client, &book_path).await.json().await.expect("Failed to parse response");
    assert_eq!(book["genres"][0]["id"], genre_id);
    let instance_id = book["copies"][0]["id"].as_str().expect("Copy id").to_string();

    // Deleting a book with copies is refused
    let response = post(&client, &format!("/books/{}/delete", book_id), json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Shows up in my borrowed books
    let mine = all_items(&client, "/mybooks").await;
    assert_eq!(ids_among(&mine, &[instance_id.clone()]), vec![instance_id.clone()]);

    // Renewal form proposes three weeks ahead
    let renew_path = format!("/book-instance/{}/renew", instance_id);
    let form: Value = get(&client, &renew_path).await.json().await.expect("Failed to parse response");
    assert_eq!(form["renewal_date"], (today + Duration::weeks(3)).to_string());

    // Too far ahead: redisplayed, nothing written
    let too_far = (today + Duration::days(29)).to_string();
    let response = post(&client, &renew_path, json!({ "renewal_date": too_far })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["errors"]["renewal_date"][0],
        "Invalid date - renewal more than 4 weeks ahead"
    );
    assert_eq!(body["form"]["renewal_date"], too_far);

    let copy = get_json(&client, &format!("/book-instances/{}", instance_id)).await;
    assert_eq!(copy["due_back"], (today + Duration::days(3)).to_string());

    // Not a date at all: same form, still nothing written
    let response = post(&client, &renew_path, json!({ "renewal_date": 5 })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["errors"]["renewal_date"][0], "Enter a valid date.");

    let copy = get_json(&client, &format!("/book-instances/{}", instance_id)).await;
    assert_eq!(copy["due_back"], (today + Duration::days(3)).to_string());

    // Valid: redirect to all borrowed, due date updated
    let new_due = (today + Duration::days(14)).to_string();
    let response = post(&client, &renew_path, json!({ "renewal_date": new_due })).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/borrowed");

    let copy: Value = get(&client, &format!("/book-instances/{}", instance_id))
        .await
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(copy["due_back"], new_due);
    assert_eq!(copy["status"], "o");

    // Clean up
    for path in [
        format!("/book-instances/{}/delete", instance_id),
        format!("/books/{}/delete", book_id),
        format!("/authors/{}/delete", author_id),
        format!("/genres/{}/delete", genre_id),
    ] {
        let response = post(&client, &path, json!({})).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_anonymous_cannot_create() {
    let response = post(&client(), "/genres/create", json!({ "name": "Poetry" })).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login?next=%2Fgenres%2Fcreate");
}

#[tokio::test]
#[ignore]
async fn test_borrowed_views_filter_and_order_by_due_date() {
    let client = librarian().await;
    let me = get_json(&client, "/accounts/me").await;
    let today = Local::now().date_naive();
    let suffix = Uuid::new_v4().simple().to_string();

    let response = post(
        &client,
        "/authors/create",
        json!({ "first_name": "Terry", "last_name": format!("Pratchett {}", suffix) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let author_id: i64 = created_id(&response).parse().expect("Author id");

    let response = post(&client, "/genres/create", json!({ "name": format!("Satire {}", suffix) })).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let genre_id: i64 = created_id(&response).parse().expect("Genre id");

    let isbn = format!("{:013}", Uuid::new_v4().as_u128() % 10_000_000_000_000);
    let response = post(
        &client,
        "/books/create",
        json!({
            "title": "Guards! Guards!",
            "author": author_id,
            "summary": "The Night Watch meets a dragon.",
            "isbn": isbn,
            "genre": [genre_id]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let book_id: i64 = created_id(&response).parse().expect("Book id");

    // (due in days, borrowed by me, status)
    let copies = [
        (10, true, "o"),
        (2, true, "o"),
        (5, false, "o"),
        (1, true, "m"),
        (-1, true, "o"),
    ];
    for (days, mine, status) in copies {
        let borrower = if mine { me["id"].clone() } else { Value::Null };
        let response = post(
            &client,
            "/book-instances/create",
            json!({
                "book": book_id,
                "imprint": format!("Gollancz, due +{}", days),
                "due_back": (today + Duration::days(days)).to_string(),
                "borrower": borrower,
                "status": status
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let book = get_json(&client, &format!("/books/{}", book_id)).await;
    let copy_id = |days: i64| -> String {
        book["copies"]
            .as_array()
            .expect("Copies")
            .iter()
            .find(|c| c["imprint"] == format!("Gollancz, due +{}", days))
            .and_then(|c| c["id"].as_str())
            .expect("Copy id")
            .to_string()
    };
    let (due10, due2, other5, kept1, late) =
        (copy_id(10), copy_id(2), copy_id(5), copy_id(1), copy_id(-1));
    let ours = vec![due10.clone(), due2.clone(), other5.clone(), kept1.clone(), late.clone()];

    // My borrowed: only my on-loan copies, earliest due first
    let mine = all_items(&client, "/mybooks").await;
    assert_eq!(
        ids_among(&mine, &ours),
        vec![late.clone(), due2.clone(), due10.clone()]
    );
    let overdue: Vec<bool> = mine
        .iter()
        .filter(|item| ours.iter().any(|id| item["id"] == id.as_str()))
        .map(|item| item["is_overdue"].as_bool().expect("Overdue flag"))
        .collect();
    assert_eq!(overdue, vec![true, false, false]);
    for item in &mine {
        assert_eq!(item["borrower_id"], me["id"]);
        assert_eq!(item["status"], "o");
    }

    // All borrowed: every on-loan copy, earliest due first
    let all = all_items(&client, "/borrowed").await;
    assert_eq!(
        ids_among(&all, &ours),
        vec![late.clone(), due2.clone(), other5.clone(), due10.clone()]
    );
    assert!(all.iter().all(|item| item["status"] == "o"));
    let dues: Vec<&str> = all.iter().filter_map(|item| item["due_back"].as_str()).collect();
    assert!(dues.windows(2).all(|pair| pair[0] <= pair[1]));

    for id in &ours {
        let response = post(&client, &format!("/book-instances/{}/delete", id), json!({})).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
    for path in [
        format!("/books/{}/delete", book_id),
        format!("/authors/{}/delete", author_id),
        format!("/genres/{}/delete", genre_id),
    ] {
        let response = post(&client, &path, json!({})).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", path);
    }
}
