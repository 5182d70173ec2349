use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub name: &'static str,
}

static USERS: [User; 5] = [
    User { user_id: 1, name: "安藤" },
    User { user_id: 2, name: "伊藤" },
    User { user_id: 3, name: "遠藤" },
    User { user_id: 4, name: "加藤" },
    User { user_id: 5, name: "武藤" },
];

pub fn find_user(user_id: i64) -> Option<&'static User> {
    USERS.iter().find(|user| user.user_id == user_id)
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Item {
    pub name: String,
    pub price: f64,
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: &'static str,
}

pub enum UserLookup {
    Found(&'static User),
    Missing,
}

// A missing user is still a 200, only the body changes.
impl IntoResponse for UserLookup {
    fn into_response(self) -> Response {
        match self {
            UserLookup::Found(user) => (StatusCode::OK, Json(user)).into_response(),
            UserLookup::Missing => (
                StatusCode::OK,
                Json(ApiErrorResponse {
                    error: "User not found",
                }),
            )
                .into_response(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
struct SearchParams {
    #[serde(default = "default_keyword")]
    keyword: String,
}

fn default_keyword() -> String {
    "default".into()
}

pub fn router() -> Router {
    Router::new()
        .route("/hello", get(say_hello))
        .route("/users/{user_id}", get(get_user))
        .route("/search", get(search))
        .route("/items/", post(create_item))
}

async fn say_hello() -> Json<Message> {
    Json(Message {
        message: "こんにちは、FastAPI！",
    })
}

async fn get_user(Path(user_id): Path<i64>) -> UserLookup {
    match find_user(user_id) {
        Some(user) => UserLookup::Found(user),
        None => {
            tracing::debug!(user_id, "User not found");
            UserLookup::Missing
        }
    }
}

async fn search(Query(params): Query<SearchParams>) -> Json<SearchParams> {
    Json(params)
}

async fn create_item(Json(item): Json<Item>) -> Json<Item> {
    Json(item)
}
