use http::StatusCode;
use micro_dispatch::{Context, Engine};
use serde::Deserialize;
use std::io::Write;
use tracing::error;

#[derive(Deserialize)]
pub struct User {
    name: String,
    zip: String,
}

// curl -v http://127.0.0.1:8080/get?name=zava
fn get(ctx: &mut Context) {
    let uri = ctx.uri().clone();
    let _ = write!(ctx.writer(), "get successfully {uri}\r\n");
}

// curl -v -d "name=hello&zip=world" http://127.0.0.1:8080/post
fn post(ctx: &mut Context) {
    match ctx.bind_form::<User>() {
        Ok(user) => ctx.string(StatusCode::OK, format_args!("post successfully, name: {}, zip: {}\r\n", user.name, user.zip)),
        Err(e) => ctx.string(StatusCode::BAD_REQUEST, format_args!("{e}\r\n")),
    }
}

fn put(ctx: &mut Context) {
    let name = ctx.default_query("name", "anonymous").to_owned();
    ctx.string(StatusCode::OK, format_args!("put successfully {name}\r\n"));
}

fn delete(ctx: &mut Context) {
    ctx.status(StatusCode::NO_CONTENT);
}

fn options(ctx: &mut Context) {
    ctx.header("Allow", "GET, POST, PUT, DELETE, OPTIONS");
    ctx.status(StatusCode::OK);
}

// curl -v -X PUT http://127.0.0.1:8080/any
fn any(ctx: &mut Context) {
    let method = ctx.method().to_string();
    let websocket = ctx.is_websocket();
    ctx.json(StatusCode::OK, &serde_json::json!({ "method": method, "websocket": websocket }));
}

#[tokio::main]
async fn main() {
    micro_dispatch::logging::init();

    let mut engine = Engine::new();
    engine
        .get("/get", get)
        .post("/post", post)
        .put("/put", put)
        .delete("/delete", delete)
        .options("/options", options)
        .any("/any", any);

    if let Err(e) = engine.run("127.0.0.1:8080").await {
        error!(cause = %e, "server stopped");
    }
}
