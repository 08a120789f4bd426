use http::StatusCode;
use micro_dispatch::{Context, Engine, EngineError};
use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct RawResponse {
    status_line: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine
        .get("/get", |ctx: &mut Context| ctx.data(StatusCode::OK, "ok"))
        .post("/post", |ctx: &mut Context| {
            let name = ctx.post_form("name").to_owned();
            write!(ctx.writer(), "post successfully {name}").unwrap();
        })
        .get("/json", |ctx: &mut Context| {
            let mut map = HashMap::new();
            map.insert("a", 1);
            ctx.json(StatusCode::OK, &map);
        })
        .any("/any", |ctx: &mut Context| {
            let method = ctx.method().clone();
            ctx.string(StatusCode::OK, format_args!("{method} any successfully"));
        });
    engine
}

async fn start(engine: Engine) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(engine.serve(listener));
    address
}

async fn send(address: SocketAddr, raw_request: &str) -> RawResponse {
    let mut stream = TcpStream::connect(address).await.unwrap();
    stream.write_all(raw_request.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();

    let split = buf.windows(4).position(|w| w == b"\r\n\r\n").expect("response should contain a header end");
    let head = String::from_utf8(buf[..split].to_vec()).unwrap();
    let body = buf[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_owned();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_owned()))
        .collect();

    RawResponse { status_line, headers, body }
}

fn get(path: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
}

#[tokio::test]
async fn test_get_matched() {
    let address = start(engine()).await;

    let response = send(address, &get("/get?x=1")).await;
    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.body, b"ok");
}

#[tokio::test]
async fn test_trailing_slash_not_found() {
    let address = start(engine()).await;

    let response = send(address, &get("/get/")).await;
    assert_eq!(response.status_line, "HTTP/1.1 404 Not Found");
    assert_eq!(response.body, b"404 NOT FOUND:/get/\n");

    let response = send(address, &get("/nothing?x=1")).await;
    assert_eq!(response.status_line, "HTTP/1.1 404 Not Found");
    assert_eq!(response.body, b"404 NOT FOUND:/nothing?x=1\n");
}

#[tokio::test]
async fn test_post_form() {
    let address = start(engine()).await;

    let body = "name=hello&zip=world";
    let request = format!(
        "POST /post HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );

    let response = send(address, &request).await;
    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.body, b"post successfully hello");
}

#[tokio::test]
async fn test_post_multipart_form() {
    let address = start(engine()).await;

    let body = "--boundary\r\n\
                Content-Disposition: form-data; name=\"name\"\r\n\r\n\
                hello\r\n\
                --boundary\r\n\
                Content-Disposition: form-data; name=\"zip\"\r\n\r\n\
                world\r\n\
                --boundary--\r\n";
    let request = format!(
        "POST /post HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: multipart/form-data; boundary=boundary\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );

    let response = send(address, &request).await;
    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.body, b"post successfully hello");
}

#[tokio::test]
async fn test_json() {
    let address = start(engine()).await;

    let response = send(address, &get("/json")).await;
    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.headers.get("content-type").map(String::as_str), Some("application/json"));

    let value: HashMap<String, i64> = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value, HashMap::from([("a".to_owned(), 1)]));
}

#[tokio::test]
async fn test_any() {
    let address = start(engine()).await;

    for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
        let request = format!("{method} /any HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: 0\r\n\r\n");
        let response = send(address, &request).await;
        assert_eq!(response.status_line, "HTTP/1.1 200 OK");
        assert_eq!(response.body, format!("{method} any successfully").into_bytes());
    }

    let request = "PATCH /any HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: 0\r\n\r\n";
    let response = send(address, request).await;
    assert_eq!(response.status_line, "HTTP/1.1 404 Not Found");
    assert_eq!(response.body, b"404 NOT FOUND:/any\n");
}

#[tokio::test]
async fn test_bind_failure() {
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = occupied.local_addr().unwrap().to_string();

    let result = Engine::new().run(&address).await;
    match result {
        Err(EngineError::Bind { address: failed, .. }) => assert_eq!(failed, address),
        other => panic!("expected bind error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_address() {
    let result = Engine::new().run("not an address").await;
    assert!(matches!(result, Err(EngineError::Bind { .. })));
}
