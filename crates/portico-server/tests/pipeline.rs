//! End-to-end pipeline behavior through `Server::handle`.

use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use portico_core::{read_body, Response, ResponseExt};
use portico_router::{HandlerParams, Router};
use portico_server::{
    AllowedExtensions, BoxedInterceptor, BoxedMiddleware, InterceptorContext, MiddlewareContext,
    PublicDir, Server, ServerConfig,
};
use tempfile::TempDir;
use tokio::sync::Notify;

fn request(method: Method, uri: &str) -> portico_core::Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

fn router() -> Router {
    Router::builder()
        .get("/", |_: HandlerParams| async {
            Response::text(StatusCode::OK, "response")
        })
        .get("/:id", |p: HandlerParams| async move {
            let id = p.params.get("id").unwrap_or_default().to_string();
            Response::text(StatusCode::OK, format!("{id}-{}", p.request.method()))
        })
        .build()
        .unwrap()
}

async fn text(response: Response) -> (StatusCode, String) {
    let (parts, body) = read_body(response).await;
    (parts.status, String::from_utf8(body.to_vec()).unwrap())
}

fn replace_body(replacement: &'static str) -> impl Fn(InterceptorContext) -> std::future::Ready<Response> {
    move |ctx: InterceptorContext| {
        std::future::ready(Response::text(ctx.response.status(), replacement))
    }
}

#[tokio::test]
async fn middleware_short_circuit_skips_everything_else() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.js"), "js").unwrap();

    let config = ServerConfig::builder()
        .public_dir(PublicDir::new(dir.path(), AllowedExtensions::Any))
        .build();
    let server = Server::new(router(), config);

    server.use_middleware(|_: MiddlewareContext| async {
        Some(Response::text(StatusCode::OK, "blocked"))
    });
    server.intercept(replace_body("intercepted"));

    for (method, uri) in [
        (Method::GET, "/"),
        (Method::POST, "/"),
        (Method::GET, "/nowhere/at/all"),
        (Method::GET, "/app.js"),
    ] {
        let (_, body) = text(server.handle(request(method, uri)).await).await;
        assert_eq!(body, "blocked", "{uri}");
    }
}

#[tokio::test]
async fn middleware_runs_in_order_until_first_response() {
    let server = Server::new(router(), ServerConfig::default());
    let seen = Arc::new(AtomicUsize::new(0));

    let first_seen = Arc::clone(&seen);
    let first: BoxedMiddleware = Arc::new(move |_: MiddlewareContext| {
        first_seen.fetch_add(1, Ordering::SeqCst);
        async { None::<Response> }
    });
    let gate: BoxedMiddleware = Arc::new(|ctx: MiddlewareContext| async move {
        (ctx.request.uri().path() == "/secret")
            .then(|| Response::text(StatusCode::FORBIDDEN, "no"))
    });
    server.use_all([first, gate]);

    let (status, body) = text(server.handle(request(Method::GET, "/secret")).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "no");

    let (status, body) = text(server.handle(request(Method::GET, "/")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "response");

    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn interceptors_fold_in_registration_order() {
    let server = Server::new(router(), ServerConfig::default());

    let tag = |suffix: &'static str| -> BoxedInterceptor {
        Arc::new(move |ctx: InterceptorContext| async move {
            let (parts, body) = read_body(ctx.response).await;
            let text = format!("{}{suffix}", String::from_utf8_lossy(&body));
            Response::text(parts.status, text)
        })
    };
    server.intercept_all([tag("+a"), tag("+b")]);
    server.intercept(tag("+c"));

    let (_, body) = text(server.handle(request(Method::GET, "/1")).await).await;
    assert_eq!(body, "1-GET+a+b+c");
}

#[tokio::test]
async fn dispatch_passes_params_and_method() {
    let server = Server::new(router(), ServerConfig::default());
    let (status, body) = text(server.handle(request(Method::GET, "/1")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1-GET");
}

#[tokio::test]
async fn method_mismatch_is_405_and_unknown_route_is_404() {
    let server = Server::new(router(), ServerConfig::default());

    let response = server.handle(request(Method::POST, "/")).await;
    assert_eq!(response.headers()[http::header::ALLOW], "GET");
    let (status, body) = text(response).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "Error: method not allowed");

    let (status, body) = text(server.handle(request(Method::GET, "/a/b")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Error: route not found");
}

#[tokio::test]
async fn static_request_without_public_dir() {
    let server = Server::new(router(), ServerConfig::default());

    let (status, body) = text(server.handle(request(Method::GET, "/app.js")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("public folder is not defined"));
}

#[tokio::test]
async fn static_request_checks_extension_then_file() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::builder()
        .public_dir(PublicDir::new(dir.path(), AllowedExtensions::only(["css"])))
        .build();
    let server = Server::new(router(), config);

    let (status, body) = text(server.handle(request(Method::GET, "/x.js")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("file extension is not allowed"));

    let (status, body) = text(server.handle(request(Method::GET, "/x.css")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("file not found"));
}

#[tokio::test]
async fn static_file_is_served_and_intercepted() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css").join("site.css"), "h1 {}").unwrap();

    let config = ServerConfig::builder()
        .public_dir(PublicDir::new(dir.path(), AllowedExtensions::Any))
        .build();
    let server = Server::new(router(), config);
    server.intercept(|ctx: InterceptorContext| async move {
        let mut response = ctx.response;
        response
            .headers_mut()
            .insert("cache-control", http::HeaderValue::from_static("max-age=60"));
        response
    });

    let response = server.handle(request(Method::GET, "/css/site.css")).await;
    assert_eq!(response.headers()["content-type"], "text/css; charset=utf-8");
    assert_eq!(response.headers()["cache-control"], "max-age=60");

    let (status, body) = text(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "h1 {}");
}

#[tokio::test]
async fn static_requests_ignore_the_router() {
    let router = Router::builder()
        .get("/report.pdf", |_: HandlerParams| async {
            Response::text(StatusCode::OK, "from handler")
        })
        .build()
        .unwrap();
    let server = Server::new(router, ServerConfig::default());

    let (status, body) = text(server.handle(request(Method::GET, "/report.pdf")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Error: public folder is not defined");
}

#[tokio::test]
async fn appended_stages_apply_to_later_requests() {
    let server = Server::new(router(), ServerConfig::default());

    let (_, before) = text(server.handle(request(Method::GET, "/")).await).await;
    assert_eq!(before, "response");

    server.intercept(replace_body("changed"));
    let (_, after) = text(server.handle(request(Method::GET, "/")).await).await;
    assert_eq!(after, "changed");
}

#[tokio::test]
async fn in_flight_request_keeps_its_stage_snapshot() {
    let server = Server::new(router(), ServerConfig::default());
    let first = Arc::new(AtomicBool::new(true));
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    // Parks the first request inside the pipeline until released.
    let gate = Arc::clone(&first);
    let entered_tx = Arc::clone(&entered);
    let release_rx = Arc::clone(&release);
    server.use_middleware(move |_: MiddlewareContext| {
        let parked = gate.swap(false, Ordering::SeqCst);
        let (entered, release) = (Arc::clone(&entered_tx), Arc::clone(&release_rx));
        async move {
            if parked {
                entered.notify_one();
                release.notified().await;
            }
            None::<Response>
        }
    });

    let running = server.clone();
    let in_flight =
        tokio::spawn(async move { running.handle(request(Method::GET, "/")).await });

    entered.notified().await;
    server.intercept(replace_body("changed"));
    release.notify_one();

    let (status, body) = text(in_flight.await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "response");

    let (_, later) = text(server.handle(request(Method::GET, "/")).await).await;
    assert_eq!(later, "changed");
}
