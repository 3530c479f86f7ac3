//! End-to-end dispatch behaviour through the public API.

use std::sync::{Arc, Mutex};

use geode::{
    BoxError, Dispatcher, Environment, Gateway, MemoryStore, Next, Outcome, Request, Response,
    SessionStore, Status,
};

/// Handler that appends `tag` to a shared trace, then continues.
fn step(tag: &'static str, trace: Arc<Mutex<Vec<&'static str>>>) -> impl geode::Handler {
    move |req: Request, res: Response, next: Next| {
        let trace = Arc::clone(&trace);
        async move {
            trace.lock().unwrap().push(tag);
            next.run(req, res).await
        }
    }
}

/// Handler that appends `tag` to a shared trace and stops.
fn stop(tag: &'static str, trace: Arc<Mutex<Vec<&'static str>>>) -> impl geode::Handler {
    move |_req: Request, res: Response, _next: Next| {
        let trace = Arc::clone(&trace);
        async move {
            trace.lock().unwrap().push(tag);
            res
        }
    }
}

async fn params_body(req: Request, mut res: Response, _next: Next) -> Response {
    let joined: Vec<&str> = req.params().iter().collect();
    res.push(joined.join(","));
    res
}

#[tokio::test]
async fn stack_runs_last_added_first() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut app = Dispatcher::new();
    app.add_handler("/", step("A", Arc::clone(&trace)))
        .unwrap()
        .push(step("B", Arc::clone(&trace)))
        .push(step("C", Arc::clone(&trace)));

    let res = app.run(Request::new("/", "", "")).await;
    assert_eq!(res.status(), Status::Success);
    assert_eq!(*trace.lock().unwrap(), ["C", "B", "A"]);
}

#[tokio::test]
async fn short_circuit_skips_earlier_handlers() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut app = Dispatcher::new();
    app.add_handler("/", step("A", Arc::clone(&trace)))
        .unwrap()
        .push(stop("B", Arc::clone(&trace)))
        .push(step("C", Arc::clone(&trace)));

    app.run(Request::new("/", "", "")).await;
    assert_eq!(*trace.lock().unwrap(), ["C", "B"]);
}

#[tokio::test]
async fn captures_reach_every_handler_in_the_stack() {
    let mut app = Dispatcher::new();
    app.add_handler("/page/([^/]+)/([^/]+)", params_body).unwrap();
    app.add_handler(r"/page/(\d+)(?:/(\d+)(?:/(\d+))?)?", params_body).unwrap();

    let body = |res: Response| String::from_utf8(res.body().to_vec()).unwrap();

    assert_eq!(body(app.run(Request::new("/page/hello/world", "", "")).await), "hello,world");
    assert_eq!(body(app.run(Request::new("/page/1", "", "")).await), "1");
    assert_eq!(body(app.run(Request::new("/page/1/2/3", "", "")).await), "1,2,3");

    let res = app.run(Request::new("/page/1/2/3/4", "", "")).await;
    assert_eq!(res.status(), Status::NotFound);
}

#[tokio::test]
async fn named_captures_are_reachable_by_name() {
    let mut app = Dispatcher::new();
    app.add_handler(r"/page/(?<foo>\d+)", |req: Request, mut res: Response, _next: Next| async move {
        res.push(req.params().name("foo").unwrap_or("none"));
        res
    })
    .unwrap();

    let res = app.run(Request::new("/page/42", "", "")).await;
    assert_eq!(res.body(), b"42");
}

#[tokio::test]
async fn error_deep_in_the_stack_becomes_temporary_failure() {
    let reports = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink_reports = Arc::clone(&reports);
    let mut app = Dispatcher::new()
        .with_sink(move |msg: &str| sink_reports.lock().unwrap().push(msg.to_owned()));

    app.add_handler("/", |_req: Request, _res: Response, _next: Next| async move {
        let n: u32 = "not a number".parse()?;
        Ok::<_, BoxError>(Response::text(n.to_string()))
    })
    .unwrap()
    .push(|req: Request, mut res: Response, next: Next| async move {
        res.push("partial output");
        next.run(req, res).await
    });

    let res = app.run(Request::new("/", "", "")).await;
    assert_eq!(res, Response::new(Status::TemporaryFailure, "Server error"));
    assert_eq!(reports.lock().unwrap().len(), 1);
    assert!(reports.lock().unwrap()[0].contains("invalid digit"));
}

#[tokio::test]
async fn sessions_persist_across_requests_for_the_same_certificate() {
    async fn counter(req: Request, mut res: Response, _next: Next) -> Outcome {
        let Some(session) = req.session() else {
            return Ok(Response::new(Status::ClientCertificateRequired, "Certificate required"));
        };
        let visits: u32 = session.get("visits").map(|v| v.parse::<u32>()).transpose()?.unwrap_or(0) + 1;
        session.set("visits", visits.to_string());
        res.push(visits.to_string());
        Ok(res)
    }

    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    let mut app = Dispatcher::new().with_session_store(Arc::clone(&store));
    app.add_handler("/count", counter).unwrap();

    let env = Environment {
        path: "/count".into(),
        fingerprint: Some("SHA256:c0ffee".into()),
        ..Environment::default()
    };
    assert_eq!(app.run_environment(&env).await.body(), b"1");
    assert_eq!(app.run_environment(&env).await.body(), b"2");

    let anonymous = Environment { fingerprint: None, ..env.clone() };
    let res = app.run_environment(&anonymous).await;
    assert_eq!(res.status(), Status::ClientCertificateRequired);
}

#[tokio::test]
async fn gateway_output_is_exactly_status_line_and_body() {
    let mut app = Dispatcher::new();
    app.add_handler("/", |_req: Request, mut res: Response, _next: Next| async move {
        res.set_meta("text/plain");
        res.push("line one\nline two\n");
        res
    })
    .unwrap();

    let env = Environment { path: "/".into(), ..Environment::default() };
    let mut out = Vec::new();
    Gateway::default().serve_to(&app, &env, &mut out).await.unwrap();
    assert_eq!(out, b"20 text/plain\r\nline one\nline two\n");
}
