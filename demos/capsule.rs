//! A small capsule served as a CGI program.
//!
//! Point the Gemini server's CGI directory at the built binary, or try it
//! locally by setting the variables yourself:
//!
//!   cargo build --example capsule
//!   PATH_INFO=/page/2 target/debug/examples/capsule
//!   PATH_INFO=/search QUERY_STRING=rust%20cgi target/debug/examples/capsule
//!   PATH_INFO=/visits TLS_CLIENT_HASH=SHA256:abcd target/debug/examples/capsule
//!
//! Set GEODE_CONFIG to a TOML file to rename the variables, and RUST_LOG
//! for diagnostics on stderr.

use std::fmt::Write;
use std::sync::Arc;

use geode::{
    BoxError, Config, Dispatcher, Gateway, MemoryStore, Next, Outcome, Request, Response, Status,
    middleware,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), geode::Error> {
    // stdout carries the response; everything else goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::var("GEODE_CONFIG") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::default(),
    };

    let mut app = Dispatcher::new().with_session_store(Arc::new(MemoryStore::new()));
    app.add_handler("/", index)?.push(middleware::trace);
    app.add_handler(r"/page/(\d+)", page)?;
    app.add_handler("/search", search)?;
    app.add_handler("/visits", visits)?
        .push(middleware::require_identity)
        .push(middleware::trace);
    app.add_handler("/old", |_req: Request, _res: Response, _next: Next| async move {
        Response::new(Status::RedirectPermanent, "/")
    })?;

    Gateway::new(config).serve(&app).await
}

async fn index(_req: Request, mut res: Response, _next: Next) -> Response {
    res.push("# geode capsule\n\n");
    res.push("=> /page/1 First page\n");
    res.push("=> /search Search\n");
    res.push("=> /visits Visit counter (needs a certificate)\n");
    res
}

async fn page(req: Request, mut res: Response, _next: Next) -> Result<Response, BoxError> {
    let n: u32 = req.param(0).unwrap_or("1").parse()?;
    writeln!(res, "# Page {n}")?;
    if n > 1 {
        writeln!(res, "=> /page/{} Previous", n - 1)?;
    }
    writeln!(res, "=> /page/{} Next", n + 1)?;
    Ok(res)
}

async fn search(req: Request, mut res: Response, _next: Next) -> Response {
    if req.query().is_empty() {
        return Response::new(Status::Input, "Search for?");
    }
    res.push(format!("# Results for \"{}\"\n\nNothing yet.\n", req.query()));
    res
}

async fn visits(req: Request, mut res: Response, _next: Next) -> Outcome {
    let Some(session) = req.session() else {
        return Ok(Response::new(Status::ClientCertificateRequired, "Certificate required"));
    };
    let count = match session.get("visits") {
        Some(v) => v.parse::<u64>()? + 1,
        None => 1,
    };
    session.set("visits", count.to_string());
    writeln!(res, "# Hello {}\n\nVisit number {count}.", req.identity())?;
    Ok(res)
}
