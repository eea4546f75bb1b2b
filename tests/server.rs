// tests/server.rs

use std::error::Error;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use frontpipe::config::TunnelSection;
use frontpipe::errors::PipelineError;
use frontpipe::server::http::router;
use frontpipe::server::{
    RELOAD_PATH, ReloadHub, Reloader, ServerOptions, inject_reload_client, open_tunnel,
    start_server,
};
use frontpipe_test_utils::{ProjectFixture, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn reload_client_goes_before_the_closing_body_tag() {
    let out = inject_reload_client("<html><BODY><p>hi</p></BODY></html>");
    let script = out.find("<script>").expect("script injected");
    assert!(script < out.find("</BODY>").expect("body kept"));
    assert!(out.contains(RELOAD_PATH));
    assert!(out.ends_with("</BODY></html>"));

    let fragment = inject_reload_client("<p>fragment</p>");
    assert!(fragment.starts_with("<p>fragment</p><script>"));
}

async fn get(app: axum::Router, uri: &str) -> Result<(StatusCode, String), Box<dyn Error>> {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, String::from_utf8(bytes.to_vec())?))
}

#[tokio::test]
async fn html_pages_get_the_reload_client_and_assets_do_not() -> TestResult {
    let project = ProjectFixture::new();
    project.write("dev/index.html", "<html><body>home</body></html>");
    project.write("dev/styles/style.css", ".a{color:red}");
    let hub = ReloadHub::new();

    let (status, page) = get(router(project.path("dev"), hub.clone(), true), "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("home"));
    assert!(page.contains(RELOAD_PATH));

    let (_, css) = get(router(project.path("dev"), hub.clone(), true), "/styles/style.css").await?;
    assert_eq!(css, ".a{color:red}");

    let (_, plain) = get(router(project.path("dev"), hub.clone(), false), "/index.html").await?;
    assert_eq!(plain, "<html><body>home</body></html>");

    let (missing, _) = get(router(project.path("dev"), hub, true), "/nope.html").await?;
    assert_eq!(missing, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn server_binds_a_free_port_and_serves_the_tree() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    project.write("build/index.html", "<body>built</body>");
    let options = ServerOptions {
        host: "127.0.0.1".to_string(),
        port: 0,
        root: project.path("build"),
        live_reload: true,
    };

    let handle = start_server(options, ReloadHub::new()).await?;
    assert_ne!(handle.port(), 0);

    let client = reqwest::Client::builder().no_proxy().build()?;
    let body = with_timeout(async {
        client
            .get(format!("{}/index.html", handle.url()))
            .send()
            .await?
            .text()
            .await
    })
    .await?;
    assert!(body.starts_with("<body>built<script>"));
    Ok(())
}

#[test]
fn reload_without_listeners_is_harmless() {
    let hub = ReloadHub::new();
    hub.reload();
    let mut rx = hub.subscribe();
    assert_eq!(hub.subscribers(), 1);
    hub.reload();
    assert!(rx.try_recv().is_ok());
}

fn tunnel(cmd: &str) -> TunnelSection {
    TunnelSection {
        enabled: true,
        cmd: cmd.to_string(),
        url_pattern: r"url=(https://\S+)".to_string(),
        startup_timeout: "1s".to_string(),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn tunnel_reports_the_announced_url() -> TestResult {
    let section = tunnel("echo starting; echo 'url=https://demo.tunnel.test/{port}'; sleep 5");
    let t = open_tunnel(&section, Duration::from_secs(5), 4321).await?;
    assert_eq!(t.url(), "https://demo.tunnel.test/4321");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn silent_tunnel_times_out() {
    let section = tunnel("sleep 5");
    let err = open_tunnel(&section, Duration::from_millis(200), 4321)
        .await
        .expect_err("no url printed");
    assert!(matches!(err, PipelineError::Tunnel(ref msg) if msg.contains("no public URL")));
}

#[cfg(unix)]
#[tokio::test]
async fn tunnel_exiting_early_is_an_error() {
    let section = tunnel("echo nothing here");
    let err = open_tunnel(&section, Duration::from_secs(5), 4321)
        .await
        .expect_err("process exits without url");
    assert!(matches!(err, PipelineError::Tunnel(ref msg) if msg.contains("exited")));
}
