//! REST Server
//!
//! Route table and actix-web server bootstrap.

use crate::handler;
use crate::types::FILES_ROUTE;
use actix_files::Files;
use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use zipper_core::application::JobManager;

const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads; `None` uses actix-web's default (one per core)
    pub workers: Option<usize>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            workers: None,
        }
    }
}

/// Register every route; `output_dir` is served read-only under `/files`
pub fn configure(cfg: &mut web::ServiceConfig, output_dir: &Path) {
    cfg.route("/health", web::get().to(handler::health))
        .service(
            web::scope("/tasks")
                .route("", web::post().to(handler::create_task))
                .route("/{id}/items", web::post().to(handler::add_item))
                .route("/{id}/run", web::post().to(handler::run_task))
                .route("/{id}/status", web::get().to(handler::task_status))
                .route("/{id}/result", web::get().to(handler::task_result)),
        )
        .service(Files::new(FILES_ROUTE, output_dir));
}

/// HTTP Server
pub struct ApiServer {
    config: HttpServerConfig,
    manager: Arc<JobManager>,
}

impl ApiServer {
    pub fn new(config: HttpServerConfig, manager: Arc<JobManager>) -> Self {
        Self { config, manager }
    }

    /// Bind and return the running server future
    ///
    /// Signal handling is left to the caller, which stops the server through
    /// `Server::handle()`.
    pub fn start(self) -> std::io::Result<Server> {
        let output_dir: PathBuf = self.manager.output_dir().to_path_buf();
        let data = web::Data::from(self.manager);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            output_dir = %output_dir.display(),
            "Starting HTTP server"
        );

        let mut server = HttpServer::new(move || {
            let output_dir = output_dir.clone();
            App::new()
                .app_data(data.clone())
                .wrap(Logger::default())
                .configure(move |cfg| configure(cfg, &output_dir))
        })
        .disable_signals();

        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind((self.config.host.as_str(), self.config.port))?
            .run();

        info!("HTTP server started successfully");
        Ok(server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddItemResponse, CreateTaskResponse, ErrorBody, StatusResponse};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use zipper_core::application::ManagerConfig;
    use zipper_core::port::fetcher::mocks::{MockFetch, MockFetcher};
    use zipper_core::port::id_provider::mocks::SequentialIdProvider;
    use zipper_core::port::packager::mocks::MockPackager;

    struct Fixture {
        manager: Arc<JobManager>,
        _staging: TempDir,
        _output: TempDir,
    }

    fn fixture(fetcher: MockFetcher, max_parallel: usize) -> Fixture {
        let staging = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let manager = JobManager::new(
            ManagerConfig {
                max_parallel,
                staging_dir: staging.path().to_path_buf(),
                output_dir: output.path().to_path_buf(),
            },
            Arc::new(SequentialIdProvider::new()),
            Arc::new(fetcher),
            Arc::new(MockPackager::new_success()),
        )
        .unwrap();

        Fixture {
            manager: Arc::new(manager),
            _staging: staging,
            _output: output,
        }
    }

    macro_rules! init_app {
        ($manager:expr) => {{
            let output_dir = $manager.output_dir().to_path_buf();
            test::init_service(
                App::new()
                    .app_data(web::Data::from(Arc::clone(&$manager)))
                    .configure(move |cfg| configure(cfg, &output_dir)),
            )
            .await
        }};
    }

    async fn wait_terminal(manager: &JobManager, id: &str) {
        for _ in 0..200 {
            let job = manager.snapshot(id).unwrap();
            if job.state.is_terminal() && manager.running_jobs() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", id);
    }

    #[actix_web::test]
    async fn test_health() {
        let fx = fixture(MockFetcher::new(), 3);
        let app = init_app!(fx.manager);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "ok");
    }

    #[actix_web::test]
    async fn test_create_task() {
        let fx = fixture(MockFetcher::new(), 3);
        let app = init_app!(fx.manager);

        let resp = test::call_service(&app, test::TestRequest::post().uri("/tasks").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: CreateTaskResponse = test::read_body_json(resp).await;
        assert_eq!(body.id, "job-1");
    }

    #[actix_web::test]
    async fn test_add_item_validation() {
        let fx = fixture(MockFetcher::new(), 3);
        let app = init_app!(fx.manager);
        fx.manager.create().unwrap();

        // Accepted, URL trimmed
        let req = test::TestRequest::post()
            .uri("/tasks/job-1/items")
            .set_json(json!({"url": "  https://x/a.pdf  "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: AddItemResponse = test::read_body_json(resp).await;
        assert_eq!((body.added, body.limit), (1, 3));

        let cases = [
            ("/tasks/job-1/items", "{not json".to_string(), StatusCode::BAD_REQUEST, "invalid json"),
            ("/tasks/job-1/items", json!({"url": "   "}).to_string(), StatusCode::BAD_REQUEST, "empty url"),
            ("/tasks/job-1/items", json!({}).to_string(), StatusCode::BAD_REQUEST, "empty url"),
            (
                "/tasks/job-1/items",
                json!({"url": "https://x/c.gif"}).to_string(),
                StatusCode::BAD_REQUEST,
                "only .pdf and .jpeg are allowed",
            ),
            (
                "/tasks/nope/items",
                json!({"url": "https://x/a.pdf"}).to_string(),
                StatusCode::NOT_FOUND,
                "task not found",
            ),
        ];

        for (uri, payload, status, message) in cases {
            let req = test::TestRequest::post()
                .uri(uri)
                .insert_header(("content-type", "application/json"))
                .set_payload(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status, "{}", message);
            let body: ErrorBody = test::read_body_json(resp).await;
            assert_eq!(body.error, message);
        }

        // Rejected items never reached the job
        assert_eq!(fx.manager.snapshot("job-1").unwrap().added, 1);
    }

    #[actix_web::test]
    async fn test_items_limit_reached() {
        let fx = fixture(MockFetcher::new(), 3);
        let app = init_app!(fx.manager);
        fx.manager.create().unwrap();

        for n in 0..3 {
            fx.manager
                .add_item("job-1", &format!("https://x/{}.pdf", n))
                .unwrap();
        }

        let req = test::TestRequest::post()
            .uri("/tasks/job-1/items")
            .set_json(json!({"url": "https://x/4.pdf"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "items limit reached");
    }

    #[actix_web::test]
    async fn test_run_without_items() {
        let fx = fixture(MockFetcher::new(), 3);
        let app = init_app!(fx.manager);
        fx.manager.create().unwrap();

        let req = test::TestRequest::post().uri("/tasks/job-1/run").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "no valid items to process");
    }

    #[actix_web::test]
    async fn test_full_flow_and_download() {
        let fetcher = MockFetcher::new()
            .with("https://x/a.pdf", MockFetch::Body(b"A".to_vec()))
            .with("https://x/b.jpeg", MockFetch::Body(b"B".to_vec()));
        let fx = fixture(fetcher, 3);
        let app = init_app!(fx.manager);
        fx.manager.create().unwrap();
        fx.manager.add_item("job-1", "https://x/a.pdf").unwrap();
        fx.manager.add_item("job-1", "https://x/b.jpeg").unwrap();

        // Nothing to download yet
        let req = test::TestRequest::get().uri("/tasks/job-1/result").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "result not ready");

        let req = test::TestRequest::post().uri("/tasks/job-1/run").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "accepted"}));

        wait_terminal(&fx.manager, "job-1").await;

        let req = test::TestRequest::get().uri("/tasks/job-1/status").to_request();
        let status: StatusResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            status,
            StatusResponse {
                status: "done".to_string(),
                added: 2,
                done: 2,
                error: String::new(),
                result_url: "/files/job-1.zip".to_string(),
            }
        );

        // MockPackager writes the entry names as the archive body
        let req = test::TestRequest::get().uri("/tasks/job-1/result").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("attachment"));
        assert_eq!(test::read_body(resp).await, "a.pdf\nb.jpeg");

        let req = test::TestRequest::get().uri(&status.result_url).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "a.pdf\nb.jpeg");
    }

    #[actix_web::test]
    async fn test_run_conflicts() {
        let fetcher = MockFetcher::new().with(
            "https://x/slow.pdf",
            MockFetch::Slow {
                delay: Duration::from_millis(200),
                body: b"slow".to_vec(),
            },
        );
        let fx = fixture(fetcher, 1);
        let app = init_app!(fx.manager);

        fx.manager.create().unwrap();
        fx.manager.add_item("job-1", "https://x/slow.pdf").unwrap();
        fx.manager.create().unwrap();
        fx.manager.add_item("job-2", "https://x/slow.pdf").unwrap();

        let req = test::TestRequest::post().uri("/tasks/job-1/run").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::ACCEPTED);

        // Same job again
        let req = test::TestRequest::post().uri("/tasks/job-1/run").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "task already started");

        // Adding to a started job
        let req = test::TestRequest::post()
            .uri("/tasks/job-1/items")
            .set_json(json!({"url": "https://x/late.pdf"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // Only slot taken
        let req = test::TestRequest::post().uri("/tasks/job-2/run").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "server is busy, try later");

        // Busy job is still startable once the slot frees up
        wait_terminal(&fx.manager, "job-1").await;
        let req = test::TestRequest::post().uri("/tasks/job-2/run").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::ACCEPTED);
        wait_terminal(&fx.manager, "job-2").await;
    }

    #[actix_web::test]
    async fn test_status_unknown_task() {
        let fx = fixture(MockFetcher::new(), 3);
        let app = init_app!(fx.manager);

        let req = test::TestRequest::get().uri("/tasks/missing/status").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "task not found");
    }

    #[actix_web::test]
    async fn test_partial_failure_status() {
        let fetcher = MockFetcher::new().with("https://x/a.pdf", MockFetch::Body(b"A".to_vec()));
        let fx = fixture(fetcher, 3);
        let app = init_app!(fx.manager);
        fx.manager.create().unwrap();
        fx.manager.add_item("job-1", "https://x/a.pdf").unwrap();
        fx.manager.add_item("job-1", "https://x/missing.pdf").unwrap();
        fx.manager.run("job-1").unwrap();

        wait_terminal(&fx.manager, "job-1").await;

        let req = test::TestRequest::get().uri("/tasks/job-1/status").to_request();
        let status: StatusResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status.status, "done");
        assert_eq!(status.done, 1);
        assert!(status.error.contains("404"));
        assert!(!status.result_url.is_empty());
    }
}
