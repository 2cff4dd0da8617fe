//! Shared fixtures: real fetcher + packager wired into a manager on temp dirs
#![allow(dead_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zipper_core::application::{JobManager, ManagerConfig};
use zipper_core::domain::JobSnapshot;
use zipper_core::port::RandomIdProvider;
use zipper_infra_system::{FetchSettings, HttpFetcher, ZipPackager};

pub struct TestEnv {
    pub manager: Arc<JobManager>,
    pub staging: TempDir,
    pub output: TempDir,
}

/// Must be called inside a tokio runtime
pub fn env(max_parallel: usize, settings: FetchSettings) -> TestEnv {
    let staging = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let manager = JobManager::new(
        ManagerConfig {
            max_parallel,
            staging_dir: staging.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
        },
        Arc::new(RandomIdProvider),
        Arc::new(HttpFetcher::new(settings).unwrap()),
        Arc::new(ZipPackager::new()),
    )
    .unwrap();

    TestEnv {
        manager: Arc::new(manager),
        staging,
        output,
    }
}

pub fn default_env() -> TestEnv {
    env(3, FetchSettings::default())
}

pub async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn body(bytes: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_bytes(bytes.to_vec())
}

/// Local server answering every request with a chunked 200 body of `total`
/// bytes and no Content-Length. Returns its base URL.
pub async fn chunked_server(total: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let head = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
                if socket.write_all(head).await.is_err() {
                    return;
                }

                let chunk = vec![b'Z'; 1024];
                let mut sent = 0;
                while sent < total {
                    let n = chunk.len().min(total - sent);
                    let framed = [
                        format!("{:x}\r\n", n).into_bytes(),
                        chunk[..n].to_vec(),
                        b"\r\n".to_vec(),
                    ]
                    .concat();
                    if socket.write_all(&framed).await.is_err() {
                        return;
                    }
                    sent += n;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
            });
        }
    });

    format!("http://{}", addr)
}

/// Poll until the job is terminal and its admission slot is free
pub async fn wait_finished(manager: &JobManager, id: &str) -> JobSnapshot {
    for _ in 0..500 {
        let job = manager.snapshot(id).unwrap();
        if job.state.is_terminal() && manager.running_jobs() == 0 {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not finish", id);
}

pub fn read_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect()
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}
