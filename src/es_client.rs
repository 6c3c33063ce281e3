use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::conf::Endpoint;
use crate::error::{LoaderError, Result};
use crate::models::server_info::ServerInfo;

#[derive(Debug)]
pub struct EsClient {
    endpoint: Endpoint,
    http_client: Client,
}

/// Raw status and body of one call.
#[derive(Debug)]
pub struct EsResponse {
    status: StatusCode,
    body: String,
}

fn inject_auth(request_builder: RequestBuilder, endpoint: &Endpoint) -> RequestBuilder {
    if endpoint.has_basic_auth() {
        request_builder.basic_auth(endpoint.get_username(), endpoint.get_password())
    } else {
        request_builder
    }
}

pub fn build_http_client(endpoint: &Endpoint) -> Result<Client> {
    let mut builder = Client::builder();
    if endpoint.is_insecure() {
        warn!("TLS certificate verification is disabled for {}", endpoint.get_url());
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(path) = endpoint.get_root_certificates() {
        for cert in load_certificates(path)? {
            builder = builder.add_root_certificate(cert);
        }
    }
    Ok(builder.build()?)
}

/// Every PEM file in `path` that parses as a certificate; others are skipped.
fn load_certificates(path: &Path) -> Result<Vec<Certificate>> {
    let mut certs = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let file_path = entry?.path();
        if !file_path.is_file() {
            continue;
        }
        match std::fs::read(&file_path).map(|content| Certificate::from_pem(&content)) {
            Ok(Ok(cert)) => certs.push(cert),
            _ => warn!("Skipping {:?}, not a PEM certificate", file_path),
        }
    }
    debug!("Loaded {} root certificate(s) from {:?}", certs.len(), path);
    Ok(certs)
}

impl EsResponse {
    pub fn get_status(&self) -> StatusCode {
        self.status
    }
    pub fn into_body(self) -> String {
        self.body
    }

    pub fn parse<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| LoaderError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl EsClient {
    pub fn new(endpoint: Endpoint, http_client: Client) -> Self {
        Self {
            endpoint,
            http_client,
        }
    }

    /// Sends one JSON request and hands back whatever the store answered.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<EsResponse> {
        debug!("{} {} {:?}", method, path, query);

        let mut request_builder = self
            .http_client
            .request(method, format!("{}{}", self.endpoint.get_url(), path));
        request_builder = inject_auth(request_builder, &self.endpoint);
        if !query.is_empty() {
            request_builder = request_builder.query(query);
        }
        if let Some(body) = body {
            request_builder = request_builder
                .header(CONTENT_TYPE, "application/json")
                .body(body);
        }
        if let Some(timeout) = self.endpoint.get_timeout() {
            request_builder = request_builder.timeout(timeout);
        }

        let response = request_builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} -> {}", path, status);
        Ok(EsResponse { status, body })
    }

    /// Like [`EsClient::call`], but any non-2xx status is an error.
    pub async fn call_ok(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<EsResponse> {
        let response = self.call(method.clone(), path, query, body).await?;
        if !response.status.is_success() {
            return Err(LoaderError::Status {
                method,
                path: path.to_string(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call_ok(Method::GET, path, &[], None).await?.parse(path)
    }

    pub async fn server_info(&self) -> Result<ServerInfo> {
        self.get_json("/").await
    }

    pub async fn print_server_info(&self, prefix: &str) -> Option<ServerInfo> {
        match self.server_info().await {
            Ok(server_info) => {
                info!(
                    "{}: hostname={}, name={}, uuid={:?}, version={}, lucene={}",
                    prefix,
                    server_info.get_hostname(),
                    server_info.get_name(),
                    server_info.get_uuid(),
                    server_info.get_version(),
                    server_info.get_lucene_version()
                );
                Some(server_info)
            }
            Err(e) => {
                warn!("{}: unable to read server info from {}: {}", prefix, self.endpoint.get_url(), e);
                None
            }
        }
    }
}
