//! reqwest-backed implementation of [`RemoteSync`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use folio_api_models::{
    Category, CategoryListResponse, CreateCategoryRequest, CreateFolderRequest,
    CreateFolderResponse, FileDto, FileListResponse, Folder, FolderListResponse, MessageResponse,
    RenameRequest, RetryFailedRequest, UploadResponse, VerifyResponse,
};
use folio_core::{Document, FileId, FolderId, ProgressSnapshot, UserId};

use crate::error::{
    AuthFailure, Operation, SyncError, SyncResult, classify_response, from_reqwest,
};
use crate::remote::{DownloadPayload, ExpandOutcome, RemoteSync, UploadFile};
use crate::retry::RetryPolicy;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const HEADER_USER_ID: &str = "user_id";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bearer credential issued by the external auth service.
#[derive(Clone)]
pub struct Credentials {
    /// User the token belongs to.
    pub user_id: UserId,
    /// Bearer token.
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Transport settings for [`HttpRemote`].
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for idempotent calls.
    pub retry: RetryPolicy,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// HTTP client for the document backend.
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    retry: RetryPolicy,
}

impl HttpRemote {
    /// Build a client stamped with a per-process request id.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] when the HTTP client cannot be built.
    pub fn new(
        base_url: Url,
        credentials: Option<Credentials>,
        options: HttpOptions,
    ) -> SyncResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(&Uuid::new_v4().to_string())
            .map_err(|_| SyncError::validation("request identifier contains invalid characters"))?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| SyncError::validation(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
            retry: options.retry,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> SyncResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SyncError::validation(format!("invalid base URL '{}'", self.base_url)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => builder
                .bearer_auth(&creds.token)
                .header(HEADER_USER_ID, creds.user_id.to_string()),
            None => builder,
        }
    }

    async fn send(&self, operation: Operation, builder: RequestBuilder) -> SyncResult<Response> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|err| from_reqwest(operation, &err))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_response(operation, response).await)
        }
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> SyncResult<T> {
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let response = self.send(operation, builder).await?;
        response.json::<T>().await.map_err(|err| SyncError::Decode {
            operation,
            message: err.to_string(),
        })
    }

    async fn request_unit(
        &self,
        operation: Operation,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> SyncResult<()> {
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        self.send(operation, builder).await.map(|_| ())
    }

    async fn download(&self, url: Url) -> SyncResult<DownloadPayload> {
        let response = self
            .send(Operation::Download, self.client.get(url))
            .await?;
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| from_reqwest(Operation::Download, &err))?;
        Ok(DownloadPayload {
            file_name,
            bytes: bytes.to_vec(),
        })
    }

    async fn list_documents(&self, operation: Operation, url: Url) -> SyncResult<Vec<Document>> {
        let list: FileListResponse = self
            .retry
            .run(operation, || {
                self.request_json(operation, Method::GET, url.clone(), None)
            })
            .await?;
        into_documents(operation, list.files)
    }
}

fn to_body<T: serde::Serialize>(operation: Operation, value: &T) -> SyncResult<Value> {
    serde_json::to_value(value).map_err(|err| SyncError::Decode {
        operation,
        message: err.to_string(),
    })
}

/// Convert a listing, rejecting it when any entry breaks the file contract.
fn into_documents(operation: Operation, files: Vec<FileDto>) -> SyncResult<Vec<Document>> {
    let total = files.len();
    let mut docs = Vec::with_capacity(total);
    let mut rejected = Vec::new();
    for dto in files {
        let file_id = dto.file_id;
        match Document::try_from(dto) {
            Ok(doc) => docs.push(doc),
            Err(err) => {
                warn!(
                    operation = operation.as_str(),
                    file_id,
                    error = %err,
                    "malformed document in listing"
                );
                rejected.push(format!("file {file_id}: {err}"));
            }
        }
    }
    if rejected.is_empty() {
        return Ok(docs);
    }
    Err(SyncError::Decode {
        operation,
        message: format!(
            "{} of {total} documents are malformed ({})",
            rejected.len(),
            rejected.join("; ")
        ),
    })
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// `filename*` (RFC 5987) wins over the plain `filename` parameter.
#[must_use]
pub fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        if let Some(encoded) = param.strip_prefix("filename*=") {
            let encoded = encoded.trim_matches('"');
            let raw = encoded
                .split_once("''")
                .map_or(encoded, |(_, rest)| rest);
            if let Ok(decoded) = urlencoding::decode(raw) {
                let decoded = decoded.into_owned();
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
        } else if let Some(name) = param.strip_prefix("filename=") {
            let name = name.trim_matches('"');
            if !name.is_empty() {
                plain = Some(name.to_string());
            }
        }
    }
    plain
}

#[async_trait]
impl RemoteSync for HttpRemote {
    async fn list_folders(&self, user_id: UserId) -> SyncResult<Vec<Folder>> {
        let operation = Operation::ListFolders;
        let url = self.endpoint(&["folders", &user_id.to_string()])?;
        let list: FolderListResponse = self
            .retry
            .run(operation, || {
                self.request_json(operation, Method::GET, url.clone(), None)
            })
            .await?;
        Ok(list.folders)
    }

    async fn create_folder(&self, user_id: UserId, name: &str) -> SyncResult<FolderId> {
        let operation = Operation::CreateFolder;
        let url = self.endpoint(&["folders", "create"])?;
        let body = to_body(
            operation,
            &CreateFolderRequest {
                user_id,
                folder_name: name.to_string(),
            },
        )?;
        let created: CreateFolderResponse = self
            .retry
            .run(operation, || {
                self.request_json(operation, Method::POST, url.clone(), Some(body.clone()))
            })
            .await?;
        debug!(folder_id = created.folder_id, "folder created");
        Ok(created.folder_id)
    }

    async fn rename_folder(&self, folder_id: FolderId, name: &str) -> SyncResult<()> {
        let operation = Operation::RenameFolder;
        let url = self.endpoint(&["folders", &folder_id.to_string(), "rename"])?;
        let body = to_body(
            operation,
            &RenameRequest {
                new_name: name.to_string(),
            },
        )?;
        self.retry
            .run(operation, || {
                self.request_unit(operation, Method::PATCH, url.clone(), Some(body.clone()))
            })
            .await
    }

    async fn delete_folder(&self, folder_id: FolderId) -> SyncResult<()> {
        let operation = Operation::DeleteFolder;
        let url = self.endpoint(&["folders", &folder_id.to_string()])?;
        self.retry
            .run(operation, || {
                self.request_unit(operation, Method::DELETE, url.clone(), None)
            })
            .await
    }

    async fn list_categories(&self, folder_id: FolderId) -> SyncResult<Vec<Category>> {
        let operation = Operation::ListCategories;
        let url = self.endpoint(&["folders", &folder_id.to_string(), "categories"])?;
        let list: CategoryListResponse = self
            .retry
            .run(operation, || {
                self.request_json(operation, Method::GET, url.clone(), None)
            })
            .await?;
        Ok(list
            .categories
            .into_iter()
            .map(|entry| entry.into_category(folder_id))
            .collect())
    }

    async fn create_category(&self, folder_id: FolderId, name: &str) -> SyncResult<()> {
        let operation = Operation::CreateCategory;
        let url = self.endpoint(&["folders", &folder_id.to_string(), "categories"])?;
        let body = to_body(
            operation,
            &CreateCategoryRequest {
                category_name: name.to_string(),
            },
        )?;
        self.retry
            .run(operation, || {
                self.request_unit(operation, Method::POST, url.clone(), Some(body.clone()))
            })
            .await
    }

    async fn rename_category(
        &self,
        folder_id: FolderId,
        old_name: &str,
        new_name: &str,
    ) -> SyncResult<()> {
        let operation = Operation::RenameCategory;
        let url = self.endpoint(&["folders", &folder_id.to_string(), "categories", old_name])?;
        let body = to_body(
            operation,
            &RenameRequest {
                new_name: new_name.to_string(),
            },
        )?;
        self.retry
            .run(operation, || {
                self.request_unit(operation, Method::PUT, url.clone(), Some(body.clone()))
            })
            .await
    }

    async fn delete_category(&self, folder_id: FolderId, name: &str) -> SyncResult<()> {
        let operation = Operation::DeleteCategory;
        let url = self.endpoint(&["folders", &folder_id.to_string(), "categories", name])?;
        self.retry
            .run(operation, || {
                self.request_unit(operation, Method::DELETE, url.clone(), None)
            })
            .await
    }

    async fn list_category_files(
        &self,
        folder_id: FolderId,
        name: &str,
    ) -> SyncResult<Vec<Document>> {
        let url = self.endpoint(&[
            "folders",
            &folder_id.to_string(),
            "categories",
            name,
            "files",
        ])?;
        self.list_documents(Operation::ListCategoryFiles, url).await
    }

    async fn list_unclassified_files(&self, folder_id: FolderId) -> SyncResult<Vec<Document>> {
        let url = self.endpoint(&["files", &folder_id.to_string(), "unclassified"])?;
        self.list_documents(Operation::ListUnclassified, url).await
    }

    async fn get_progress(&self, folder_id: FolderId) -> SyncResult<ProgressSnapshot> {
        let operation = Operation::Progress;
        let url = self.endpoint(&["folders", &folder_id.to_string(), "progress"])?;
        self.retry
            .run(operation, || {
                self.request_json(operation, Method::GET, url.clone(), None)
            })
            .await
    }

    async fn request_classification(&self, folder_id: FolderId) -> SyncResult<()> {
        let url = self.endpoint(&["folders", &folder_id.to_string(), "classify"])?;
        self.request_unit(Operation::Classify, Method::POST, url, None)
            .await
    }

    async fn retry_failed_classification(&self, folder_id: FolderId) -> SyncResult<()> {
        let operation = Operation::RetryFailed;
        let url = self.endpoint(&["folders", &folder_id.to_string(), "classify", "failed"])?;
        let body = to_body(operation, &RetryFailedRequest::default())?;
        self.request_unit(operation, Method::POST, url, Some(body))
            .await
    }

    async fn delete_file(&self, file_id: FileId) -> SyncResult<()> {
        let operation = Operation::DeleteFile;
        let url = self.endpoint(&["files", &file_id.to_string()])?;
        self.retry
            .run(operation, || {
                self.request_unit(operation, Method::DELETE, url.clone(), None)
            })
            .await
    }

    async fn expand_archive(
        &self,
        folder_id: FolderId,
        file_id: FileId,
    ) -> SyncResult<ExpandOutcome> {
        let operation = Operation::ExpandArchive;
        let url = self.endpoint(&[
            "files",
            "unzip",
            &folder_id.to_string(),
            &file_id.to_string(),
        ])?;
        let response: MessageResponse = self
            .retry
            .run(operation, || {
                self.request_json(operation, Method::POST, url.clone(), None)
            })
            .await?;
        Ok(ExpandOutcome::from_message(response.message))
    }

    async fn upload_files(&self, folder_id: FolderId, files: Vec<UploadFile>) -> SyncResult<u64> {
        let operation = Operation::Upload;
        if files.is_empty() {
            return Err(SyncError::validation("no files selected for upload"));
        }
        let url = self.endpoint(&["files", "upload", &folder_id.to_string()])?;
        let response: UploadResponse = self
            .retry
            .run(operation, || {
                let form = files.iter().fold(Form::new(), |form, file| {
                    form.part(
                        "files",
                        Part::bytes(file.bytes.clone()).file_name(file.file_name.clone()),
                    )
                });
                let builder = self.client.post(url.clone()).multipart(form);
                async move {
                    let response = self.send(operation, builder).await?;
                    response
                        .json::<UploadResponse>()
                        .await
                        .map_err(|err| SyncError::Decode {
                            operation,
                            message: err.to_string(),
                        })
                }
            })
            .await?;
        Ok(response.uploaded)
    }

    async fn download_folder(&self, folder_id: FolderId) -> SyncResult<DownloadPayload> {
        let url = self.endpoint(&["folders", "download", &folder_id.to_string()])?;
        self.retry
            .run(Operation::Download, || self.download(url.clone()))
            .await
    }

    async fn download_category(
        &self,
        folder_id: FolderId,
        name: &str,
    ) -> SyncResult<DownloadPayload> {
        let url = self.endpoint(&[
            "folders",
            "download",
            "category",
            &folder_id.to_string(),
            name,
        ])?;
        self.retry
            .run(Operation::Download, || self.download(url.clone()))
            .await
    }

    async fn download_file(&self, file_id: FileId) -> SyncResult<DownloadPayload> {
        let url = self.endpoint(&["folders", "download", "file", &file_id.to_string()])?;
        self.retry
            .run(Operation::Download, || self.download(url.clone()))
            .await
    }

    async fn verify_session(&self) -> SyncResult<UserId> {
        let operation = Operation::VerifySession;
        let Some(creds) = &self.credentials else {
            return Err(SyncError::Auth(AuthFailure::MissingCredentials));
        };
        let url = self.endpoint(&["auth", "verify"])?;
        let verdict: VerifyResponse = self
            .retry
            .run(operation, || {
                self.request_json(operation, Method::GET, url.clone(), None)
            })
            .await?;
        if verdict.valid && verdict.user_id == creds.user_id {
            Ok(verdict.user_id)
        } else {
            Err(SyncError::Auth(AuthFailure::InvalidKey))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    fn remote_for(server: &MockServer, credentials: Option<Credentials>) -> HttpRemote {
        HttpRemote::new(
            server.base_url().parse().expect("valid URL"),
            credentials,
            HttpOptions {
                timeout: Duration::from_secs(5),
                retry: RetryPolicy {
                    attempts: 3,
                    backoff: Duration::ZERO,
                },
            },
        )
        .expect("client builds")
    }

    fn creds() -> Credentials {
        Credentials {
            user_id: 1,
            token: "tok".into(),
        }
    }

    #[tokio::test]
    async fn list_folders_sends_credentials() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/folders/1")
                .header("authorization", "Bearer tok")
                .header(HEADER_USER_ID, "1");
            then.status(200).json_body(json!({
                "folders": [{"folder_id": 3, "folder_name": "Reports", "file_count": 2}]
            }));
        });

        let folders = remote_for(&server, Some(creds()))
            .list_folders(1)
            .await
            .expect("folders");
        mock.assert();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, "Reports");
    }

    #[tokio::test]
    async fn create_folder_duplicate_surfaces_server_message() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/folders/create")
                .json_body(json!({"user_id": 1, "folder_name": "Reports"}));
            then.status(400)
                .json_body(json!({"detail": "이미 존재하는 폴더 이름입니다."}));
        });

        let err = remote_for(&server, None)
            .create_folder(1, "Reports")
            .await
            .expect_err("duplicate must fail");
        mock.assert_hits(1);
        assert_eq!(
            err,
            SyncError::Conflict {
                message: "이미 존재하는 폴더 이름입니다.".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_documents_fail_the_listing() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/files/3/unclassified");
            then.status(200).json_body(json!({
                "files": [
                    {"file_id": 1, "file_name": "a.pdf", "transform_state": 2, "classification_state": 0},
                    {"file_id": 2, "file_name": "b.pdf", "transform_state": 7, "classification_state": 0}
                ]
            }));
        });

        let err = remote_for(&server, None)
            .list_unclassified_files(3)
            .await
            .expect_err("contract violation");
        mock.assert_hits(1);
        let SyncError::Decode { operation, message } = err else {
            panic!("expected a decode error, got {err:?}");
        };
        assert_eq!(operation, Operation::ListUnclassified);
        assert!(message.starts_with("1 of 2 documents are malformed"), "{message}");
        assert!(message.contains("file 2"), "{message}");
    }

    #[tokio::test]
    async fn progress_is_retried_but_classification_is_not() {
        let server = MockServer::start_async().await;
        let progress = server.mock(|when, then| {
            when.method(GET).path("/folders/3/progress");
            then.status(503);
        });
        let classify = server.mock(|when, then| {
            when.method(POST).path("/folders/3/classify");
            then.status(503);
        });

        let remote = remote_for(&server, None);
        let err = remote.get_progress(3).await.expect_err("unavailable");
        assert!(err.is_retryable());
        progress.assert_hits(3);

        let err = remote
            .request_classification(3)
            .await
            .expect_err("unavailable");
        assert!(matches!(err, SyncError::Server { status: 503, .. }));
        classify.assert_hits(1);
    }

    #[tokio::test]
    async fn retry_failed_sends_flag() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/folders/3/classify/failed")
                .json_body(json!({"retry_failed": true}));
            then.status(202);
        });
        remote_for(&server, None)
            .retry_failed_classification(3)
            .await
            .expect("accepted");
        mock.assert();
    }

    #[tokio::test]
    async fn expand_archive_parses_extracted_count() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/files/unzip/3/9");
            then.status(200)
                .json_body(json!({"message": "3 files extracted"}));
        });
        let outcome = remote_for(&server, None)
            .expand_archive(3, 9)
            .await
            .expect("expanded");
        assert_eq!(outcome.extracted, Some(3));
    }

    #[tokio::test]
    async fn rename_category_targets_old_name() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/folders/3/categories/Invoices")
                .json_body(json!({"new_name": "Bills"}));
            then.status(200);
        });
        remote_for(&server, None)
            .rename_category(3, "Invoices", "Bills")
            .await
            .expect("renamed");
        mock.assert();
    }

    #[tokio::test]
    async fn delete_missing_category_reports_not_found() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path("/folders/3/categories/Gone");
            then.status(404)
                .json_body(json!({"detail": "category not found"}));
        });
        let err = remote_for(&server, None)
            .delete_category(3, "Gone")
            .await
            .expect_err("missing");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn download_reads_suggested_file_name() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/folders/download/3");
            then.status(200)
                .header("content-disposition", "attachment; filename=\"Reports.zip\"")
                .body("PK");
        });
        let payload = remote_for(&server, None)
            .download_folder(3)
            .await
            .expect("payload");
        assert_eq!(payload.file_name.as_deref(), Some("Reports.zip"));
        assert_eq!(payload.bytes, b"PK".to_vec());
    }

    #[tokio::test]
    async fn expired_session_maps_to_auth_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/folders/3/categories");
            then.status(401)
                .json_body(json!({"detail": {"error": "jwt_error"}}));
        });
        let err = remote_for(&server, Some(creds()))
            .list_categories(3)
            .await
            .expect_err("unauthorized");
        assert_eq!(err, SyncError::Auth(AuthFailure::JwtError));
    }

    #[tokio::test]
    async fn verify_session_rejects_foreign_user() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/auth/verify");
            then.status(200).json_body(json!({"valid": true, "user_id": 2}));
        });
        let err = remote_for(&server, Some(creds()))
            .verify_session()
            .await
            .expect_err("foreign user");
        assert_eq!(err, SyncError::Auth(AuthFailure::InvalidKey));

        let missing = remote_for(&server, None)
            .verify_session()
            .await
            .expect_err("no credentials");
        assert_eq!(missing, SyncError::Auth(AuthFailure::MissingCredentials));
    }

    #[tokio::test]
    async fn upload_requires_files() {
        let server = MockServer::start_async().await;
        let err = remote_for(&server, None)
            .upload_files(3, Vec::new())
            .await
            .expect_err("empty upload");
        assert!(matches!(err, SyncError::Validation { .. }));
    }

    #[tokio::test]
    async fn upload_posts_multipart_form() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/files/upload/3");
            then.status(200).json_body(json!({"uploaded": 2}));
        });
        let uploaded = remote_for(&server, None)
            .upload_files(
                3,
                vec![
                    UploadFile {
                        file_name: "a.pdf".into(),
                        bytes: b"%PDF".to_vec(),
                    },
                    UploadFile {
                        file_name: "b.txt".into(),
                        bytes: b"hello".to_vec(),
                    },
                ],
            )
            .await
            .expect("uploaded");
        mock.assert();
        assert_eq!(uploaded, 2);
    }

    #[test]
    fn content_disposition_prefers_extended_name() {
        assert_eq!(
            parse_content_disposition(
                "attachment; filename=\"fallback.zip\"; filename*=UTF-8''%EB%B3%B4%EA%B3%A0%EC%84%9C.zip"
            )
            .as_deref(),
            Some("보고서.zip")
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=plain.pdf").as_deref(),
            Some("plain.pdf")
        );
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn endpoint_encodes_segments_and_keeps_prefix() {
        let remote = HttpRemote::new(
            "http://localhost:8000/api/".parse().expect("url"),
            None,
            HttpOptions::default(),
        )
        .expect("client");
        let url = remote
            .endpoint(&["folders", "3", "categories", "Q1/Q2 notes"])
            .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/folders/3/categories/Q1%2FQ2%20notes"
        );
    }
}
