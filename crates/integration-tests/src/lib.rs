//! Shared fixtures for the integration suites: a fully wired in-memory
//! application, seeded records, and request plumbing for driving the
//! router through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use uuid::Uuid;

use auth_adapters::{Argon2Hasher, CookieSessions, TimedSigner};
use domains::models::{Post, PostStatus, User};
use domains::ports::{CredentialHasher, PostStore, SessionProvider, UserStore};
use mail_adapters::RecordingMailer;
use services::{AccountService, PostService};
use storage_adapters::media::MemoryBlobStore;
use storage_adapters::memory::{MemoryPostStore, MemoryUserStore};

pub const SECRET: &[u8] = b"integration-suite-secret";
pub const PUBLIC_URL: &str = "http://dishboard.test";
pub const CONFIRM_MAX_AGE: Duration = Duration::from_secs(3600);

/// The whole application over in-memory adapters, with direct handles to
/// every store so tests can seed and inspect state.
pub struct TestApp {
    pub users: Arc<MemoryUserStore>,
    pub posts: Arc<MemoryPostStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub mailer: Arc<RecordingMailer>,
    pub sessions: Arc<CookieSessions>,
    pub accounts: AccountService,
    pub post_service: PostService,
    #[cfg(feature = "web-axum")]
    pub router: axum::Router,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let posts = Arc::new(MemoryPostStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let sessions = Arc::new(CookieSessions::new(SECRET, Duration::from_secs(86400)));
        let accounts = AccountService::new(
            users.clone(),
            blobs.clone(),
            Arc::new(Argon2Hasher),
            Arc::new(TimedSigner::new(SECRET, "email-confirm")),
            mailer.clone(),
            PUBLIC_URL.to_owned(),
            CONFIRM_MAX_AGE,
        );
        let post_service = PostService::new(posts.clone(), blobs.clone());
        #[cfg(feature = "web-axum")]
        let router = api_adapters::build_router(api_adapters::AppState {
            posts: post_service.clone(),
            accounts: accounts.clone(),
            post_store: posts.clone(),
            blob_store: blobs.clone(),
            sessions: sessions.clone(),
        });
        Self {
            users,
            posts,
            blobs,
            mailer,
            sessions,
            accounts,
            post_service,
            #[cfg(feature = "web-axum")]
            router,
        }
    }

    /// Insert a user directly, bypassing the registration flow.
    pub async fn seed_user(
        &self,
        email: &str,
        password: &str,
        confirmed: bool,
        admin: bool,
    ) -> User {
        let hash = Argon2Hasher.hash(password).expect("hashing fixture password");
        let mut user = User::register(email, "Fixture Cook", hash);
        user.is_confirmed = confirmed;
        user.is_admin = admin;
        self.users.insert(user.clone()).await.expect("seeding user");
        user
    }

    /// Insert a post directly.
    pub async fn seed_post(&self, author: &str, title: &str, status: PostStatus) -> Post {
        let post = Post {
            id: Uuid::now_v7(),
            title: title.to_owned(),
            content: "Chop, season, serve.".to_owned(),
            author: author.to_owned(),
            status,
            publish_date: Utc::now(),
            image_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.posts.insert(post.clone()).await.expect("seeding post");
        post
    }

    /// A valid session cookie pair for `email`, as a browser would send
    /// it back.
    pub fn session_cookie(&self, email: &str) -> String {
        let ticket = self.sessions.issue(email, false);
        format!("dishboard_session={}", ticket.value)
    }

    /// The confirmation token from the most recent mail to `email`.
    pub fn confirmation_token(&self, email: &str) -> Option<String> {
        let mail = self.mailer.last_to(email)?;
        let after = mail.html_body.split("/confirm/").nth(1)?;
        Some(after.split('"').next()?.to_owned())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub fn random_email() -> String {
    SafeEmail().fake()
}

#[cfg(feature = "web-axum")]
pub mod web {
    //! Request builders and response probes for the oneshot-driven
    //! router tests.

    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, REFERER, SET_COOKIE};
    use axum::http::{Request, Response};
    use axum::Router;
    use tower::ServiceExt;

    use api_adapters::flash::{self, FlashMessage};

    pub const BOUNDARY: &str = "fixture-boundary";

    async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
        router
            .clone()
            .oneshot(request)
            .await
            .expect("router never errors")
    }

    pub async fn get(router: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        send(router, builder.body(Body::empty()).unwrap()).await
    }

    /// POST an urlencoded form.
    pub async fn post_form(
        router: &Router,
        path: &str,
        cookie: Option<&str>,
        body: &str,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        send(router, builder.body(Body::from(body.to_owned())).unwrap()).await
    }

    /// POST a multipart form, optionally carrying one file part named
    /// `image`.
    pub async fn post_multipart(
        router: &Router,
        path: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(path).header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let body = multipart_body(fields, image);
        send(router, builder.body(Body::from(body)).unwrap()).await
    }

    /// POST with no body, as the pin and delete forms do.
    pub async fn post_empty(
        router: &Router,
        path: &str,
        cookie: Option<&str>,
        referer: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(referer) = referer {
            builder = builder.header(REFERER, referer);
        }
        send(router, builder.body(Body::empty()).unwrap()).await
    }

    pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        if let Some((filename, bytes)) = image {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    /// The `Location` of a redirect response.
    pub fn location(response: &Response<Body>) -> String {
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    }

    /// Flash messages the response stores for the next page view.
    pub fn flash_messages(response: &Response<Body>) -> Vec<FlashMessage> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| {
                let rest = value.strip_prefix("dishboard_flash=")?;
                Some(rest.split(';').next().unwrap_or_default().to_owned())
            })
            .map(|encoded| flash::decode(&encoded))
            .unwrap_or_default()
    }

    /// The session cookie pair a response installs, if any.
    pub fn session_cookie_from(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with("dishboard_session=") && !value.contains("Max-Age=0"))
            .map(|value| value.split(';').next().unwrap_or_default().to_owned())
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("reading response body");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
