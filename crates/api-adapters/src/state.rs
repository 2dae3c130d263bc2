//! Shared application state, assembled once at startup by the binary and
//! injected into every handler. No global mutables.

use std::sync::Arc;

use domains::ports::{BlobStore, PostStore, SessionProvider};
use services::{AccountService, PostService};

#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub accounts: AccountService,
    /// Raw post access for per-request capability derivation.
    pub post_store: Arc<dyn PostStore>,
    /// Raw blob access for the image-serving route.
    pub blob_store: Arc<dyn BlobStore>,
    pub sessions: Arc<dyn SessionProvider>,
}
