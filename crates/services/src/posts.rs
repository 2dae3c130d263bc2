//! # Post lifecycle
//!
//! Create, edit and delete orchestration. The blob store is written
//! before the post record references it, so a failed image upload never
//! leaves a record pointing at nothing. Record writes stay independent
//! single-document operations; there is no cross-store transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use domains::error::DomainResult;
use domains::models::{Post, PostChanges, PostStatus, Upload};
use domains::ports::{BlobStore, PostStore};

/// Validated form input for creating or editing a post.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub publish_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    blobs: Arc<dyn BlobStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { posts, blobs }
    }

    pub async fn find(&self, id: Uuid) -> DomainResult<Option<Post>> {
        self.posts.find(id).await
    }

    pub async fn list_published(&self) -> DomainResult<Vec<Post>> {
        self.posts.list_published().await
    }

    pub async fn list_by_author(&self, author: &str) -> DomainResult<Vec<Post>> {
        self.posts.list_by_author(author).await
    }

    pub async fn list_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Post>> {
        self.posts.list_by_ids(ids).await
    }

    /// Create a post owned by `author`. The image, when present, is
    /// stored first; if that fails the record is never written.
    pub async fn create(
        &self,
        author: &str,
        input: PostInput,
        image: Option<Upload>,
    ) -> DomainResult<Post> {
        let image_id = match image {
            Some(upload) => Some(self.blobs.put(upload.bytes, &upload.filename).await?),
            None => None,
        };
        let post = Post {
            id: Uuid::now_v7(),
            title: input.title,
            content: input.content,
            author: author.to_owned(),
            status: input.status,
            publish_date: input.publish_date,
            image_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.posts.insert(post.clone()).await?;
        info!(post_id = %post.id, author = %post.author, "post created");
        Ok(post)
    }

    /// Apply edits to an existing post. Field changes and the image
    /// reference swap are independent writes; the replaced image's blob
    /// is removed once the new reference is in place.
    pub async fn update(
        &self,
        post: &Post,
        input: PostInput,
        image: Option<Upload>,
    ) -> DomainResult<()> {
        let changes = PostChanges {
            title: input.title,
            content: input.content,
            status: input.status,
            publish_date: input.publish_date,
            updated_at: Utc::now(),
        };
        self.posts.update_content(post.id, changes).await?;

        if let Some(upload) = image {
            let new_id = self.blobs.put(upload.bytes, &upload.filename).await?;
            self.posts.set_image(post.id, new_id).await?;
            if let Some(old_id) = post.image_id {
                if let Err(err) = self.blobs.delete(old_id).await {
                    warn!(blob_id = %old_id, %err, "failed to delete replaced post image");
                }
            }
        }
        info!(post_id = %post.id, "post updated");
        Ok(())
    }

    /// Delete a post and, best effort, its stored image.
    pub async fn delete(&self, post: &Post) -> DomainResult<()> {
        self.posts.delete(post.id).await?;
        if let Some(image_id) = post.image_id {
            if let Err(err) = self.blobs.delete(image_id).await {
                warn!(blob_id = %image_id, %err, "failed to delete post image");
            }
        }
        info!(post_id = %post.id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use domains::error::DomainError;
    use domains::ports::{MockBlobStore, MockPostStore};
    use mockall::Sequence;

    fn input() -> PostInput {
        PostInput {
            title: "Miso ramen".to_owned(),
            content: "Broth first.".to_owned(),
            status: PostStatus::Published,
            publish_date: Utc::now(),
        }
    }

    fn upload() -> Upload {
        Upload {
            filename: "ramen.jpg".to_owned(),
            bytes: Bytes::from_static(b"jpeg bytes"),
        }
    }

    fn existing_post(image_id: Option<Uuid>) -> Post {
        Post {
            id: Uuid::now_v7(),
            title: "Old title".to_owned(),
            content: "Old content".to_owned(),
            author: "cook@example.com".to_owned(),
            status: PostStatus::Draft,
            publish_date: Utc::now(),
            image_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn create_stores_the_image_before_the_record() {
        let blob_id = Uuid::now_v7();
        let mut blobs = MockBlobStore::new();
        let mut posts = MockPostStore::new();
        let mut seq = Sequence::new();

        blobs
            .expect_put()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(blob_id));
        posts
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .withf(move |post| post.image_id == Some(blob_id))
            .returning(|_| Ok(()));

        let service = PostService::new(Arc::new(posts), Arc::new(blobs));
        let post = service
            .create("cook@example.com", input(), Some(upload()))
            .await
            .unwrap();
        assert_eq!(post.author, "cook@example.com");
        assert_eq!(post.image_id, Some(blob_id));
    }

    #[tokio::test]
    async fn failed_image_upload_aborts_the_create() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_put()
            .returning(|_, _| Err(DomainError::Internal("disk full".to_owned())));
        // No insert expectation: a record write would panic the mock.
        let posts = MockPostStore::new();

        let service = PostService::new(Arc::new(posts), Arc::new(blobs));
        let result = service
            .create("cook@example.com", input(), Some(upload()))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn replacing_an_image_deletes_the_old_blob() {
        let old_id = Uuid::now_v7();
        let new_id = Uuid::now_v7();
        let post = existing_post(Some(old_id));

        let mut posts = MockPostStore::new();
        posts.expect_update_content().returning(|_, _| Ok(()));
        posts
            .expect_set_image()
            .withf(move |_, id| *id == new_id)
            .returning(|_, _| Ok(()));

        let mut blobs = MockBlobStore::new();
        blobs.expect_put().returning(move |_, _| Ok(new_id));
        blobs
            .expect_delete()
            .times(1)
            .withf(move |id| *id == old_id)
            .returning(|_| Ok(()));

        let service = PostService::new(Arc::new(posts), Arc::new(blobs));
        service.update(&post, input(), Some(upload())).await.unwrap();
    }

    #[tokio::test]
    async fn delete_cascades_to_the_blob() {
        let image_id = Uuid::now_v7();
        let post = existing_post(Some(image_id));

        let mut posts = MockPostStore::new();
        posts.expect_delete().times(1).returning(|_| Ok(()));
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_delete()
            .times(1)
            .withf(move |id| *id == image_id)
            .returning(|_| Ok(()));

        let service = PostService::new(Arc::new(posts), Arc::new(blobs));
        service.delete(&post).await.unwrap();
    }

    #[tokio::test]
    async fn a_failed_blob_delete_does_not_fail_the_post_delete() {
        let post = existing_post(Some(Uuid::now_v7()));

        let mut posts = MockPostStore::new();
        posts.expect_delete().returning(|_| Ok(()));
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_delete()
            .returning(|_| Err(DomainError::Internal("io".to_owned())));

        let service = PostService::new(Arc::new(posts), Arc::new(blobs));
        assert!(service.delete(&post).await.is_ok());
    }
}
