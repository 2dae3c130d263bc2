//! In-memory `UserStore` / `PostStore`. DashMap gives per-shard locking;
//! every mutation here happens under a single shard guard, which is what
//! makes the pin operations idempotent under concurrent requests.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use domains::error::{DomainError, DomainResult};
use domains::models::{Post, PostChanges, PostStatus, ProfileFields, User};
use domains::ports::{PostStore, UserStore};

/// Users keyed by email, the identity key everything else reasons about.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: User) -> DomainResult<()> {
        if self.users.contains_key(&user.email) {
            return Err(DomainError::Conflict(format!(
                "user {} already exists",
                user.email
            )));
        }
        self.users.insert(user.email.clone(), user);
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> DomainResult<()> {
        if let Some(mut entry) = self.users.iter_mut().find(|entry| entry.id == id) {
            entry.name = fields.name;
            entry.address = fields.address;
            entry.bio = fields.bio;
            entry.theme = fields.theme;
        }
        Ok(())
    }

    async fn set_confirmed(&self, email: &str) -> DomainResult<()> {
        if let Some(mut entry) = self.users.get_mut(email) {
            entry.is_confirmed = true;
        }
        Ok(())
    }

    async fn set_image(&self, id: Uuid, image_id: Option<Uuid>) -> DomainResult<()> {
        if let Some(mut entry) = self.users.iter_mut().find(|entry| entry.id == id) {
            entry.image_id = image_id;
        }
        Ok(())
    }

    async fn add_pin(&self, email: &str, post_id: Uuid) -> DomainResult<()> {
        if let Some(mut entry) = self.users.get_mut(email) {
            if !entry.pinned.contains(&post_id) {
                entry.pinned.push(post_id);
            }
        }
        Ok(())
    }

    async fn remove_pin(&self, email: &str, post_id: Uuid) -> DomainResult<()> {
        if let Some(mut entry) = self.users.get_mut(email) {
            entry.pinned.retain(|pinned| *pinned != post_id);
        }
        Ok(())
    }

    async fn list_all(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}

/// Posts keyed by id.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: DashMap<Uuid, Post>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn find(&self, id: Uuid) -> DomainResult<Option<Post>> {
        Ok(self.posts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_published(&self) -> DomainResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| entry.status == PostStatus::Published)
            .map(|entry| entry.value().clone())
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn list_by_author(&self, author: &str) -> DomainResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| entry.author == author)
            .map(|entry| entry.value().clone())
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Post>> {
        let mut posts: Vec<Post> = ids
            .iter()
            .filter_map(|id| self.posts.get(id).map(|entry| entry.value().clone()))
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn insert(&self, post: Post) -> DomainResult<()> {
        self.posts.insert(post.id, post);
        Ok(())
    }

    async fn update_content(&self, id: Uuid, changes: PostChanges) -> DomainResult<()> {
        if let Some(mut entry) = self.posts.get_mut(&id) {
            entry.title = changes.title;
            entry.content = changes.content;
            entry.status = changes.status;
            entry.publish_date = changes.publish_date;
            entry.updated_at = Some(changes.updated_at);
        }
        Ok(())
    }

    async fn set_image(&self, id: Uuid, image_id: Uuid) -> DomainResult<()> {
        if let Some(mut entry) = self.posts.get_mut(&id) {
            entry.image_id = Some(image_id);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.posts.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post_at(author: &str, status: PostStatus, year: i32) -> Post {
        Post {
            id: Uuid::now_v7(),
            title: format!("Dish of {year}"),
            content: "Cook it.".to_owned(),
            author: author.to_owned(),
            status,
            publish_date: Utc.with_ymd_and_hms(year, 1, 1, 12, 0, 0).unwrap(),
            image_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn repeated_pins_do_not_duplicate() {
        let store = MemoryUserStore::new();
        let user = User::register("cook@example.com", "Cook", "hash".to_owned());
        store.insert(user).await.unwrap();

        let post_id = Uuid::now_v7();
        store.add_pin("cook@example.com", post_id).await.unwrap();
        store.add_pin("cook@example.com", post_id).await.unwrap();
        store.add_pin("cook@example.com", post_id).await.unwrap();

        let stored = store
            .find_by_email("cook@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.pinned, vec![post_id]);
    }

    #[tokio::test]
    async fn published_listing_excludes_drafts_and_sorts_newest_first() {
        let store = MemoryPostStore::new();
        store
            .insert(post_at("a@example.com", PostStatus::Published, 2023))
            .await
            .unwrap();
        store
            .insert(post_at("a@example.com", PostStatus::Published, 2025))
            .await
            .unwrap();
        store
            .insert(post_at("a@example.com", PostStatus::Draft, 2026))
            .await
            .unwrap();

        let listed = store.list_published().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Dish of 2025");
        assert_eq!(listed[1].title, "Dish of 2023");
    }

    #[tokio::test]
    async fn duplicate_email_insert_is_a_conflict() {
        let store = MemoryUserStore::new();
        store
            .insert(User::register("dup@example.com", "First", "h1".to_owned()))
            .await
            .unwrap();
        let err = store
            .insert(User::register("dup@example.com", "Second", "h2".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
