//! Content service behaviour against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository};
use quill_core::services::{
    CommentService, NewComment, NewPost, PostChanges, PostService, ProfileInput, UserService,
};
use quill_infra::InMemoryStore;

struct Fixture {
    store: Arc<InMemoryStore>,
    posts: PostService,
    comments: CommentService,
    users: UserService,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    Fixture {
        posts: PostService::new(store.clone(), store.clone()),
        comments: CommentService::new(store.clone(), store.clone()),
        users: UserService::new(store.clone(), store.clone(), store.clone()),
        store,
    }
}

fn new_post(title: &str, content: &str, author: &str) -> NewPost {
    NewPost {
        title: Some(title.into()),
        content: Some(content.into()),
        author_id: Some(author.into()),
        ..Default::default()
    }
}

fn new_comment(post_id: Uuid, content: &str, author: &str) -> NewComment {
    NewComment {
        post_id: Some(post_id.to_string()),
        content: Some(content.into()),
        author_id: Some(author.into()),
    }
}

fn profile(uid: &str, username: &str) -> ProfileInput {
    ProfileInput {
        firebase_uid: Some(uid.into()),
        email: Some(format!("{uid}@example.com")),
        username: Some(username.into()),
        display_name: Some(username.to_uppercase()),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_post_derives_excerpt_and_reading_time() {
    let fx = fixture();
    let content = "word ".repeat(250);

    let post = fx.posts.create(new_post("Hi", &content, "u1")).await.unwrap();
    let stored = fx.posts.get(post.id).await.unwrap();

    assert_eq!(stored.reading_time, 2);
    assert_eq!(stored.excerpt, format!("{}...", &content[..150]));
    assert_eq!(stored.created_at, stored.updated_at);
}

#[tokio::test]
async fn create_post_reports_all_missing_fields() {
    let fx = fixture();

    let err = fx.posts.create(NewPost::default()).await.unwrap_err();

    match err {
        DomainError::Validation(errors) => {
            assert_eq!(
                errors.fields().collect::<Vec<_>>(),
                vec!["title", "content", "authorId"]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(fx.posts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_recomputes_derived_fields() {
    let fx = fixture();
    let post = fx.posts.create(new_post("Hi", "short", "u1")).await.unwrap();
    let content = "word ".repeat(450);

    let updated = fx
        .posts
        .update(
            post.id,
            Some("u1"),
            PostChanges {
                title: Some("Hello".into()),
                content: Some(content.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Hello");
    assert_eq!(updated.reading_time, 3);
    assert_eq!(updated.excerpt, format!("{}...", &content[..150]));
    assert!(updated.updated_at >= post.updated_at);
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete_post() {
    let fx = fixture();
    let post = fx.posts.create(new_post("Hi", "body", "u1")).await.unwrap();

    let update = fx
        .posts
        .update(
            post.id,
            Some("u2"),
            PostChanges {
                title: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(update, Err(DomainError::Forbidden { .. })));

    let delete = fx.posts.delete(post.id, Some("u2")).await;
    assert!(matches!(delete, Err(DomainError::Forbidden { .. })));

    let missing_actor = fx.posts.delete(post.id, None).await;
    assert!(matches!(missing_actor, Err(DomainError::Forbidden { .. })));

    let unchanged = fx.posts.get(post.id).await.unwrap();
    assert_eq!(unchanged.title, "Hi");
    assert_eq!(unchanged.updated_at, post.updated_at);
}

#[tokio::test]
async fn not_found_comes_before_forbidden() {
    let fx = fixture();

    let result = fx.posts.delete(Uuid::new_v4(), Some("u1")).await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound {
            entity_type: "Post",
            ..
        })
    ));
}

#[tokio::test]
async fn deleting_post_cascades_to_comments() {
    let fx = fixture();
    let post = fx.posts.create(new_post("Hi", "body", "u1")).await.unwrap();
    let keep = fx.posts.create(new_post("Other", "body", "u1")).await.unwrap();
    for author in ["u2", "u3"] {
        fx.comments
            .create(new_comment(post.id, "nice", author))
            .await
            .unwrap();
    }
    let survivor = fx
        .comments
        .create(new_comment(keep.id, "still here", "u2"))
        .await
        .unwrap();

    let removed = fx.posts.delete(post.id, Some("u1")).await.unwrap();

    assert_eq!(removed, 2);
    assert!(matches!(
        fx.posts.get(post.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(fx.comments.list_by_post(post.id).await.unwrap().is_empty());
    assert_eq!(fx.comments.get(survivor.id).await.unwrap().content, "still here");
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let fx = fixture();
    let missing = Uuid::new_v4();

    let result = fx.comments.create(new_comment(missing, "hello", "u1")).await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound {
            entity_type: "Post",
            ..
        })
    ));
    assert!(fx.comments.list_by_post(missing).await.unwrap().is_empty());
    assert!(fx.comments.list_by_author("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn non_owner_cannot_delete_comment() {
    let fx = fixture();
    let post = fx.posts.create(new_post("P", "body", "u1")).await.unwrap();
    let comment = fx
        .comments
        .create(new_comment(post.id, "first", "u1"))
        .await
        .unwrap();

    let result = fx.comments.delete(comment.id, Some("u2")).await;
    assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    assert_eq!(fx.comments.get(comment.id).await.unwrap().content, "first");

    let edit = fx
        .comments
        .update(comment.id, Some("u2"), Some("changed".into()))
        .await;
    assert!(matches!(edit, Err(DomainError::Forbidden { .. })));
    assert_eq!(fx.comments.get(comment.id).await.unwrap().content, "first");
}

#[tokio::test]
async fn owner_edits_and_deletes_comment() {
    let fx = fixture();
    let post = fx.posts.create(new_post("P", "body", "u1")).await.unwrap();
    let comment = fx
        .comments
        .create(new_comment(post.id, "first", "u2"))
        .await
        .unwrap();

    let edited = fx
        .comments
        .update(comment.id, Some("u2"), Some("edited".into()))
        .await
        .unwrap();
    assert_eq!(edited.content, "edited");
    assert!(edited.updated_at >= comment.updated_at);

    let blank = fx.comments.update(comment.id, Some("u2"), Some("  ".into())).await;
    assert!(matches!(blank, Err(DomainError::Validation(_))));

    fx.comments.delete(comment.id, Some("u2")).await.unwrap();
    assert!(matches!(
        fx.comments.get(comment.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn listings_are_ordered() {
    let fx = fixture();
    let base = Utc::now();

    for (title, minutes) in [("old", 0), ("new", 20), ("mid", 10)] {
        let mut post = Post::new("u1".into(), title.into(), "body".into());
        post.created_at = base + Duration::minutes(minutes);
        BaseRepository::<Post, Uuid>::insert(fx.store.as_ref(), post)
            .await
            .unwrap();
    }
    let titles: Vec<_> = fx
        .posts
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["new", "mid", "old"]);

    let post = fx.posts.create(new_post("thread", "body", "u1")).await.unwrap();
    for (text, minutes) in [("second", 2), ("first", 1), ("third", 3)] {
        let mut comment = Comment::new(post.id, "u2".into(), text.into());
        comment.created_at = base + Duration::minutes(minutes);
        BaseRepository::<Comment, Uuid>::insert(fx.store.as_ref(), comment)
            .await
            .unwrap();
    }
    let thread: Vec<_> = fx
        .comments
        .list_by_post(post.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.content)
        .collect();
    assert_eq!(thread, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn comments_count_is_computed_on_read() {
    let fx = fixture();
    let post = fx.posts.create(new_post("P", "body", "u1")).await.unwrap();
    assert_eq!(post.comments_count, 0);

    for _ in 0..3 {
        fx.comments
            .create(new_comment(post.id, "hey", "u2"))
            .await
            .unwrap();
    }

    assert_eq!(fx.posts.get(post.id).await.unwrap().comments_count, 3);
    assert_eq!(fx.posts.list().await.unwrap()[0].comments_count, 3);
}

#[tokio::test]
async fn username_taken_by_other_uid_is_rejected() {
    let fx = fixture();
    let ada = fx.users.upsert(profile("fb-1", "ada")).await.unwrap();
    let bob = fx.users.upsert(profile("fb-2", "bob")).await.unwrap();

    let result = fx.users.upsert(profile("fb-2", "ada")).await;
    assert!(matches!(result, Err(DomainError::Duplicate(_))));

    let ada_after = fx.users.get("fb-1").await.unwrap();
    let bob_after = fx.users.get("fb-2").await.unwrap();
    assert_eq!(ada_after.username, ada.username);
    assert_eq!(bob_after.username, bob.username);
    assert_eq!(bob_after.updated_at, bob.updated_at);
}

#[tokio::test]
async fn upsert_is_idempotent_for_same_uid() {
    let fx = fixture();
    let first = fx.users.upsert(profile("fb-1", "ada")).await.unwrap();

    let mut changed = profile("fb-1", "ada");
    changed.bio = Some("Mathematician".into());
    let second = fx.users.upsert(changed).await.unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.bio, "Mathematician");
    assert_eq!(fx.users.get_by_username("ada").await.unwrap().firebase_uid, "fb-1");
}

#[tokio::test]
async fn profile_photo_requires_reference_and_user() {
    let fx = fixture();
    fx.users.upsert(profile("fb-1", "ada")).await.unwrap();

    let missing_ref = fx
        .users
        .update_profile_photo(Some("fb-1".into()), None)
        .await;
    assert!(matches!(missing_ref, Err(DomainError::Validation(_))));

    let missing_user = fx
        .users
        .update_profile_photo(Some("fb-9".into()), Some("/uploads/x.png".into()))
        .await;
    assert!(matches!(missing_user, Err(DomainError::NotFound { .. })));

    let photo = fx
        .users
        .update_profile_photo(Some("fb-1".into()), Some("/uploads/ada.png".into()))
        .await
        .unwrap();
    assert_eq!(photo, "/uploads/ada.png");
    assert_eq!(
        fx.users.get("fb-1").await.unwrap().profile_photo.as_deref(),
        Some("/uploads/ada.png")
    );
}

#[tokio::test]
async fn stats_aggregate_on_demand() {
    let fx = fixture();
    let a = fx.posts.create(new_post("A", "body", "u1")).await.unwrap();
    let b = fx.posts.create(new_post("B", "body", "u1")).await.unwrap();
    fx.posts.create(new_post("C", "body", "u2")).await.unwrap();

    fx.posts.toggle_like(a.id, Some("u2".into())).await.unwrap();
    fx.posts.toggle_like(a.id, Some("u3".into())).await.unwrap();
    fx.posts.toggle_like(b.id, Some("u2".into())).await.unwrap();
    fx.comments.create(new_comment(b.id, "self reply", "u1")).await.unwrap();

    let stats = fx.users.stats("u1").await.unwrap();
    assert_eq!(stats.posts_count, 2);
    assert_eq!(stats.comments_count, 1);
    assert_eq!(stats.likes_received, 3);

    // Unliking is reflected immediately; nothing is cached.
    fx.posts.toggle_like(a.id, Some("u3".into())).await.unwrap();
    assert_eq!(fx.users.stats("u1").await.unwrap().likes_received, 2);
}

#[tokio::test]
async fn list_by_author_is_newest_first() {
    let fx = fixture();
    let base = Utc::now();
    for (title, author, minutes) in [("a1", "u1", 1), ("b1", "u2", 2), ("a2", "u1", 3)] {
        let mut post = Post::new(author.into(), title.into(), "body".into());
        post.created_at = base + Duration::minutes(minutes);
        BaseRepository::<Post, Uuid>::insert(fx.store.as_ref(), post)
            .await
            .unwrap();
    }

    let titles: Vec<_> = fx
        .posts
        .list_by_author("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["a2", "a1"]);
}

/// Post store where every load races with a delete: the post (and its
/// comments) are cascaded away right after the copy is handed out.
struct DeletedAfterLoad(Arc<InMemoryStore>);

#[async_trait]
impl BaseRepository<Post, Uuid> for DeletedAfterLoad {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let post = BaseRepository::<Post, Uuid>::find_by_id(self.0.as_ref(), id).await?;
        if post.is_some() {
            self.0.delete_cascade(id).await?;
        }
        Ok(post)
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        BaseRepository::<Post, Uuid>::insert(self.0.as_ref(), post).await
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        BaseRepository::<Post, Uuid>::update(self.0.as_ref(), post).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        BaseRepository::<Post, Uuid>::delete(self.0.as_ref(), id).await
    }
}

#[async_trait]
impl PostRepository for DeletedAfterLoad {
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        self.0.list_newest_first().await
    }

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, RepoError> {
        PostRepository::find_by_author(self.0.as_ref(), author_id).await
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<u64, RepoError> {
        self.0.delete_cascade(id).await
    }
}

#[tokio::test]
async fn writes_racing_a_delete_do_not_recreate_the_post() {
    let store = Arc::new(InMemoryStore::new());
    let plain = PostService::new(store.clone(), store.clone());
    let racing = PostService::new(Arc::new(DeletedAfterLoad(store.clone())), store.clone());
    let comments = CommentService::new(store.clone(), store.clone());

    let post = plain.create(new_post("A", "body", "u1")).await.unwrap();
    comments
        .create(new_comment(post.id, "hi", "u2"))
        .await
        .unwrap();

    let err = racing
        .toggle_like(post.id, Some("u3".into()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound { entity_type: "Post", .. }
    ));

    // Second attempt finds nothing to load at all.
    let changes = PostChanges {
        title: Some("Edited".into()),
        ..Default::default()
    };
    assert!(matches!(
        racing.update(post.id, Some("u1"), changes).await,
        Err(DomainError::NotFound { .. })
    ));

    assert!(matches!(
        plain.get(post.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(plain.list().await.unwrap().is_empty());
    assert!(store.find_by_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn comment_edit_after_its_post_is_deleted_is_not_found() {
    let fx = fixture();
    let post = fx.posts.create(new_post("A", "body", "u1")).await.unwrap();
    let comment = fx
        .comments
        .create(new_comment(post.id, "hi", "u2"))
        .await
        .unwrap();

    fx.posts.delete(post.id, Some("u1")).await.unwrap();

    let mut stale = comment.clone();
    stale.edit("edited".into());
    assert!(matches!(
        BaseRepository::<Comment, Uuid>::update(fx.store.as_ref(), stale).await,
        Err(RepoError::NotFound)
    ));
    assert!(matches!(
        fx.comments.update(comment.id, Some("u2"), Some("edited".into())).await,
        Err(DomainError::NotFound { entity_type: "Comment", .. })
    ));
    assert!(fx.store.find_by_post(post.id).await.unwrap().is_empty());
}
