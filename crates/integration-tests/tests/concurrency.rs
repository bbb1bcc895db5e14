//! Lost-update checks: concurrent voters on one post are serialized in some
//! order, but every transition is applied exactly once.


use std::sync::Arc;

use chrono::Utc;
use domains::{Session, UserDirectory, VoteValue};
use fixtures::{session_ttl, signed_up, stack, text_draft, TestStack};
use uuid::Uuid;

/// A live session without the Argon2 round trip, so spawning dozens of
/// distinct users stays fast. The directory still has to know each user.
async fn fast_user(stack: &TestStack, login: &str) -> Session {
    let user_id = Uuid::now_v7();
    stack.directory.register_user(user_id, login).await.unwrap();
    let now = Utc::now();
    Session {
        token: format!("test-{user_id}"),
        user_id,
        login: login.into(),
        created: now,
        expires: now + session_ttl(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn fifty_concurrent_upvotes_all_land() {
    let stack = Arc::new(stack());
    let author = signed_up(&stack, "author").await;
    let post = stack
        .posts
        .create_post(&author, text_draft("c", "t"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..50 {
        let voter = fast_user(&stack, &format!("user{i}")).await;
        let stack = Arc::clone(&stack);
        let post_id = post.id;
        handles.push(tokio::spawn(async move {
            stack.posts.vote(&voter, post_id, VoteValue::Up).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let view = stack.posts.post(post.id).await.unwrap();
    assert_eq!(view.score, 50);
    assert_eq!(view.upvote_percentage, 100);
    assert_eq!(view.votes.len(), 50);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_flips_converge_on_final_votes() {
    let stack = Arc::new(stack());
    let author = signed_up(&stack, "author").await;
    let post = stack
        .posts
        .create_post(&author, text_draft("c", "t"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let voter = fast_user(&stack, &format!("flipper{i}")).await;
        let stack = Arc::clone(&stack);
        let post_id = post.id;
        handles.push(tokio::spawn(async move {
            // each user's own ops are ordered; users interleave freely
            stack.posts.vote(&voter, post_id, VoteValue::Down).await.unwrap();
            stack.posts.vote(&voter, post_id, VoteValue::Up).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // final aggregates reflect each user's final vote, regardless of order
    let view = stack.posts.post(post.id).await.unwrap();
    assert_eq!(view.score, 20);
    assert_eq!(view.upvote_percentage, 100);
    assert_eq!(view.votes.len(), 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_cast_then_retract_nets_to_zero() {
    let stack = Arc::new(stack());
    let author = signed_up(&stack, "author").await;
    let post = stack
        .posts
        .create_post(&author, text_draft("c", "t"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..30 {
        let voter = fast_user(&stack, &format!("ghost{i}")).await;
        let stack = Arc::clone(&stack);
        let post_id = post.id;
        handles.push(tokio::spawn(async move {
            stack.posts.vote(&voter, post_id, VoteValue::Up).await.unwrap();
            stack.posts.unvote(&voter, post_id).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let view = stack.posts.post(post.id).await.unwrap();
    assert_eq!(view.score, 0);
    assert_eq!(view.upvote_percentage, 0);
    assert!(view.votes.is_empty());
}
