//! Post orchestration. The repository's vote map is authoritative for the
//! score; the directory's per-user mirror is a derived index. Every vote
//! operation updates both as one logical step: the mirror is written first
//! (so an unknown user aborts before the tally moves) and rolled back if the
//! repository rejects the vote.
//!
//! Concurrent votes by the same user on the same post can commit to the two
//! stores in opposite orders, leaving the mirror disagreeing with the post's
//! map. The divergence persists until that user's next vote or un-vote on the
//! post; mirror writes are last-write-wins, so any later operation repairs it
//! and the post's map stays the source of truth throughout.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use domains::{
    AppError, Comment, PostDraft, PostRepo, PostView, Result, Session, UserDirectory, VoteValue,
};

pub struct PostService {
    repo: Arc<dyn PostRepo>,
    directory: Arc<dyn UserDirectory>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepo>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { repo, directory }
    }

    /// Creates a post authored by the session's user and records the
    /// authorship in the directory. If the directory rejects the author,
    /// the freshly created post is removed again so no orphan survives.
    pub async fn create_post(&self, actor: &Session, draft: PostDraft) -> Result<PostView> {
        let view = self.repo.create(actor.author(), draft).await?;

        if let Err(err) = self.directory.record_authorship(actor.user_id, view.id).await {
            if let Err(cleanup) = self.repo.delete(view.id).await {
                warn!(post_id = %view.id, %cleanup, "could not remove post after authorship failure");
            }
            return Err(err);
        }

        info!(post_id = %view.id, author = %actor.login, "post created");
        Ok(view)
    }

    /// Only the author may delete. Removes the post with its comments,
    /// forgets the authorship, and clears every voter's mirror entry.
    pub async fn delete_post(&self, actor: &Session, post_id: Uuid) -> Result<PostView> {
        let post = self.repo.get(post_id).await?;
        if post.author.id != actor.user_id {
            return Err(AppError::Forbidden(
                "only the author may delete a post".into(),
            ));
        }

        let removed = self.repo.delete(post_id).await?;

        // Directory entries for a deleted post are stale derived state;
        // cleanup failures are logged, not surfaced.
        if let Err(err) = self.directory.forget_authorship(actor.user_id, post_id).await {
            warn!(post_id = %post_id, %err, "could not forget authorship");
        }
        for vote in &removed.votes {
            if let Err(err) = self.directory.mirror_vote(vote.user, post_id, None).await {
                warn!(post_id = %post_id, voter = %vote.user, %err, "could not clear vote mirror");
            }
        }

        info!(post_id = %post_id, author = %actor.login, "post deleted");
        Ok(removed)
    }

    /// Cast, no-op, or flip the acting user's vote. The mirror write runs
    /// first; if the repository then fails, the mirror is restored to the
    /// prior value so neither side is left half-applied.
    pub async fn vote(&self, actor: &Session, post_id: Uuid, value: VoteValue) -> Result<PostView> {
        let prior = self.directory.current_vote(actor.user_id, post_id).await?;
        self.directory
            .mirror_vote(actor.user_id, post_id, Some(value))
            .await?;

        match self.repo.vote(post_id, actor.user_id, value).await {
            Ok(view) => Ok(view),
            Err(err) => {
                self.restore_mirror(actor.user_id, post_id, prior).await;
                Err(err)
            }
        }
    }

    /// Retract the acting user's vote; a missing prior vote is a no-op.
    pub async fn unvote(&self, actor: &Session, post_id: Uuid) -> Result<PostView> {
        let prior = self.directory.current_vote(actor.user_id, post_id).await?;
        self.directory
            .mirror_vote(actor.user_id, post_id, None)
            .await?;

        match self.repo.unvote(post_id, actor.user_id).await {
            Ok(view) => Ok(view),
            Err(err) => {
                self.restore_mirror(actor.user_id, post_id, prior).await;
                Err(err)
            }
        }
    }

    async fn restore_mirror(&self, user_id: Uuid, post_id: Uuid, prior: Option<VoteValue>) {
        if let Err(err) = self.directory.mirror_vote(user_id, post_id, prior).await {
            warn!(post_id = %post_id, user = %user_id, %err, "vote mirror rollback failed");
        }
    }

    /// What the acting user currently has on this post, in O(1) via the mirror.
    pub async fn my_vote(&self, actor: &Session, post_id: Uuid) -> Result<Option<VoteValue>> {
        self.directory.current_vote(actor.user_id, post_id).await
    }

    pub async fn comment(&self, actor: &Session, post_id: Uuid, body: &str) -> Result<Comment> {
        self.repo.add_comment(post_id, actor.author(), body).await
    }

    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<PostView> {
        self.repo.delete_comment(post_id, comment_id).await
    }

    /// Fetches a post and bumps its view counter.
    pub async fn open_post(&self, post_id: Uuid) -> Result<PostView> {
        self.repo.record_view(post_id).await
    }

    pub async fn post(&self, post_id: Uuid) -> Result<PostView> {
        self.repo.get(post_id).await
    }

    pub async fn posts(&self) -> Result<Vec<PostView>> {
        self.repo.list_all().await
    }

    pub async fn posts_in_category(&self, category: &str) -> Result<Vec<PostView>> {
        self.repo.list_by_category(category).await
    }

    pub async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<PostView>> {
        self.repo.list_by_author(author_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{Author, MockPostRepo, MockUserDirectory, PostContent};
    use mockall::predicate::eq;
    use tokio_test::assert_ok;

    fn session(user_id: Uuid) -> Session {
        let now = Utc::now();
        Session {
            token: "test-token".into(),
            user_id,
            login: "alice".into(),
            created: now,
            expires: now + chrono::Duration::hours(1),
        }
    }

    fn view(post_id: Uuid, author_id: Uuid) -> PostView {
        PostView {
            id: post_id,
            author: Author { id: author_id, username: "alice".into() },
            category: "c".into(),
            title: "t".into(),
            content: PostContent::Text { text: "body".into() },
            created: Utc::now(),
            score: 0,
            upvote_percentage: 0,
            views: 0,
            comments: vec![],
            votes: vec![],
        }
    }

    #[tokio::test]
    async fn vote_updates_mirror_then_repo() {
        let user = Uuid::now_v7();
        let post = Uuid::now_v7();

        let mut directory = MockUserDirectory::new();
        directory
            .expect_current_vote()
            .with(eq(user), eq(post))
            .returning(|_, _| Ok(None));
        directory
            .expect_mirror_vote()
            .with(eq(user), eq(post), eq(Some(VoteValue::Up)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut repo = MockPostRepo::new();
        repo.expect_vote()
            .with(eq(post), eq(user), eq(VoteValue::Up))
            .times(1)
            .returning(move |p, u, _| {
                let mut v = view(p, u);
                v.score = 1;
                Ok(v)
            });

        let service = PostService::new(Arc::new(repo), Arc::new(directory));
        let out = assert_ok!(service.vote(&session(user), post, VoteValue::Up).await);
        assert_eq!(out.score, 1);
    }

    #[tokio::test]
    async fn vote_rolls_back_mirror_when_repo_rejects() {
        let user = Uuid::now_v7();
        let post = Uuid::now_v7();

        let mut directory = MockUserDirectory::new();
        directory
            .expect_current_vote()
            .returning(|_, _| Ok(Some(VoteValue::Down)));
        directory
            .expect_mirror_vote()
            .with(eq(user), eq(post), eq(Some(VoteValue::Up)))
            .times(1)
            .returning(|_, _, _| Ok(()));
        // rollback to the prior value
        directory
            .expect_mirror_vote()
            .with(eq(user), eq(post), eq(Some(VoteValue::Down)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut repo = MockPostRepo::new();
        repo.expect_vote()
            .returning(|p, _, _| Err(AppError::post_not_found(p)));

        let service = PostService::new(Arc::new(repo), Arc::new(directory));
        let err = service
            .vote(&session(user), post, VoteValue::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn vote_by_unknown_user_never_touches_the_post() {
        let user = Uuid::now_v7();
        let post = Uuid::now_v7();

        let mut directory = MockUserDirectory::new();
        directory.expect_current_vote().returning(|_, _| Ok(None));
        directory
            .expect_mirror_vote()
            .returning(|u, _, _| Err(AppError::UnknownUser(u)));

        // no expectation on repo.vote: any call would panic the mock
        let repo = MockPostRepo::new();

        let service = PostService::new(Arc::new(repo), Arc::new(directory));
        let err = service
            .vote(&session(user), post, VoteValue::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownUser(_)));
    }

    #[tokio::test]
    async fn create_rolls_back_post_when_author_is_unknown() {
        let user = Uuid::now_v7();
        let post = Uuid::now_v7();

        let mut repo = MockPostRepo::new();
        repo.expect_create()
            .returning(move |author, _| Ok(view(post, author.id)));
        repo.expect_delete()
            .with(eq(post))
            .times(1)
            .returning(move |p| Ok(view(p, user)));

        let mut directory = MockUserDirectory::new();
        directory
            .expect_record_authorship()
            .returning(|u, _| Err(AppError::UnknownUser(u)));

        let service = PostService::new(Arc::new(repo), Arc::new(directory));
        let draft = PostDraft {
            category: "c".into(),
            title: "t".into(),
            content: PostContent::Text { text: "b".into() },
        };
        let err = service.create_post(&session(user), draft).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownUser(_)));
    }

    #[tokio::test]
    async fn create_rollback_failure_still_reports_the_directory_error() {
        let user = Uuid::now_v7();
        let post = Uuid::now_v7();

        let mut repo = MockPostRepo::new();
        repo.expect_create()
            .returning(move |author, _| Ok(view(post, author.id)));
        // the cleanup delete fails too; the caller still sees UnknownUser
        repo.expect_delete()
            .with(eq(post))
            .times(1)
            .returning(|p| Err(AppError::post_not_found(p)));

        let mut directory = MockUserDirectory::new();
        directory
            .expect_record_authorship()
            .returning(|u, _| Err(AppError::UnknownUser(u)));

        let service = PostService::new(Arc::new(repo), Arc::new(directory));
        let draft = PostDraft {
            category: "c".into(),
            title: "t".into(),
            content: PostContent::Text { text: "b".into() },
        };
        let err = service.create_post(&session(user), draft).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownUser(_)));
    }

    #[tokio::test]
    async fn only_the_author_may_delete() {
        let author = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let post = Uuid::now_v7();

        let mut repo = MockPostRepo::new();
        repo.expect_get()
            .with(eq(post))
            .returning(move |p| Ok(view(p, author)));
        // repo.delete must never run for the stranger

        let directory = MockUserDirectory::new();
        let service = PostService::new(Arc::new(repo), Arc::new(directory));

        let err = service
            .delete_post(&session(stranger), post)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_clears_every_voter_mirror() {
        let author = Uuid::now_v7();
        let voter = Uuid::now_v7();
        let post = Uuid::now_v7();

        let mut repo = MockPostRepo::new();
        repo.expect_get()
            .returning(move |p| Ok(view(p, author)));
        repo.expect_delete().returning(move |p| {
            let mut v = view(p, author);
            v.votes = vec![domains::Vote { user: voter, vote: VoteValue::Up }];
            Ok(v)
        });

        let mut directory = MockUserDirectory::new();
        directory
            .expect_forget_authorship()
            .with(eq(author), eq(post))
            .times(1)
            .returning(|_, _| Ok(()));
        directory
            .expect_mirror_vote()
            .with(eq(voter), eq(post), eq(None::<VoteValue>))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = PostService::new(Arc::new(repo), Arc::new(directory));
        assert_ok!(service.delete_post(&session(author), post).await);
    }
}
