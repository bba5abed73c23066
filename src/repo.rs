use std::path::Path;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("invalid handle")] InvalidHandle,
    #[error("handle already in use")] HandleAlreadyInUse,
    #[error("handle not found")] HandleNotFound,
    #[error("account id not found")] AccountIdNotFound,
    #[error("invalid post message")] InvalidPost,
    #[error("post id not found")] PostIdNotFound,
    #[error("post is not actionable")] NotActionable,
    #[error("snapshot io: {0}")] Io(#[from] std::io::Error),
    #[error("snapshot format: {0}")] Snapshot(#[from] serde_json::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub trait AccountRepo: Send + Sync {
    fn create_account(&self, handle: &str, description: &str) -> RepoResult<Id>;
    fn find_by_handle(&self, handle: &str) -> RepoResult<AccountSummary>;
    fn find_by_id(&self, id: Id) -> RepoResult<AccountSummary>;
    fn change_handle(&self, old_handle: &str, new_handle: &str) -> RepoResult<()>;
    fn update_description(&self, handle: &str, description: &str) -> RepoResult<()>;
    fn remove_account_by_id(&self, id: Id) -> RepoResult<()>;
    fn remove_account_by_handle(&self, handle: &str) -> RepoResult<()>;
    fn show_account(&self, handle: &str) -> RepoResult<String>;
}

pub trait PostRepo: Send + Sync {
    fn create_post(&self, handle: &str, message: &str) -> RepoResult<Id>;
    fn comment_post(&self, handle: &str, id: Id, message: &str) -> RepoResult<Id>;
    fn endorse_post(&self, handle: &str, id: Id) -> RepoResult<Id>;
    fn delete_post(&self, id: Id) -> RepoResult<()>;
    fn get_post(&self, id: Id) -> RepoResult<PostView>;
    fn show_individual_post(&self, id: Id) -> RepoResult<String>;
    fn show_post_children_details(&self, id: Id) -> RepoResult<String>;
    /// Ids of every tombstoned post, in deletion order.
    fn tombstoned_posts(&self) -> Vec<Id>;
}

pub trait StatsRepo: Send + Sync {
    fn number_of_accounts(&self) -> usize;
    fn total_original_posts(&self) -> usize;
    fn total_comment_posts(&self) -> usize;
    fn total_endorsement_posts(&self) -> usize;
    /// Id of the post with the most endorsements, 0 when there is none.
    fn most_endorsed_post(&self) -> Id;
    /// Id of the account with the most endorsements, 0 when there is none.
    fn most_endorsed_account(&self) -> Id;
    fn stats(&self) -> PlatformStats {
        PlatformStats {
            accounts: self.number_of_accounts(),
            original_posts: self.total_original_posts(),
            comment_posts: self.total_comment_posts(),
            endorsement_posts: self.total_endorsement_posts(),
        }
    }
}

pub trait PlatformRepo: Send + Sync {
    fn erase_platform(&self) -> RepoResult<()>;
    fn save_platform(&self, path: &Path) -> RepoResult<()>;
    fn load_platform(&self, path: &Path) -> RepoResult<()>;
}

pub trait Repo: AccountRepo + PostRepo + StatsRepo + PlatformRepo {}

impl<T> Repo for T where T: AccountRepo + PostRepo + StatsRepo + PlatformRepo {}

pub mod inmem {
    use super::*;
    use chrono::Utc;
    use log::{debug, error, info};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

    use crate::render;

    /// Whole platform: accounts in creation order plus the node arena.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct State {
        accounts: Vec<Account>,
        posts: BTreeMap<Id, Post>, // live and tombstoned nodes
        tombstones: Vec<Id>,
        next_account_id: Id,
        next_post_id: Id,
    }

    impl State {
        fn next_account_id(&mut self) -> Id {
            self.next_account_id += 1;
            self.next_account_id
        }

        fn next_post_id(&mut self) -> Id {
            self.next_post_id += 1;
            self.next_post_id
        }

        fn account_index(&self, handle: &str) -> RepoResult<usize> {
            self.accounts.iter().position(|a| a.handle == handle).ok_or(RepoError::HandleNotFound)
        }

        fn account_index_by_id(&self, id: Id) -> RepoResult<usize> {
            self.accounts.iter().position(|a| a.id == id).ok_or(RepoError::AccountIdNotFound)
        }

        fn account(&self, id: Id) -> Option<&Account> {
            self.accounts.iter().find(|a| a.id == id)
        }

        fn post(&self, id: Id) -> RepoResult<&Post> {
            self.posts.get(&id).ok_or(RepoError::PostIdNotFound)
        }

        fn author_handle(&self, post: &Post) -> Option<&str> {
            post.author.and_then(|a| self.account(a)).map(|a| a.handle.as_str())
        }

        /// Format check, then uniqueness against every account except `except`.
        fn check_handle(&self, handle: &str, except: Option<Id>) -> RepoResult<()> {
            if !is_valid_handle(handle) {
                return Err(RepoError::InvalidHandle);
            }
            if self.accounts.iter().any(|a| a.handle == handle && Some(a.id) != except) {
                return Err(RepoError::HandleAlreadyInUse);
            }
            Ok(())
        }

        fn invalidate(&mut self, account: Option<Id>) {
            if let Some(a) = account.and_then(|id| self.accounts.iter_mut().find(|a| a.id == id)) {
                a.tally = None;
            }
        }

        fn compute_tally(&self, account: &Account) -> Tally {
            account
                .posts
                .iter()
                .filter_map(|id| self.posts.get(id))
                .fold(Tally::default(), |mut t, p| {
                    if p.is_original() && !p.deleted {
                        t.post_count += 1;
                    }
                    t.endorsement_count += p.endorsements.len();
                    t
                })
        }

        fn tally(&self, account: &Account) -> Tally {
            account.tally.unwrap_or_else(|| self.compute_tally(account))
        }

        /// Recompute every stale cache; called before a mutation returns.
        fn refresh_tallies(&mut self) {
            let fresh: Vec<(usize, Tally)> = self
                .accounts
                .iter()
                .enumerate()
                .filter(|(_, a)| a.tally.is_none())
                .map(|(i, a)| (i, self.compute_tally(a)))
                .collect();
            for (i, t) in fresh {
                self.accounts[i].tally = Some(t);
            }
        }

        fn summary(&self, account: &Account) -> AccountSummary {
            let t = self.tally(account);
            AccountSummary {
                id: account.id,
                handle: account.handle.clone(),
                description: account.description.clone(),
                post_count: t.post_count,
                endorsement_count: t.endorsement_count,
                created_at: account.created_at,
            }
        }

        fn view(&self, post: &Post) -> PostView {
            PostView {
                id: post.id,
                kind: post.kind,
                handle: self.author_handle(post).map(str::to_string),
                message: post.message.clone(),
                deleted: post.deleted,
                endorsement_count: post.endorsements.len(),
                comment_count: post.comments.len(),
                created_at: post.created_at,
            }
        }

        // ── accounts ─────────────────────────────────────────────────

        fn create_account(&mut self, handle: &str, description: &str) -> RepoResult<Id> {
            self.check_handle(handle, None)?;
            let id = self.next_account_id();
            self.accounts.push(Account {
                id,
                handle: handle.to_string(),
                description: description.to_string(),
                posts: Vec::new(),
                created_at: Utc::now(),
                tally: Some(Tally::default()),
            });
            info!("created account {id} '{handle}'");
            Ok(id)
        }

        fn change_handle(&mut self, old_handle: &str, new_handle: &str) -> RepoResult<()> {
            if !is_valid_handle(new_handle) {
                return Err(RepoError::InvalidHandle);
            }
            let idx = self.account_index(old_handle)?;
            self.check_handle(new_handle, Some(self.accounts[idx].id))?;
            self.accounts[idx].handle = new_handle.to_string();
            info!("renamed account '{old_handle}' to '{new_handle}'");
            Ok(())
        }

        fn update_description(&mut self, handle: &str, description: &str) -> RepoResult<()> {
            let idx = self.account_index(handle)?;
            self.accounts[idx].description = description.to_string();
            Ok(())
        }

        /// Tombstones everything the account authored, then drops the account.
        fn remove_account_at(&mut self, idx: usize) {
            let account_id = self.accounts[idx].id;
            let owned = self.accounts[idx].posts.clone();
            for post_id in owned {
                // own endorsements of own posts are discarded earlier in the cascade
                if let Err(e) = self.delete_post(post_id) {
                    debug!("cascade for account {account_id} skipped post {post_id}: {e}");
                }
            }
            self.accounts.retain(|a| a.id != account_id);
            info!("removed account {account_id}");
        }

        // ── posts ────────────────────────────────────────────────────

        fn attach(&mut self, author_idx: usize, kind: PostKind, message: String) -> Id {
            let id = self.next_post_id();
            let author = self.accounts[author_idx].id;
            self.posts.insert(id, Post {
                id,
                kind,
                author: Some(author),
                message,
                deleted: false,
                comments: Vec::new(),
                endorsements: Vec::new(),
                created_at: Utc::now(),
            });
            self.accounts[author_idx].posts.push(id);
            self.accounts[author_idx].tally = None;
            id
        }

        fn actionable_target(&self, id: Id) -> RepoResult<&Post> {
            let target = self.post(id)?;
            if !target.is_actionable() {
                return Err(RepoError::NotActionable);
            }
            Ok(target)
        }

        fn create_post(&mut self, handle: &str, message: &str) -> RepoResult<Id> {
            let idx = self.account_index(handle)?;
            if !is_valid_message(message) {
                return Err(RepoError::InvalidPost);
            }
            let id = self.attach(idx, PostKind::Original, message.to_string());
            debug!("'{handle}' created post {id}");
            Ok(id)
        }

        fn comment_post(&mut self, handle: &str, target: Id, message: &str) -> RepoResult<Id> {
            let idx = self.account_index(handle)?;
            self.actionable_target(target)?;
            if !is_valid_message(message) {
                return Err(RepoError::InvalidPost);
            }
            let id = self.attach(idx, PostKind::Comment { reference: target }, message.to_string());
            if let Some(parent) = self.posts.get_mut(&target) {
                parent.comments.push(id);
            }
            debug!("'{handle}' commented {id} on {target}");
            Ok(id)
        }

        fn endorse_post(&mut self, handle: &str, target: Id) -> RepoResult<Id> {
            let idx = self.account_index(handle)?;
            let post = self.actionable_target(target)?;
            let owner = post.author;
            let message = endorsement_message(self.author_handle(post).unwrap_or_default(), &post.message);
            let id = self.attach(idx, PostKind::Endorsement { reference: target }, message);
            if let Some(parent) = self.posts.get_mut(&target) {
                parent.endorsements.push(id);
            }
            self.invalidate(owner);
            debug!("'{handle}' endorsed {target} as {id}");
            Ok(id)
        }

        fn detach_from_author(&mut self, id: Id, author: Option<Id>) {
            if let Some(a) = author.and_then(|aid| self.accounts.iter_mut().find(|a| a.id == aid)) {
                a.posts.retain(|p| *p != id);
                a.tally = None;
            }
        }

        /// Removes an endorsement outright; used when its target is deleted.
        fn discard(&mut self, id: Id) {
            if let Some(e) = self.posts.remove(&id) {
                self.detach_from_author(id, e.author);
            }
        }

        fn delete_post(&mut self, id: Id) -> RepoResult<()> {
            let post = self.post(id)?;
            if post.deleted {
                return Ok(());
            }
            let (kind, author) = (post.kind, post.author);
            match kind {
                PostKind::Endorsement { reference } => {
                    let mut owner = None;
                    if let Some(target) = self.posts.get_mut(&reference) {
                        target.endorsements.retain(|e| *e != id);
                        owner = target.author;
                    }
                    self.invalidate(owner);
                }
                PostKind::Original | PostKind::Comment { .. } => {
                    let dropped = self
                        .posts
                        .get_mut(&id)
                        .map(|p| std::mem::take(&mut p.endorsements))
                        .unwrap_or_default();
                    for e in dropped {
                        self.discard(e);
                    }
                }
            }
            self.detach_from_author(id, author);
            if let Some(p) = self.posts.get_mut(&id) {
                p.tombstone();
            }
            self.tombstones.push(id);
            debug!("tombstoned post {id}");
            Ok(())
        }

        // ── reads ────────────────────────────────────────────────────

        fn live_posts(&self) -> impl Iterator<Item = &Post> {
            self.accounts
                .iter()
                .flat_map(|a| a.posts.iter())
                .filter_map(|id| self.posts.get(id))
        }

        fn render_thread(&self, root: Id) -> RepoResult<String> {
            if self.post(root)?.is_endorsement() {
                return Err(RepoError::NotActionable);
            }
            Ok(render::thread(root, |id| self.posts.get(&id).map(|p| (p, self.author_handle(p)))))
        }

        fn most_endorsed_post(&self) -> Id {
            let mut best: Option<&Post> = None;
            for p in self.live_posts().filter(|p| !p.is_endorsement()) {
                if best.map_or(true, |b| p.endorsements.len() > b.endorsements.len()) {
                    best = Some(p);
                }
            }
            best.map_or(0, |p| p.id)
        }

        fn most_endorsed_account(&self) -> Id {
            let mut best: Option<(Id, usize)> = None;
            for a in &self.accounts {
                let n = self.tally(a).endorsement_count;
                if best.map_or(true, |(_, b)| n > b) {
                    best = Some((a.id, n));
                }
            }
            best.map_or(0, |(id, _)| id)
        }
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Option<Arc<PathBuf>>,
    }

    impl InMemRepo {
        /// Empty platform, nothing written to disk.
        pub fn new() -> Self {
            Self { state: Arc::new(RwLock::new(State::default())), snapshot_path: None }
        }

        /// Platform backed by a snapshot file: loaded now (missing file means
        /// empty) and rewritten after every successful mutation.
        pub fn with_snapshot(path: impl Into<PathBuf>) -> RepoResult<Self> {
            let path = path.into();
            let state = match std::fs::read(&path) {
                Ok(bytes) => {
                    let mut s: State = serde_json::from_slice(&bytes)?;
                    s.refresh_tallies();
                    info!("loaded snapshot '{}'", path.display());
                    s
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    info!("no snapshot at '{}', starting empty", path.display());
                    State::default()
                }
                Err(e) => return Err(e.into()),
            };
            Ok(Self { state: Arc::new(RwLock::new(state)), snapshot_path: Some(Arc::new(path)) })
        }

        fn read(&self) -> RwLockReadGuard<'_, State> {
            self.state.read().unwrap_or_else(PoisonError::into_inner)
        }

        fn write(&self) -> RwLockWriteGuard<'_, State> {
            self.state.write().unwrap_or_else(PoisonError::into_inner)
        }

        fn write_snapshot(state: &State, path: &Path) -> RepoResult<()> {
            let bytes = serde_json::to_vec_pretty(state)?;
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(path, bytes)?;
            Ok(())
        }

        /// Runs one operation under the write lock. Caches are refreshed and
        /// the snapshot rewritten only when it succeeds; a failed snapshot
        /// write rolls the state back and is returned to the caller.
        fn mutate<T>(&self, op: impl FnOnce(&mut State) -> RepoResult<T>) -> RepoResult<T> {
            let mut s = self.write();
            let Some(path) = self.snapshot_path.as_deref() else {
                let out = op(&mut s)?;
                s.refresh_tallies();
                return Ok(out);
            };
            let before = s.clone();
            let out = op(&mut s)?;
            s.refresh_tallies();
            if let Err(e) = Self::write_snapshot(&s, path) {
                error!("failed to write snapshot '{}': {e}", path.display());
                *s = before;
                return Err(e);
            }
            Ok(out)
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self { Self::new() }
    }

    impl AccountRepo for InMemRepo {
        fn create_account(&self, handle: &str, description: &str) -> RepoResult<Id> {
            self.mutate(|s| s.create_account(handle, description))
        }
        fn find_by_handle(&self, handle: &str) -> RepoResult<AccountSummary> {
            let s = self.read();
            let idx = s.account_index(handle)?;
            Ok(s.summary(&s.accounts[idx]))
        }
        fn find_by_id(&self, id: Id) -> RepoResult<AccountSummary> {
            let s = self.read();
            let idx = s.account_index_by_id(id)?;
            Ok(s.summary(&s.accounts[idx]))
        }
        fn change_handle(&self, old_handle: &str, new_handle: &str) -> RepoResult<()> {
            self.mutate(|s| s.change_handle(old_handle, new_handle))
        }
        fn update_description(&self, handle: &str, description: &str) -> RepoResult<()> {
            self.mutate(|s| s.update_description(handle, description))
        }
        fn remove_account_by_id(&self, id: Id) -> RepoResult<()> {
            self.mutate(|s| {
                let idx = s.account_index_by_id(id)?;
                s.remove_account_at(idx);
                Ok(())
            })
        }
        fn remove_account_by_handle(&self, handle: &str) -> RepoResult<()> {
            self.mutate(|s| {
                let idx = s.account_index(handle)?;
                s.remove_account_at(idx);
                Ok(())
            })
        }
        fn show_account(&self, handle: &str) -> RepoResult<String> {
            Ok(render::account(&self.find_by_handle(handle)?))
        }
    }

    impl PostRepo for InMemRepo {
        fn create_post(&self, handle: &str, message: &str) -> RepoResult<Id> {
            self.mutate(|s| s.create_post(handle, message))
        }
        fn comment_post(&self, handle: &str, id: Id, message: &str) -> RepoResult<Id> {
            self.mutate(|s| s.comment_post(handle, id, message))
        }
        fn endorse_post(&self, handle: &str, id: Id) -> RepoResult<Id> {
            self.mutate(|s| s.endorse_post(handle, id))
        }
        fn delete_post(&self, id: Id) -> RepoResult<()> {
            self.mutate(|s| s.delete_post(id))
        }
        fn get_post(&self, id: Id) -> RepoResult<PostView> {
            let s = self.read();
            let post = s.post(id)?;
            Ok(s.view(post))
        }
        fn show_individual_post(&self, id: Id) -> RepoResult<String> {
            let s = self.read();
            let post = s.post(id)?;
            Ok(render::post(post, s.author_handle(post)))
        }
        fn show_post_children_details(&self, id: Id) -> RepoResult<String> {
            self.read().render_thread(id)
        }
        fn tombstoned_posts(&self) -> Vec<Id> {
            self.read().tombstones.clone()
        }
    }

    impl StatsRepo for InMemRepo {
        fn number_of_accounts(&self) -> usize {
            self.read().accounts.len()
        }
        fn total_original_posts(&self) -> usize {
            let s = self.read();
            s.accounts.iter().map(|a| s.tally(a).post_count).sum()
        }
        fn total_comment_posts(&self) -> usize {
            self.read().live_posts().map(|p| p.comments.len()).sum()
        }
        fn total_endorsement_posts(&self) -> usize {
            let s = self.read();
            s.accounts.iter().map(|a| s.tally(a).endorsement_count).sum()
        }
        fn most_endorsed_post(&self) -> Id {
            self.read().most_endorsed_post()
        }
        fn most_endorsed_account(&self) -> Id {
            self.read().most_endorsed_account()
        }
    }

    impl PlatformRepo for InMemRepo {
        fn erase_platform(&self) -> RepoResult<()> {
            self.mutate(|s| {
                *s = State::default();
                Ok(())
            })?;
            info!("platform erased");
            Ok(())
        }
        fn save_platform(&self, path: &Path) -> RepoResult<()> {
            Self::write_snapshot(&self.read(), path)?;
            info!("saved platform to '{}'", path.display());
            Ok(())
        }
        fn load_platform(&self, path: &Path) -> RepoResult<()> {
            let bytes = std::fs::read(path)?;
            let loaded: State = serde_json::from_slice(&bytes)?;
            self.mutate(move |s| {
                *s = loaded;
                Ok(())
            })?;
            info!("loaded platform from '{}'", path.display());
            Ok(())
        }
    }
}
