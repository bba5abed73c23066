use std::path::PathBuf;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::models::Id;
use crate::repo::{Repo, RepoResult};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a new account
    CreateAccount {
        handle: String,
        #[arg(long, short = 'd', default_value = "")]
        description: String,
    },
    /// Remove an account and tombstone everything it posted
    RemoveAccount {
        #[arg(required_unless_present = "id")]
        handle: Option<String>,
        #[arg(long, conflicts_with = "handle")]
        id: Option<Id>,
    },
    ChangeHandle { old_handle: String, new_handle: String },
    UpdateDescription { handle: String, description: String },
    ShowAccount { handle: String },
    /// Publish an original post
    CreatePost { handle: String, message: String },
    /// Reply to a post or comment
    Comment { handle: String, id: Id, message: String },
    Endorse { handle: String, id: Id },
    DeletePost { id: Id },
    ShowPost { id: Id },
    /// Render a post with its whole comment tree
    ShowThread { id: Id },
    /// List tombstoned post ids
    Tombstones,
    Stats,
    MostEndorsed,
    /// Drop all accounts and posts and restart both id sequences
    Erase,
    Save { path: PathBuf },
    Load { path: PathBuf },
}

/// Result of one command in both renderings.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub text: String,
    pub json: Value,
}

impl Response {
    fn id(id: Id) -> Self {
        Self { text: id.to_string(), json: json!({ "id": id }) }
    }
    fn ok() -> Self {
        Self { text: "ok".into(), json: json!({ "status": "ok" }) }
    }
    fn text(text: String) -> Self {
        let json = json!({ "text": text });
        Self { text, json }
    }
}

pub fn execute(repo: &dyn Repo, command: Command) -> RepoResult<Response> {
    let resp = match command {
        Command::CreateAccount { handle, description } => Response::id(repo.create_account(&handle, &description)?),
        Command::RemoveAccount { handle, id } => {
            match (handle, id) {
                (_, Some(id)) => repo.remove_account_by_id(id)?,
                (Some(handle), None) => repo.remove_account_by_handle(&handle)?,
                (None, None) => return Err(crate::repo::RepoError::HandleNotFound),
            }
            Response::ok()
        }
        Command::ChangeHandle { old_handle, new_handle } => {
            repo.change_handle(&old_handle, &new_handle)?;
            Response::ok()
        }
        Command::UpdateDescription { handle, description } => {
            repo.update_description(&handle, &description)?;
            Response::ok()
        }
        Command::ShowAccount { handle } => {
            let summary = repo.find_by_handle(&handle)?;
            Response { text: repo.show_account(&handle)?, json: json!(summary) }
        }
        Command::CreatePost { handle, message } => Response::id(repo.create_post(&handle, &message)?),
        Command::Comment { handle, id, message } => Response::id(repo.comment_post(&handle, id, &message)?),
        Command::Endorse { handle, id } => Response::id(repo.endorse_post(&handle, id)?),
        Command::DeletePost { id } => {
            repo.delete_post(id)?;
            Response::ok()
        }
        Command::ShowPost { id } => {
            let view = repo.get_post(id)?;
            Response { text: repo.show_individual_post(id)?, json: json!(view) }
        }
        Command::ShowThread { id } => Response::text(repo.show_post_children_details(id)?),
        Command::Tombstones => {
            let ids = repo.tombstoned_posts();
            let text = ids.iter().map(Id::to_string).collect::<Vec<_>>().join("\n");
            Response { text, json: json!(ids) }
        }
        Command::Stats => {
            let s = repo.stats();
            Response {
                text: format!(
                    "Accounts: {}\nOriginal posts: {}\nComments: {}\nEndorsements: {}",
                    s.accounts, s.original_posts, s.comment_posts, s.endorsement_posts
                ),
                json: json!(s),
            }
        }
        Command::MostEndorsed => {
            let (post, account) = (repo.most_endorsed_post(), repo.most_endorsed_account());
            Response {
                text: format!("Most endorsed post: {post}\nMost endorsed account: {account}"),
                json: json!({ "post": post, "account": account }),
            }
        }
        Command::Erase => {
            repo.erase_platform()?;
            Response::ok()
        }
        Command::Save { path } => {
            repo.save_platform(&path)?;
            Response::ok()
        }
        Command::Load { path } => {
            repo.load_platform(&path)?;
            Response::ok()
        }
    };
    Ok(resp)
}
