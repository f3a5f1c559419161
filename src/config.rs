use std::path::PathBuf;

use anyhow::bail;

use crate::cli::{ErrorArgs, RemoteArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    User(u64),
    Group(u64),
}

/// Everything needed to talk to one Zotero library.
#[derive(Debug, Clone)]
pub struct Config {
    pub library: Library,
    pub api_key: String,
    pub limit: usize,
    pub dump: Option<PathBuf>,
}

/// What to do with a record that cannot be formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnError {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub on_error: OnError,
}

impl TryFrom<RemoteArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: RemoteArgs) -> anyhow::Result<Self> {
        let library = match (args.user, args.group) {
            (Some(id), None) => Library::User(id),
            (None, Some(id)) => Library::Group(id),
            _ => bail!("exactly one of --user or --group is required"),
        };
        if args.key.trim().is_empty() {
            bail!("the API key is empty");
        }
        Ok(Config {
            library,
            api_key: args.key,
            limit: usize::from(args.limit),
            dump: args.dump_file,
        })
    }
}

impl From<ErrorArgs> for ExportOptions {
    fn from(args: ErrorArgs) -> Self {
        let on_error = if args.skip_invalid { OnError::Skip } else { OnError::Abort };
        ExportOptions { on_error }
    }
}
