use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Export Zotero collections as BibTeX", long_about = None)]
pub struct Cli {
    /// Log more (repeat for even more); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List collections of the library, optionally filtered by title
    Collections {
        /// Case-insensitive partial match on the collection name
        #[arg(value_name = "TITLE")]
        filter: Option<String>,

        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Export every item of a collection to BibTeX on standard output
    Export {
        #[arg(value_name = "COLLECTION-ID")]
        collection: String,

        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        errors: ErrorArgs,
    },
    /// Format items saved earlier with --dump, without contacting Zotero
    Format {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        errors: ErrorArgs,
    },
}

/// Where the library lives and how to talk to it.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("library").required(true).args(["user", "group"])))]
pub struct RemoteArgs {
    /// Zotero API key (https://www.zotero.org/settings/keys)
    #[arg(long, value_name = "API-KEY", env = "ZOTERO_API_KEY", hide_env_values = true)]
    pub key: String,

    /// Group ID (https://www.zotero.org/groups/)
    #[arg(long, value_name = "ID")]
    pub group: Option<u64>,

    /// User ID (https://www.zotero.org/settings/keys)
    #[arg(long, value_name = "ID")]
    pub user: Option<u64>,

    /// Page size of the queries
    #[arg(long, value_name = "N", default_value_t = 30, value_parser = clap::value_parser!(u16).range(1..=100))]
    pub limit: u16,

    /// Save the retrieved records as JSON to FILENAME
    #[arg(long = "dump", value_name = "FILENAME")]
    pub dump_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ErrorArgs {
    /// Log and skip records that cannot be formatted instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("zotbib").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_with_group() {
        let cli = parse(&["export", "ABC123", "--key", "k", "--group", "42", "--skip-invalid"])
            .expect("parse");
        match cli.command {
            Command::Export { collection, remote, errors } => {
                assert_eq!(collection, "ABC123");
                assert_eq!(remote.group, Some(42));
                assert_eq!(remote.user, None);
                assert_eq!(remote.limit, 30);
                assert!(errors.skip_invalid);
            }
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn user_and_group_are_exclusive() {
        let err = parse(&["collections", "--key", "k", "--user", "1", "--group", "2"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn library_is_required() {
        let err = parse(&["collections", "--key", "k"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn limit_is_bounded() {
        assert!(parse(&["collections", "--key", "k", "--user", "1", "--limit", "0"]).is_err());
        assert!(parse(&["collections", "--key", "k", "--user", "1", "--limit", "101"]).is_err());
        let cli = parse(&["-vv", "collections", "thesis", "--key", "k", "--user", "1", "--limit", "100"])
            .expect("parse");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Collections { filter, remote } => {
                assert_eq!(filter.as_deref(), Some("thesis"));
                assert_eq!(remote.limit, 100);
            }
            other => panic!("expected collections, got {other:?}"),
        }
    }

    #[test]
    fn format_takes_a_file() {
        proptest::proptest!(|(name in "[A-Za-z0-9_][A-Za-z0-9._-]{0,31}")| {
            let cli = parse(&["format", &name]).expect("parse");
            match cli.command {
                Command::Format { input, errors } => {
                    proptest::prop_assert_eq!(input, PathBuf::from(&name));
                    proptest::prop_assert!(!errors.skip_invalid);
                }
                _ => proptest::prop_assert!(false, "expected format"),
            }
        })
    }
}
