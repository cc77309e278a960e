//! Command-line interface argument parsing
//!
//! Defines all fdb commands and their arguments using Clap.

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigOverrides, SANDBOX_HOST};
use crate::perms::Preset;

/// fdb - command-line client for the Fluidinfo object store
#[derive(Parser, Debug)]
#[command(name = "fdb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tag, untag, query and list objects, tags and namespaces in Fluidinfo")]
#[command(long_about = concat!(
    "fdb (v", env!("CARGO_PKG_VERSION"), ")\n",
    "Command-line client for Fluidinfo, the tag-based object store.\n\n",
    "Objects are picked with -a (about tag), -i (id) or -q (query).\n",
    "Tags are written njr/rating (Fluidinfo style) or, with -U, /njr/rating\n",
    "and rating relative to the authenticated user (unix style)."
))]
pub struct Cli {
    /// Report what fdb is doing
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log every HTTP request and response
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,

    /// HTTP timeout in seconds
    #[arg(short = 'T', long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Force unix-style paths for tags and namespaces
    #[arg(short = 'U', long = "unix-style-paths", global = true)]
    pub unix_style_paths: bool,

    /// Force Fluidinfo-style paths for tags and namespaces
    #[arg(short = 'F', long = "fluidinfo-style-paths", global = true)]
    pub fluidinfo_style_paths: bool,

    /// Use the credentials file of another user
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Use the sandbox at https://sandbox.fluidinfo.com
    #[arg(short, long, global = true)]
    pub sandbox: bool,

    /// Use the specified host; http:// is added when no scheme is given
    #[arg(long, global = true, value_name = "URL")]
    pub hostname: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Object selection shared by the object commands
#[derive(Args, Debug, Clone, Default)]
pub struct ObjectArgs {
    /// Select objects by about tag
    #[arg(short, long, value_name = "ABOUT")]
    pub about: Vec<String>,

    /// Select objects by id
    #[arg(short, long, value_name = "ID")]
    pub id: Vec<String>,

    /// Select objects matching a Fluidinfo query
    #[arg(short, long, value_name = "QUERY")]
    pub query: Vec<String>,
}

impl ObjectArgs {
    /// Whether no object was selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.about.is_empty() && self.id.is_empty() && self.query.is_empty()
    }
}

/// Arguments of the raw HTTP commands
#[derive(Args, Debug, Clone)]
pub struct RawArgs {
    /// API path, e.g. /tags/njr/rating
    pub uri: String,

    /// key=value pairs sent as query parameters (for put, the first is the body)
    pub params: Vec<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tag objects, optionally with values
    ///
    /// Examples:
    ///   fdb tag -a 'DADGAD' njr/tuning njr/rating=10
    ///   fdb tag -q 'about = "DADGAD"' njr/tuning
    #[command(display_order = 1)]
    Tag {
        #[command(flatten)]
        objects: ObjectArgs,

        /// Tags, as tag or tag=value
        tags: Vec<String>,
    },

    /// Remove tags from objects
    ///
    /// Example:
    ///   fdb untag -a 'DADGAD' njr/tuning njr/rating
    #[command(display_order = 2)]
    Untag {
        #[command(flatten)]
        objects: ObjectArgs,

        /// Tags to remove
        tags: Vec<String>,
    },

    /// Show tag values on objects
    ///
    /// The pseudo-tag id shows the object's id.
    ///
    /// Example:
    ///   fdb show -a 'DADGAD' njr/tuning njr/rating id
    #[command(display_order = 3)]
    Show {
        #[command(flatten)]
        objects: ObjectArgs,

        /// Tags to show
        tags: Vec<String>,
    },

    /// Show every tag on objects, with values
    ///
    /// Example:
    ///   fdb tags -a 'DADGAD'
    #[command(display_order = 4)]
    Tags {
        #[command(flatten)]
        objects: ObjectArgs,
    },

    /// Count the selected objects
    ///
    /// Example:
    ///   fdb count -q 'has fluiddb/users/username'
    #[command(display_order = 5)]
    Count {
        #[command(flatten)]
        objects: ObjectArgs,
    },

    /// List a namespace, or show a tag
    ///
    /// Examples:
    ///   fdb ls                 # your top-level namespace
    ///   fdb ls -l njr/books    # with permissions
    ///   fdb ls -R njr          # recursively
    #[command(display_order = 6)]
    Ls {
        /// Show permission summaries
        #[arg(short, long)]
        long: bool,

        /// Describe every permission in full
        #[arg(short = 'L', long)]
        longer: bool,

        /// Show permission summaries with group members
        #[arg(short, long)]
        group: bool,

        /// List sub-namespaces recursively
        #[arg(short = 'R', long)]
        recurse: bool,

        /// Show the namespace itself, not its contents
        #[arg(short = 'd', long = "namespace")]
        namespace_only: bool,

        /// Namespace or tag (default: your namespace)
        path: Option<String>,
    },

    /// Remove tags or namespaces
    ///
    /// Example:
    ///   fdb rm -R njr/old-stuff
    #[command(display_order = 7)]
    Rm {
        /// Remove namespaces with everything inside
        #[arg(short = 'R', long)]
        recurse: bool,

        /// Tags or namespaces to remove
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Set permissions on tags or namespaces from a preset
    ///
    /// A trailing / marks a namespace.
    ///
    /// Examples:
    ///   fdb perms private njr/diary
    ///   fdb perms group-read --group alice,bob njr/books/
    #[command(display_order = 8)]
    Perms {
        /// Preset to apply
        #[arg(value_enum)]
        preset: Preset,

        /// Group members for the group presets
        #[arg(short = 'G', long, value_delimiter = ',')]
        group: Vec<String>,

        /// Tags or namespaces
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Print the authenticated username
    #[command(display_order = 9)]
    Whoami,

    /// Print the authenticated user's top-level namespace
    #[command(visible_alias = "pwn")]
    #[command(display_order = 10)]
    Pwd,

    /// Make another user's credentials the default
    ///
    /// Copies ~/.fluidDBcredentials.USER over ~/.fluidDBcredentials.
    #[command(display_order = 11)]
    Su {
        /// User whose credentials file to use
        user: String,
    },

    /// Raw HTTP GET
    ///
    /// Examples:
    ///   fdb get /tags/njr/rating
    ///   fdb get /permissions/tags/njr/rating action=delete
    #[command(display_order = 12)]
    Get(RawArgs),

    /// Raw HTTP PUT; the first key=value pair is the JSON body
    #[command(display_order = 13)]
    Put(RawArgs),

    /// Raw HTTP POST
    #[command(display_order = 14)]
    Post(RawArgs),

    /// Raw HTTP DELETE
    #[command(display_order = 15)]
    Delete(RawArgs),

    /// Raw HTTP HEAD
    #[command(display_order = 16)]
    Head(RawArgs),

    /// Print the fdb version
    #[command(display_order = 17)]
    Version,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Settings given on the command line, to merge over the file
    #[must_use]
    pub fn config_overrides(&self) -> ConfigOverrides {
        let host = self
            .hostname
            .clone()
            .or_else(|| self.sandbox.then(|| SANDBOX_HOST.to_string()));
        let unix_style_paths = if self.unix_style_paths {
            Some(true)
        } else if self.fluidinfo_style_paths {
            Some(false)
        } else {
            None
        };
        ConfigOverrides {
            host,
            timeout_secs: self.timeout,
            unix_style_paths,
            debug: self.debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn object_flags_repeat() {
        let cli = Cli::try_parse_from([
            "fdb", "tag", "-a", "DADGAD", "-a", "Eliza", "-q", "has njr/rating", "njr/rating=10",
        ])
        .expect("parse");
        match cli.command {
            Commands::Tag { objects, tags } => {
                assert_eq!(objects.about, vec!["DADGAD", "Eliza"]);
                assert_eq!(objects.query, vec!["has njr/rating"]);
                assert_eq!(tags, vec!["njr/rating=10"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from(["fdb", "whoami", "-s", "-U", "-T", "5"]).expect("parse");
        let config = cli.config_overrides();
        assert_eq!(config.host.as_deref(), Some(SANDBOX_HOST));
        assert_eq!(config.unix_style_paths, Some(true));
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn hostname_beats_sandbox() {
        let cli = Cli::try_parse_from(["fdb", "-s", "--hostname", "localhost:9000", "whoami"])
            .expect("parse");
        assert_eq!(cli.config_overrides().host.as_deref(), Some("localhost:9000"));
    }

    #[test]
    fn unset_flags_override_nothing() {
        let cli = Cli::try_parse_from(["fdb", "whoami"]).expect("parse");
        assert_eq!(cli.config_overrides(), ConfigOverrides::default());
    }

    #[test]
    fn perms_group_is_comma_separated() {
        let cli = Cli::try_parse_from(["fdb", "perms", "group", "-G", "alice,bob", "njr/books/"])
            .expect("parse");
        match cli.command {
            Commands::Perms { preset, group, paths } => {
                assert_eq!(preset, Preset::Group);
                assert_eq!(group, vec!["alice", "bob"]);
                assert_eq!(paths, vec!["njr/books/"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn pwn_is_pwd() {
        let cli = Cli::try_parse_from(["fdb", "pwn"]).expect("parse");
        assert!(matches!(cli.command, Commands::Pwd));
    }

    #[test]
    fn raw_get_collects_params() {
        let cli = Cli::try_parse_from(["fdb", "get", "/permissions/tags/njr/rating", "action=delete"])
            .expect("parse");
        match cli.command {
            Commands::Get(raw) => {
                assert_eq!(raw.uri, "/permissions/tags/njr/rating");
                assert_eq!(raw.params, vec!["action=delete"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
