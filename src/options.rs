//! Parsing Options.
//! `pn-inherit [OPTIONS] <PARENT> <CHILD>`; extra flags may also come from `PN_FLAGS`.

use clap::{Arg, ArgAction, Command};
use std::error::Error;

use crate::analysis::Strictness;
use crate::config::AnalyzerConfig;
use crate::net::ArcPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn make_options_parser() -> clap::Command {
    let parser = Command::new("pn-inherit")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Classify the inheritance relation between two Petri nets")
        .arg(
            Arg::new("parent")
                .value_name("PARENT")
                .help("Parent net (.json or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("child")
                .value_name("CHILD")
                .help("Child net (.json or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML file with analyzer settings"),
        )
        .arg(
            Arg::new("state_limit")
                .short('l')
                .long("state-limit")
                .value_name("N")
                .help("Maximum number of markings per reachability graph")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Require child-only places to be empty when matching markings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict_arcs")
                .long("strict-arcs")
                .help("Reject arcs that reference undeclared places")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .help("Build the two reachability graphs one after another")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(
            Arg::new("dot")
                .long("dot")
                .value_name("DIR")
                .help("Directory where both nets and their reachability graphs are written as DOT"),
        );
    parser
}

#[derive(Debug, Default)]
pub struct Options {
    pub parent: String,
    pub child: String,
    pub config: Option<String>,
    pub state_limit: Option<usize>,
    pub strict: bool,
    pub strict_arcs: bool,
    pub sequential: bool,
    pub format: OutputFormat,
    pub dot_dir: Option<String>,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, Box<dyn Error>> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("text") | None => OutputFormat::Text,
            Some("json") => OutputFormat::Json,
            Some(other) => return Err(format!("UnsupportedFormat: {}", other))?,
        };
        let required = |name: &str| -> Result<String, Box<dyn Error>> {
            matches
                .get_one::<String>(name)
                .cloned()
                .ok_or_else(|| format!("missing argument <{}>", name).into())
        };

        Ok(Options {
            parent: required("parent")?,
            child: required("child")?,
            config: matches.get_one::<String>("config").cloned(),
            state_limit: matches.get_one::<usize>("state_limit").copied(),
            strict: matches.get_flag("strict"),
            strict_arcs: matches.get_flag("strict_arcs"),
            sequential: matches.get_flag("sequential"),
            format,
            dot_dir: matches.get_one::<String>("dot").cloned(),
        })
    }

    /// Command-line flags override values loaded from the config file.
    pub fn apply(&self, config: &mut AnalyzerConfig) {
        if let Some(limit) = self.state_limit {
            config.state_limit = limit;
        }
        if self.strict {
            config.strictness = Strictness::Strict;
        }
        if self.strict_arcs {
            config.arc_policy = ArcPolicy::Strict;
        }
        if self.sequential {
            config.parallel = false;
        }
    }
}
