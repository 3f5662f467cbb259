#![warn(non_snake_case)]

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use pn_inherit::config::AnalyzerConfig;
use pn_inherit::net::io::read_net;
use pn_inherit::options::{Options, OutputFormat};
use pn_inherit::{InheritanceAnalyzer, NetRole};

fn main() {
    if std::env::var("PN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_LOG")
            .write_style("PN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {:#}", err);
            2
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<()> {
    let mut flags = shellwords::split(&std::env::var("PN_FLAGS").unwrap_or_default())
        .context("PN_FLAGS is not a valid shell word list")?;
    debug!("PN options from environment: {:?}", flags);
    flags.extend(std::env::args().skip(1));

    let options = match Options::parse_from_args(&flags) {
        Ok(options) => options,
        Err(err) => anyhow::bail!("{}", err),
    };
    debug!("options {:?}", options);

    let mut config = match &options.config {
        Some(path) => AnalyzerConfig::load_from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    options.apply(&mut config);

    let parent = read_net(&options.parent)
        .with_context(|| format!("Failed to load parent net: {}", options.parent))?;
    let child = read_net(&options.child)
        .with_context(|| format!("Failed to load child net: {}", options.child))?;

    let analyzer = InheritanceAnalyzer::new(config);
    let (parent_graph, child_graph) = analyzer.build_graphs(&parent, &child)?;

    if let Some(dir) = &options.dot_dir {
        let dir = Path::new(dir);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create DOT directory: {:?}", dir))?;
        analyzer
            .compile(&parent, NetRole::Parent)?
            .write_dot(dir.join("parent_net.dot"))?;
        analyzer
            .compile(&child, NetRole::Child)?
            .write_dot(dir.join("child_net.dot"))?;
        parent_graph.write_dot(dir.join("parent.dot"))?;
        child_graph.write_dot(dir.join("child.dot"))?;
        log::info!("nets and reachability graphs written to {:?}", dir);
    }

    let report = analyzer.compare(&parent, &parent_graph, &child_graph);
    match options.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
