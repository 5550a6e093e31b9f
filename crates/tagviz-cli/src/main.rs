//! `tagviz` - build visualization artifacts from a tag outline and a paper corpus
//!
//! Usage:
//!   tagviz build --outline <PATH> --papers <PATH> [--out <DIR>] [--parallel] [--compact]
//!   tagviz check --outline <PATH> --papers <PATH> [--json] [--print-config]
//!   tagviz levels [--json]

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tagviz_cli::{logging, LogOptions, Loader, Pipeline, PipelineInputs, TagvizConfig};
use tagviz_relations::level_combinations;

fn input_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("outline")
                .long("outline")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Taxonomy outline document"),
        )
        .arg(
            Arg::new("papers")
                .long("papers")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Paper corpus JSON"),
        )
}

fn cli() -> Command {
    Command::new("tagviz")
        .version(tagviz_cli::VERSION)
        .about("Research-tag taxonomy and cross-domain co-occurrence builder")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            input_args(Command::new("build").about("Build and write every artifact"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory (overrides output.dir)"),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .action(ArgAction::SetTrue)
                        .help("Aggregate on all cores (overrides aggregation.parallel)"),
                )
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .action(ArgAction::SetTrue)
                        .help("Write compact JSON (overrides output.pretty)"),
                ),
        )
        .subcommand(
            input_args(Command::new("check").about("Build in memory and report, writing nothing"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                )
                .arg(
                    Arg::new("print-config")
                        .long("print-config")
                        .action(ArgAction::SetTrue)
                        .help("Print the effective configuration as TOML"),
                ),
        )
        .subcommand(
            Command::new("levels")
                .about("List the 27 level combinations")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print as a JSON array"),
                ),
        )
}

fn loader(args: &ArgMatches) -> Result<Loader> {
    let loader = Loader::new();
    Ok(match args.get_one::<PathBuf>("config") {
        Some(path) => loader.with_file(path)?,
        None => loader,
    })
}

fn build_config(args: &ArgMatches) -> Result<TagvizConfig> {
    let mut loader = loader(args)?;
    if let Some(out) = args.get_one::<PathBuf>("out") {
        loader = loader.set_override("output.dir", out.display().to_string())?;
    }
    if args.get_flag("parallel") {
        loader = loader.set_override("aggregation.parallel", true)?;
    }
    if args.get_flag("compact") {
        loader = loader.set_override("output.pretty", false)?;
    }
    Ok(loader.build()?)
}

fn inputs(args: &ArgMatches) -> Result<PipelineInputs> {
    let outline = args
        .get_one::<PathBuf>("outline")
        .context("--outline is required")?;
    let papers = args
        .get_one::<PathBuf>("papers")
        .context("--papers is required")?;
    Ok(PipelineInputs::new(outline, papers))
}

fn build(args: &ArgMatches) -> Result<()> {
    let pipeline = Pipeline::new(build_config(args)?)?;
    let report = pipeline.build(&inputs(args)?)?;
    print!("{}", report.generate_text());
    Ok(())
}

fn check(args: &ArgMatches) -> Result<()> {
    let config = loader(args)?.build()?;
    if args.get_flag("print-config") {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let pipeline = Pipeline::new(config)?;
    let build = pipeline.run(&inputs(args)?)?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&build.report)?);
    } else {
        print!("{}", build.report.generate_text());
    }
    Ok(())
}

fn levels(args: &ArgMatches) -> Result<()> {
    let combinations = level_combinations();
    if args.get_flag("json") {
        println!("{}", serde_json::to_string(&combinations)?);
    } else {
        for combination in combinations {
            println!("{combination}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Globals are propagated down, so the subcommand sees them wherever given
    let scope = matches.subcommand().map_or(&matches, |(_, args)| args);
    logging::init(LogOptions {
        verbosity: scope.get_count("verbose"),
        json: scope.get_flag("log-json"),
    })?;

    match matches.subcommand() {
        Some(("build", args)) => build(args),
        Some(("check", args)) => check(args),
        Some(("levels", args)) => levels(args),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn build_flags_become_overrides() {
        let matches = cli()
            .try_get_matches_from([
                "tagviz", "build", "--outline", "o.md", "--papers", "p.json", "--out", "site",
                "--parallel", "--compact",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        let config = build_config(args).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("site"));
        assert!(config.aggregation.parallel);
        assert!(!config.output.pretty);
        assert_eq!(inputs(args).unwrap().outline, PathBuf::from("o.md"));
    }

    #[test]
    fn check_leaves_defaults_alone() {
        let matches = cli()
            .try_get_matches_from(["tagviz", "check", "--outline", "o.md", "--papers", "p.json"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(loader(args).unwrap().build().unwrap(), TagvizConfig::load_defaults().unwrap());
    }
}
