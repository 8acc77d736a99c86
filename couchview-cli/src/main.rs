use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use couchview::{
    evaluate_map_function, load_definitions, load_from_file, DesignDefinition, Language,
};
use eyre::Result;

#[derive(Parser, Debug)]
#[clap(name = "couchview", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the map function of every view in the given definition files.
    Map {
        /// Generate every map function in this language (`javascript` or
        /// `erlang`) instead of the one each view is configured with.
        #[clap(short, long)]
        language: Option<Language>,
        /// Definition file(s) or glob pattern(s).
        definitions: Vec<String>,
    },
    /// Print the query parameters of every view in the given definition files.
    Query {
        /// Definition file(s) or glob pattern(s).
        definitions: Vec<String>,
    },
    /// Run views over a set of documents locally and print their results.
    Run {
        /// The definition file containing the view(s).
        definition: PathBuf,
        /// A JSON or YAML file containing an array of documents.
        docs: PathBuf,
        /// Only run the view with this name. Otherwise all views that can be
        /// evaluated locally are run.
        #[clap(short = 'n', long)]
        view: Option<String>,
    },
    /// Extract the results of a view from a stored query response.
    Process {
        /// The definition file containing the view.
        definition: PathBuf,
        /// A JSON or YAML file containing the rows returned by the query.
        rows: PathBuf,
        /// The name of the view that was queried.
        #[clap(short = 'n', long)]
        view: String,
    },
}

fn main() {
    let args = Args::parse();
    simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })
    .unwrap();

    let result = match &args.command {
        Command::Map {
            language,
            definitions,
        } => print_map_functions(&patterns(definitions), *language),
        Command::Query { definitions } => print_query_params(&patterns(definitions)),
        Command::Run {
            definition,
            docs,
            view,
        } => run_views(definition, docs, view.as_deref()),
        Command::Process {
            definition,
            rows,
            view,
        } => process_rows(definition, rows, view),
    };
    if let Err(e) = result {
        log::error!("Failed: {:#}", e);
        std::process::exit(1);
    }
}

fn patterns(definitions: &[String]) -> Vec<&str> {
    if definitions.is_empty() {
        vec!["views/*.json", "views/*.yml", "views/*.yaml"]
    } else {
        definitions.iter().map(AsRef::as_ref).collect()
    }
}

fn print_map_functions(patterns: &[&str], language: Option<Language>) -> Result<()> {
    for def in load_definitions(patterns)? {
        for spec in def.view_specs() {
            let spec = match language {
                Some(language) => spec.with_language(language),
                None => spec,
            };
            println!("// {}/{} ({})", def.model, spec.view_name(), spec.language());
            println!("{}\n", spec.map_function()?);
        }
    }
    Ok(())
}

fn print_query_params(patterns: &[&str]) -> Result<()> {
    for def in load_definitions(patterns)? {
        for spec in def.view_specs() {
            println!("[{}/{}]", def.model, spec.view_name());
            for (name, value) in spec.query_options().to_query_pairs()? {
                println!("{}={}", name, value);
            }
            println!();
        }
    }
    Ok(())
}

fn run_views(definition: &Path, docs: &Path, view: Option<&str>) -> Result<()> {
    let def = DesignDefinition::load_from_file(definition)?;
    let docs: Vec<serde_json::Value> = load_from_file(docs)?;
    let specs = def.evaluable_specs(view)?;
    let mut output = serde_json::Map::new();
    for spec in specs {
        let rows = evaluate_map_function(&spec, &docs)?;
        let results = spec.process_results(rows);
        log::info!("View {} produced {} result(s)", spec.view_name(), results.len());
        output.insert(spec.view_name().to_string(), serde_json::to_value(results)?);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn process_rows(definition: &Path, rows: &Path, view: &str) -> Result<()> {
    let spec = DesignDefinition::load_from_file(definition)?.view_spec(view)?;
    let results = spec.process_results(load_from_file(rows)?);
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
