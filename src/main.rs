use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Deserialize;
use std::path::PathBuf;

use intake_rs::intake::analysis::AnalysisReport;
use intake_rs::intake::config::IntakeConfig;
use intake_rs::intake::session::{MemoryRunStore, RunStore};
use intake_rs::intake::survey::graph::validate;
use intake_rs::intake::survey::run::{Advance, Navigator};
use intake_rs::intake::survey::types::SurveyDefinition;
use intake_rs::intake::survey::{Answer, SurveyGraph, SurveyLoader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a survey definition for authoring errors
    Validate {
        /// Survey file, or a survey name under INTAKE_SURVEY_DIR
        survey: String,
    },
    /// Print the linear reading order of a survey's nodes
    Order {
        survey: String,
    },
    /// Replay a scripted run and print the path taken and any findings
    Replay {
        survey: String,

        /// Path to a JSON file holding an array of answers; the string
        /// "back" retreats one step
        #[arg(short, long)]
        answers: PathBuf,
    },
    /// Print the JSON schema of survey definitions
    Schema,
}

/// One step of a replay script
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Command(String),
    Answer(Answer),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = IntakeConfig::from_env()?;
    let loader = SurveyLoader::new();

    match args.command {
        Commands::Validate { survey } => {
            let def = loader.load(config.survey_path(&survey))?;
            let report = validate(&def);

            for issue in &report.errors {
                println!("error: {}", issue.message);
            }
            for issue in &report.warnings {
                println!("warning: {}", issue.message);
            }
            if !report.is_valid() {
                bail!(
                    "Survey '{}' has {} error(s)",
                    def.name,
                    report.errors.len()
                );
            }
            println!(
                "Survey '{}' is valid ({} warning(s))",
                def.name,
                report.warnings.len()
            );
        }
        Commands::Order { survey } => {
            let def = loader.load(config.survey_path(&survey))?;
            let graph = SurveyGraph::new(&def)?;
            for (i, id) in graph.reading_order().iter().enumerate() {
                println!("{:>3}. {}", i + 1, id);
            }
        }
        Commands::Replay { survey, answers } => {
            let graph = loader.load_graph(config.survey_path(&survey))?;
            let script = std::fs::read_to_string(&answers)
                .with_context(|| format!("Cannot read answer script {}", answers.display()))?;
            let steps: Vec<Step> =
                serde_json::from_str(&script).context("Answer script must be a JSON array")?;

            // Each step is a separate request against the stored run
            let store = MemoryRunStore::from_config(&config);
            let id = store.create(Navigator::start(&graph).into_state()).await;
            for step in steps {
                let state = store
                    .get(id)
                    .await
                    .with_context(|| format!("Run {} expired during replay", id))?;
                let mut nav = Navigator::resume(&graph, state)?;
                let completed = match step {
                    Step::Command(cmd) if cmd == "back" => {
                        nav.retreat();
                        false
                    }
                    Step::Command(cmd) => bail!("Unknown script command '{}'", cmd),
                    Step::Answer(answer) => {
                        let at = nav.current_node_id().to_string();
                        let outcome = nav
                            .advance(answer)
                            .with_context(|| format!("Replay failed at node '{}'", at))?;
                        outcome == Advance::Completed
                    }
                };
                store.put(id, nav.into_state()).await;
                if completed {
                    break;
                }
            }

            let state = store
                .get(id)
                .await
                .with_context(|| format!("Run {} expired during replay", id))?;
            let nav = Navigator::resume(&graph, state)?;

            let state = nav.state();
            let path: Vec<&str> = state
                .history
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(state.current_node_id.as_str()))
                .collect();
            println!("Path: {}", path.join(" -> "));
            println!(
                "Progress: {:.0}%{}",
                nav.progress(),
                if nav.is_completed() { " (completed)" } else { "" }
            );

            let report = AnalysisReport::build(&graph, &nav.active_answers());
            if report.is_empty() {
                println!("No findings");
            }
            println!("{}", report.to_text());
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(SurveyDefinition);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}
