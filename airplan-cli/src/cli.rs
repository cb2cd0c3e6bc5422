use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use airplan_core::{
    Config, Error, Forecast, Place, Plan, PlanStore, Planner, export::recommendations_csv,
    model::format_hour, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "airplan", version, about = "Air quality activity planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Compute the best times for your activities in a city.
    Plan {
        /// City name, e.g. "London".
        city: String,

        /// Optional country code qualifier, e.g. "GB".
        #[arg(long)]
        country: Option<String>,

        /// Activity to plan; repeat for several. Prompts interactively when absent.
        #[arg(long = "activity", short = 'a')]
        activities: Vec<String>,

        /// Persist the computed plan to the local store.
        #[arg(long)]
        save: bool,
    },

    /// List stored plans, newest first.
    List,

    /// Show a stored plan by id.
    Show {
        /// Id printed by `plan --save` or `list`.
        id: i64,
    },

    /// Export a stored plan's recommendations as CSV.
    Export {
        /// Id printed by `plan --save` or `list`.
        id: i64,

        /// Write to this file instead of stdout.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Plan { city, country, activities, save } => {
                plan(city, country.unwrap_or_default(), activities, save).await
            }
            Command::List => list().await,
            Command::Show { id } => show(id).await,
            Command::Export { id, output } => export(id, output).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("API key saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn plan(
    city: String,
    country: String,
    mut activities: Vec<String>,
    save: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    if activities.is_empty() {
        activities = prompt_activities()?;
    }

    let place = Place::new(city, country);
    let mut planner = Planner::new(provider);
    let plan = planner.plan(&place, &activities).await?;
    let forecast = planner.forecast_for(&place).await?;

    println!("Air quality forecast for {place}:");
    print_forecast(&forecast);

    println!();
    println!("Your plan:");
    print_plan(&plan);

    if save {
        let store = PlanStore::open(&config.database_path()?).await?;
        let id = store.save(&plan).await?;
        println!();
        println!("Saved as plan {id}. Reload it with `airplan show {id}`.");
    }

    Ok(())
}

async fn list() -> anyhow::Result<()> {
    let config = Config::load()?;
    let store = PlanStore::open(&config.database_path()?).await?;

    let summaries = store.list().await?;
    if summaries.is_empty() {
        println!("No stored plans yet. Save one with `airplan plan <CITY> --save`.");
        return Ok(());
    }

    for s in summaries {
        let place = Place::new(s.city, s.country);
        println!(
            "{:>4}  {}  {}  [{}]",
            s.id,
            s.created_at.format("%Y-%m-%d %H:%M UTC"),
            place,
            s.activities.join(", "),
        );
    }

    Ok(())
}

async fn show(id: i64) -> anyhow::Result<()> {
    let config = Config::load()?;
    let store = PlanStore::open(&config.database_path()?).await?;

    // A missing plan is not a failure; just say so and leave things as-is.
    match store.get(id).await {
        Ok(plan) => {
            let place = Place::new(plan.city.clone(), plan.country.clone());
            println!(
                "Plan {id} for {place}, created {}:",
                plan.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            print_plan(&plan);
            Ok(())
        }
        Err(Error::PlanNotFound(_)) => {
            println!("No stored plan with id {id}. Run `airplan list` to see what exists.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn export(id: i64, output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let store = PlanStore::open(&config.database_path()?).await?;

    let plan = store.get(id).await?;
    let csv = recommendations_csv(&plan.recommendations)?;

    match output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported plan {id} to {}", path.display());
        }
        None => print!("{csv}"),
    }

    Ok(())
}

/// One activity per prompt; an empty line finishes the list.
fn prompt_activities() -> anyhow::Result<Vec<String>> {
    println!("Enter your activities, one per line (empty line to finish).");

    let mut activities = Vec::new();
    loop {
        let line = inquire::Text::new("Activity:")
            .prompt()
            .context("Failed to read activity")?;

        if line.trim().is_empty() {
            break;
        }
        activities.push(line.trim().to_string());
    }

    Ok(activities)
}

fn print_forecast(forecast: &Forecast) {
    println!("{:<8} {:>3}  {}", "Hour", "AQI", "Level");
    for point in &forecast.points {
        println!(
            "{:<8} {:>3}  {}",
            format_hour(point.timestamp),
            point.aqi,
            point.level(),
        );
    }
}

fn print_plan(plan: &Plan) {
    let width = plan
        .recommendations
        .iter()
        .map(|r| r.activity.label.len())
        .max()
        .unwrap_or(8)
        .max("Activity".len());

    println!("{:<width$}  {}", "Activity", "Best time");
    for rec in &plan.recommendations {
        println!("{:<width$}  {}", rec.activity.label, rec.best_times_text());
    }
}
