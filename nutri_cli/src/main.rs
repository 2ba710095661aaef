use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use nutri_core::aggregate::{day_key, day_timestamp};
use nutri_core::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "nwatch")]
#[command(about = "Nutrient intake log with deficiency early warnings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Profile to operate on (defaults to the configured default profile)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Override the profile's demographic group (e.g. adult_male)
    #[arg(long, global = true)]
    demographic: Option<String>,

    /// Read configuration from this file instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a food and its nutrients
    Log {
        /// Food name
        #[arg(long)]
        name: String,

        /// Nutrient amount, repeatable (e.g. vitamin_c=30mg)
        #[arg(long = "nutrient", value_name = "KEY=AMOUNT", required = true)]
        nutrients: Vec<String>,

        /// Day to log on (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Serving size (e.g. 150g)
        #[arg(long)]
        serving: Option<String>,
    },

    /// Show daily totals, newest first
    Show {
        /// Only show the most recent N days
        #[arg(long)]
        days: Option<usize>,
    },

    /// List the entries logged on one day
    Entries {
        /// Day (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// Delete one food entry by id
    DeleteEntry {
        id: String,
    },

    /// Delete a whole day
    DeleteDay {
        date: String,
    },

    /// Report nutrients at risk of deficiency
    Analyze {
        /// Assume intake was already low before tracking began
        #[arg(long)]
        fast_track: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tracked nutrients and allowances for the active demographic
    Nutrients,

    /// Export daily totals to CSV
    Export {
        /// Destination file
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    nutri_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let profile = cli
        .profile
        .unwrap_or_else(|| config.default_profile.clone());
    let demographic = match cli.demographic {
        Some(d) => d.parse::<DemographicGroup>()?,
        None => config.demographic_for(&profile),
    };

    let knowledge = default_knowledge_base();
    let errors = knowledge.validate();
    if !errors.is_empty() {
        eprintln!("Knowledge base validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::KnowledgeBase("Invalid knowledge base".into()));
    }

    let registry = TrackerRegistry::journals(
        &data_dir,
        config.store.lock_timeout(),
        Arc::clone(&knowledge),
    );
    let tracker = registry.tracker(&profile)?;
    tracing::debug!("Using profile '{}' ({}) in {:?}", profile, demographic, data_dir);

    match cli.command {
        Commands::Log {
            name,
            nutrients,
            date,
            serving,
        } => cmd_log(&tracker, name, &nutrients, date, serving),
        Commands::Show { days } => cmd_show(&tracker, days),
        Commands::Entries { date } => cmd_entries(&tracker, &date),
        Commands::DeleteEntry { id } => cmd_delete_entry(&tracker, &id),
        Commands::DeleteDay { date } => cmd_delete_day(&tracker, &date),
        Commands::Analyze { fast_track, json } => cmd_analyze(
            &tracker,
            demographic,
            fast_track || config.analysis.assumes_prior_deficiency,
            json,
        ),
        Commands::Nutrients => cmd_nutrients(&knowledge, demographic),
        Commands::Export { out } => cmd_export(&tracker, &out),
    }
}

fn cmd_log(
    tracker: &ProfileTracker<JsonlLogStore>,
    name: String,
    nutrients: &[String],
    date: Option<String>,
    serving: Option<String>,
) -> Result<()> {
    let now = Utc::now();
    let today = day_key(&now.with_timezone(&Local));
    let day = match date {
        Some(d) => parse_date(&d)?,
        None => today,
    };
    // Back-dated entries get a timestamp on their own local day
    let logged_at = if day == today { now } else { day_timestamp(day, &Local) };

    let mut entry = FoodEntry::new(name, logged_at);
    for arg in nutrients {
        let (nutrient, amount) = parse_nutrient_arg(arg)?;
        entry = entry.with_nutrient(nutrient, amount);
    }
    if let Some(serving) = serving {
        entry = entry.with_serving_size(serving.parse::<Amount>()?);
    }

    let food = entry.name.clone();
    let id = tracker.add_food(day, entry)?;

    println!("✓ Logged '{}' on {}", food, day);
    println!("  id: {}", id);
    Ok(())
}

fn cmd_show(tracker: &ProfileTracker<JsonlLogStore>, days: Option<usize>) -> Result<()> {
    let records = tracker.daily_records()?;
    if records.is_empty() {
        println!("No intake logged for profile '{}'.", tracker.profile());
        return Ok(());
    }

    let limit = days.unwrap_or(records.len());
    for record in records.iter().take(limit) {
        println!("{}", record.date);
        if record.totals.is_empty() {
            println!("  (no nutrients)");
        }
        for (nutrient, amount) in &record.totals {
            println!("  {:<18} {}", display_name(tracker.knowledge(), *nutrient), amount);
        }
    }
    Ok(())
}

fn cmd_entries(tracker: &ProfileTracker<JsonlLogStore>, date: &str) -> Result<()> {
    let day = parse_date(date)?;
    let entries = tracker.entries_for_day(day)?;
    if entries.is_empty() {
        println!("No entries on {}.", day);
        return Ok(());
    }

    for entry in entries {
        match &entry.serving_size {
            Some(serving) => println!("{}  {} ({})", entry.id, entry.name, serving),
            None => println!("{}  {}", entry.id, entry.name),
        }
        for (nutrient, amount) in &entry.nutrients {
            println!("    {:<18} {}", display_name(tracker.knowledge(), *nutrient), amount);
        }
    }
    Ok(())
}

fn cmd_delete_entry(tracker: &ProfileTracker<JsonlLogStore>, id: &str) -> Result<()> {
    let id = uuid::Uuid::parse_str(id)
        .map_err(|e| Error::InvalidInput(format!("'{}' is not an entry id: {}", id, e)))?;

    if !tracker.delete_food(id)? {
        return Err(Error::NotFound(format!("entry {}", id)));
    }
    println!("✓ Deleted entry {}", id);
    Ok(())
}

fn cmd_delete_day(tracker: &ProfileTracker<JsonlLogStore>, date: &str) -> Result<()> {
    let day = parse_date(date)?;
    if !tracker.delete_day(day)? {
        return Err(Error::NotFound(format!("no log for {}", day)));
    }
    println!("✓ Deleted log for {}", day);
    Ok(())
}

fn cmd_analyze(
    tracker: &ProfileTracker<JsonlLogStore>,
    demographic: DemographicGroup,
    fast_track: bool,
    json: bool,
) -> Result<()> {
    let report = tracker.report(demographic, fast_track)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Analyzed {} logged day(s) for '{}' ({}){}",
        report.days_analyzed,
        tracker.profile(),
        demographic,
        if fast_track { ", fast-track" } else { "" }
    );

    if report.warnings.is_empty() {
        println!("\nNo potential deficiencies detected.");
        return Ok(());
    }

    println!();
    for warning in &report.warnings {
        println!(
            "[{}] {}: {}",
            warning.severity.to_string().to_uppercase(),
            display_name(tracker.knowledge(), warning.nutrient),
            warning.message
        );
        let symptoms = &warning.deficiency_profile.key_symptoms;
        if !symptoms.is_empty() {
            println!("    Symptoms: {}", symptoms.join(", "));
        }
        if let Some(record) = tracker.knowledge().record(warning.nutrient) {
            if !record.dietary_sources.is_empty() {
                let top: Vec<_> = record.dietary_sources.iter().take(3).cloned().collect();
                println!("    Sources: {}", top.join(", "));
            }
        }
    }
    Ok(())
}

fn cmd_nutrients(knowledge: &KnowledgeBase, demographic: DemographicGroup) -> Result<()> {
    println!("Daily allowances for {}", demographic);
    println!();

    for record in knowledge.records() {
        let allowance = record
            .allowances
            .get(&demographic)
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".into());
        let model = record
            .deficiency_profile
            .as_ref()
            .map(|p| describe_model(&p.risk_model))
            .unwrap_or_else(|| "not analyzed".into());

        println!(
            "  {:<14} {:<18} {:>12}  {}",
            record.nutrient.as_str(),
            record.name,
            allowance,
            model
        );
    }
    Ok(())
}

fn cmd_export(tracker: &ProfileTracker<JsonlLogStore>, out: &std::path::Path) -> Result<()> {
    let records = tracker.daily_records()?;
    let rows = export_daily_totals(&records, out)?;
    println!("✓ Exported {} rows to {}", rows, out.display());
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a YYYY-MM-DD date", s)))
}

/// Parse `vitamin_c=30mg`
fn parse_nutrient_arg(arg: &str) -> Result<(NutrientType, Amount)> {
    let (key, amount) = arg.split_once('=').ok_or_else(|| {
        Error::InvalidInput(format!("'{}' should look like KEY=AMOUNT", arg))
    })?;
    Ok((key.parse::<NutrientType>()?, amount.parse::<Amount>()?))
}

fn display_name(knowledge: &KnowledgeBase, nutrient: NutrientType) -> String {
    knowledge
        .record(nutrient)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| nutrient.to_string())
}

fn describe_model(model: &RiskModel) -> String {
    match model {
        RiskModel::DailyEssential { onset_hours } => {
            format!("daily essential, onset {}h", onset_hours)
        }
        RiskModel::DailyTurnover { onset_weeks } => {
            format!("daily turnover, onset {} weeks", onset_weeks)
        }
        RiskModel::LongTermStorage { depletion_months } => {
            format!("long-term storage, {} months", depletion_months)
        }
        RiskModel::Structural { depletion_months } => {
            format!("structural, {} months", depletion_months)
        }
        RiskModel::AcuteRegulated => "acute regulated".into(),
        RiskModel::Adaptive => "adaptive".into(),
    }
}
