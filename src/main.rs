use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use npc_forge::credentials::load_api_key;
use npc_forge::llm::OpenAiClient;
use npc_forge::{
    GeneratorConfig, Npc, NpcEngine, SessionObserver, SessionRequest, WorldBrief, WorldPalette,
};

fn print_usage() {
    println!("npc_forge [options]");
    println!("options:");
    println!("  --setting <text>               game setting (e.g. medieval, futuristic)");
    println!("  --mood <text>                  game mood (e.g. dark, whimsical)");
    println!("  --feelings <text>              feelings to evoke (e.g. fear, excitement)");
    println!("  --storyboard <text>            additional notes");
    println!("  --count <1-20>                 number of NPCs (default 8)");
    println!("  --occupation-diversity <0-1>   default 0.5");
    println!("  --persona-diversity <0-1>      default 0.5");
    println!("  --motivation-diversity <0-1>   default 0.5");
    println!("  --config <path>                TOML configuration file");
    println!("  --output <dir>                 overrides output_dir from the configuration");
    println!("  --seed <n>                     overrides seed from the configuration");
}

struct Args {
    brief: WorldBrief,
    count: usize,
    occupation_diversity: f64,
    persona_diversity: f64,
    motivation_diversity: f64,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    seed: Option<u64>,
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, label: &str) -> Result<T> {
    let raw = value.with_context(|| format!("missing value for {}", label))?;
    raw.parse::<T>()
        .map_err(|_| anyhow::anyhow!("invalid {}: {}", label, raw))
}

fn parse_args(raw: Vec<String>) -> Result<Option<Args>> {
    let mut args = Args {
        brief: WorldBrief::default(),
        count: 8,
        occupation_diversity: 0.5,
        persona_diversity: 0.5,
        motivation_diversity: 0.5,
        config: None,
        output: None,
        seed: None,
    };

    let mut iter = raw.into_iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "-h" | "--help" => return Ok(None),
            "--setting" => args.brief.setting = iter.next().context("missing value for --setting")?,
            "--mood" => args.brief.mood = iter.next().context("missing value for --mood")?,
            "--feelings" => args.brief.feelings = iter.next().context("missing value for --feelings")?,
            "--storyboard" => {
                args.brief.storyboard = iter.next().context("missing value for --storyboard")?
            }
            "--count" => args.count = parse_number(iter.next(), "--count")?,
            "--occupation-diversity" => {
                args.occupation_diversity = parse_number(iter.next(), "--occupation-diversity")?
            }
            "--persona-diversity" => {
                args.persona_diversity = parse_number(iter.next(), "--persona-diversity")?
            }
            "--motivation-diversity" => {
                args.motivation_diversity = parse_number(iter.next(), "--motivation-diversity")?
            }
            "--config" => args.config = Some(iter.next().context("missing value for --config")?.into()),
            "--output" => args.output = Some(iter.next().context("missing value for --output")?.into()),
            "--seed" => args.seed = Some(parse_number(iter.next(), "--seed")?),
            other => bail!("unknown option: {}", other),
        }
    }

    Ok(Some(args))
}

/// Prints one line per finished NPC
struct ConsoleProgress;

impl SessionObserver for ConsoleProgress {
    fn palette_ready(&mut self, palette: &WorldPalette) {
        println!(
            "Palette: {} personas, {} occupations, {} motivating entities",
            palette.personas.len(),
            palette.occupations.len(),
            palette.motivating_entities.len()
        );
    }

    fn npc_completed(&mut self, index: usize, total: usize, npc: &Npc) {
        let sheet = &npc.character_sheet;
        println!(
            "[{}/{}] {} - {} ({}, {}, {}, {}, {})",
            index + 1,
            total,
            npc.name,
            npc.tldr,
            sheet.intellect,
            sheet.charisma,
            sheet.integrity,
            sheet.resilience,
            sheet.kindness
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(args) = parse_args(env::args().skip(1).collect())? else {
        print_usage();
        return Ok(());
    };

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("failed to load configuration from {:?}", path))?,
        None => GeneratorConfig::default(),
    };
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let api_key = load_api_key(&config).context("failed to read the API key")?;
    let llm = OpenAiClient::with_options(
        api_key,
        &config.model,
        &config.base_url,
        config.request_timeout(),
    )?;

    let request = SessionRequest::new(args.brief, args.count).with_diversity(
        args.occupation_diversity,
        args.persona_diversity,
        args.motivation_diversity,
    );
    request.validate()?;

    let output_dir = config.output_dir.clone();
    let mut engine = NpcEngine::new(config, llm)?;
    let session = engine
        .run(&request, &mut ConsoleProgress)
        .await
        .context("NPC generation failed")?;

    println!("Wrote {} NPC records to {:?}", session.len(), output_dir);
    Ok(())
}
