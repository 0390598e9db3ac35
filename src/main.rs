use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::Parser;
use content::{
    Context, GenConfig, Generator, MapgenKind, Params, RegistryBuilder,
};
use glam::{ivec3, IVec3};
use world::SubmapDump;

pub const APP_NAME: &str = "submapgen";

#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = "Generate submaps from JSON mapgen files")]
struct Args {
    /// JSON files or directories to load mapgens and palettes from.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Id of the mapgen to generate.
    #[arg(long, short)]
    mapgen: Option<String>,

    /// List the loaded mapgen ids instead of generating.
    #[arg(long)]
    list: bool,

    #[arg(long, help = "Generation seed, a number or any text")]
    seed: Option<String>,

    #[arg(long, value_parser = parse_location, default_value = "0,0,0",
          help = "Absolute position of the mapgen as X,Y,Z")]
    at: IVec3,

    /// Mapgen parameter value as NAME=VALUE.
    #[arg(long = "param", short, value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Generator settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print submaps as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_location(s: &str) -> anyhow::Result<IVec3> {
    let parts = s
        .split(',')
        .map(|a| a.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad location {s:?}"))?;
    match parts[..] {
        [x, y] => Ok(ivec3(x, y, 0)),
        [x, y, z] => Ok(ivec3(x, y, z)),
        _ => bail!("bad location {s:?}, expected X,Y,Z"),
    }
}

fn parse_param(s: &str) -> anyhow::Result<(String, String)> {
    let Some((name, value)) = s.split_once('=') else {
        bail!("bad parameter {s:?}, expected NAME=VALUE");
    };
    Ok((name.trim().to_owned(), value.trim().to_owned()))
}

fn parse_seed(s: &str) -> u64 {
    s.parse().unwrap_or_else(|_| util::hash_seed(s))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = Args::parse();

    let config: GenConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("can't read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("bad config {}", path.display()))?
        }
        None => Default::default(),
    };

    let mut builder = RegistryBuilder::default();
    for path in &args.paths {
        let report = builder.load_path(path)?;
        for (source, err) in &report.failed {
            eprintln!("{source}: {err:#}");
        }
        log::info!(
            "{}: {} mapgens, {} palettes, {} failed",
            path.display(),
            report.mapgens,
            report.palettes,
            report.failed.len()
        );
    }
    let registry = builder.build();

    if args.list {
        for kind in [MapgenKind::Overmap, MapgenKind::Nested, MapgenKind::Update]
        {
            for id in registry.ids(kind) {
                println!("{kind} {id}");
            }
        }
        return Ok(());
    }

    let Some(id) = &args.mapgen else {
        bail!("no mapgen given, use --mapgen or --list");
    };

    let seed = match &args.seed {
        Some(s) => parse_seed(s),
        None => rand::random(),
    };
    log::info!("seed: {seed}");

    let names = registry.id_table();
    let generator = Generator::new(&registry, &names).with_config(config);
    let ctx = Context::new(args.at, seed)
        .with_params(args.params.iter().cloned().collect::<Params>());

    let Some((split, diag)) = generator.generate_id(id, &ctx) else {
        bail!("unknown mapgen {id:?}");
    };

    if args.json {
        let chunks: Vec<_> = split
            .chunks
            .iter()
            .map(|c| {
                serde_json::json!({
                    "grid": c.grid.to_array(),
                    "position": c.position.to_array(),
                    "submap": SubmapDump::new(&c.submap, &names),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&chunks)?);
    } else {
        for c in &split.chunks {
            println!("{} {}", c.grid, c.position);
            println!("{}", SubmapDump::new(&c.submap, &names));
        }
    }

    if !diag.is_clean() {
        eprint!("{diag}");
    }

    Ok(())
}
