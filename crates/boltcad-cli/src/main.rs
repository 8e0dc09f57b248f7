//! boltcad CLI - fastener dimensions and construction documents
//!
//! Completes catalog sizes and writes bolts, nuts and passages as JSON
//! construction trees for a CSG kernel.

use anyhow::{Context, Result};
use boltcad::{
    complete, guess, passage, plain_bolt, threaded_bolt, threaded_nut, Catalog, Fit, HeadStyle,
    Orientation, Overrides, Part, PrintSettings, Scene, ScrewDims,
};
use boltcad_ir::Document;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "boltcad")]
#[command(about = "Parametric 3D-printable bolts, nuts and passages", long_about = None)]
struct Cli {
    /// Print settings TOML file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Size catalog TOML file (default: built-in ISO metric table)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Facets per full turn, overrides the settings file
    #[arg(long, global = true)]
    resolution: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sizes in the catalog
    Sizes,
    /// Print the completed dimensions of a size as JSON
    Dims {
        #[command(flatten)]
        size: SizeArgs,
        /// Thread length override
        #[arg(long)]
        length: Option<f64>,
        /// Pitch override
        #[arg(long)]
        pitch: Option<f64>,
        /// Thread passage length override
        #[arg(long)]
        passage_length: Option<f64>,
    },
    /// Write a bolt document
    Bolt {
        #[command(flatten)]
        size: SizeArgs,
        /// Head style
        #[arg(long, value_enum, default_value_t = HeadArg::Allen)]
        head: HeadArg,
        /// Shank length (default: catalog thread length)
        #[arg(long)]
        length: Option<f64>,
        /// Smooth shank without a thread
        #[arg(long)]
        plain: bool,
        /// Let the thread run out instead of cutting the ends square
        #[arg(long)]
        no_flat: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a nut document
    Nut {
        #[command(flatten)]
        size: SizeArgs,
        /// Head style
        #[arg(long, value_enum, default_value_t = HeadArg::Hex)]
        head: HeadArg,
        /// Backing wall outside the thread
        #[arg(long)]
        wall: Option<f64>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a passage document to subtract from a printed part
    Passage {
        #[command(flatten)]
        size: SizeArgs,
        /// Head style
        #[arg(long, value_enum, default_value_t = HeadArg::Allen)]
        head: HeadArg,
        /// Follow the head outline to block rotation
        #[arg(long)]
        tight: bool,
        /// Passage length (default: catalog thread length)
        #[arg(long)]
        length: Option<f64>,
        /// Open the head cavity towards +Z
        #[arg(long)]
        flip: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a bolt, its nut and its passage as one scene
    Kit {
        #[command(flatten)]
        size: SizeArgs,
        /// Bolt head style
        #[arg(long, value_enum, default_value_t = HeadArg::Allen)]
        head: HeadArg,
        /// Nut style
        #[arg(long, value_enum, default_value_t = HeadArg::Hex)]
        nut: HeadArg,
        /// Bolt length (default: catalog thread length)
        #[arg(long)]
        length: Option<f64>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Display information about a document
    Info {
        /// Path to the JSON document
        file: PathBuf,
    },
}

/// Size selection: a catalog name or a diameter to round to a size.
#[derive(Args)]
struct SizeArgs {
    /// Catalog size name, e.g. M3
    #[arg(required_unless_present = "diameter")]
    size: Option<String>,
    /// Pick the nearest size to this diameter (negative rounds down, 0 picks the smallest)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "size")]
    diameter: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeadArg {
    Allen,
    Hex,
    Square,
}

impl From<HeadArg> for HeadStyle {
    fn from(arg: HeadArg) -> Self {
        match arg {
            HeadArg::Allen => HeadStyle::Allen,
            HeadArg::Hex => HeadStyle::Hex,
            HeadArg::Square => HeadStyle::Square,
        }
    }
}

/// Catalog and settings shared by every command.
struct Setup {
    catalog: Catalog,
    settings: PrintSettings,
}

impl Setup {
    fn load(cli: &Cli) -> Result<Self> {
        let catalog = match &cli.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("reading catalog {}", path.display()))?,
            None => Catalog::iso_metric(),
        };
        let mut settings = match &cli.settings {
            Some(path) => PrintSettings::load(path)
                .with_context(|| format!("reading settings {}", path.display()))?,
            None => PrintSettings::default(),
        };
        if let Some(resolution) = cli.resolution {
            settings = settings.with_resolution(resolution);
        }
        tracing::debug!(sizes = catalog.len(), ?settings, "loaded configuration");
        Ok(Self { catalog, settings })
    }

    fn dims(&self, size: &SizeArgs, overrides: &Overrides) -> Result<ScrewDims> {
        let dims = match (&size.size, size.diameter) {
            (_, Some(td)) => guess(&self.catalog, td, overrides, &self.settings)?,
            (Some(name), None) => {
                let index = self
                    .catalog
                    .find(name)
                    .ok_or_else(|| boltcad::FastenerError::UnknownSize(name.clone()))?;
                complete(&self.catalog, index, overrides, &self.settings)?
            }
            (None, None) => anyhow::bail!("Give a size name or --diameter"),
        };
        Ok(dims)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Info { file } = &cli.command {
        return show_info(file);
    }

    let ctx = Setup::load(&cli)?;
    let no_overrides = Overrides::default();

    match cli.command {
        Commands::Sizes => list_sizes(&ctx.catalog),
        Commands::Dims {
            size,
            length,
            pitch,
            passage_length,
        } => {
            let overrides = Overrides {
                thread_length: length,
                pitch,
                thread_passage_length: passage_length,
                ..Default::default()
            };
            let dims = ctx.dims(&size, &overrides)?;
            println!("{}", serde_json::to_string_pretty(&dims)?);
        }
        Commands::Bolt {
            size,
            head,
            length,
            plain,
            no_flat,
            output,
        } => {
            let dims = ctx.dims(&size, &no_overrides)?;
            let bolt = if plain {
                plain_bolt(&dims, head.into(), length, &ctx.settings)?
            } else {
                threaded_bolt(&dims, head.into(), length, !no_flat, &ctx.settings)?
            };
            write_part(&bolt, output.as_deref())?;
        }
        Commands::Nut {
            size,
            head,
            wall,
            output,
        } => {
            let dims = ctx.dims(&size, &no_overrides)?;
            let nut = threaded_nut(&dims, head.into(), wall, &ctx.settings)?;
            write_part(&nut, output.as_deref())?;
        }
        Commands::Passage {
            size,
            head,
            tight,
            length,
            flip,
            output,
        } => {
            let dims = ctx.dims(&size, &no_overrides)?;
            let fit = if tight { Fit::Tight } else { Fit::Loose };
            let orientation = if flip {
                Orientation::Nut
            } else {
                Orientation::Bolt
            };
            let length = length.unwrap_or(dims.thread_length());
            let hole = passage(&dims, head.into(), fit, length, orientation, &ctx.settings)?;
            write_part(&hole, output.as_deref())?;
        }
        Commands::Kit {
            size,
            head,
            nut,
            length,
            output,
        } => {
            let dims = ctx.dims(&size, &no_overrides)?;
            let length = length.unwrap_or(dims.thread_length());
            let mut scene = Scene::new();
            scene.add(&threaded_bolt(&dims, head.into(), Some(length), true, &ctx.settings)?);
            scene.add(&threaded_nut(&dims, nut.into(), None, &ctx.settings)?);
            scene.add(&passage(
                &dims,
                head.into(),
                Fit::Loose,
                length,
                Orientation::Bolt,
                &ctx.settings,
            )?);
            write_document(&scene.to_document(), output.as_deref())?;
        }
        Commands::Info { .. } => unreachable!("handled before loading configuration"),
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn list_sizes(catalog: &Catalog) {
    println!("{:<8} {:>8} {:>10} {:>8}", "size", "pitch", "diameter", "length");
    for entry in catalog.iter() {
        println!(
            "{:<8} {:>8} {:>10} {:>8}",
            entry.name, entry.pitch, entry.thread_diameter, entry.thread_length
        );
    }
}

fn write_part(part: &Part, output: Option<&Path>) -> Result<()> {
    write_document(&part.to_document(), output)
}

fn write_document(doc: &Document, output: Option<&Path>) -> Result<()> {
    let json = doc.to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "Wrote {} node(s), {} part(s) to {}",
                doc.nodes.len(),
                doc.roots.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn show_info(file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let doc = Document::from_json(&json)?;
    doc.validate()?;

    println!("boltcad document: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Nodes: {}", doc.nodes.len());
    println!("  Scene entries: {}", doc.roots.len());

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for node in doc.nodes.values() {
        *counts.entry(node.op.kind()).or_default() += 1;
    }
    println!("\nOperations:");
    for (kind, count) in &counts {
        println!("  {kind}: {count}");
    }

    if !doc.roots.is_empty() {
        println!("\nScene:");
        for (i, entry) in doc.roots.iter().enumerate() {
            let reachable = doc.depth_first(entry.root)?.len();
            println!("  {}: {} ({} nodes)", i + 1, entry.label, reachable);
            match boltcad::bounds::node_bounds(&doc, entry.root)? {
                Some(b) => {
                    let size = b.size();
                    println!(
                        "     bounds: [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
                        b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
                    );
                    println!("     size: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
                }
                None => println!("     bounds: empty"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_head_names() {
        let cli = Cli::try_parse_from(["boltcad", "nut", "M3", "--head", "square", "--wall", "2"])
            .unwrap();
        match cli.command {
            Commands::Nut { head, wall, .. } => {
                assert_eq!(HeadStyle::from(head), HeadStyle::Square);
                assert_eq!(wall, Some(2.0));
            }
            _ => panic!("expected nut command"),
        }
        assert!(Cli::try_parse_from(["boltcad", "bolt", "M3", "--head", "round"]).is_err());
    }
}
