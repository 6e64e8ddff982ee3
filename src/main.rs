use clap::{Parser, Subcommand};
use imgpipe::config;
use imgpipe::imaging::{
    Dimensions, HAnchor, ResizeParams, ScaleSpec, SizeBound, VAnchor, calculate_coordinates,
};
use imgpipe::processor::ImageProcessor;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imgpipe")]
#[command(about = "Resize, crop, watermark and filter images")]
#[command(long_about = "\
Resize, crop, watermark and filter images

An input image (file or http(s) URL) is decoded, run through an ordered list
of operations and encoded as GIF, PNG or JPEG. With no operations, an
unchanged type and quality 100 the input is copied through byte for byte.

Operations come from a TOML recipe:

  [output]
  type = \"jpg\"
  quality = 85

  [[operations]]
  kind = \"resize\"
  width = 400
  height = 300
  scale = \"crop_center_middle\"

Set RUST_LOG=debug to trace each step.

Run 'imgpipe gen-recipe' to generate a documented recipe.toml.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an image through a recipe
    Run {
        /// Input file or http(s) URL
        #[arg(short, long)]
        input: String,
        /// Output file; the encoded image goes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output type (gif, png, jpg), overrides the recipe
        #[arg(long = "type")]
        kind: Option<String>,
        /// JPEG quality 0-100, overrides the recipe
        #[arg(short, long)]
        quality: Option<u32>,
        /// Recipe file with output settings and operations
        #[arg(short, long)]
        recipe: Option<PathBuf>,
    },
    /// Print the source and destination rectangles of a resize
    Coords {
        width_in: u32,
        height_in: u32,
        width_out: u32,
        height_out: u32,
        /// Horizontal crop anchor (left, center, right)
        #[arg(long)]
        crop_x: Option<HAnchor>,
        /// Vertical crop anchor (top, middle, bottom)
        #[arg(long)]
        crop_y: Option<VAnchor>,
        /// ratio, crop, prop, resize, or crop_<x>_<y> / prop_<x>_<y>
        #[arg(long)]
        scale: Option<ScaleSpec>,
        /// smaller, bigger or smaller_bigger
        #[arg(long, default_value = "smaller")]
        size_bound: SizeBound,
        /// Print JSON instead of an ImageMagick command line
        #[arg(long)]
        json: bool,
    },
    /// Write the 1x1 transparent placeholder PNG
    Placeholder {
        #[arg(short, long, default_value = "default.png")]
        output: PathBuf,
    },
    /// Print a stock recipe.toml with all operations documented
    GenRecipe,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            input,
            output,
            kind,
            quality,
            recipe,
        } => {
            let mut processor = ImageProcessor::new();
            if !processor.set_input_file(&input) {
                return Err(format!("input {input:?} is neither a file nor an http(s) URL").into());
            }
            if let Some(path) = &recipe {
                config::load_recipe(path)?.apply_to(&mut processor)?;
            }
            if let Some(kind) = &kind {
                processor.set_output_type(kind)?;
            }
            if let Some(quality) = quality {
                if quality > 100 {
                    return Err("quality must be 0-100".into());
                }
                processor.set_output_quality(quality);
            }
            if let Some(path) = &output {
                processor.set_output_file(path);
            }

            processor.execute()?;

            match &output {
                Some(path) => println!(
                    "{} -> {} ({}, {} operations)",
                    input,
                    path.display(),
                    processor.output_mime(),
                    processor.operations().len()
                ),
                None => {
                    let data = processor.take_output_data().unwrap_or_default();
                    std::io::stdout().lock().write_all(&data)?;
                }
            }
        }
        Command::Coords {
            width_in,
            height_in,
            width_out,
            height_out,
            crop_x,
            crop_y,
            scale,
            size_bound,
            json,
        } => {
            let request = ResizeParams {
                width: width_out,
                height: height_out,
                crop_x,
                crop_y,
                scale,
                size_bound,
            };
            let coords = calculate_coordinates(Dimensions::new(width_in, height_in), &request);
            if json {
                println!("{}", serde_json::to_string_pretty(&coords)?);
            } else {
                println!(
                    "src:  {}x{}+{}+{}",
                    coords.src.width, coords.src.height, coords.src.x, coords.src.y
                );
                println!("dest: {}x{}", coords.dest.width, coords.dest.height);
                println!("{}", coords.to_magick_args("input", "output"));
            }
        }
        Command::Placeholder { output } => {
            let mut processor = ImageProcessor::new();
            processor.set_output_file(&output);
            processor.create_default()?;
            println!("{} -> {}", processor.output_name(), output.display());
        }
        Command::GenRecipe => {
            print!("{}", config::stock_recipe_toml());
        }
    }

    Ok(())
}
