use std::error::Error;
use std::path::PathBuf;

use blockpix::{default_output_path, run, ColorType, ExtractionMethod, PipelineConfig};
use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use log::LevelFilter;

#[derive(ValueEnum, Clone, Debug)]
enum PaletteMethod {
    Kmeans,
    MedianCut,
}

#[derive(ValueEnum, Clone, Debug)]
enum ColorSpace {
    Lab,
    Rgb,
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("blockpix")
        .version("0.1")
        .about("Pixelize the input image with a brightness-matched palette.")
        .arg(
            Arg::new("input")
                .help("Sets the input file to use")
                .required(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Sets an optional output file, defaults to <input>_pixelized.png"),
        )
        .arg(
            Arg::new("palette_source")
                .short('p')
                .long("palette_source")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Image the palette is extracted from, defaults to the input"),
        )
        .arg(
            Arg::new("pixel_size")
                .short('s')
                .long("pixel_size")
                .help("Side of the square blocks, in pixels.")
                .default_value("8")
                .value_parser(value_parser!(u32))
                .value_name("UINT"),
        )
        .arg(
            Arg::new("n_colors")
                .long("n_colors")
                .short('k')
                .help("The number of colors extracted for the palette.")
                .default_value("8")
                .value_parser(value_parser!(usize))
                .value_name("UINT"),
        )
        .arg(
            Arg::new("method")
                .action(ArgAction::Set)
                .long("method")
                .value_name("PaletteMethod")
                .help("How the palette is extracted. Valid are \"kmeans\" and \"median-cut\".")
                .value_parser(value_parser!(PaletteMethod))
                .default_value("median-cut"),
        )
        .arg(
            Arg::new("quality")
                .long("quality")
                .short('q')
                .help("Sample every n-th pixel for median cut.")
                .default_value("10")
                .value_parser(value_parser!(usize))
                .value_name("UINT"),
        )
        .arg(
            Arg::new("num_runs")
                .long("num_runs")
                .short('r')
                .help("The number of runs for the kmeans algorithm.")
                .default_value("3")
                .value_parser(value_parser!(u32))
                .value_name("UINT"),
        )
        .arg(
            Arg::new("max_iter")
                .long("max_iter")
                .short('i')
                .help("The maximum number of iterations for the kmeans algorithm.")
                .default_value("20")
                .value_parser(value_parser!(usize))
                .value_name("UINT"),
        )
        .arg(
            Arg::new("color_space")
                .long("color_space")
                .short('c')
                .help("The color space kmeans clusters in.")
                .action(ArgAction::Set)
                .value_name("ColorSpace")
                .value_parser(value_parser!(ColorSpace))
                .default_value("lab"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Prints debug information verbosely.")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let env = env_logger::Env::default().default_filter_or("info");
    let mut logger = env_logger::Builder::from_env(env);
    if matches.get_flag("verbose") {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    // Safe to unwrap: required or defaulted
    let input_path = matches.get_one::<PathBuf>("input").unwrap();
    let n_colors = *matches.get_one::<usize>("n_colors").unwrap();
    let pixel_size = *matches.get_one::<u32>("pixel_size").unwrap();

    let method = match matches.get_one::<PaletteMethod>("method").unwrap() {
        PaletteMethod::Kmeans => ExtractionMethod::Kmeans {
            num_runs: *matches.get_one::<u32>("num_runs").unwrap(),
            max_iter: *matches.get_one::<usize>("max_iter").unwrap(),
            color_type: match matches.get_one::<ColorSpace>("color_space").unwrap() {
                ColorSpace::Lab => ColorType::Lab,
                ColorSpace::Rgb => ColorType::Rgb,
            },
        },
        PaletteMethod::MedianCut => ExtractionMethod::MedianCut {
            quality: *matches.get_one::<usize>("quality").unwrap(),
        },
    };
    let config = PipelineConfig::new(n_colors, pixel_size, method)?;

    let palette_source = matches.get_one::<PathBuf>("palette_source").unwrap_or(input_path);
    let output_path = match matches.get_one::<PathBuf>("output") {
        Some(path) => path.clone(),
        None => default_output_path(input_path),
    };

    run(input_path, palette_source, &output_path, &config)?;
    println!("Image saved to {}", output_path.display());

    Ok(())
}
