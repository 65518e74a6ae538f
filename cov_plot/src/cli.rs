use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgMatches, Command,
};

use utils::{init_log, parse_nt_value, LogLevel};

use crate::{config::*, output::ImageFormat, painter::PlotKind};

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("warn")
                .help("Set log level"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log level (may be repeated)"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with_all(["loglevel", "verbose"])
                .help("Silence all output"),
        )
        .arg(
            Arg::new("nt_per_band")
                .short('n')
                .long("nt-per-band")
                .value_parser(parse_nt_value)
                .value_name("INT")
                .help("Set number of nucleotides per band [default: automatic]"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Input npz file with coverage data [default: combined/<SEQ_ID>.combined.coverage.npz]"),
        )
        .arg(
            Arg::new("width")
                .short('W')
                .long("width")
                .value_parser(value_parser!(u32).range(100..))
                .value_name("INT")
                .default_value("1000")
                .help("Set image width (px)"),
        )
        .arg(
            Arg::new("band_height")
                .short('H')
                .long("band-height")
                .value_parser(value_parser!(u32).range(10..))
                .value_name("INT")
                .default_value("200")
                .help("Set height of each band (px)"),
        )
        .arg(
            Arg::new("yfrac")
                .short('Y')
                .long("yfrac")
                .value_parser(value_parser!(f64))
                .value_name("FLOAT")
                .default_value("0.98")
                .help("Fraction of the coverage that must fall inside the y limits of each band"),
        )
        .arg(
            Arg::new("ymax")
                .long("ymax")
                .value_parser(value_parser!(f64))
                .value_name("FLOAT")
                .help("Set maximum of the y axis (overrides --yfrac)"),
        )
        .arg(
            Arg::new("start")
                .short('s')
                .long("start")
                .value_parser(parse_nt_value)
                .value_name("POS")
                .help("Start position of the plot [default: 0]"),
        )
        .arg(
            Arg::new("stop")
                .short('e')
                .long("stop")
                .value_parser(parse_nt_value)
                .value_name("POS")
                .help("Stop position of the plot [default: end of sequence]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Output file name without extension [default: SEQ_ID]"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_parser(value_parser!(ImageFormat))
                .ignore_case(true)
                .action(ArgAction::Append)
                .value_name("FORMAT")
                .default_value("png")
                .help("Output format: png, jpg, bmp or svg (may be given more than once)"),
        )
        .arg(
            Arg::new("kind")
                .short('k')
                .long("kind")
                .value_parser(value_parser!(PlotKind))
                .ignore_case(true)
                .value_name("KIND")
                .default_value("coverage")
                .help("Band contents: coverage, binned or frame"),
        )
        .arg(
            Arg::new("tag")
                .short('T')
                .long("tag")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .help("Tag added to output file name"),
        )
        .arg(
            Arg::new("title")
                .short('t')
                .long("title")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .help("Set plot title"),
        )
        .arg(
            Arg::new("quick")
                .short('Q')
                .long("quick")
                .action(ArgAction::SetTrue)
                .help("Create a light version of the plot"),
        )
        .arg(
            Arg::new("seq_id")
                .value_parser(value_parser!(String))
                .value_name("SEQ_ID")
                .required(true)
                .help("Sequence identifier"),
        )
}

/// Build Config from parsed matches
fn config_from_matches(m: &ArgMatches) -> anyhow::Result<Config> {
    let seq_id = m
        .get_one::<String>("seq_id")
        .expect("Missing sequence id")
        .clone();

    let mut cfg = Config::new(seq_id);

    if let Some(p) = m.get_one::<PathBuf>("input") {
        cfg.set_input_file(p)
    }

    cfg.set_range(
        m.get_one::<usize>("start").copied(),
        m.get_one::<usize>("stop").copied(),
    )?;

    if let Some(x) = m.get_one::<usize>("nt_per_band") {
        cfg.set_nt_per_band(*x)?
    }

    cfg.set_image_width(*m.get_one::<u32>("width").expect("Missing default width"));
    cfg.set_band_height(
        *m.get_one::<u32>("band_height")
            .expect("Missing default band height"),
    );

    let yscale = match m.get_one::<f64>("ymax") {
        Some(y) => YScale::Max(*y),
        None => YScale::Fraction(*m.get_one::<f64>("yfrac").expect("Missing default yfrac")),
    };
    cfg.set_yscale(yscale)?;

    if let Some(p) = m.get_one::<PathBuf>("output") {
        cfg.set_output(p)
    }

    cfg.set_formats(
        m.get_many::<ImageFormat>("format")
            .map(|v| v.copied().collect())
            .unwrap_or_default(),
    );

    if let Some(k) = m.get_one::<PlotKind>("kind") {
        cfg.set_kind(*k)
    }
    if let Some(s) = m.get_one::<String>("tag") {
        cfg.set_tag(s.clone())
    }
    if let Some(s) = m.get_one::<String>("title") {
        cfg.set_title(s.clone())
    }
    if m.get_flag("quick") {
        cfg.set_quick()
    }

    Ok(cfg)
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m)?;

    debug!("Processing command line options");

    config_from_matches(&m)
}
