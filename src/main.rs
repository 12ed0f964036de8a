use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use instant::Duration;
use log::{error, info};

use fillgrid::{
    render_grid, save_image, solve, DuplicatePolicy, FillOptions, GridConfig, WordList,
};

#[derive(Parser)]
#[command(name = "fillgrid")]
#[command(about = "Fill a crossword structure with words from a word list", long_about = None)]
struct Cli {
    /// Grid structure: `_` or `.` for open cells, `#` for blocks
    structure: PathBuf,

    /// Word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file, as a PNG image if it ends in `.png`
    output: Option<PathBuf>,

    /// Allow the same word to fill more than one slot
    #[arg(long)]
    allow_duplicates: bool,

    /// Give up after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> fillgrid::Result<bool> {
    let grid_config = GridConfig::from_template_file(&cli.structure)?;
    let word_list = WordList::from_dict_file(&cli.words)?;

    let options = FillOptions {
        duplicates: if cli.allow_duplicates {
            DuplicatePolicy::Allow
        } else {
            DuplicatePolicy::Forbid
        },
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    match solve(&grid_config, &word_list, &options) {
        Ok(result) => {
            info!("{:?}", result.statistics);

            let display_grid = render_grid(&grid_config, &word_list, &result.assignment);
            println!("{}", display_grid);

            if let Some(output) = &cli.output {
                let is_png = output
                    .extension()
                    .map_or(false, |extension| extension.eq_ignore_ascii_case("png"));
                if is_png {
                    save_image(&grid_config, &word_list, &result.assignment, output)?;
                } else {
                    fs::write(output, display_grid + "\n")?;
                }
                info!("written grid to {}", output.display());
            }
            Ok(true)
        }
        Err(failure) => {
            info!("{}", failure);
            println!("No solution.");
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::from(2)
        }
    }
}
