use subpack::parser::Parser;
use subpack::processor::{self, ProcessOpts};
use subpack::serialiser;
use subpack::{Pos, SubsPack};

use std::io::{self, Read};

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use clap::builder::RangedI64ValueParser;
use clap::Parser as ClapParser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Transform, merge, split and analyze SRT subtitles")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[arg(
        long,
        value_name = "FILE",
        requires = "concat_at",
        help = "Concatenate the subtitles of the second part of the movie."
    )]
    concat: Option<String>,
    #[arg(
        long,
        value_name = "MS",
        value_parser = millis_parser(),
        help = "Where the second part starts in the joined movie, in milliseconds."
    )]
    concat_at: Option<i64>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Merge another subtitle file into the input to create a dual subtitle."
    )]
    merge: Option<String>,
    #[arg(
        long,
        value_name = "MS",
        requires = "split_output",
        value_parser = millis_parser(),
        help = "Split the subtitles at the given time, in milliseconds."
    )]
    split_at: Option<i64>,
    #[arg(
        long,
        value_name = "FILE",
        help = "The file to write the second half of a split to."
    )]
    split_output: Option<String>,
    #[arg(
        long,
        value_name = "MS",
        allow_negative_numbers = true,
        value_parser = millis_parser(),
        help = "Shift all subtitles by the given amount of milliseconds."
    )]
    shift: Option<i64>,
    #[arg(
        long,
        value_name = "FACTOR",
        help = "Scale all timestamps, e.g. 1.001 to fix a 23.976 vs 24 fps mismatch."
    )]
    scale: Option<f64>,
    #[arg(
        long,
        value_name = "FACTOR",
        help = "Lengthen the display duration of all subtitles."
    )]
    lengthen: Option<f64>,
    #[arg(
        long,
        value_name = "POS",
        help = "Position of all subtitles: top, bottom, topleft, center, ... or 1-9."
    )]
    pos: Option<Pos>,
    #[arg(long, value_name = "COLOR", help = "Color of all subtitles, e.g. '#ffff00'.")]
    color: Option<String>,
    #[arg(long, help = "Remove HTML formatting.")]
    remove_html: bool,
    #[arg(long, help = "Remove inline controls such as {\\an8}.")]
    remove_control: bool,
    #[arg(long, help = "Remove hearing impaired lines such as [PHONE RINGING].")]
    remove_hi: bool,
    #[arg(long, help = "Sort the subtitles by appearance time.")]
    sort: bool,
    #[arg(
        long,
        help = "Print statistics to standard error after writing the output."
    )]
    stats: bool,
    #[arg(long, help = "Enable debug logging.")]
    debug: bool,
}

// `i64::MIN` milliseconds is the one value chrono cannot represent.
fn millis_parser() -> RangedI64ValueParser<i64> {
    clap::value_parser!(i64).range(-i64::MAX..)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let pack = read_pack(&cli.input)?;
    if pack.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }

    let concat = match (&cli.concat, cli.concat_at) {
        (Some(path), Some(at)) => Some((read_pack(path)?, Duration::milliseconds(at))),
        (Some(_), None) => return Err(anyhow!("--concat requires --concat-at")),
        _ => None,
    };
    let merge = cli.merge.as_deref().map(read_pack).transpose()?;

    let opts = ProcessOpts {
        concat,
        merge,
        remove_control: cli.remove_control,
        remove_html: cli.remove_html,
        remove_hi: cli.remove_hi,
        shift: cli.shift.map(Duration::milliseconds),
        scale: cli.scale,
        lengthen: cli.lengthen,
        pos: cli.pos,
        color: cli.color,
        sort: cli.sort,
    };
    let mut pack = processor::process(pack, opts)?;

    if let Some(at) = cli.split_at {
        let second = pack
            .split(Duration::milliseconds(at))
            .context("Failed to split subtitles")?;
        let path = cli
            .split_output
            .as_deref()
            .ok_or_else(|| anyhow!("--split-at requires --split-output"))?;
        info!("Writing {} subtitles to '{}'", second.len(), path);
        write_pack(&second, path)?;
    }

    write_pack(&pack, &cli.output)?;

    if cli.stats {
        eprintln!("{}", pack.stats());
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::default()
            .add_directive("subpack=trace".parse().unwrap())
            .add_directive("info".parse().unwrap())
    } else {
        EnvFilter::default()
            .add_directive("subpack=info".parse().unwrap())
            .add_directive("warn".parse().unwrap())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_pack(path: &str) -> Result<SubsPack> {
    let data = if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path).context(format!("Failed to open input file: '{}'", path))?
    };

    let subs = Parser::new()
        .parse(&data)
        .context(format!("Failed to parse SRT file: '{}'", path))?;
    Ok(SubsPack::new(subs))
}

fn write_pack(pack: &SubsPack, path: &str) -> Result<()> {
    if path == "-" {
        serialiser::serialise(pack, io::stdout())
    } else {
        let dst = std::fs::File::create(path)
            .context(format!("Failed to create output file: '{}'", path))?;
        serialiser::serialise(pack, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_arguments_are_bounded() {
        let cli = Cli::try_parse_from(["subpack", "--shift", "-1500"]).unwrap();
        assert_eq!(cli.shift, Some(-1500));

        let min = i64::MIN.to_string();
        assert!(Cli::try_parse_from(["subpack", "--shift", min.as_str()]).is_err());
        for args in [
            ["subpack", "--concat", "b.srt", "--concat-at", min.as_str()],
            ["subpack", "--split-output", "b.srt", "--split-at", min.as_str()],
        ] {
            assert!(Cli::try_parse_from(args).is_err());
        }
    }
}
