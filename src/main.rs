use clap::{Parser, Subcommand};
use log::debug;
use ppmsteg::{embed, extract, Image, RandomBits};
use std::{
    error::Error,
    io::{self, BufRead, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

/// Longest message read from standard input, in bytes
const MAX_MESSAGE_LEN: usize = 1023;

#[derive(Parser, Debug)]
#[command(version, about = "Hide a message in the red channel of a PPM image")]
struct Args {
    /// Seed for the pixel selection, random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Read a PPM file and write it back to standard output
    #[command(name = "t", alias = "test")]
    Test { file: PathBuf },
    /// Read a message from standard input and hide it in a copy of FILE
    #[command(name = "e", alias = "encode")]
    Encode { file: PathBuf },
    /// Print the message hidden in ENCODED, compared against ORIGINAL
    #[command(name = "d", alias = "decode")]
    Decode { original: PathBuf, encoded: PathBuf },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    // seeded once, before any image is touched
    let mut bits = match args.seed {
        Some(seed) => RandomBits::seeded(seed),
        None => RandomBits::from_entropy(),
    };

    match args.mode {
        Mode::Test { file } => {
            let image = Image::open(&file)?;
            image.write_to(BufWriter::new(io::stdout().lock()))?;
        }
        Mode::Encode { file } => {
            let original = Image::open(&file)?;
            eprint!("Enter message to encode: ");
            io::stderr().flush()?;
            let message = read_message(io::stdin().lock())?.ok_or("Failed to read message")?;
            debug!("Encoding {} byte message", message.len());
            let encoded = embed(&original, &message, &mut bits)?;
            encoded.write_to(BufWriter::new(io::stdout().lock()))?;
        }
        Mode::Decode { original, encoded } => {
            let original = Image::open(&original)?;
            let encoded = Image::open(&encoded)?;
            let message = extract(&original, &encoded)?;
            // printed as a C string would be, up to the first zero byte
            let end = message
                .iter()
                .position(|&byte| byte == 0)
                .unwrap_or(message.len());
            let mut stdout = io::stdout().lock();
            stdout.write_all(b"Decoded message: ")?;
            stdout.write_all(&message[..end])?;
            stdout.write_all(b"\n")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// First whitespace separated word of `input`, at most [`MAX_MESSAGE_LEN`] bytes
fn read_message<R: BufRead>(mut input: R) -> io::Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        if let Some(word) = line
            .split(|byte| byte.is_ascii_whitespace())
            .find(|word| !word.is_empty())
        {
            return Ok(Some(word[..word.len().min(MAX_MESSAGE_LEN)].to_vec()));
        }
    }
}
