use std::{
    error::Error,
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use argh::FromArgs;
use embedded_window::{Config, Source, StdSeekable, StdStream, WindowedReader};
use log::{error, info};

#[derive(FromArgs)]
/// Stream a file or stdin through a sliding window reader
struct Args {
    /// input file, stdin when omitted
    #[argh(positional)]
    input: Option<PathBuf>,

    /// bytes requested per step
    #[argh(option, short = 's', default = "4096")]
    step: usize,

    /// 32 KiB chunks and 256 KiB windows
    #[argh(switch, short = 'l')]
    large: bool,

    /// print a weak checksum per block of this many bytes instead of copying
    #[argh(option)]
    sums: Option<usize>,

    /// count newlines instead of copying
    #[argh(switch)]
    lines: bool,
}

type Result<T> = core::result::Result<T, Box<dyn Error>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let config = if args.large {
        Config::LARGE
    } else {
        Config::DEFAULT
    };

    let result = match &args.input {
        Some(path) => File::open(path)
            .map_err(Into::into)
            .and_then(|file| run(WindowedReader::with_config(StdSeekable(file), config), &args)),
        None => run(
            WindowedReader::with_config(StdStream(io::stdin().lock()), config),
            &args,
        ),
    };

    if let Err(e) = result {
        error!("wincat failed: {e}");
        std::process::exit(1);
    }
}

fn run<S: Source>(mut reader: WindowedReader<S>, args: &Args) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());

    let total = if let Some(block) = args.sums {
        if block == 0 {
            return Err("block size must be non-zero".into());
        }
        for_each_step(&mut reader, block, |offset, bytes| {
            writeln!(out, "{offset:>12} {:>8} {:08x}", bytes.len(), weak_sum(bytes))
        })?
    } else if args.lines {
        let mut lines = 0usize;
        let total = for_each_step(&mut reader, args.step, |_, bytes| {
            lines += memchr::memchr_iter(b'\n', bytes).count();
            Ok(())
        })?;
        writeln!(out, "{lines}")?;
        total
    } else {
        for_each_step(&mut reader, args.step, |_, bytes| out.write_all(bytes))?
    };
    out.flush()?;

    info!(
        "Read {total} bytes, window capacity {} bytes",
        reader.capacity()
    );
    Ok(())
}

/// Walks the whole stream in `step` sized requests and hands each step's
/// bytes to `f`. Returns the stream length.
fn for_each_step<S: Source>(
    reader: &mut WindowedReader<S>,
    step: usize,
    mut f: impl FnMut(u64, &[u8]) -> io::Result<()>,
) -> Result<u64> {
    let mut offset = 0u64;
    loop {
        let view = reader.request(offset, step)?;
        let take = view.len().min(step);
        if take > 0 {
            f(offset, &view[..take])?;
        }
        offset += take as u64;
        if take < step {
            if view.is_eof() {
                return Ok(offset);
            }
            // non-blocking input ran dry
            std::thread::yield_now();
        }
    }
}

/// The rsync-style weak checksum: two 16 bit running sums packed together.
fn weak_sum(bytes: &[u8]) -> u32 {
    let mut a: u32 = 0;
    let mut b: u32 = 0;
    for &byte in bytes {
        a = a.wrapping_add(byte as u32);
        b = b.wrapping_add(a);
    }
    (a & 0xffff) | (b << 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn steps_cover_the_stream() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 253) as u8).collect();
        let mut reader = WindowedReader::new(StdSeekable(Cursor::new(data.clone())));
        let mut copy = Vec::new();
        let total = for_each_step(&mut reader, 777, |offset, bytes| {
            assert_eq!(offset as usize, copy.len());
            copy.extend_from_slice(bytes);
            Ok(())
        })
        .unwrap();
        assert_eq!(total, 50_000);
        assert_eq!(copy, data);
    }

    #[test]
    fn weak_sum_of_known_block() {
        assert_eq!(weak_sum(b""), 0);
        // a = 1 + 2 + 3 = 6, b = 1 + 3 + 6 = 10
        assert_eq!(weak_sum(&[1, 2, 3]), 6 | (10 << 16));
    }
}
