extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{err_msg, Error};
use log::info;
use mandelbrot::config::{default_workers, MAX_ITERATIONS, MIN_ITERATIONS};
use mandelbrot::{Config, Explorer, ViewState, YStep};
use std::str::FromStr;
use std::time::Duration;

/// Given a string and a separator, returns the two values
/// separated by the separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_steps(s: &str) -> Result<(), String> {
    validate_range(
        s,
        0,
        200,
        "Could not parse zoom steps",
        "At most 200 zoom steps",
    )
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const SEQUENTIAL: &str = "sequential";
const SQUARE_PIXELS: &str = "square-pixels";
const TIMEOUT: &str = "timeout-ms";
const CLICK: &str = "click";
const ZOOM_IN: &str = "zoom-in";
const ZOOM_OUT: &str = "zoom-out";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandelbrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Band-parallel Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output image; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("600x600")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.5,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Center of the view on the complex plane"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.1,
                        std::f64::MAX,
                        "Could not parse zoom",
                        "Zoom must be at least 0.1",
                    )
                })
                .help("Magnification; 1 shows a 4x4 square of the plane"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        MIN_ITERATIONS,
                        MAX_ITERATIONS,
                        "Could not parse iteration count",
                        &format!(
                            "Iteration count must be between {} and {}",
                            MIN_ITERATIONS, MAX_ITERATIONS
                        ),
                    )
                })
                .help("Iteration cap per pixel"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of band workers [default: one per CPU]"),
        )
        .arg(
            Arg::with_name(SEQUENTIAL)
                .long(SEQUENTIAL)
                .help("Render on the main thread only"),
        )
        .arg(
            Arg::with_name(SQUARE_PIXELS)
                .long(SQUARE_PIXELS)
                .help("Divide the vertical step by the image height instead of its width"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .long(TIMEOUT)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        u64::max_value(),
                        "Could not parse timeout",
                        "Timeout must be positive",
                    )
                })
                .help("Fail if a parallel render takes longer than this"),
        )
        .arg(
            Arg::with_name(CLICK)
                .long(CLICK)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .validator(|s| validate_pair::<usize>(&s, ',', "Could not parse click position"))
                .help("Recenter on pixel X,Y before rendering; may be repeated"),
        )
        .arg(
            Arg::with_name(ZOOM_IN)
                .long(ZOOM_IN)
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_steps(&s))
                .help("Zoom in this many steps after clicking"),
        )
        .arg(
            Arg::with_name(ZOOM_OUT)
                .long(ZOOM_OUT)
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_steps(&s))
                .help("Zoom out this many steps after clicking"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| err_msg(format!("Missing value for --{}", name)))?;
    T::from_str(raw).map_err(|_| err_msg(format!("Could not parse --{}", name)))
}

fn pair<T: FromStr>(matches: &ArgMatches, name: &str, separator: char) -> Result<(T, T), Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| err_msg(format!("Missing value for --{}", name)))?;
    parse_pair(raw, separator).ok_or_else(|| err_msg(format!("Could not parse --{}", name)))
}

fn config(matches: &ArgMatches) -> Result<Config, Error> {
    let (width, height) = pair::<usize>(matches, SIZE, 'x')?;
    let (center_x, center_y) = pair::<f64>(matches, CENTER, ',')?;
    let workers = if matches.is_present(SEQUENTIAL) {
        None
    } else if matches.is_present(THREADS) {
        Some(value(matches, THREADS)?)
    } else {
        Some(default_workers())
    };
    let timeout = match matches.value_of(TIMEOUT) {
        Some(ms) => Some(Duration::from_millis(u64::from_str(ms)?)),
        None => None,
    };
    Ok(Config {
        width,
        height,
        view: ViewState::new(center_x, center_y, value(matches, ZOOM)?),
        max_iterations: value(matches, ITERATIONS)?,
        workers,
        y_step: if matches.is_present(SQUARE_PIXELS) {
            YStep::ImageHeight
        } else {
            YStep::ImageWidth
        },
        timeout,
    })
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let mut explorer = Explorer::new(config(matches)?)?;

    if let Some(clicks) = matches.values_of(CLICK) {
        for click in clicks {
            let (x, y) = parse_pair::<usize>(click, ',')
                .ok_or_else(|| err_msg("Could not parse click position"))?;
            explorer.click(x, y);
        }
    }
    for _ in 0..value::<usize>(matches, ZOOM_IN)? {
        explorer.zoom_in();
    }
    for _ in 0..value::<usize>(matches, ZOOM_OUT)? {
        explorer.zoom_out();
    }

    let frame = explorer.render()?;
    let view = explorer.view();
    println!(
        "Rendered {}x{} at {}{:+}i, zoom {:.1}, {} iterations on {} worker(s) in {:.1} ms",
        frame.width,
        frame.height,
        view.center_x,
        view.center_y,
        view.zoom,
        explorer.max_iterations(),
        explorer.active_workers(),
        frame.elapsed_ms()
    );

    let output = matches
        .value_of(OUTPUT)
        .ok_or_else(|| err_msg("No output file"))?;
    frame.save(output)?;
    info!("wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
