#![forbid(unsafe_code)]

//! Command-line argument parsing for the Cheetah tools.
//!
//! Args are parsed by hand. Environment variables under the `CHEETAH_`
//! prefix provide defaults; explicit flags override them.

use std::process;
use std::time::Duration;

use cheetah_fx::Generator;
use cheetah_runtime::{Cadence, TimeSource};
use chrono::NaiveDateTime;

use crate::countdown::{self, CountdownFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const COUNTDOWN_HELP: &str = "\
cheetah-countdown: count down to a moment on a character display

USAGE:
    cheetah-countdown --host=HOST --date=\"Y-m-d H:M:S\" --text=TEXT [OPTIONS]

OPTIONS:
    --host=HOST          Display address, e.g. 10.0.0.7 or display.local:8080
    --date=DATE          Target in local time, e.g. \"2026-12-31 23:59:59\"
    --text=TEXT          Text shown once the target is reached
    --format=FMT         Countdown format (default: \"{d}d {H:02d}:{M:02d}:{S:02d}\")
                         Fields: {d} days, {H} hours, {M} minutes, {S} seconds
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    CHEETAH_HOST                Override --host default
    CHEETAH_COUNTDOWN_FORMAT    Override --format default
    RUST_LOG                    Log filter (default: info)";

const ANIMATE_HELP: &str = "\
cheetah-animate: drive an animation generator into a display or the terminal

USAGE:
    cheetah-animate (--host=HOST | --preview) [OPTIONS]

OPTIONS:
    --host=HOST          Push frames to the display at HOST
    --preview            Render frames in this terminal instead
    --width=N            Frame width in pixels (default: 74)
    --height=N           Frame height in pixels (default: 101)
    --generator=SEL      Generator name or selection document, e.g.
                         plasma or '{\"generator\":\"matrix\",\"params\":{\"speed\":20}}'
    --cadence-ms=N       Delay between frames; 0 runs a tight loop (default: 10)
    --clock=SOURCE       'wall' (default), 'counter' or 'counter:STEP'
    --brightness=N       Set display brightness 0-255 before starting
    --pixels-path=PATH   Pixel endpoint (default: /canvas/pixels.json)
    --exit-after-ms=N    Stop after N milliseconds (0 = run until killed)
    --list               Print the generator catalog as JSON and exit
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    CHEETAH_HOST             Override --host default
    CHEETAH_GENERATOR        Override --generator default
    CHEETAH_CADENCE_MS       Override --cadence-ms default
    CHEETAH_EXIT_AFTER_MS    Override --exit-after-ms default
    RUST_LOG                 Log filter (default: info)";

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<T> {
    Run(T),
    Help,
    Version,
}

/// Invalid command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError(pub String);

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CliError {}

fn invalid(flag: &str, value: &str) -> CliError {
    CliError(format!("Invalid {flag} value: {value}"))
}

fn unknown(arg: &str) -> CliError {
    CliError(format!("Unknown argument: {arg}"))
}

fn number<N: std::str::FromStr>(flag: &str, value: &str) -> Result<N, CliError> {
    value.parse().map_err(|_| invalid(flag, value))
}

/// Print help or version and exit, or return the options to run with.
/// Invalid input exits with status 1.
fn resolve<T>(tool: &str, help: &str, parsed: Result<Command<T>, CliError>) -> T {
    match parsed {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            println!("{help}");
            process::exit(0);
        }
        Ok(Command::Version) => {
            println!("{tool} {VERSION}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!("Run with --help for usage information.");
            process::exit(1);
        }
    }
}

// =============================================================================
// cheetah-countdown
// =============================================================================

/// Parsed `cheetah-countdown` options.
#[derive(Debug, Clone)]
pub struct CountdownOpts {
    pub host: String,
    pub target: NaiveDateTime,
    pub text: String,
    pub format: CountdownFormat,
}

impl CountdownOpts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        resolve(
            "cheetah-countdown",
            COUNTDOWN_HELP,
            Self::parse_from(args, |key| std::env::var(key).ok()),
        )
    }

    pub fn parse_from<I, E>(args: I, env: E) -> Result<Command<Self>, CliError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut host = env("CHEETAH_HOST");
        let mut format = env("CHEETAH_COUNTDOWN_FORMAT");
        let mut date = None;
        let mut text = None;

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                other => {
                    if let Some(val) = other.strip_prefix("--host=") {
                        host = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--date=") {
                        date = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--text=") {
                        text = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--format=") {
                        format = Some(val.to_string());
                    } else {
                        return Err(unknown(other));
                    }
                }
            }
        }

        let host = host
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| CliError("Missing --host".into()))?;
        let date = date.ok_or_else(|| CliError("Missing --date".into()))?;
        let target = countdown::parse_target(&date).map_err(|_| invalid("--date", &date))?;
        let text = text.ok_or_else(|| CliError("Missing --text".into()))?;
        let format = match format {
            Some(fmt) => CountdownFormat::parse(&fmt)
                .map_err(|err| CliError(format!("Invalid --format value: {err}")))?,
            None => CountdownFormat::default(),
        };

        Ok(Command::Run(Self {
            host,
            target,
            text,
            format,
        }))
    }
}

// =============================================================================
// cheetah-animate
// =============================================================================

/// Where `cheetah-animate` sends frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Device { host: String },
    Preview,
}

/// Parsed `cheetah-animate` options.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimateOpts {
    /// `None` until `--host` or `--preview` is given.
    pub output: Option<Output>,
    pub width: usize,
    pub height: usize,
    pub generator: Generator,
    pub cadence: Cadence,
    pub time_source: TimeSource,
    pub brightness: Option<i64>,
    pub pixels_path: Option<String>,
    /// Auto-stop after this long.
    pub exit_after: Option<Duration>,
    /// Print the catalog instead of animating.
    pub list: bool,
}

impl Default for AnimateOpts {
    fn default() -> Self {
        Self {
            output: None,
            width: 74,
            height: 101,
            generator: Generator::default(),
            cadence: Cadence::default(),
            time_source: TimeSource::WallClock,
            brightness: None,
            pixels_path: None,
            exit_after: None,
            list: false,
        }
    }
}

fn parse_clock(value: &str) -> Result<TimeSource, CliError> {
    match value {
        "wall" => Ok(TimeSource::WallClock),
        "counter" => Ok(TimeSource::Counter { start: 0, step: 1 }),
        other => {
            let step = other
                .strip_prefix("counter:")
                .and_then(|step| step.parse().ok())
                .ok_or_else(|| invalid("--clock", value))?;
            Ok(TimeSource::Counter { start: 0, step })
        }
    }
}

fn parse_generator(value: &str) -> Result<Generator, CliError> {
    Generator::parse(value).map_err(|err| CliError(format!("Invalid --generator value: {err}")))
}

fn exit_after(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl AnimateOpts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        resolve(
            "cheetah-animate",
            ANIMATE_HELP,
            Self::parse_from(args, |key| std::env::var(key).ok()),
        )
    }

    pub fn parse_from<I, E>(args: I, env: E) -> Result<Command<Self>, CliError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Environment defaults first; malformed values are ignored.
        if let Some(host) = env("CHEETAH_HOST").filter(|h| !h.trim().is_empty()) {
            opts.output = Some(Output::Device { host });
        }
        if let Some(val) = env("CHEETAH_GENERATOR")
            && let Ok(generator) = Generator::parse(&val)
        {
            opts.generator = generator;
        }
        if let Some(val) = env("CHEETAH_CADENCE_MS")
            && let Ok(ms) = val.parse()
        {
            opts.cadence = Cadence::from_millis(ms);
        }
        if let Some(val) = env("CHEETAH_EXIT_AFTER_MS")
            && let Ok(ms) = val.parse()
        {
            opts.exit_after = exit_after(ms);
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--preview" => opts.output = Some(Output::Preview),
                "--list" => opts.list = true,
                other => {
                    if let Some(val) = other.strip_prefix("--host=") {
                        opts.output = Some(Output::Device {
                            host: val.to_string(),
                        });
                    } else if let Some(val) = other.strip_prefix("--width=") {
                        opts.width = number("--width", val)?;
                    } else if let Some(val) = other.strip_prefix("--height=") {
                        opts.height = number("--height", val)?;
                    } else if let Some(val) = other.strip_prefix("--generator=") {
                        opts.generator = parse_generator(val)?;
                    } else if let Some(val) = other.strip_prefix("--cadence-ms=") {
                        opts.cadence = Cadence::from_millis(number("--cadence-ms", val)?);
                    } else if let Some(val) = other.strip_prefix("--clock=") {
                        opts.time_source = parse_clock(val)?;
                    } else if let Some(val) = other.strip_prefix("--brightness=") {
                        let level: i64 = number("--brightness", val)?;
                        if !(0..=255).contains(&level) {
                            return Err(invalid("--brightness", val));
                        }
                        opts.brightness = Some(level);
                    } else if let Some(val) = other.strip_prefix("--pixels-path=") {
                        opts.pixels_path = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after = exit_after(number("--exit-after-ms", val)?);
                    } else {
                        return Err(unknown(other));
                    }
                }
            }
        }

        if opts.output.is_none() && !opts.list {
            return Err(CliError("One of --host or --preview is required".into()));
        }
        if matches!(opts.output, Some(Output::Device { ref host }) if host.trim().is_empty()) {
            return Err(invalid("--host", ""));
        }
        if cheetah_core::byte_len(opts.width, opts.height).is_none() {
            return Err(CliError(format!(
                "Frame {}x{} is too large",
                opts.width, opts.height
            )));
        }
        Ok(Command::Run(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cheetah_fx::{AnimationGenerator, Plasma};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn animate(list: &[&str]) -> Result<Command<AnimateOpts>, CliError> {
        AnimateOpts::parse_from(args(list), no_env)
    }

    fn run<T>(cmd: Result<Command<T>, CliError>) -> T {
        match cmd {
            Ok(Command::Run(opts)) => opts,
            Ok(_) => panic!("expected Run"),
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_generators_flag() {
        assert!(ANIMATE_HELP.contains("--generator"));
        assert!(COUNTDOWN_HELP.contains("{H:02d}"));
    }

    #[test]
    fn countdown_requires_all_fields() {
        let err = CountdownOpts::parse_from(args(&["--date=2026-01-01 00:00:00"]), no_env)
            .unwrap_err();
        assert_eq!(err, CliError("Missing --host".into()));

        let err = CountdownOpts::parse_from(args(&["--host=a", "--date=2026-01-01 00:00:00"]), no_env)
            .unwrap_err();
        assert_eq!(err, CliError("Missing --text".into()));
    }

    #[test]
    fn countdown_full_parse() {
        let opts = run(CountdownOpts::parse_from(
            args(&[
                "--host=10.0.0.7",
                "--date=2026-12-31 23:59:59",
                "--text=Happy new year",
                "--format={S}s",
            ]),
            no_env,
        ));
        assert_eq!(opts.host, "10.0.0.7");
        assert_eq!(opts.text, "Happy new year");
        assert_eq!(opts.format.render(42), "42s");
        assert_eq!(opts.target, countdown::parse_target("2026-12-31 23:59:59").unwrap());
    }

    #[test]
    fn countdown_host_from_env() {
        let env = |key: &str| (key == "CHEETAH_HOST").then(|| "display.local".to_string());
        let opts = run(CountdownOpts::parse_from(
            args(&["--date=2026-12-31 23:59:59", "--text=x"]),
            env,
        ));
        assert_eq!(opts.host, "display.local");
        assert_eq!(opts.format, CountdownFormat::default());
    }

    #[test]
    fn countdown_rejects_bad_date_and_format() {
        let base = ["--host=a", "--text=x"];
        let mut bad_date = args(&base);
        bad_date.push("--date=tomorrow".into());
        assert_eq!(
            CountdownOpts::parse_from(bad_date, no_env).unwrap_err(),
            CliError("Invalid --date value: tomorrow".into())
        );

        let mut bad_format = args(&base);
        bad_format.push("--date=2026-12-31 23:59:59".into());
        bad_format.push("--format={x}".into());
        assert!(CountdownOpts::parse_from(bad_format, no_env).is_err());
    }

    #[test]
    fn animate_defaults() {
        let opts = run(animate(&["--preview"]));
        assert_eq!(opts.output, Some(Output::Preview));
        assert_eq!((opts.width, opts.height), (74, 101));
        assert_eq!(opts.generator, Generator::default());
        assert_eq!(opts.cadence, Cadence::Paced(Duration::from_millis(10)));
        assert_eq!(opts.time_source, TimeSource::WallClock);
        assert_eq!(opts.exit_after, None);
    }

    #[test]
    fn animate_full_parse() {
        let opts = run(animate(&[
            "--host=10.0.0.7",
            "--width=16",
            "--height=8",
            "--generator=plasma",
            "--cadence-ms=0",
            "--clock=counter:1000",
            "--brightness=128",
            "--pixels-path=/canvas/bitmap.json",
            "--exit-after-ms=2500",
        ]));
        assert_eq!(
            opts.output,
            Some(Output::Device {
                host: "10.0.0.7".into()
            })
        );
        assert_eq!((opts.width, opts.height), (16, 8));
        assert_eq!(opts.generator, Generator::Plasma(Plasma::default()));
        assert_eq!(opts.cadence, Cadence::Tight);
        assert_eq!(opts.time_source, TimeSource::Counter { start: 0, step: 1000 });
        assert_eq!(opts.brightness, Some(128));
        assert_eq!(opts.pixels_path.as_deref(), Some("/canvas/bitmap.json"));
        assert_eq!(opts.exit_after, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn animate_requires_an_output() {
        assert!(animate(&["--width=3"]).is_err());
        assert!(matches!(animate(&["--list"]), Ok(Command::Run(_))));
    }

    #[test]
    fn animate_rejects_bad_values() {
        assert_eq!(
            animate(&["--preview", "--width=wide"]).unwrap_err(),
            CliError("Invalid --width value: wide".into())
        );
        assert!(animate(&["--preview", "--brightness=300"]).is_err());
        assert!(animate(&["--preview", "--clock=sundial"]).is_err());
        assert!(animate(&["--preview", "--generator=lava"]).is_err());
        assert!(animate(&["--preview", "--bogus"]).is_err());
    }

    #[test]
    fn animate_rejects_frames_too_large_to_allocate() {
        let huge = format!("--width={}", usize::MAX / 2);
        assert_eq!(
            animate(&["--preview", &huge, "--height=3"]).unwrap_err(),
            CliError(format!("Frame {}x3 is too large", usize::MAX / 2))
        );
        assert!(matches!(
            animate(&["--preview", "--width=0", &format!("--height={}", usize::MAX)]),
            Ok(Command::Run(_))
        ));
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            "CHEETAH_HOST" => Some("env-host".to_string()),
            "CHEETAH_CADENCE_MS" => Some("40".to_string()),
            "CHEETAH_GENERATOR" => Some("matrix".to_string()),
            _ => None,
        };
        let opts = run(AnimateOpts::parse_from(args(&["--cadence-ms=5"]), env));
        assert_eq!(
            opts.output,
            Some(Output::Device {
                host: "env-host".into()
            })
        );
        assert_eq!(opts.cadence, Cadence::from_millis(5));
        assert_eq!(opts.generator.name(), "matrix");

        let opts = run(AnimateOpts::parse_from(args(&["--preview"]), env));
        assert_eq!(opts.output, Some(Output::Preview));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(animate(&["--bogus=1", "-h"]).unwrap_err(), unknown("--bogus=1"));
        assert!(matches!(animate(&["-V", "--bogus"]), Ok(Command::Version)));
        assert!(matches!(
            CountdownOpts::parse_from(args(&["--help"]), no_env),
            Ok(Command::Help)
        ));
    }
}
