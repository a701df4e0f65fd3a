//! lazyboot - Adaptive Lazy Resource Loading
//!
//! Loads a page, boots the lazy loader against a simulated host and prints
//! the rewritten document or a JSON report of what the loader did.

use lazyboot::dom::Viewport;
use lazyboot::lazy::{EngineStats, StrategyKind};
use lazyboot::platform::{ConnectionInfo, EffectiveType};
use lazyboot::{Capabilities, Environment, LazyConfig, LazyError, Page, Result, NAME, VERSION};
use serde::Serialize;
use std::env;
use std::path::PathBuf;

const USAGE: &str = "\
usage: lazyboot <page.html> [options]

options:
  --viewport WxH        viewport size in pixels (default 390x844)
  --scroll Y            scroll to Y after the page settles
  --connection TYPE     effective connection type: slow-2g, 2g, 3g or 4g
  --save-data           the user asked to reduce data usage
  --reduced-motion      the user prefers reduced motion
  --no-observer         host without intersection and resize observers
  --no-idle             host without idle callbacks
  --config FILE         TOML file with loader tunables
  --report              print a JSON report instead of the document
  --help                show this message";

#[derive(Debug, Default)]
struct Options {
    page: PathBuf,
    viewport: Viewport,
    scroll: Option<f32>,
    connection: Option<EffectiveType>,
    save_data: bool,
    reduced_motion: bool,
    no_observer: bool,
    no_idle: bool,
    config: Option<PathBuf>,
    report: bool,
}

impl Options {
    fn environment(&self) -> Environment {
        let mut capabilities = Capabilities::modern();
        if self.no_observer {
            capabilities.intersection_observer = false;
            capabilities.resize_observer = false;
        }
        if self.no_idle {
            capabilities.idle_callback = false;
        }

        let connection = if self.connection.is_some() || self.save_data {
            Some(ConnectionInfo {
                effective_type: self.connection.unwrap_or(EffectiveType::FourG),
                save_data: self.save_data,
            })
        } else {
            None
        };

        Environment {
            capabilities,
            connection,
            prefers_reduced_motion: self.reduced_motion,
        }
    }
}

#[derive(Serialize)]
struct ProfileReport {
    effective_type: &'static str,
    save_data: bool,
    slow: bool,
    reduced_motion: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    name: &'static str,
    version: &'static str,
    profile: Option<ProfileReport>,
    strategy: Option<StrategyKind>,
    pending: usize,
    listeners: usize,
    frames: u64,
    stats: Option<&'a EngineStats>,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{} v{}\n\n{}", NAME, VERSION, USAGE);
        return;
    }

    if let Err(e) = parse_args(&args).and_then(|options| run(&options)) {
        eprintln!("{}: {}", NAME, e);
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut page = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--viewport" => options.viewport = parse_viewport(value(&mut iter, arg)?)?,
            "--scroll" => options.scroll = Some(parse_number(value(&mut iter, arg)?, arg)?),
            "--connection" => {
                let raw = value(&mut iter, arg)?;
                let effective_type = EffectiveType::parse(raw);
                if effective_type == EffectiveType::Unknown {
                    return Err(LazyError::InvalidArgument(format!(
                        "unknown connection type '{}'",
                        raw
                    )));
                }
                options.connection = Some(effective_type);
            }
            "--save-data" => options.save_data = true,
            "--reduced-motion" => options.reduced_motion = true,
            "--no-observer" => options.no_observer = true,
            "--no-idle" => options.no_idle = true,
            "--config" => options.config = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--report" => options.report = true,
            flag if flag.starts_with("--") => {
                return Err(LazyError::InvalidArgument(format!("unknown option '{}'", flag)));
            }
            path if page.is_none() => page = Some(PathBuf::from(path)),
            extra => {
                return Err(LazyError::InvalidArgument(format!("unexpected argument '{}'", extra)));
            }
        }
    }

    options.page = page.ok_or_else(|| LazyError::InvalidArgument(format!("missing page\n\n{}", USAGE)))?;
    Ok(options)
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| LazyError::InvalidArgument(format!("{} needs a value", flag)))
}

fn parse_number(raw: &str, flag: &str) -> Result<f32> {
    raw.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| LazyError::InvalidArgument(format!("{} expects a positive number, got '{}'", flag, raw)))
}

fn parse_viewport(raw: &str) -> Result<Viewport> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| LazyError::InvalidArgument(format!("viewport must be WxH, got '{}'", raw)))?;
    Ok(Viewport::new(
        parse_number(width, "--viewport")?,
        parse_number(height, "--viewport")?,
    ))
}

fn run(options: &Options) -> Result<()> {
    let config = match &options.config {
        Some(path) => LazyConfig::load(path)?,
        None => LazyConfig::default(),
    };
    let html = std::fs::read_to_string(&options.page)?;

    let mut page = Page::from_html(&html, options.viewport, options.environment(), config)?;
    page.boot();
    page.settle();

    if let Some(y) = options.scroll {
        page.scroll_to(0.0, y);
        page.render_frame();
    }

    if options.report {
        let engine = page.engine();
        let report = Report {
            name: NAME,
            version: VERSION,
            profile: page.profile().map(|p| ProfileReport {
                effective_type: p.effective_type.as_str(),
                save_data: p.save_data_requested,
                slow: p.is_slow,
                reduced_motion: p.prefers_reduced_motion,
            }),
            strategy: engine.and_then(|e| e.strategy()),
            pending: engine.map_or(0, |e| e.pending_len()),
            listeners: page.listeners().len(),
            frames: page.frames(),
            stats: engine.map(|e| e.stats()),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| LazyError::InvalidArgument(format!("report serialization failed: {}", e)))?;
        println!("{}", json);
    } else {
        println!("{}", page.to_html());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let options = parse_args(&args(&[
            "page.html",
            "--viewport",
            "800x600",
            "--scroll",
            "1200",
            "--connection",
            "3g",
            "--no-observer",
            "--report",
        ]))
        .unwrap();
        assert_eq!(options.page, PathBuf::from("page.html"));
        assert_eq!(options.viewport.size(), (800.0, 600.0));
        assert_eq!(options.scroll, Some(1200.0));
        assert_eq!(options.connection, Some(EffectiveType::ThreeG));
        assert!(options.report);

        let environment = options.environment();
        assert!(!environment.capabilities.intersection_observer);
        assert!(environment.capabilities.idle_callback);
        assert_eq!(
            environment.connection.map(|c| c.effective_type),
            Some(EffectiveType::ThreeG)
        );
    }

    #[test]
    fn test_save_data_alone_implies_connection_info() {
        let options = parse_args(&args(&["p.html", "--save-data"])).unwrap();
        let connection = options.environment().connection.unwrap();
        assert!(connection.save_data);
        assert_eq!(connection.effective_type, EffectiveType::FourG);
        assert!(parse_args(&args(&["p.html"])).unwrap().environment().connection.is_none());
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["p.html", "--viewport", "800"])).is_err());
        assert!(parse_args(&args(&["p.html", "--scroll"])).is_err());
        assert!(parse_args(&args(&["p.html", "--connection", "5g"])).is_err());
        assert!(parse_args(&args(&["p.html", "--frobnicate"])).is_err());
        assert!(parse_args(&args(&["a.html", "b.html"])).is_err());
    }
}
