// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::{ACCESS_TOKEN_ENV, Config};
use logging::LogTarget;
use runtime::{FetchSettings, RemoteRuntime};
use shopdeck_app::{AppState, ViewKind};
use shopdeck_remote::HttpTransport;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `shopdeck --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let target = if options.list.is_some() || options.check_only {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.log_file()?)
    };
    logging::init(&config.log_level(), &target)?;

    let access_token = config.access_token().ok_or_else(|| {
        anyhow!(
            "no access token; set shop.access_token in {} or {ACCESS_TOKEN_ENV}",
            options.config_path.display()
        )
    })?;
    let transport = HttpTransport::for_shop(
        config.shop_domain()?,
        config.api_version(),
        &access_token,
        config.fetch_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [shop] config in {}; fix domain/api_version/access_token values",
            options.config_path.display()
        )
    })?;
    tracing::info!(endpoint = %transport.endpoint(), timeout = ?transport.timeout(), "transport ready");
    if options.check_only {
        return Ok(());
    }

    let mut runtime = RemoteRuntime::new(transport, FetchSettings::from_config(&config));
    tracing::debug!(settings = ?runtime.settings(), "runtime configured");

    if let Some(kind) = options.list {
        let listing = runtime::render_listing(&mut runtime, kind, options.filtered)?;
        println!("{listing}");
        return Ok(());
    }

    let mut state = AppState::new(ViewKind::Orders);
    shopdeck_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    list: Option<ViewKind>,
    filtered: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        list: None,
        filtered: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow!("--list requires a view: orders, inventory, or tracking")
                })?;
                let kind = ViewKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown view {:?} for --list; use orders, inventory, or tracking",
                        value.as_ref()
                    )
                })?;
                options.list = Some(kind);
            }
            "--filtered" => {
                options.filtered = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.filtered && options.list.is_none() {
        return Err(anyhow!("--filtered needs --list orders"));
    }

    Ok(options)
}

fn print_help() {
    println!("shopdeck");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and build the shop client without fetching");
    println!("  --list <view>            Print one view (orders, inventory, tracking) and exit");
    println!("  --filtered               With --list orders, keep only orders ready to sync");
    println!("  --help                   Show this help");
}
