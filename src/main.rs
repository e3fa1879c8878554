use sixpair::backends::hid::HidapiTransport;
use sixpair::backends::raw_node::platform_raw_nodes;
use sixpair::cli::{self, Command, Console, EXIT_FAILURE};
use sixpair::config::{ColorMode, PairerConfig, LOG_ENV};
use sixpair::manager::Pairer;
use sixpair::ui::Palette;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn")).init();

    let mut args = std::env::args();
    let program = args
        .next()
        .as_deref()
        .and_then(|p| Path::new(p).file_name())
        .map_or_else(|| "sixpair".to_string(), |n| n.to_string_lossy().into_owned());
    let args: Vec<String> = args.collect();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let interactive = stdin.is_terminal();

    let config = match PairerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            let p = Palette::resolve(ColorMode::Auto, stderr.is_terminal());
            let _ = writeln!(stderr.lock(), "{} {e}", p.error());
            return exit_code(EXIT_FAILURE);
        }
    };
    let palette = Palette::resolve(config.color, stdout.is_terminal());

    let (mut out, mut err, mut input) = (stdout.lock(), stderr.lock(), stdin.lock());
    let mut console = Console {
        out: &mut out,
        err: &mut err,
        input: &mut input,
        interactive,
        palette,
        program,
    };

    let command = match Command::from_args(&args) {
        Ok(command) => command,
        Err(e) => return exit_code(cli::usage_failure(&e, &mut console)),
    };

    let transport = match HidapiTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            let _ = writeln!(console.err, "{} {e}", palette.error());
            return exit_code(EXIT_FAILURE);
        }
    };
    let mut pairer =
        Pairer::new(transport, platform_raw_nodes()).with_max_controllers(config.max_controllers);

    exit_code(cli::run(command, &mut pairer, &config, &mut console))
}
