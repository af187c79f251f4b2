mod cli;

use std::net::SocketAddr;
use std::process;

use cli::{Options, USAGE};
use logging::{LogLevel, Logger};
use voip::{
    CodecAnnouncement, MediaLoop, MediaLoopConfig, NullSink, ResolvedTransport,
    Resolver, ResolverConfig, SilenceSource, VoipConfig, descriptor,
};

fn main() {
    println!("Softphone - Starting...");

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    // Load configuration
    let config = load_config(options.config_path.as_deref());

    // Initialize logger
    let logger = initialize_logger(&config);
    logger.info("Softphone starting...");

    let bind_addr = parse_bind_address(&config, &logger);
    let transport = resolve_transport(&config, bind_addr, &logger);

    match descriptor::build(&transport.candidate(), &CodecAnnouncement::default_set()) {
        Ok(sdp) => print!("{}", sdp),
        Err(e) => {
            logger.error(&format!("Cannot build session description: {}", e));
            process::exit(1);
        }
    }

    if let Some(remote) = options.remote {
        run_media_leg(&config, &transport, remote, options.frames, &logger);
    }

    match transport.shutdown() {
        Ok(Some(report)) => logger.info(&format!(
            "Keepalive stopped after {} requests ({:?})",
            report.sent, report.stop
        )),
        Ok(None) => {}
        Err(e) => logger.warn(&format!("Relay release failed: {}", e)),
    }
    logger.info("Softphone finished");
}

/// Initializes the main logger from configuration
fn initialize_logger(config: &VoipConfig) -> Logger {
    let log_level: LogLevel = config.logging.log_level.parse().unwrap_or(LogLevel::Info);

    let logger = if config.logging.enable_file {
        Logger::with_component(
            config.logging.log_file_path.clone().into(),
            log_level,
            "Main",
            config.logging.enable_console,
        )
    } else {
        Logger::console(log_level, "Main")
    };

    match logger {
        Ok(logger) => {
            println!(
                "Logging initialized: {} (level: {})",
                config.logging.log_file_path, config.logging.log_level
            );
            logger
        }
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            process::exit(1);
        }
    }
}

/// Loads configuration from the given file, `voip.json` in the standard
/// locations, or built-in defaults
fn load_config(path: Option<&str>) -> VoipConfig {
    let loaded = match path {
        Some(path) => VoipConfig::load_from_file(path).map(|c| (c, path.to_string())),
        None => VoipConfig::discover().map(|c| (c, voip::CONFIG_FILE_NAME.to_string())),
    };

    match loaded {
        Ok((config, source)) => {
            println!("Configuration loaded from: {}", source);
            config
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Using default values...");
            VoipConfig::default()
        }
    }
}

fn parse_bind_address(config: &VoipConfig, logger: &Logger) -> SocketAddr {
    match config.media.bind_address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            logger.error(&format!(
                "Invalid media bind address {}: {}",
                config.media.bind_address, e
            ));
            process::exit(1);
        }
    }
}

fn resolve_transport(config: &VoipConfig, bind_addr: SocketAddr, logger: &Logger) -> ResolvedTransport {
    let resolver = Resolver::new(ResolverConfig::from_config(config), logger);
    match resolver.resolve(bind_addr) {
        Ok(transport) => {
            logger.info(&format!("Resolved candidate: {}", transport.candidate()));
            transport
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Sends `frames` frames of silence to `remote` from the resolved socket
/// and plays nothing back.
fn run_media_leg(
    config: &VoipConfig,
    transport: &ResolvedTransport,
    remote: SocketAddr,
    frames: u64,
    logger: &Logger,
) {
    let socket = match transport.media_socket(remote, logger.for_component("Socket")) {
        Ok(socket) => socket,
        Err(e) => {
            logger.error(&format!("Cannot open media socket: {}", e));
            return;
        }
    };

    let outcome = MediaLoop::new(
        socket,
        &config.media.codec,
        SilenceSource::limited(frames),
        NullSink::new(),
        MediaLoopConfig::from_media_config(&config.media),
        logger,
    )
    .run();

    println!(
        "Media leg ended ({}): {} sent, {} received, {} dropped",
        outcome.reason, outcome.sent, outcome.received, outcome.dropped
    );
}
